// src/engine/executor.rs — Claim execution
//
// Executes one planned claim through the rate-limited client, or simulates
// it in dry-run mode. Responses are interpreted defensively: absent fields
// render as "?" and never abort the account.

use std::sync::Arc;

use crate::api::client::SendOutcome;
use crate::api::ApiClient;
use crate::engine::reconcile::ClaimAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    Success,
    HttpFailure,
    NetworkFailure,
    RateLimitExhausted,
    DryRun,
}

#[derive(Debug, Clone)]
pub struct ClaimResult {
    pub outcome: ClaimOutcome,
    pub status: Option<u16>,
    pub reward: String,
    pub new_balance: String,
    pub message: String,
}

impl ClaimResult {
    fn bare(outcome: ClaimOutcome, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            outcome,
            status,
            reward: "?".into(),
            new_balance: "?".into(),
            message: message.into(),
        }
    }
}

pub struct ClaimExecutor {
    api: Arc<ApiClient>,
    dry_run: bool,
}

impl ClaimExecutor {
    pub fn new(api: Arc<ApiClient>, dry_run: bool) -> Self {
        Self { api, dry_run }
    }

    pub async fn execute(&self, account: &str, action: &ClaimAction) -> ClaimResult {
        // Checked before any request is issued, for both action kinds.
        if self.dry_run {
            tracing::info!(account, "dry run, skipping {}", action);
            return ClaimResult::bare(ClaimOutcome::DryRun, None, "dry run");
        }

        let outcome = match action {
            ClaimAction::Task {
                task_type,
                task_name,
            } => self.api.claim_task(account, task_type, task_name).await,
            ClaimAction::GiftCode { code } => self.api.claim_gift_code(account, code).await,
        };

        self.interpret(account, action, outcome)
    }

    fn interpret(&self, account: &str, action: &ClaimAction, outcome: SendOutcome) -> ClaimResult {
        match outcome {
            SendOutcome::Response(resp) => {
                let reward = field_or_unknown(&resp.body, "reward");
                let new_balance = field_or_unknown(&resp.body, "newBalance");
                let message = resp.body["message"].as_str().unwrap_or("").to_string();

                if resp.is_success() {
                    tracing::info!(
                        account,
                        status = resp.status,
                        reward = %reward,
                        new_balance = %new_balance,
                        "claimed {}: {}",
                        action,
                        message
                    );
                    ClaimResult {
                        outcome: ClaimOutcome::Success,
                        status: Some(resp.status),
                        reward,
                        new_balance,
                        message,
                    }
                } else {
                    tracing::warn!(
                        account,
                        status = resp.status,
                        "claim failed for {}: {}",
                        action,
                        message
                    );
                    ClaimResult {
                        outcome: ClaimOutcome::HttpFailure,
                        status: Some(resp.status),
                        reward,
                        new_balance,
                        message,
                    }
                }
            }
            SendOutcome::RateLimitExhausted => {
                tracing::warn!(account, "rate limit exhausted claiming {}", action);
                ClaimResult::bare(ClaimOutcome::RateLimitExhausted, Some(429), "too many retries")
            }
            SendOutcome::NetworkFailure(message) => {
                tracing::warn!(account, "network failure claiming {}: {}", action, message);
                ClaimResult::bare(ClaimOutcome::NetworkFailure, None, message)
            }
        }
    }
}

/// Render an optional response field, with an explicit placeholder when the
/// remote omits it.
fn field_or_unknown(body: &serde_json::Value, key: &str) -> String {
    match body.get(key) {
        None | Some(serde_json::Value::Null) => "?".into(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(v) => v.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::{ApiRequest, ApiResponse, Transport, TransportError};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FixedTransport {
        result: fn() -> Result<ApiResponse, TransportError>,
        calls: AtomicU32,
    }

    #[async_trait]
    impl Transport for FixedTransport {
        async fn execute(&self, _request: &ApiRequest) -> Result<ApiResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)()
        }
    }

    fn executor(
        result: fn() -> Result<ApiResponse, TransportError>,
        dry_run: bool,
    ) -> (ClaimExecutor, Arc<FixedTransport>) {
        let transport = Arc::new(FixedTransport {
            result,
            calls: AtomicU32::new(0),
        });
        let api = Arc::new(ApiClient::new(transport.clone(), "http://api.test"));
        (ClaimExecutor::new(api, dry_run), transport)
    }

    fn task_action() -> ClaimAction {
        ClaimAction::Task {
            task_type: "quiz".into(),
            task_name: "Weekly Quiz".into(),
        }
    }

    #[tokio::test]
    async fn test_dry_run_issues_no_request() {
        let (executor, transport) = executor(
            || {
                Ok(ApiResponse {
                    status: 200,
                    body: serde_json::json!({}),
                })
            },
            true,
        );

        let result = executor.execute("u1", &task_action()).await;
        assert_eq!(result.outcome, ClaimOutcome::DryRun);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);

        let gift = executor
            .execute("u1", &ClaimAction::GiftCode { code: "W10".into() })
            .await;
        assert_eq!(gift.outcome, ClaimOutcome::DryRun);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_extracts_fields() {
        let (executor, _) = executor(
            || {
                Ok(ApiResponse {
                    status: 200,
                    body: serde_json::json!({
                        "reward": 5,
                        "newBalance": "105",
                        "message": "Task completed"
                    }),
                })
            },
            false,
        );

        let result = executor.execute("u1", &task_action()).await;
        assert_eq!(result.outcome, ClaimOutcome::Success);
        assert_eq!(result.status, Some(200));
        assert_eq!(result.reward, "5");
        assert_eq!(result.new_balance, "105");
        assert_eq!(result.message, "Task completed");
    }

    #[tokio::test]
    async fn test_absent_fields_render_placeholder() {
        let (executor, _) = executor(
            || {
                Ok(ApiResponse {
                    status: 201,
                    body: serde_json::json!({}),
                })
            },
            false,
        );

        let result = executor.execute("u1", &task_action()).await;
        assert_eq!(result.outcome, ClaimOutcome::Success);
        assert_eq!(result.reward, "?");
        assert_eq!(result.new_balance, "?");
        assert_eq!(result.message, "");
    }

    #[tokio::test]
    async fn test_http_failure_carries_status_and_message() {
        let (executor, _) = executor(
            || {
                Ok(ApiResponse {
                    status: 400,
                    body: serde_json::json!({"message": "Already claimed"}),
                })
            },
            false,
        );

        let result = executor
            .execute("u1", &ClaimAction::GiftCode { code: "W10".into() })
            .await;
        assert_eq!(result.outcome, ClaimOutcome::HttpFailure);
        assert_eq!(result.status, Some(400));
        assert_eq!(result.message, "Already claimed");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_exhaustion_passes_through() {
        let (executor, transport) = executor(
            || {
                Ok(ApiResponse {
                    status: 429,
                    body: serde_json::Value::Null,
                })
            },
            false,
        );

        let result = executor.execute("u1", &task_action()).await;
        assert_eq!(result.outcome, ClaimOutcome::RateLimitExhausted);
        assert_eq!(result.status, Some(429));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_network_failure_passes_through() {
        let (executor, transport) = executor(|| Err(TransportError::Connect("reset".into())), false);

        let result = executor.execute("u1", &task_action()).await;
        assert_eq!(result.outcome, ClaimOutcome::NetworkFailure);
        assert_eq!(result.status, None);
        assert_eq!(result.message, "reset");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_field_or_unknown_shapes() {
        let body = serde_json::json!({"a": "x", "b": 7, "c": null});
        assert_eq!(field_or_unknown(&body, "a"), "x");
        assert_eq!(field_or_unknown(&body, "b"), "7");
        assert_eq!(field_or_unknown(&body, "c"), "?");
        assert_eq!(field_or_unknown(&body, "missing"), "?");
    }
}
