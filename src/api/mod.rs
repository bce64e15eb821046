// src/api/mod.rs — Remote tasks API surface
//
// Thin endpoint layer over the rate-limited client. GET endpoints return
// `{ success, data }` envelopes; a failed or malformed envelope degrades to
// an empty/absent value and is never fatal for the account being processed.

pub mod client;
pub mod types;

use std::sync::Arc;

use serde::de::DeserializeOwned;

use client::{ApiRequest, RateLimitedClient, SendOutcome, Transport};
use types::{CompletedTask, Envelope, TaskDefinition, UserProfile, DAILY_CHECKIN};

pub struct ApiClient {
    client: RateLimitedClient,
    base_url: String,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>) -> Self {
        Self {
            client: RateLimitedClient::new(transport),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET an enveloped payload. Returns `None` on any terminal failure or a
    /// missing/false `success` flag.
    async fn fetch_enveloped<T: DeserializeOwned>(&self, label: &str, path: &str) -> Option<T> {
        match self.client.send(label, ApiRequest::get(self.url(path))).await {
            SendOutcome::Response(resp) => {
                let envelope: Envelope<T> = match serde_json::from_value(resp.body) {
                    Ok(e) => e,
                    Err(e) => {
                        tracing::warn!(label, status = resp.status, "malformed envelope: {}", e);
                        return None;
                    }
                };
                if !envelope.success {
                    tracing::warn!(label, status = resp.status, "envelope reports failure");
                    return None;
                }
                envelope.data
            }
            // Already logged by the client layer
            SendOutcome::RateLimitExhausted | SendOutcome::NetworkFailure(_) => None,
        }
    }

    /// Global catalog of active tasks. A synthetic daily check-in definition
    /// is prepended when the catalog omits one, so the daily path is always
    /// evaluated.
    pub async fn fetch_active_tasks(&self) -> Vec<TaskDefinition> {
        let mut tasks: Vec<TaskDefinition> = self
            .fetch_enveloped("/tasks/active", "/tasks/active")
            .await
            .unwrap_or_default();

        tracing::info!("loaded {} active tasks", tasks.len());

        if !tasks.iter().any(|t| t.task_type == DAILY_CHECKIN) {
            tasks.insert(0, TaskDefinition::synthetic_daily_checkin());
        }
        tasks
    }

    /// Completed-task history for one account; empty on failure.
    pub async fn fetch_completed_tasks(&self, account: &str) -> Vec<CompletedTask> {
        let label = format!("[{account}] /tasks/user");
        let tasks: Vec<CompletedTask> = self
            .fetch_enveloped(&label, &format!("/tasks/user/{account}"))
            .await
            .unwrap_or_default();
        tracing::debug!(account, completed = tasks.len(), "fetched completion history");
        tasks
    }

    /// Profile snapshot for one account; absent on failure.
    pub async fn fetch_profile(&self, account: &str) -> Option<UserProfile> {
        let label = format!("[{account}] /users/:id");
        self.fetch_enveloped(&label, &format!("/users/{account}"))
            .await
    }

    pub async fn claim_task(&self, account: &str, task_type: &str, task_name: &str) -> SendOutcome {
        let label = format!("[{account}] /tasks/complete {task_type}");
        let payload = serde_json::json!({
            "userId": account,
            "taskType": task_type,
            "taskName": task_name,
        });
        self.client
            .send(&label, ApiRequest::post(self.url("/tasks/complete"), payload))
            .await
    }

    pub async fn claim_gift_code(&self, account: &str, code: &str) -> SendOutcome {
        let label = format!("[{account}] /gift-codes/claim {code}");
        let payload = serde_json::json!({
            "userId": account,
            "code": code,
        });
        self.client
            .send(&label, ApiRequest::post(self.url("/gift-codes/claim"), payload))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use client::{ApiResponse, TransportError};
    use pretty_assertions::assert_eq;

    /// Transport answering GETs from a fixed URL-suffix → body table.
    struct TableTransport {
        routes: Vec<(&'static str, serde_json::Value)>,
    }

    #[async_trait]
    impl Transport for TableTransport {
        async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
            for (suffix, body) in &self.routes {
                if request.url.ends_with(suffix) {
                    return Ok(ApiResponse {
                        status: 200,
                        body: body.clone(),
                    });
                }
            }
            Ok(ApiResponse {
                status: 404,
                body: serde_json::Value::Null,
            })
        }
    }

    fn api(routes: Vec<(&'static str, serde_json::Value)>) -> ApiClient {
        ApiClient::new(Arc::new(TableTransport { routes }), "http://api.test")
    }

    #[tokio::test]
    async fn test_catalog_synthesizes_daily_checkin() {
        let api = api(vec![(
            "/tasks/active",
            serde_json::json!({
                "success": true,
                "data": [{"taskType": "social_follow", "title": "Follow X"}]
            }),
        )]);

        let tasks = api.fetch_active_tasks().await;
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].task_type, DAILY_CHECKIN);
        assert_eq!(tasks[1].task_type, "social_follow");
    }

    #[tokio::test]
    async fn test_catalog_keeps_remote_daily_checkin() {
        let api = api(vec![(
            "/tasks/active",
            serde_json::json!({
                "success": true,
                "data": [
                    {"taskType": "social_follow"},
                    {"taskType": "daily_checkin", "title": "Check in", "reward": 7}
                ]
            }),
        )]);

        let tasks = api.fetch_active_tasks().await;
        assert_eq!(tasks.len(), 2);
        // Remote definition kept in catalog position, not replaced
        assert_eq!(tasks[1].task_type, DAILY_CHECKIN);
        assert_eq!(tasks[1].reward, Some(7.0));
    }

    #[tokio::test]
    async fn test_failed_envelope_yields_empty_catalog() {
        let api = api(vec![(
            "/tasks/active",
            serde_json::json!({"success": false, "data": [{"taskType": "x"}]}),
        )]);

        let tasks = api.fetch_active_tasks().await;
        // Only the synthesized daily check-in survives a soft failure
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].task_type, DAILY_CHECKIN);
    }

    #[tokio::test]
    async fn test_malformed_body_yields_empty_history() {
        let api = api(vec![(
            "/tasks/user/u1",
            serde_json::json!({"success": true, "data": "not-a-list"}),
        )]);

        let tasks = api.fetch_completed_tasks("u1").await;
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn test_profile_absent_on_http_failure() {
        let api = api(vec![]);
        assert!(api.fetch_profile("u1").await.is_none());
    }

    #[tokio::test]
    async fn test_profile_fetch() {
        let api = api(vec![(
            "/users/u1",
            serde_json::json!({
                "success": true,
                "data": {"name": "alice", "afdTokens": 12.0, "claimedGiftCodes": ["W10"]}
            }),
        )]);

        let profile = api.fetch_profile("u1").await.unwrap();
        assert_eq!(profile.name.as_deref(), Some("alice"));
        assert!(profile.has_claimed_code("W10"));
    }
}
