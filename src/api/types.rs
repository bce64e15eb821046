// src/api/types.rs — Wire types for the remote tasks API
//
// All endpoints wrap their payload in a `{ success, data }` envelope. Field
// names on the wire are camelCase; everything beyond the join keys is
// optional because the remote omits fields freely.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Task type of the recurring daily check-in, claimable once per UTC day.
pub const DAILY_CHECKIN: &str = "daily_checkin";

/// Standard response envelope for the GET endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
}

/// One entry of the global active-task catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDefinition {
    pub task_type: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub task_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reward: Option<f64>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl TaskDefinition {
    /// Human-readable name, falling back title → taskName → description →
    /// taskType.
    pub fn display_name(&self) -> &str {
        self.title
            .as_deref()
            .or(self.task_name.as_deref())
            .or(self.description.as_deref())
            .unwrap_or(&self.task_type)
    }

    /// Synthetic daily check-in definition, prepended to the catalog when the
    /// remote omits one so the daily path is always evaluated.
    pub fn synthetic_daily_checkin() -> Self {
        Self {
            task_type: DAILY_CHECKIN.into(),
            title: Some("Daily Check-in".into()),
            task_name: None,
            description: Some("Daily check-in reward".into()),
            reward: Some(5.0),
            platform: Some("Internal".into()),
            is_active: Some(true),
        }
    }
}

/// One completed-task record from an account's history.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedTask {
    pub task_type: String,
    pub completed_at: DateTime<Utc>,
}

/// Account profile snapshot, fetched before claiming (gift-code gating) and
/// after (summary reporting).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub afd_tokens: Option<f64>,
    #[serde(default)]
    pub completed_tasks: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub claimed_gift_codes: Vec<ClaimedCode>,
}

impl UserProfile {
    pub fn completed_count(&self) -> usize {
        self.completed_tasks.as_ref().map_or(0, |t| t.len())
    }

    /// Whether `code` appears in the claimed-gift-codes collection, in either
    /// of the shapes the remote returns.
    pub fn has_claimed_code(&self, code: &str) -> bool {
        self.claimed_gift_codes.iter().any(|e| e.matches(code))
    }
}

/// Entry of a profile's claimed-gift-codes collection. The remote returns
/// either a bare code string or an object carrying a `code` field; anything
/// else is kept but never matches.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ClaimedCode {
    Bare(String),
    Keyed { code: String },
    Other(serde_json::Value),
}

impl ClaimedCode {
    pub fn matches(&self, code: &str) -> bool {
        match self {
            ClaimedCode::Bare(c) => c == code,
            ClaimedCode::Keyed { code: c } => c == code,
            ClaimedCode::Other(_) => false,
        }
    }
}
