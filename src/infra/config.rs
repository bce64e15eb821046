// src/infra/config.rs — Configuration loading (TOML + environment overrides)
//
// Resolution order: built-in defaults, then an optional config.toml, then
// `CLAIMBOT_*` environment variables, then CLI flags (applied in main).

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub claims: ClaimsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the remote REST API (no trailing slash).
    pub base_url: String,
    /// Outbound User-Agent header.
    pub user_agent: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.aithereumnetwork.com/api".into(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36"
                .into(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Fixed part of the inter-account delay (ms).
    pub base_delay_ms: u64,
    /// Upper bound of the random jitter added to the inter-account delay (ms).
    pub jitter_ms: u64,
    /// Wall-clock interval between full passes over all accounts (ms).
    pub loop_interval_ms: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 3_000,
            jitter_ms: 2_000,
            loop_interval_ms: 240 * 60 * 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimsConfig {
    /// Newline-delimited accounts file (blank lines and `#` comments skipped).
    pub accounts_file: String,
    /// When true, no claim POST is ever issued.
    pub dry_run: bool,
    /// Gift codes to claim for every account (deduplicated, order kept).
    #[serde(default)]
    pub gift_codes: Vec<String>,
}

impl Default for ClaimsConfig {
    fn default() -> Self {
        Self {
            accounts_file: "accounts.txt".into(),
            dry_run: false,
            gift_codes: Vec::new(),
        }
    }
}

impl Config {
    /// Load config from a TOML file, then apply environment overrides.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Defaults plus environment overrides (no config file).
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from a lookup function. Split out from
    /// `apply_env_overrides` so tests can inject values without touching
    /// process environment.
    fn apply_overrides(&mut self, get: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| get(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("CLAIMBOT_API_BASE") {
            self.api.base_url = v.trim().trim_end_matches('/').to_string();
        }
        if let Some(v) = get("CLAIMBOT_USER_AGENT") {
            self.api.user_agent = v;
        }
        if let Some(v) = get("CLAIMBOT_ACCOUNTS_FILE") {
            self.claims.accounts_file = v;
        }
        if let Some(v) = get("CLAIMBOT_DRY_RUN") {
            self.claims.dry_run = matches!(v.trim(), "1" | "true" | "yes");
        }
        if let Some(v) = get("CLAIMBOT_GIFT_CODES") {
            self.claims.gift_codes = parse_gift_codes(&v);
        }
        if let Some(v) = get("CLAIMBOT_BASE_DELAY_MS").and_then(|v| v.trim().parse().ok()) {
            self.schedule.base_delay_ms = v;
        }
        if let Some(v) = get("CLAIMBOT_JITTER_MS").and_then(|v| v.trim().parse().ok()) {
            self.schedule.jitter_ms = v;
        }
        if let Some(v) = get("CLAIMBOT_LOOP_INTERVAL_MS").and_then(|v| v.trim().parse().ok()) {
            self.schedule.loop_interval_ms = v;
        }
    }
}

/// Parse a comma-separated gift-code list: trimmed, empties dropped,
/// duplicates removed keeping the first occurrence.
pub fn parse_gift_codes(raw: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    raw.split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .filter(|c| seen.insert(c.clone()))
        .collect()
}
