// src/engine/scheduler.rs — Account sweep and repeat-forever loop
//
// Accounts are processed strictly one at a time, in file order, with a
// jittered cooldown between accounts. The pacing resembles human usage and
// keeps the whole account set under the remote rate limiter. One pass is
// independent of the next; nothing is carried forward locally.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;

use crate::api::client::Transport;
use crate::api::types::TaskDefinition;
use crate::api::ApiClient;
use crate::engine::executor::ClaimExecutor;
use crate::engine::reconcile;
use crate::infra::accounts::read_accounts;
use crate::infra::config::Config;
use crate::util::random_in_range;

pub struct Scheduler {
    config: Config,
    api: Arc<ApiClient>,
    executor: ClaimExecutor,
}

impl Scheduler {
    pub fn new(config: Config, transport: Arc<dyn Transport>) -> Self {
        let api = Arc::new(ApiClient::new(transport, config.api.base_url.clone()));
        let executor = ClaimExecutor::new(api.clone(), config.claims.dry_run);
        Self {
            config,
            api,
            executor,
        }
    }

    /// One full sweep: catalog fetch, then every account in order. The
    /// accounts file is re-read each pass so edits apply without a restart.
    /// An error here aborts only this pass.
    pub async fn run_pass(&self) -> anyhow::Result<()> {
        tracing::info!(
            accounts_file = %self.config.claims.accounts_file,
            dry_run = self.config.claims.dry_run,
            gift_codes = %self.config.claims.gift_codes.join(", "),
            "starting full pass"
        );

        let accounts = read_accounts(Path::new(&self.config.claims.accounts_file))?;
        let catalog = self.api.fetch_active_tasks().await;

        tracing::info!(total = accounts.len(), "processing accounts");

        for (i, account) in accounts.iter().enumerate() {
            tracing::info!("===== account #{}/{}: {} =====", i + 1, accounts.len(), account);
            self.process_account(account, &catalog).await;

            // Cooldown after every account except the last.
            if i + 1 < accounts.len() {
                let sleep_ms = self.config.schedule.base_delay_ms
                    + random_in_range(0, self.config.schedule.jitter_ms);
                tracing::info!(sleep_ms, "cooldown before next account");
                tokio::time::sleep(Duration::from_millis(sleep_ms)).await;
            }
        }

        tracing::info!("full pass completed");
        Ok(())
    }

    /// Fetch state, reconcile, claim, report. Every remote failure along the
    /// way degrades to an empty/absent value or a failure result, so one
    /// account can never abort the pass.
    async fn process_account(&self, account: &str, catalog: &[TaskDefinition]) {
        let profile_before = self.api.fetch_profile(account).await;
        let completed = self.api.fetch_completed_tasks(account).await;

        let actions = reconcile::plan(
            catalog,
            &completed,
            profile_before.as_ref(),
            &self.config.claims.gift_codes,
            Utc::now(),
        );

        if actions.is_empty() {
            tracing::info!(account, "nothing left to claim");
        }

        for action in &actions {
            tracing::info!(account, "claiming {}", action);
            let _ = self.executor.execute(account, action).await;
        }

        // Post-claim snapshot for delta reporting.
        if let Some(after) = self.api.fetch_profile(account).await {
            tracing::info!(
                account,
                name = after.name.as_deref().unwrap_or("?"),
                tokens = after.afd_tokens.unwrap_or(0.0),
                completed = after.completed_count(),
                "account summary"
            );
        }
    }
}

/// Repeat full passes on a fixed wall-clock interval until `stop` flips to
/// true (or its sender drops). A failed pass is logged and the loop keeps
/// going; only an error escaping this function is fatal to the process.
pub async fn run_loop(
    scheduler: &Scheduler,
    interval: Duration,
    mut stop: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    tracing::info!(interval_ms = interval.as_millis() as u64, "entering run loop");

    loop {
        let started = Utc::now();
        tracing::info!("===== run start {} =====", started.to_rfc3339());

        if let Err(e) = scheduler.run_pass().await {
            tracing::error!("pass failed: {e:#}");
        }

        tracing::info!("===== run end {} =====", Utc::now().to_rfc3339());

        let sleep = tokio::time::sleep(interval);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => break,
                res = stop.changed() => {
                    if res.is_err() || *stop.borrow() {
                        tracing::info!("stop signal received, leaving run loop");
                        return Ok(());
                    }
                }
            }
        }
    }
}
