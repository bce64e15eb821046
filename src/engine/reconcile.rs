// src/engine/reconcile.rs — Claim planning
//
// Pure decision function: catalog + account state + configured gift codes in,
// ordered claim actions out. No I/O here; the scheduler owns the sleeps and
// the executor owns the network.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::api::types::{CompletedTask, TaskDefinition, UserProfile, DAILY_CHECKIN};

/// One claim still required for an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimAction {
    Task { task_type: String, task_name: String },
    GiftCode { code: String },
}

impl std::fmt::Display for ClaimAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimAction::Task {
                task_type,
                task_name,
            } => write!(f, "task {task_type} (\"{task_name}\")"),
            ClaimAction::GiftCode { code } => write!(f, "gift code \"{code}\""),
        }
    }
}

/// Decide what still needs claiming. Output order: daily check-in first, then
/// remaining tasks in catalog order, then gift codes in configured order —
/// chosen for predictable logs, not required by the protocol.
pub fn plan(
    catalog: &[TaskDefinition],
    completed: &[CompletedTask],
    profile: Option<&UserProfile>,
    gift_codes: &[String],
    now: DateTime<Utc>,
) -> Vec<ClaimAction> {
    let by_type = group_by_type(completed);
    let mut actions = Vec::new();

    // Daily check-in: claimable unless the most recent completion falls on
    // today's UTC calendar date.
    if daily_checkin_open(&by_type, now) {
        let task_name = catalog
            .iter()
            .find(|t| t.task_type == DAILY_CHECKIN)
            .map(|t| t.display_name().to_string())
            .unwrap_or_else(|| "Daily Check-in".into());
        actions.push(ClaimAction::Task {
            task_type: DAILY_CHECKIN.into(),
            task_name,
        });
    } else {
        tracing::debug!("daily check-in already claimed today");
    }

    // Other tasks: any completion of the type, regardless of count or age,
    // suppresses the claim.
    for task in catalog.iter().filter(|t| t.task_type != DAILY_CHECKIN) {
        match by_type.get(task.task_type.as_str()) {
            Some(entries) => {
                tracing::debug!(
                    task_type = %task.task_type,
                    count = entries.len(),
                    "task already completed"
                );
            }
            None => actions.push(ClaimAction::Task {
                task_type: task.task_type.clone(),
                task_name: task.display_name().to_string(),
            }),
        }
    }

    // Gift codes: claim state is external and authoritative; an absent
    // profile means nothing is known to be claimed, so every code is tried.
    for code in gift_codes {
        let claimed = profile.is_some_and(|p| p.has_claimed_code(code));
        if claimed {
            tracing::debug!(code = %code, "gift code already claimed");
        } else {
            actions.push(ClaimAction::GiftCode { code: code.clone() });
        }
    }

    actions
}

fn group_by_type(completed: &[CompletedTask]) -> HashMap<&str, Vec<&CompletedTask>> {
    let mut by_type: HashMap<&str, Vec<&CompletedTask>> = HashMap::new();
    for entry in completed {
        by_type.entry(entry.task_type.as_str()).or_default().push(entry);
    }
    by_type
}

fn daily_checkin_open(by_type: &HashMap<&str, Vec<&CompletedTask>>, now: DateTime<Utc>) -> bool {
    let Some(entries) = by_type.get(DAILY_CHECKIN) else {
        return true;
    };
    // Entries are unordered; the most recent completion decides.
    match entries.iter().max_by_key(|e| e.completed_at) {
        Some(latest) => latest.completed_at.date_naive() != now.date_naive(),
        None => true,
    }
}
