// src/infra/accounts.rs — Accounts file loading
//
// One account identifier per line, UTF-8. Lines are trimmed; blank lines and
// `#` comments are skipped. The file is re-read at the start of every pass so
// edits are picked up without a restart.

use std::path::Path;

use crate::infra::errors::ClaimBotError;

pub fn read_accounts(path: &Path) -> Result<Vec<String>, ClaimBotError> {
    if !path.exists() {
        return Err(ClaimBotError::AccountsFileNotFound {
            path: path.display().to_string(),
        });
    }

    let raw = std::fs::read_to_string(path)?;
    let accounts: Vec<String> = raw
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|l| l.to_string())
        .collect();

    if accounts.is_empty() {
        return Err(ClaimBotError::NoAccounts {
            path: path.display().to_string(),
        });
    }

    Ok(accounts)
}
