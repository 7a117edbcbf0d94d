use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

/// One line of the account list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountEntry {
    /// 1-based line number in the list
    pub id: usize,
    pub raw: String,
}

/// Read the newline-delimited credential list
pub fn load_accounts(path: &Path) -> Result<Vec<AccountEntry>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read account list {:?}", path))?;
    let accounts = parse_accounts(&contents);
    info!("Loaded {} account(s) from {:?}", accounts.len(), path);
    Ok(accounts)
}

/// Blank lines are skipped but still count toward the numbering
pub fn parse_accounts(contents: &str) -> Vec<AccountEntry> {
    contents
        .lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let raw = line.trim();
            (!raw.is_empty()).then(|| AccountEntry {
                id: i + 1,
                raw: raw.to_string(),
            })
        })
        .collect()
}
