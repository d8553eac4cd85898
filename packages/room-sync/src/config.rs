//! Runtime configuration for the synchronization layer.

use std::env;
use std::str::FromStr;

use konchina_engine::GameRules;

use crate::error::SyncError;

pub const DEFAULT_TXN_MAX_ATTEMPTS: u32 = 8;
pub const DEFAULT_TXN_BACKOFF_MS: u64 = 5;

/// Retry budget, AFK policy and the rules new rooms are created with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Read-compute-write attempts before giving up on a contended room.
    pub txn_max_attempts: u32,
    /// Base delay between conflicting attempts; doubles per attempt.
    pub txn_backoff_ms: u64,
    /// Forfeit a player once this many of their turns time out in a row.
    pub afk_forfeit_after: Option<u32>,
    pub rules: GameRules,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            txn_max_attempts: DEFAULT_TXN_MAX_ATTEMPTS,
            txn_backoff_ms: DEFAULT_TXN_BACKOFF_MS,
            afk_forfeit_after: None,
            rules: GameRules::default(),
        }
    }
}

impl SyncConfig {
    /// Build from `KONCHINA_*` environment variables, defaulting what is unset.
    pub fn from_env() -> Result<Self, SyncError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let txn_max_attempts = parse_var(&lookup, "KONCHINA_TXN_MAX_ATTEMPTS")?
            .unwrap_or(defaults.txn_max_attempts);
        if txn_max_attempts == 0 {
            return Err(SyncError::config(
                "KONCHINA_TXN_MAX_ATTEMPTS must be at least 1",
            ));
        }

        let txn_backoff_ms =
            parse_var(&lookup, "KONCHINA_TXN_BACKOFF_MS")?.unwrap_or(defaults.txn_backoff_ms);

        let afk_forfeit_after = parse_var::<u32, _>(&lookup, "KONCHINA_AFK_FORFEIT_AFTER")?;
        if afk_forfeit_after == Some(0) {
            return Err(SyncError::config(
                "KONCHINA_AFK_FORFEIT_AFTER must be at least 1 when set",
            ));
        }

        let mut rules = defaults.rules;
        if let Some(threshold) = parse_var::<u32, _>(&lookup, "KONCHINA_WIN_THRESHOLD")? {
            if threshold == 0 {
                return Err(SyncError::config(
                    "KONCHINA_WIN_THRESHOLD must be at least 1",
                ));
            }
            rules = rules.with_win_threshold(threshold);
        }
        if let Some(raw) = lookup("KONCHINA_ENFORCE_CAPTURES") {
            rules = rules.with_capture_enforcement(parse_flag("KONCHINA_ENFORCE_CAPTURES", &raw)?);
        }

        Ok(Self {
            txn_max_attempts,
            txn_backoff_ms,
            afk_forfeit_after,
            rules,
        })
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>, SyncError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<T>()
        .map(Some)
        .map_err(|e| SyncError::config(format!("{name}={raw:?} is invalid: {e}")))
}

fn parse_flag(name: &str, raw: &str) -> Result<bool, SyncError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(SyncError::config(format!(
            "{name}={other:?} is not a boolean"
        ))),
    }
}
