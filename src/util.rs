use std::env;
use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use sha2::{Digest, Sha256};

/// Environment variable naming the storage directory for database files.
pub const DATA_DIR_ENV: &str = "QBANK_DATA_DIR";

/// Fallback storage directory when the environment does not name one.
pub const DEFAULT_DATA_DIR: &str = "data";

pub fn now_utc_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Timestamp used to name backup directories, e.g. `20260805_142500`.
pub fn backup_timestamp() -> String {
    Utc::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Resolves the storage directory: explicit flag first, then `QBANK_DATA_DIR`,
/// then the local `data` fallback.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir;
    }

    match env::var(DATA_DIR_ENV) {
        Ok(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => PathBuf::from(DEFAULT_DATA_DIR),
    }
}

pub fn hash_password(plain: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plain.as_bytes());
    format!("sha256${:x}", hasher.finalize())
}
