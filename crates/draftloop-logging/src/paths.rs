use std::io;
use std::path::PathBuf;

use chrono::Utc;
use sha2::{Digest, Sha256};

/// Default location for a run's event log:
/// `<data_dir>/draftloop/runs/<UTC timestamp>_<brief hash>.jsonl`
pub fn default_log_path(brief: &str) -> io::Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "Could not determine data directory",
        )
    })?;
    Ok(data_dir
        .join("draftloop")
        .join("runs")
        .join(log_file_name(brief, Utc::now())))
}

/// First 6 hex digits of the brief's SHA-256; names the run without
/// recording the brief
pub fn brief_hash(brief: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(brief.as_bytes());
    let mut hash = hex::encode(hasher.finalize());
    hash.truncate(6);
    hash
}

fn log_file_name(brief: &str, now: chrono::DateTime<Utc>) -> String {
    format!(
        "{}_{}.jsonl",
        now.format("%Y-%m-%dT%H-%M-%SZ"),
        brief_hash(brief)
    )
}
