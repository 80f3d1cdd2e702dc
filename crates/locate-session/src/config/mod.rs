//! Session config loader (strict parsing).

pub mod schema;

use std::fs;

use locate_core::error::{LocateError, Result};

pub use schema::{CodecSection, LocateConfig, PendingSection};

pub fn load_from_file(path: &str) -> Result<LocateConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| LocateError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<LocateConfig> {
    let cfg: LocateConfig = serde_yaml::from_str(s)
        .map_err(|e| LocateError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
