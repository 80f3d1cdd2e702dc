use locate_core::error::{LocateError, Result};
use serde::Deserialize;

/// Largest accepted `pending.max_entries`.
pub const MAX_PENDING_LIMIT: usize = 65_536;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocateConfig {
    pub version: u32,

    #[serde(default)]
    pub codec: CodecSection,

    #[serde(default)]
    pub pending: PendingSection,
}

impl Default for LocateConfig {
    fn default() -> Self {
        Self {
            version: 1,
            codec: CodecSection::default(),
            pending: PendingSection::default(),
        }
    }
}

impl LocateConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(LocateError::UnsupportedVersion);
        }
        self.pending.validate()?;
        Ok(())
    }
}

/// Which non-fatal decode observations are logged at debug level.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodecSection {
    #[serde(default)]
    pub log_unknown_fields: bool,

    #[serde(default = "default_true")]
    pub log_unmatched_caps: bool,
}

impl Default for CodecSection {
    fn default() -> Self {
        Self {
            log_unknown_fields: false,
            log_unmatched_caps: default_true(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PendingSection {
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for PendingSection {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

impl PendingSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_PENDING_LIMIT).contains(&self.max_entries) {
            return Err(LocateError::BadConfig(format!(
                "pending.max_entries must be between 1 and {MAX_PENDING_LIMIT}"
            )));
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}
fn default_max_entries() -> usize {
    256
}
