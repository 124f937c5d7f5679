//! Server config loader (strict parsing).

pub mod schema;

use std::fs;
use std::path::Path;

use tally_core::error::{Result, TallyError};

pub use schema::{LogSection, ServerSection, StorageSection, TallyConfig};

/// Config file looked up when no path is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "tally.yaml";

pub fn load_from_file(path: &str) -> Result<TallyConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| TallyError::Internal(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<TallyConfig> {
    let cfg: TallyConfig = serde_yaml::from_str(s)
        .map_err(|e| TallyError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Resolve the effective config for the binary.
///
/// An explicit `path` must exist. Without one, `tally.yaml` is used when
/// present and built-in defaults otherwise. Environment overrides are
/// applied last and the result is validated again.
pub fn load(path: Option<&str>) -> Result<TallyConfig> {
    let mut cfg = match path {
        Some(p) => load_from_file(p)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => load_from_file(DEFAULT_CONFIG_PATH)?,
        None => TallyConfig::default(),
    };
    cfg.apply_overrides(|key| std::env::var(key).ok());
    cfg.validate()?;
    Ok(cfg)
}
