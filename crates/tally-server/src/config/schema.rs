use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;
use tally_core::counter::DEFAULT_FILE_NAME;
use tally_core::error::{Result, TallyError};

/// Environment variable overriding `storage.data_dir`.
pub const ENV_DATA_DIR: &str = "TALLY_DATA_DIR";
/// Environment variable overriding `server.listen`.
pub const ENV_LISTEN: &str = "TALLY_LISTEN";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TallyConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub storage: StorageSection,

    #[serde(default)]
    pub log: LogSection,
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            storage: StorageSection::default(),
            log: LogSection::default(),
        }
    }
}

impl TallyConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(TallyError::UnsupportedVersion);
        }

        self.server.validate()?;
        self.storage.validate()?;

        Ok(())
    }

    /// Apply environment overrides. `lookup` is `std::env::var` in production.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.storage.data_dir = dir;
        }
        if let Some(listen) = lookup(ENV_LISTEN) {
            self.server.listen = listen;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            TallyError::BadRequest(format!(
                "server.listen must be a valid socket address ({}): {e}",
                self.listen
            ))
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageSection {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_file_name")]
    pub file_name: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            file_name: default_file_name(),
        }
    }
}

impl StorageSection {
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.trim().is_empty() {
            return Err(TallyError::BadRequest("storage.data_dir must not be empty".into()));
        }

        // file_name is joined onto data_dir; it must not escape it
        let name = self.file_name.as_str();
        let bare = Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name);
        if name.is_empty() || !bare || name.contains(['/', '\\']) {
            return Err(TallyError::BadRequest(format!(
                "storage.file_name must be a bare file name: {name:?}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSection {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:5000".into()
}
fn default_data_dir() -> String {
    "/data".into()
}
fn default_file_name() -> String {
    DEFAULT_FILE_NAME.into()
}
fn default_log_filter() -> String {
    "info".into()
}
