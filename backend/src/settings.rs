//! Application settings loaded via OrthoConfig.
//!
//! Values come from `LISTS_*` environment variables, an optional
//! configuration file and command-line flags, in ortho_config's usual
//! precedence. Session cookie toggles are read separately by
//! [`crate::inbound::http::session_config`].

use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::persistence::StoreLocation;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAILBOX_CAPACITY: usize = 64;
const METADATA_FILE_NAME: &str = "metadata.sqlite3";
const IN_MEMORY_URL: &str = ":memory:";

/// Server and storage settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LISTS")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Directory holding one SQLite file per entity. Absent means every
    /// store lives in memory and is lost on restart.
    pub data_dir: Option<PathBuf>,
    /// Metadata mirror database. Defaults to a file inside `data_dir`.
    pub metadata_path: Option<PathBuf>,
    /// Bounded mailbox size of each entity worker.
    pub mailbox_capacity: Option<usize>,
}

impl AppSettings {
    /// Parse the bind address, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`AddrParseError`] when the configured value is not a socket
    /// address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
    }

    /// Where entity stores live.
    pub fn store_location(&self) -> StoreLocation {
        self.data_dir
            .clone()
            .map_or(StoreLocation::InMemory, StoreLocation::Directory)
    }

    /// Connection string of the metadata mirror.
    pub fn metadata_url(&self) -> String {
        match (&self.metadata_path, &self.data_dir) {
            (Some(path), _) => path.to_string_lossy().into_owned(),
            (None, Some(dir)) => dir.join(METADATA_FILE_NAME).to_string_lossy().into_owned(),
            (None, None) => IN_MEMORY_URL.to_owned(),
        }
    }

    /// Mailbox capacity, never below one.
    pub fn mailbox_capacity(&self) -> usize {
        self.mailbox_capacity
            .unwrap_or(DEFAULT_MAILBOX_CAPACITY)
            .max(1)
    }
}
