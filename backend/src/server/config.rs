//! HTTP server configuration object and helpers.

use actix_web::cookie::{Key, SameSite};
use lists::outbound::stack::StorageStack;
use std::net::SocketAddr;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) storage: Option<StorageStack>,
}

impl ServerConfig {
    /// Construct a server configuration using session settings and a bind
    /// address.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            storage: None,
        }
    }

    /// Attach the entity stores and metadata mirror.
    ///
    /// Without storage the server answers from fixture ports, which is only
    /// useful for smoke tests of the HTTP surface.
    #[must_use]
    pub fn with_storage(mut self, storage: StorageStack) -> Self {
        self.storage = Some(storage);
        self
    }
}
