//! Connection settings.

use std::time::Duration;

use crate::protocol::DEFAULT_TAG_PREFIX;

/// How the socket is protected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Security {
    /// Plain TCP (port 143). Only for local testing.
    None,
    /// TLS from the first byte (port 993).
    #[default]
    Implicit,
}

impl Security {
    /// Port conventionally used with this mode.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::None => 143,
            Self::Implicit => 993,
        }
    }
}

/// Settings for one connection.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server hostname, also used for certificate checks.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Socket protection.
    pub security: Security,
    /// Bound on TCP connect, TLS handshake and greeting together.
    pub connect_timeout: Duration,
    /// Bound on each socket write.
    pub io_timeout: Duration,
    /// Start the session with wire logging on.
    pub debug: bool,
    /// Prefix for command tags.
    pub tag_prefix: String,
}

impl Config {
    /// Implicit TLS on port 993 with default timeouts.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        ConfigBuilder::new(host).build()
    }

    /// Starts a builder.
    #[must_use]
    pub fn builder(host: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(host)
    }

    /// `host:port`, as handed to the resolver.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Builder for [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    host: String,
    port: Option<u16>,
    security: Security,
    connect_timeout: Duration,
    io_timeout: Duration,
    debug: bool,
    tag_prefix: String,
}

impl ConfigBuilder {
    /// Creates a builder for `host`.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            security: Security::Implicit,
            connect_timeout: Duration::from_secs(30),
            io_timeout: Duration::from_secs(60),
            debug: false,
            tag_prefix: DEFAULT_TAG_PREFIX.to_string(),
        }
    }

    /// Sets the port; defaults to the one for the security mode.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the security mode.
    #[must_use]
    pub const fn security(mut self, security: Security) -> Self {
        self.security = security;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the write timeout.
    #[must_use]
    pub const fn io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Turns wire logging on or off.
    #[must_use]
    pub const fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the tag prefix.
    #[must_use]
    pub fn tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tag_prefix = prefix.into();
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> Config {
        Config {
            host: self.host,
            port: self.port.unwrap_or_else(|| self.security.default_port()),
            security: self.security,
            connect_timeout: self.connect_timeout,
            io_timeout: self.io_timeout,
            debug: self.debug,
            tag_prefix: self.tag_prefix,
        }
    }
}
