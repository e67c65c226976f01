//! Per-request connection settings.
//!
//! Defaults are applied when a builder is created. There is no shared
//! mutable default; each builder owns its own copy.

use std::time::Duration;

use ureq::tls::TlsConfig;

/// Connect timeout applied to new builders.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Read timeout applied to new builders.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(1000);

/// How the transport should open and drive the connection.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub follow_redirects: bool,
    /// Skip TLS hostname verification. Insecure; meant for test and internal hosts.
    pub allow_all_hostnames: bool,
    /// Custom TLS configuration for `https` URLs. `None` uses the stack default.
    pub tls: Option<TlsConfig>,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            follow_redirects: true,
            allow_all_hostnames: false,
            tls: None,
        }
    }
}

impl ConnectionSettings {
    /// The TLS configuration the transport should use.
    ///
    /// Starts from the custom configuration when one is set. With
    /// `allow_all_hostnames` the result has certificate verification turned
    /// off, which is the only knob the stack exposes for hostname checks.
    pub fn effective_tls(&self) -> TlsConfig {
        let base = self.tls.clone().unwrap_or_default();
        if !self.allow_all_hostnames {
            return base;
        }
        TlsConfig::builder()
            .provider(base.provider())
            .root_certs(base.root_certs().clone())
            .client_cert(base.client_cert().cloned())
            .use_sni(base.use_sni())
            .disable_verification(true)
            .build()
    }
}
