//! HTTP request types described as plain data.
//!
//! # Design
//! `RequestBuilder::prepare` resolves all accumulated configuration into a
//! `PreparedRequest` without touching the network. A `Transport` then
//! executes it. Keeping the resolved request as data makes the wire-level
//! shape (final URL, headers, body bytes) inspectable in tests.

use std::fmt;

use ureq::tls::TlsConfig;
use url::Url;

use crate::config::ConnectionSettings;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Delete,
    Get,
    Head,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Delete => "DELETE",
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved request, ready to be handed to a `Transport`.
///
/// `headers` is in the order the transport should apply them. When a body is
/// present the list already carries `Content-Length` (and `Content-Type` for
/// form bodies).
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub settings: ConnectionSettings,
}

impl PreparedRequest {
    /// First value of `name` among the outgoing headers, ASCII case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_secure(&self) -> bool {
        self.url.scheme() == "https"
    }

    /// TLS configuration to connect with, or `None` for plain `http` URLs.
    pub fn tls_config(&self) -> Option<TlsConfig> {
        self.is_secure().then(|| self.settings.effective_tls())
    }
}
