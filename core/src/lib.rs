//! Blocking HTTP requests through a small fluent builder.
//!
//! # Overview
//! Configure a request with chained setters, execute it once on the calling
//! thread and read the status, headers and body from the returned
//! [`Response`].
//!
//! ```no_run
//! # fn main() -> requests_core::Result<()> {
//! let mut response = requests_core::post("http://www.example.com/form")?
//!     .data("field1", "value1")
//!     .data("field2", "value2")
//!     .execute()?;
//! println!("{} {:?}", response.status(), response.content()?);
//! # Ok(())
//! # }
//! ```
//!
//! # Design
//! - `RequestBuilder` owns its configuration and is never shared; defaults
//!   (1000 ms timeouts, redirects on) are set per builder.
//! - `prepare` and `execute` are split so the resolved request is plain data
//!   (`PreparedRequest`) before any I/O happens. `Transport` is the I/O seam;
//!   `UreqTransport` is the default.
//! - Form fields take precedence over a raw body when both are set. Mixing
//!   them is accepted without complaint.
//! - Errors are never retried or swallowed.

pub mod builder;
pub mod config;
pub mod encoding;
pub mod error;
pub mod http;
pub mod response;
pub mod transport;

pub use builder::{delete, get, head, post, put, RequestBuilder};
pub use config::ConnectionSettings;
pub use error::{RequestError, Result};
pub use http::{Method, PreparedRequest};
pub use response::{BodySource, BodyStream, Response};
pub use transport::{Transport, UreqTransport};
pub use ureq::tls::TlsConfig;
