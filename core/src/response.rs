//! The result of one executed request.
//!
//! # Design
//! A `Response` owns the status code, the header multimap and the unread body
//! stream. The body is decoded to text lazily: the first `content()` call
//! drains the stream in fixed-size chunks, drops it (closing the connection)
//! and caches the string. Later calls return the cached value.
//!
//! Callers that read the stream directly through `raw_content_stream` or
//! `buffered_content_stream` take over responsibility for consuming it.

use std::collections::BTreeMap;
use std::io::{BufReader, Read};

use serde::de::DeserializeOwned;

use crate::error::{RequestError, Result};

/// Chunk size used when draining the body in `content()`.
const READ_CHUNK: usize = 64 * 1024;

/// A readable body stream owned by a `Response`.
pub type BodyStream = Box<dyn Read + Send + 'static>;

/// Which body the server's status code routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodySource {
    Success,
    Error,
}

impl BodySource {
    /// 200 through 399 read the success body; every other code reads the error body.
    pub fn for_status(status: u16) -> Self {
        if (200..400).contains(&status) {
            BodySource::Success
        } else {
            BodySource::Error
        }
    }
}

/// Status, headers and lazily decoded body of an executed request.
pub struct Response {
    status: u16,
    headers: BTreeMap<String, Vec<String>>,
    source: BodySource,
    stream: Option<BodyStream>,
    content: Option<String>,
}

impl Response {
    /// Assemble a response. Header names are stored lowercase; repeated names
    /// keep their values in arrival order.
    pub fn new<I, K, V>(status: u16, headers: I, stream: Option<BodyStream>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in headers {
            map.entry(name.as_ref().to_ascii_lowercase())
                .or_default()
                .push(value.into());
        }
        Self {
            status,
            headers: map,
            source: BodySource::for_status(status),
            stream,
            content: None,
        }
    }

    /// The numeric status code (200, 404, ...).
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &BTreeMap<String, Vec<String>> {
        &self.headers
    }

    /// First value of header `name`, or `None` if the server did not send it.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_list(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values of header `name` in arrival order, or `None` if absent.
    pub fn header_list(&self, name: &str) -> Option<&[String]> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
    }

    pub fn body_source(&self) -> BodySource {
        self.source
    }

    /// The unread body stream, if any.
    ///
    /// Reading from it directly bypasses `content()`. Once `content()` has
    /// succeeded the stream is gone and this returns `None`.
    pub fn raw_content_stream(&mut self) -> Option<&mut (dyn Read + Send + 'static)> {
        self.stream.as_deref_mut()
    }

    /// The body stream wrapped for buffered reads. Does not consume it.
    pub fn buffered_content_stream(&mut self) -> Option<BufReader<&mut (dyn Read + Send + 'static)>> {
        self.raw_content_stream().map(BufReader::new)
    }

    /// Take ownership of the body stream. Dropping it closes the connection.
    pub fn into_content_stream(self) -> Option<BodyStream> {
        self.stream
    }

    /// The body decoded as text, read from the network at most once.
    ///
    /// Returns `Ok(None)` when the response carries no body. Invalid UTF-8 is
    /// replaced rather than rejected.
    pub fn content(&mut self) -> Result<Option<&str>> {
        if self.content.is_none() {
            if let Some(stream) = self.stream.as_mut() {
                let bytes = drain(stream)?;
                tracing::trace!(status = self.status, len = bytes.len(), "body drained");
                self.content = Some(String::from_utf8_lossy(&bytes).into_owned());
                self.stream = None;
            }
        }
        Ok(self.content.as_deref())
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&mut self) -> Result<T> {
        let text = self.content()?.ok_or_else(|| {
            RequestError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "response has no body",
            ))
        })?;
        Ok(serde_json::from_str(text)?)
    }
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("source", &self.source)
            .field("has_stream", &self.stream.is_some())
            .field("content", &self.content)
            .finish()
    }
}

fn drain<R: Read + ?Sized>(stream: &mut R) -> std::io::Result<Vec<u8>> {
    let mut chunk = vec![0u8; READ_CHUNK];
    let mut out = Vec::new();
    loop {
        match stream.read(&mut chunk) {
            Ok(0) => return Ok(out),
            Ok(n) => out.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
