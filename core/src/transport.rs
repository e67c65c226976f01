//! Executing a `PreparedRequest` over the network.
//!
//! # Design
//! `Transport` is the single I/O seam. `UreqTransport` builds a fresh
//! `ureq::Agent` per request from the request's `ConnectionSettings`, so
//! timeouts, redirect policy and TLS options never leak between builders.
//! Status codes are never turned into errors here; 4xx/5xx come back as a
//! normal `Response` whose body is the server's error body.

use std::time::Duration;

use ureq::http;
use ureq::tls::TlsConfig;
use ureq::{Agent, RequestBuilder};

use crate::config::ConnectionSettings;
use crate::error::Result;
use crate::http::{Method, PreparedRequest};
use crate::response::{BodySource, BodyStream, Response};

/// Redirect limit used when `follow_redirects` is on.
const MAX_REDIRECTS: u32 = 10;

/// Something that can perform one blocking HTTP round-trip.
pub trait Transport {
    fn send(&self, request: PreparedRequest) -> Result<Response>;
}

/// The default transport, backed by `ureq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl UreqTransport {
    fn agent(settings: &ConnectionSettings, tls: Option<TlsConfig>) -> Agent {
        let read: Option<Duration> = Some(settings.read_timeout);
        let mut config = Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(if settings.follow_redirects { MAX_REDIRECTS } else { 0 })
            .timeout_connect(Some(settings.connect_timeout))
            .timeout_recv_response(read)
            .timeout_recv_body(read);
        if let Some(tls) = tls {
            config = config.tls_config(tls);
        }
        config.build().new_agent()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: PreparedRequest) -> Result<Response> {
        let tls = request.tls_config();
        let PreparedRequest {
            method,
            url,
            headers,
            body,
            settings,
        } = request;

        tracing::debug!(
            %method,
            %url,
            body_len = body.as_ref().map(Vec::len),
            follow_redirects = settings.follow_redirects,
            tls = tls.is_some(),
            "sending request"
        );

        let agent = Self::agent(&settings, tls);
        let url = url.as_str();
        let headers: Vec<&(String, String)> = forwarded_headers(&headers, body.is_some()).collect();

        let result = match (method, body) {
            (Method::Get, None) => with_headers(agent.get(url), &headers).call(),
            (Method::Get, Some(b)) => with_headers(agent.get(url), &headers).force_send_body().send(&b[..]),
            (Method::Head, None) => with_headers(agent.head(url), &headers).call(),
            (Method::Head, Some(b)) => with_headers(agent.head(url), &headers).force_send_body().send(&b[..]),
            (Method::Delete, None) => with_headers(agent.delete(url), &headers).call(),
            (Method::Delete, Some(b)) => with_headers(agent.delete(url), &headers).force_send_body().send(&b[..]),
            (Method::Post, None) => with_headers(agent.post(url), &headers).send_empty(),
            (Method::Post, Some(b)) => with_headers(agent.post(url), &headers).send(&b[..]),
            (Method::Put, None) => with_headers(agent.put(url), &headers).send_empty(),
            (Method::Put, Some(b)) => with_headers(agent.put(url), &headers).send(&b[..]),
        };
        let response = result?;

        let status = response.status().as_u16();
        let has_body = response_has_body(method, status);
        tracing::debug!(status, source = ?BodySource::for_status(status), has_body, "response received");

        let header_pairs: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let stream: Option<BodyStream> = if has_body {
            Some(Box::new(response.into_body().into_reader()))
        } else {
            None
        };

        Ok(Response::new(status, header_pairs, stream))
    }
}

/// Headers to hand to the stack. A `Content-Length` is dropped when a body is
/// sent, since the stack derives it from the body and a second copy would
/// conflict. Without a body every header passes through as given.
fn forwarded_headers(
    headers: &[(String, String)],
    has_body: bool,
) -> impl Iterator<Item = &(String, String)> {
    headers.iter().filter(move |(name, _)| {
        !(has_body && name.eq_ignore_ascii_case(http::header::CONTENT_LENGTH.as_str()))
    })
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[&(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers.iter().copied() {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// HEAD responses and 1xx/204/304 statuses never carry a body.
fn response_has_body(method: Method, status: u16) -> bool {
    method != Method::Head && status >= 200 && status != 204 && status != 304
}
