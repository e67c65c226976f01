//! Fluent request builder.
//!
//! # Design
//! `RequestBuilder` accumulates configuration through chained setters that
//! take and return `self`. Nothing is validated across fields: a builder may
//! carry both form fields and a raw body, in which case the form fields win
//! when the request is prepared. Within one field the last write wins.
//!
//! `prepare` resolves everything into a `PreparedRequest`; `execute` prepares
//! and hands the result to the default `UreqTransport`. The builder is not
//! consumed, so executing twice sends the same request twice.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use ureq::tls::TlsConfig;
use url::Url;

use crate::config::ConnectionSettings;
use crate::encoding::{form_encode, query_string};
use crate::error::Result;
use crate::http::{Method, PreparedRequest};
use crate::response::Response;
use crate::transport::{Transport, UreqTransport};

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Start a `DELETE` request.
pub fn delete(url: &str) -> Result<RequestBuilder> {
    RequestBuilder::for_method(Method::Delete, url)
}

/// Start a `GET` request.
pub fn get(url: &str) -> Result<RequestBuilder> {
    RequestBuilder::for_method(Method::Get, url)
}

/// Start a `HEAD` request.
pub fn head(url: &str) -> Result<RequestBuilder> {
    RequestBuilder::for_method(Method::Head, url)
}

/// Start a `POST` request.
pub fn post(url: &str) -> Result<RequestBuilder> {
    RequestBuilder::for_method(Method::Post, url)
}

/// Start a `PUT` request.
pub fn put(url: &str) -> Result<RequestBuilder> {
    RequestBuilder::for_method(Method::Put, url)
}

/// Accumulates one request's configuration.
///
/// ```no_run
/// # fn main() -> requests_core::Result<()> {
/// let _page = requests_core::get("http://www.example.com/")?
///     .param("q", "rust")
///     .execute()?
///     .content()?
///     .map(str::to_owned);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    url: Url,
    params: BTreeMap<String, String>,
    headers: BTreeMap<String, String>,
    form: BTreeMap<String, String>,
    body: Option<Vec<u8>>,
    settings: ConnectionSettings,
}

impl RequestBuilder {
    /// Create a builder for `method` against `url`.
    ///
    /// Fails with `RequestError::InvalidUrl` if `url` is not an absolute URL.
    pub fn for_method(method: Method, url: &str) -> Result<Self> {
        let url = Url::parse(url)?;
        Ok(Self {
            method,
            url,
            params: BTreeMap::new(),
            headers: BTreeMap::new(),
            form: BTreeMap::new(),
            body: None,
            settings: ConnectionSettings::default(),
        })
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// The base URL, without the configured query params.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Set header `name: value`, replacing an earlier value for the same name.
    ///
    /// Sent as given, except `Content-Length` when a body is sent: that one
    /// always matches the body actually written.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn headers<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(values.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Add a query param: `url?name=value`.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn params<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(values.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Add a form field. Any form field makes the body form-encoded.
    pub fn data(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.insert(name.into(), value.into());
        self
    }

    pub fn data_map<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.form
            .extend(values.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Raw body, as text or bytes. Ignored when form fields are set.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the raw body and mark it as JSON.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(value)?;
        Ok(self.body(bytes).send_json())
    }

    /// Shortcut for `Content-Type: application/json`. Does not touch the body.
    pub fn send_json(self) -> Self {
        self.header("Content-Type", JSON_CONTENT_TYPE)
    }

    /// Timeout while connecting. Defaults to 1000 ms.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.settings.connect_timeout = timeout;
        self
    }

    /// Timeout while waiting for and reading the response. Defaults to 1000 ms.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.settings.read_timeout = timeout;
        self
    }

    /// Whether redirects from the server are followed. Defaults to true.
    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.settings.follow_redirects = follow;
        self
    }

    /// Accept any certificate host on `https` URLs.
    pub fn allow_all_hostnames(self) -> Self {
        self.set_allow_all_hostnames(true)
    }

    pub fn set_allow_all_hostnames(mut self, allow: bool) -> Self {
        self.settings.allow_all_hostnames = allow;
        self
    }

    /// Custom TLS configuration for `https` URLs.
    pub fn tls_config(mut self, tls: TlsConfig) -> Self {
        self.settings.tls = Some(tls);
        self
    }

    /// The encoded params as a URL suffix: `?k=v&...`, or `""` without params.
    pub fn query_string(&self) -> String {
        query_string(&self.params)
    }

    /// The final URL: base URL plus the encoded query params.
    ///
    /// Params are appended with `&` if the base URL already has a query.
    pub fn full_url(&self) -> Url {
        let mut url = self.url.clone();
        if self.params.is_empty() {
            return url;
        }
        let encoded = form_encode(&self.params);
        let query = match self.url.query() {
            Some(existing) if !existing.is_empty() => format!("{existing}&{encoded}"),
            _ => encoded,
        };
        url.set_query(Some(&query));
        url
    }

    /// Resolve the builder into the request a transport would send.
    pub fn prepare(&self) -> PreparedRequest {
        let mut headers: Vec<(String, String)> = self
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let body = if !self.form.is_empty() {
            let encoded = form_encode(&self.form).into_bytes();
            set_header(&mut headers, "Content-Type", FORM_CONTENT_TYPE.to_string());
            Some(encoded)
        } else {
            self.body.clone()
        };
        if let Some(b) = &body {
            set_header(&mut headers, "Content-Length", b.len().to_string());
        }

        PreparedRequest {
            method: self.method,
            url: self.full_url(),
            headers,
            body,
            settings: self.settings.clone(),
        }
    }

    /// Perform the request on the calling thread and return the response.
    pub fn execute(&self) -> Result<Response> {
        self.execute_with(&UreqTransport)
    }

    pub fn execute_with<T: Transport + ?Sized>(&self, transport: &T) -> Result<Response> {
        transport.send(self.prepare())
    }
}

/// Replace any header with the same name (ASCII case-insensitive) or append.
fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: String) {
    headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    headers.push((name.to_string(), value));
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::error::RequestError;

    #[test]
    fn malformed_url_is_rejected() {
        let err = get("not a url").unwrap_err();
        assert!(matches!(err, RequestError::InvalidUrl(_)));
    }

    #[test]
    fn plain_get_has_no_query_and_no_body() {
        let req = get("https://example.test/").unwrap().prepare();
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.url.as_str(), "https://example.test/");
        assert_eq!(req.url.query(), None);
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn convenience_constructors_fix_the_method() {
        let url = "http://example.test/";
        assert_eq!(get(url).unwrap().method(), Method::Get);
        assert_eq!(post(url).unwrap().method(), Method::Post);
        assert_eq!(put(url).unwrap().method(), Method::Put);
        assert_eq!(delete(url).unwrap().method(), Method::Delete);
        assert_eq!(head(url).unwrap().method(), Method::Head);
    }

    #[test]
    fn params_are_encoded_into_the_query() {
        let b = get("http://example.test/search")
            .unwrap()
            .param("q", "rust lang")
            .params([("page", "2"), ("sort", "a&b")]);
        assert_eq!(
            b.full_url().as_str(),
            "http://example.test/search?page=2&q=rust+lang&sort=a%26b"
        );
        assert_eq!(b.url().as_str(), "http://example.test/search");
    }

    #[test]
    fn query_string_is_empty_without_params() {
        let b = get("https://example.test/").unwrap();
        assert_eq!(b.query_string(), "");
        let b = b.param("a b", "c");
        assert_eq!(b.query_string(), "?a+b=c");
    }

    #[test]
    fn params_extend_an_existing_query() {
        let b = get("http://example.test/?x=1").unwrap().param("y", "2");
        assert_eq!(b.full_url().as_str(), "http://example.test/?x=1&y=2");
    }

    #[test]
    fn headers_appear_verbatim() {
        let req = get("http://example.test/")
            .unwrap()
            .header("X-Trace", "abc")
            .headers([("Accept", "text/html"), ("X-Trace", "def")])
            .prepare();
        assert_eq!(req.header("x-trace"), Some("def"));
        assert_eq!(req.header("Accept"), Some("text/html"));
        assert_eq!(req.headers.len(), 2);
    }

    #[test]
    fn form_fields_encode_body_and_headers() {
        let req = post("http://example.test/form")
            .unwrap()
            .data("a", "1")
            .data("b", "2")
            .prepare();
        assert_eq!(req.body.as_deref(), Some(&b"a=1&b=2"[..]));
        assert_eq!(req.header("Content-Type"), Some(FORM_CONTENT_TYPE));
        assert_eq!(req.header("Content-Length"), Some("7"));
    }

    #[test]
    fn form_data_wins_over_raw_body() {
        let req = post("http://example.test/")
            .unwrap()
            .body("ignored")
            .data_map([("k", "v w")])
            .prepare();
        assert_eq!(req.body.as_deref(), Some(&b"k=v+w"[..]));
    }

    #[test]
    fn form_content_type_replaces_user_content_type() {
        let req = post("http://example.test/")
            .unwrap()
            .send_json()
            .data("k", "v")
            .prepare();
        assert_eq!(req.header("content-type"), Some(FORM_CONTENT_TYPE));
        assert_eq!(
            req.headers
                .iter()
                .filter(|(k, _)| k.eq_ignore_ascii_case("content-type"))
                .count(),
            1
        );
    }

    #[test]
    fn raw_body_sets_length_only() {
        let req = put("http://example.test/")
            .unwrap()
            .body(vec![0u8, 1, 2])
            .prepare();
        assert_eq!(req.body.as_deref(), Some(&[0u8, 1, 2][..]));
        assert_eq!(req.header("Content-Length"), Some("3"));
        assert_eq!(req.header("Content-Type"), None);
    }

    #[test]
    fn send_json_only_sets_content_type() {
        let req = post("http://example.test/")
            .unwrap()
            .send_json()
            .prepare();
        assert_eq!(req.header("Content-Type"), Some(JSON_CONTENT_TYPE));
        assert!(req.body.is_none());
    }

    #[test]
    fn json_serializes_body() {
        let req = post("http://example.test/")
            .unwrap()
            .json(&serde_json::json!({"title": "Buy milk"}))
            .unwrap()
            .prepare();
        let body: serde_json::Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Buy milk");
        assert_eq!(req.header("Content-Type"), Some(JSON_CONTENT_TYPE));
    }

    #[test]
    fn connection_settings_flow_into_prepared_request() {
        let req = get("https://example.test/")
            .unwrap()
            .connect_timeout(Duration::from_millis(250))
            .read_timeout(Duration::from_secs(5))
            .follow_redirects(false)
            .allow_all_hostnames()
            .prepare();
        assert_eq!(req.settings.connect_timeout, Duration::from_millis(250));
        assert_eq!(req.settings.read_timeout, Duration::from_secs(5));
        assert!(!req.settings.follow_redirects);
        assert!(req.settings.allow_all_hostnames);

        let off = get("https://example.test/")
            .unwrap()
            .allow_all_hostnames()
            .set_allow_all_hostnames(false);
        assert!(!off.settings().allow_all_hostnames);
    }

    /// Records what it was asked to send and answers with a canned response.
    struct RecordingTransport {
        sent: RefCell<Vec<PreparedRequest>>,
    }

    impl Transport for RecordingTransport {
        fn send(&self, request: PreparedRequest) -> Result<Response> {
            self.sent.borrow_mut().push(request);
            Ok(Response::new(201, vec![("Location", "/items/1")], None))
        }
    }

    #[test]
    fn execute_with_hands_prepared_request_to_transport() {
        let transport = RecordingTransport {
            sent: RefCell::new(Vec::new()),
        };
        let builder = post("http://example.test/items").unwrap().data("name", "x");

        let first = builder.execute_with(&transport).unwrap();
        builder.execute_with(&transport).unwrap();

        assert_eq!(first.status(), 201);
        assert_eq!(first.header("location"), Some("/items/1"));
        let sent = transport.sent.borrow();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].body.as_deref(), Some(&b"name=x"[..]));
        assert_eq!(sent[0].url, sent[1].url);
    }
}
