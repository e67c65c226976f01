use std::{collections::BTreeMap, sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::{Path, RawQuery},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{any, get},
    Json, Router,
};
use axum_server::tls_rustls::RustlsConfig;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What the server saw of an incoming request, returned by `/echo`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Echo {
    pub method: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/status/{code}", any(status))
        .route("/redirect", get(redirect))
        .route("/headers/repeated", get(repeated_headers))
        .route("/delay/{ms}", get(delay))
        .route("/empty", any(empty))
}

/// A self-signed certificate and its PKCS#8 key, both DER-encoded.
#[derive(Clone, Debug)]
pub struct SelfSigned {
    pub cert_der: Vec<u8>,
    pub key_der: Vec<u8>,
}

impl SelfSigned {
    /// Generate a certificate valid only for `hosts`.
    pub fn generate(hosts: &[&str]) -> Result<Self, rcgen::Error> {
        let names: Vec<String> = hosts.iter().map(|h| h.to_string()).collect();
        let rcgen::CertifiedKey { cert, key_pair } = rcgen::generate_simple_self_signed(names)?;
        Ok(Self {
            cert_der: cert.der().to_vec(),
            key_der: key_pair.serialize_der(),
        })
    }
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Serve the same routes over TLS, presenting `identity` to every client.
///
/// `listener` must already be in non-blocking mode.
pub async fn run_tls(listener: std::net::TcpListener, identity: SelfSigned) -> Result<(), std::io::Error> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = rustls::ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(std::io::Error::other)?
        .with_no_client_auth()
        .with_single_cert(
            vec![CertificateDer::from(identity.cert_der)],
            PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(identity.key_der)),
        )
        .map_err(std::io::Error::other)?;

    axum_server::from_tcp_rustls(listener, RustlsConfig::from_config(Arc::new(config)))
        .serve(app().into_make_service())
        .await
}

async fn echo(method: Method, RawQuery(query): RawQuery, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(Echo {
        method: method.to_string(),
        query,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

/// Respond with `code` and a plain-text body naming it.
async fn status(Path(code): Path<u16>) -> Response {
    match StatusCode::from_u16(code) {
        Ok(code) => (code, format!("status {}", code.as_u16())).into_response(),
        Err(_) => (StatusCode::BAD_REQUEST, "invalid status").into_response(),
    }
}

async fn redirect() -> Redirect {
    Redirect::to("/echo")
}

async fn repeated_headers() -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.append("x-multi", HeaderValue::from_static("first"));
    headers.append("x-multi", HeaderValue::from_static("second"));
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    (headers, "repeated")
}

async fn delay(Path(ms): Path<u64>) -> &'static str {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    "done"
}

async fn empty() -> StatusCode {
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_serializes_missing_query_as_null() {
        let echo = Echo {
            method: "GET".to_string(),
            query: None,
            headers: BTreeMap::new(),
            body: String::new(),
        };
        let json = serde_json::to_value(&echo).unwrap();
        assert_eq!(json["method"], "GET");
        assert!(json["query"].is_null());
        assert_eq!(json["body"], "");
    }

    #[test]
    fn self_signed_identity_is_der_encoded() {
        let identity = SelfSigned::generate(&["other.test"]).unwrap();
        // DER SEQUENCE tag
        assert_eq!(identity.cert_der[0], 0x30);
        assert_eq!(identity.key_der[0], 0x30);
    }

    #[test]
    fn echo_roundtrips_through_json() {
        let echo = Echo {
            method: "POST".to_string(),
            query: Some("a=1".to_string()),
            headers: BTreeMap::from([("x-trace".to_string(), "abc".to_string())]),
            body: "k=v".to_string(),
        };
        let back: Echo = serde_json::from_str(&serde_json::to_string(&echo).unwrap()).unwrap();
        assert_eq!(back, echo);
    }
}
