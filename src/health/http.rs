// ABOUTME: Minimal HTTP/1.1 GET client for health probes.
// ABOUTME: Uses a hyper connection over a plain TCP stream; https is not supported.

use http_body_util::Empty;
use hyper::{StatusCode, Uri};
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::TcpStream;

#[derive(Debug, Error)]
pub enum HttpProbeError {
    #[error("invalid probe URL '{0}'")]
    InvalidUrl(String),

    #[error("unsupported URL scheme '{0}' (only http is supported)")]
    UnsupportedScheme(String),

    #[error("connection to {address} failed: {source}")]
    Connect {
        address: String,
        source: std::io::Error,
    },

    #[error("HTTP handshake failed: {0}")]
    Handshake(#[source] hyper::Error),

    #[error("failed to build request: {0}")]
    Request(String),

    #[error("request failed: {0}")]
    Send(#[source] hyper::Error),
}

/// Issue a GET and return the response status.
pub(crate) async fn get_status(url: &str) -> Result<StatusCode, HttpProbeError> {
    let uri: Uri = url
        .parse()
        .map_err(|_| HttpProbeError::InvalidUrl(url.to_string()))?;

    match uri.scheme_str() {
        Some("http") => {}
        Some(other) => return Err(HttpProbeError::UnsupportedScheme(other.to_string())),
        None => return Err(HttpProbeError::InvalidUrl(url.to_string())),
    }

    let host = uri
        .host()
        .ok_or_else(|| HttpProbeError::InvalidUrl(url.to_string()))?;
    let port = uri.port_u16().unwrap_or(80);
    let address = format!("{}:{}", host, port);

    let stream = TcpStream::connect(&address)
        .await
        .map_err(|source| HttpProbeError::Connect {
            address: address.clone(),
            source,
        })?;

    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
        .await
        .map_err(HttpProbeError::Handshake)?;

    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::debug!("probe connection error: {}", e);
        }
    });

    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    let req = hyper::Request::builder()
        .method("GET")
        .uri(path)
        .header("Host", address.as_str())
        .body(Empty::<bytes::Bytes>::new())
        .map_err(|e| HttpProbeError::Request(e.to_string()))?;

    let resp = sender
        .send_request(req)
        .await
        .map_err(HttpProbeError::Send)?;

    Ok(resp.status())
}
