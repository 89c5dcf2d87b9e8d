//! HTTP API - JSON boundary around the PDE calculation
//!
//! Routes:
//! - `POST /api/calculate` - compute a PDE from a JSON body
//! - `GET /api/species` - species keys for the F1 table
//! - `GET /api/durations` - duration keys for the F3 table
//! - `GET /` - informational page

pub mod page;
pub mod request;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use miette::Diagnostic;
use serde::Serialize;
use serde_json::Value;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::core::factors::{duration_keys, species_keys};
use crate::core::pde::compute_pde;
use crate::core::report::PdeReport;
use page::{PageError, Pages};
use request::inputs_from_json;

/// Largest request body accepted, in bytes
pub const MAX_BODY_BYTES: usize = 64 * 1024;

const JSON: &str = "application/json";
const HTML: &str = "text/html; charset=utf-8";

#[derive(Debug, Error, Diagnostic)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    #[diagnostic(
        code(pdecalc::server::bind),
        help("Pick another address with --bind or PDECALC_BIND")
    )]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Page(#[from] PageError),
}

/// A fully rendered response, independent of the transport
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Bytes,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl ApiResponse {
    fn json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self {
                status,
                content_type: JSON,
                body: Bytes::from(body),
            },
            Err(e) => Self::error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
        }
    }

    /// `{"error": message}` with the given status
    pub fn error(status: StatusCode, message: &str) -> Self {
        let body = serde_json::to_vec(&ErrorBody { error: message })
            .unwrap_or_else(|_| br#"{"error":"internal error"}"#.to_vec());
        Self {
            status,
            content_type: JSON,
            body: Bytes::from(body),
        }
    }

    fn html(body: String) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: HTML,
            body: Bytes::from(body),
        }
    }

    fn into_hyper(self) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(self.body));
        *response.status_mut() = self.status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(self.content_type));
        response
    }
}

/// Request router holding the pre-loaded page templates
pub struct Api {
    pages: Pages,
}

impl Api {
    pub fn new() -> Result<Self, ServerError> {
        Ok(Self {
            pages: Pages::new()?,
        })
    }

    /// Dispatch one request to its handler
    pub fn route(&self, method: &Method, path: &str, body: &[u8]) -> ApiResponse {
        match (method, path) {
            (&Method::POST, "/api/calculate") => calculate(body),
            (&Method::GET, "/api/species") => ApiResponse::json(StatusCode::OK, &species_keys()),
            (&Method::GET, "/api/durations") => {
                ApiResponse::json(StatusCode::OK, &duration_keys())
            }
            (&Method::GET, "/") => match self.pages.index() {
                Ok(html) => ApiResponse::html(html),
                Err(e) => {
                    tracing::error!(error = %e, "failed to render index page");
                    ApiResponse::error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
                }
            },
            (_, "/api/calculate" | "/api/species" | "/api/durations" | "/") => {
                ApiResponse::error(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
            }
            _ => ApiResponse::error(StatusCode::NOT_FOUND, "not found"),
        }
    }
}

fn calculate(body: &[u8]) -> ApiResponse {
    let parsed: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => {
            return ApiResponse::error(StatusCode::BAD_REQUEST, &format!("invalid JSON: {}", e))
        }
    };
    let Value::Object(fields) = parsed else {
        return ApiResponse::error(StatusCode::BAD_REQUEST, "request body must be a JSON object");
    };

    let outcome = inputs_from_json(&fields)
        .and_then(|inputs| compute_pde(&inputs).map(|result| PdeReport::new(&inputs, &result)));

    match outcome {
        Ok(report) => {
            tracing::debug!(pde = report.pde, total_factor = report.total_factor, "calculated");
            ApiResponse::json(StatusCode::OK, &report)
        }
        Err(e) => {
            tracing::debug!(kind = e.kind(), error = %e, "calculation rejected");
            ApiResponse::error(StatusCode::BAD_REQUEST, &e.to_string())
        }
    }
}

async fn handle(
    api: Arc<Api>,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = match Limited::new(req.into_body(), MAX_BODY_BYTES).collect().await {
        Ok(collected) => api.route(&method, &path, &collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => ApiResponse::error(
            StatusCode::BAD_REQUEST,
            &format!("request body exceeds {} bytes", MAX_BODY_BYTES),
        ),
        Err(e) => ApiResponse::error(
            StatusCode::BAD_REQUEST,
            &format!("unreadable request body: {}", e),
        ),
    };

    tracing::info!(%method, %path, status = response.status.as_u16(), "request");
    Ok(response.into_hyper())
}

/// Bind the listening socket
pub async fn bind(addr: &str) -> Result<TcpListener, ServerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })
}

/// Resolves when the process receives Ctrl-C
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
}

/// Accept connections until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, api: Arc<Api>, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()>,
{
    let local: SocketAddr = listener.local_addr()?;
    tracing::info!(addr = %local, "listening");

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::warn!(error = %e, "accept failed");
                        continue;
                    }
                };
                let api = Arc::clone(&api);
                tokio::spawn(async move {
                    let service = service_fn(move |req| handle(Arc::clone(&api), req));
                    if let Err(e) = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await
                    {
                        tracing::debug!(%peer, error = %e, "connection error");
                    }
                });
            }
            _ = &mut shutdown => {
                tracing::info!("shutting down");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> Api {
        Api::new().unwrap()
    }

    fn post(body: &str) -> (StatusCode, Value) {
        let response = api().route(&Method::POST, "/api/calculate", body.as_bytes());
        assert_eq!(response.content_type, JSON);
        let json = serde_json::from_slice(&response.body).unwrap();
        (response.status, json)
    }

    #[test]
    fn test_rat_noael() {
        let (status, json) = post(
            r#"{"noael": 50, "humanWeight": 50, "species": "rat", "f2": 10, "f3": "1", "f4": 1, "f5": 1}"#,
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["pde"], 50.0);
        assert_eq!(json["f1"], 5.0);
        assert_eq!(json["totalFactor"], 50.0);
    }

    #[test]
    fn test_rabbit_loael() {
        let (status, json) = post(
            r#"{"noael": 10, "species": "rabbit", "f3": "10", "f4": 5, "f5": 10, "doseType": "loael"}"#,
        );
        assert_eq!(status, StatusCode::OK);
        assert!((json["pde"].as_f64().unwrap() - 0.04).abs() < 1e-12);
        assert_eq!(json["totalFactor"], 12500.0);
    }

    #[test]
    fn test_loael_floor_reported() {
        let (status, json) = post(r#"{"noael": 10, "f5": 1, "doseType": "loael"}"#);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["f5"], 10.0);
    }

    #[test]
    fn test_unknown_species_is_bad_request() {
        let (status, json) = post(r#"{"noael": 10, "species": "unknown_animal"}"#);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"]
            .as_str()
            .unwrap()
            .starts_with("Unknown species 'unknown_animal'"));
    }

    #[test]
    fn test_zero_f1_is_bad_request() {
        let (status, json) = post(r#"{"noael": 10, "f1": 0, "f2": 10, "f3": 1, "f4": 1, "f5": 1}"#);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("denominator"));
    }

    #[test]
    fn test_overflow_is_bad_request() {
        let (status, json) = post(r#"{"noael": 1e300, "humanWeight": 1e300}"#);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("overflowed"));

        let (status, json) = post(r#"{"noael": 10, "f1": 1e200, "f2": 1e200}"#);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("denominator"));
    }

    #[test]
    fn test_invalid_json() {
        let (status, json) = post("{not json");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().starts_with("invalid JSON"));
    }

    #[test]
    fn test_non_object_body() {
        let (status, _) = post("[1, 2, 3]");
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_species_listing() {
        let response = api().route(&Method::GET, "/api/species", b"");
        assert_eq!(response.status, StatusCode::OK);
        let keys: Vec<String> = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(keys, ["mouse", "rat", "rabbit", "dog", "monkey", "human"]);
    }

    #[test]
    fn test_duration_listing() {
        let response = api().route(&Method::GET, "/api/durations", b"");
        let keys: Vec<String> = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(keys, ["1", "2", "5", "10"]);
    }

    #[test]
    fn test_index_page() {
        let response = api().route(&Method::GET, "/", b"");
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.content_type, HTML);
    }

    #[test]
    fn test_wrong_method_and_unknown_path() {
        let api = api();
        assert_eq!(
            api.route(&Method::GET, "/api/calculate", b"").status,
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            api.route(&Method::GET, "/nope", b"").status,
            StatusCode::NOT_FOUND
        );
    }
}
