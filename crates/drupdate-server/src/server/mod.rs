//! HTTP server and request routing
//!
//! Routes:
//! - `POST /api/parse`: split a manifest into core, module and other packages
//! - `GET /api/releases?package=<name>`: sorted upgrade candidates
//! - `POST /api/update`: apply chosen constraints, return the new manifest

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use bytes::Bytes;
use drupdate_core::utils::validate_package_name;
use drupdate_registry::ReleaseSource;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Incoming};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::{TokioIo, TokioTimer};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::api::{ErrorResponse, ParseRequest, ParseResponse, ReleasesResponse, UpdateRequest};

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 1024 * 1024;

const HEADER_READ_TIMEOUT: Duration = Duration::from_secs(10);

const ROUTES: [&str; 3] = ["/api/parse", "/api/releases", "/api/update"];

/// A request that could not be served, rendered as `{"error": ...}`
#[derive(Debug)]
struct RequestError {
    status: StatusCode,
    message: String,
}

impl RequestError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn into_response(self) -> Response<Full<Bytes>> {
        json_response(self.status, &ErrorResponse::new(self.message))
    }
}

/// JSON API over an injected release source
pub struct ApiServer {
    source: Arc<dyn ReleaseSource>,
}

impl ApiServer {
    pub fn new(source: Arc<dyn ReleaseSource>) -> Self {
        Self { source }
    }

    /// Bind `addr` and serve until the task is dropped
    pub async fn serve(self: Arc<Self>, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;
        self.serve_listener(listener).await
    }

    /// Serve connections from an already bound listener, one task each
    pub async fn serve_listener(self: Arc<Self>, listener: TcpListener) -> Result<()> {
        info!("API server listening on {}", listener.local_addr()?);

        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    debug!("New API connection from {}", peer);
                    let server = Arc::clone(&self);
                    tokio::spawn(async move {
                        let service = service_fn(move |req: Request<Incoming>| {
                            let server = Arc::clone(&server);
                            async move { Ok::<_, Infallible>(server.handle(req).await) }
                        });

                        if let Err(e) = http1::Builder::new()
                            .timer(TokioTimer::new())
                            .header_read_timeout(HEADER_READ_TIMEOUT)
                            .serve_connection(TokioIo::new(stream), service)
                            .await
                        {
                            warn!("API connection from {} failed: {}", peer, e);
                        }
                    });
                },
                Err(e) => {
                    warn!("Failed to accept API connection: {}", e);
                },
            }
        }
    }

    /// Route one request. Never fails; errors become JSON error responses.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let (parts, body) = req.into_parts();
        debug!(method = %parts.method, path = parts.uri.path(), "API request");

        let result = match (&parts.method, parts.uri.path()) {
            (&Method::POST, "/api/parse") => self.parse(body).await,
            (&Method::GET, "/api/releases") => self.releases(parts.uri.query()).await,
            (&Method::POST, "/api/update") => self.update(body).await,
            (_, path) if ROUTES.contains(&path) => Err(RequestError::new(
                StatusCode::METHOD_NOT_ALLOWED,
                format!("method {} not allowed on {}", parts.method, path),
            )),
            (_, path) => Err(RequestError::new(
                StatusCode::NOT_FOUND,
                format!("no route for {}", path),
            )),
        };

        result.unwrap_or_else(RequestError::into_response)
    }

    async fn parse<B>(&self, body: B) -> Result<Response<Full<Bytes>>, RequestError>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let request: ParseRequest = read_json(body).await?;
        Ok(json_response(
            StatusCode::OK,
            &ParseResponse::from(&request.composer_json),
        ))
    }

    async fn releases(&self, query: Option<&str>) -> Result<Response<Full<Bytes>>, RequestError> {
        let package = query
            .into_iter()
            .flat_map(|q| url::form_urlencoded::parse(q.as_bytes()))
            .find(|(key, _)| key == "package")
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                RequestError::new(StatusCode::BAD_REQUEST, "missing 'package' query parameter")
            })?;

        validate_package_name(&package)
            .map_err(|e| RequestError::new(StatusCode::BAD_REQUEST, e.to_string()))?;

        let releases = self.source.fetch_releases(&package).await.map_err(|e| {
            warn!("Failed to fetch releases for {}: {}", package, e);
            RequestError::new(
                StatusCode::BAD_GATEWAY,
                format!("failed to fetch releases: {}", e),
            )
        })?;

        Ok(json_response(
            StatusCode::OK,
            &ReleasesResponse { package, releases },
        ))
    }

    async fn update<B>(&self, body: B) -> Result<Response<Full<Bytes>>, RequestError>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let UpdateRequest {
            mut composer_json,
            versions,
        } = read_json(body).await?;

        let changed = composer_json.apply_constraints(
            versions
                .iter()
                .map(|(package, version)| (package.as_str(), version.as_str())),
        );
        debug!(changed, requested = versions.len(), "applied constraints");

        let encoded = composer_json.encode().map_err(|e| {
            RequestError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;
        Ok(bytes_response(StatusCode::OK, encoded))
    }
}

/// Collect a size-limited body and decode it as JSON
async fn read_json<T, B>(body: B) -> Result<T, RequestError>
where
    T: DeserializeOwned,
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let bytes = Limited::new(body, MAX_BODY_BYTES)
        .collect()
        .await
        .map_err(|e| {
            if e.downcast_ref::<LengthLimitError>().is_some() {
                RequestError::new(StatusCode::PAYLOAD_TOO_LARGE, "request body too large")
            } else {
                RequestError::new(StatusCode::BAD_REQUEST, format!("failed to read body: {}", e))
            }
        })?
        .to_bytes();

    serde_json::from_slice(&bytes)
        .map_err(|e| RequestError::new(StatusCode::BAD_REQUEST, format!("invalid JSON: {}", e)))
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(value) {
        Ok(body) => bytes_response(status, body),
        Err(e) => {
            warn!("Failed to encode API response: {}", e);
            bytes_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                br#"{"error":"failed to encode response"}"#.to_vec(),
            )
        },
    }
}

fn bytes_response(status: StatusCode, body: Vec<u8>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
