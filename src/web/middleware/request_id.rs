//! Request IDs and access logging for the BFF router.
//!
//! A caller that already tagged the call (a proxy or the dashboard) keeps its
//! `X-Request-Id`; anyone else gets a fresh ULID. Either way the ID names the
//! request span and goes back out on the response.

use axum::extract::Request;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::Response;
use futures::future::{BoxFuture, FutureExt};
use std::fmt::Debug;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use tower::{Layer, Service};
use tracing::Instrument;

pub static REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest caller-supplied ID accepted before a fresh one is generated.
const MAX_INCOMING_ID_LEN: usize = 128;

/// The ID a request is logged under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let incoming = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty() && id.len() <= MAX_INCOMING_ID_LEN);

        match incoming {
            Some(id) => Self(id.to_owned()),
            None => Self(ulid::Ulid::new().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

#[derive(Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, B> Service<Request> for RequestIdService<S>
where
    S: Service<Request, Response = Response<B>> + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Debug,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let id = RequestId::from_headers(req.headers());
        let span = tracing::info_span!("request", req_id = %id.as_str());
        let method = req.method().clone();
        let path = req.uri().path().to_owned();
        let echo = HeaderValue::from_str(id.as_str()).ok();
        let started = Instant::now();

        let pending = self.inner.call(req);

        async move {
            let mut result = pending.await;
            log_outcome(&method, &path, started.elapsed(), &result);

            if let (Ok(response), Some(value)) = (&mut result, echo) {
                response.headers_mut().insert(REQUEST_ID_HEADER, value);
            }
            result
        }
        .instrument(span)
        .boxed()
    }
}

/// Successes at debug, client errors at info, everything else at warn.
fn log_outcome<B, E: Debug>(
    method: &Method,
    path: &str,
    elapsed: Duration,
    result: &Result<Response<B>, E>,
) {
    let duration_ms = elapsed.as_millis() as u64;
    let status = match result {
        Ok(response) => response.status(),
        Err(e) => {
            tracing::error!(%method, path, error = ?e, duration_ms, "Request failed");
            return;
        }
    };

    let code = status.as_u16();
    if status.is_success() || status.is_redirection() {
        tracing::debug!(%method, path, status = code, duration_ms, "Response");
    } else if status.is_client_error() {
        tracing::info!(%method, path, status = code, duration_ms, "Response");
    } else if status == StatusCode::BAD_GATEWAY {
        tracing::warn!(%method, path, status = code, duration_ms, "Backend unavailable");
    } else {
        tracing::warn!(%method, path, status = code, duration_ms, "Response");
    }
}
