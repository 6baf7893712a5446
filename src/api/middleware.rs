//! HTTP middleware for the school backend client.

use crate::utils::{fmt_duration, log_if_slow};
use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Requests slower than this are logged at warn.
const SLOW_REQUEST: Duration = Duration::from_millis(1500);

/// Logs every outbound request with its status and duration.
pub struct TransactionLogMiddleware;

#[async_trait::async_trait]
impl Middleware for TransactionLogMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let method = req.method().clone();
        let path = req.url().path().to_owned();
        let start = Instant::now();
        trace!(method = %method, path = %path, "Sending request");

        let result = next.run(req, extensions).await;
        let duration = fmt_duration(start.elapsed());

        match &result {
            Ok(response) if response.status().is_success() => {
                debug!(method = %method, path = %path, status = response.status().as_u16(), duration, "Backend response");
            }
            Ok(response) => {
                warn!(method = %method, path = %path, status = response.status().as_u16(), duration, "Backend error response");
            }
            Err(e) => {
                warn!(method = %method, path = %path, error = %e, duration, "Backend request failed");
            }
        }

        log_if_slow(start, SLOW_REQUEST, &format!("{method} {path}"));
        result
    }
}
