//! Client for the school management REST backend.

pub mod errors;
pub mod json;
pub mod middleware;
pub mod models;

pub use errors::SchoolApiError;

use crate::audit::AuditLogEntry;
use crate::config::Config;
use crate::results::NewResult;
use crate::students::StudentDirectory;
use anyhow::Context;
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use middleware::TransactionLogMiddleware;
use models::{
    FinanceAdmin, ResultQuery, ResultRecord, Semester, SemesterInfo, SessionInfo, StartSemester,
    StudentRecord,
};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

const FINANCE_ADMIN_ROLE: &str = "finance_admin";

/// Thin typed wrapper over the backend's JSON endpoints.
///
/// Every request waits on a shared rate limiter so fan-out work (student
/// resolution in particular) cannot flood the backend.
pub struct SchoolApi {
    http: ClientWithMiddleware,
    base_url: Url,
    token: Option<String>,
    limiter: DefaultDirectRateLimiter,
}

impl SchoolApi {
    pub fn new(
        base_url: Url,
        token: Option<String>,
        timeout: Duration,
        requests_per_second: u32,
    ) -> anyhow::Result<Self> {
        if base_url.cannot_be_a_base() {
            anyhow::bail!("API base URL cannot be used as a base: {base_url}");
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("schoolboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        let http = ClientBuilder::new(client)
            .with(TransactionLogMiddleware)
            .build();

        let per_second = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let limiter = RateLimiter::direct(Quota::per_second(per_second));

        Ok(Self {
            http,
            base_url,
            token: token.filter(|t| !t.is_empty()),
            limiter,
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(
            config.api_base_url.clone(),
            config.api_token.clone(),
            config.request_timeout,
            config.rate_limit_per_second,
        )
    }

    /// Build an endpoint URL from path segments. Segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<Option<T>, SchoolApiError> {
        let url = self.endpoint(segments);
        let builder = self.authorize(self.http.get(url.clone()).query(query));
        self.execute(builder, &url).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<Option<T>, SchoolApiError> {
        let url = self.endpoint(segments);
        let mut builder = self.authorize(self.http.post(url.clone()));
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.execute(builder, &url).await
    }

    /// Send a request and decode its (enveloped) body. `Ok(None)` means the
    /// backend answered successfully with a null or empty payload.
    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        url: &Url,
    ) -> Result<Option<T>, SchoolApiError> {
        self.limiter.until_ready().await;

        let response = builder.send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SchoolApiError::NotFound(url.path().to_owned()));
        }
        if !status.is_success() {
            return Err(SchoolApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        json::decode_enveloped::<Option<T>>(&body).map_err(|e| SchoolApiError::ParseFailed {
            status: status.as_u16(),
            url: url.to_string(),
            source: anyhow::Error::new(e),
        })
    }

    fn required<T>(value: Option<T>, url: &Url) -> Result<T, SchoolApiError> {
        value.ok_or_else(|| SchoolApiError::EmptyPayload(url.path().to_owned()))
    }

    /// The first user holding the finance-admin role, if any.
    #[instrument(skip_all)]
    pub async fn find_finance_admin(&self) -> Result<Option<FinanceAdmin>, SchoolApiError> {
        let admins: Vec<FinanceAdmin> = self
            .get(&["users"], &[("role", FINANCE_ADMIN_ROLE.to_owned())])
            .await?
            .unwrap_or_default();
        debug!(count = admins.len(), "Fetched finance admins");
        Ok(admins.into_iter().next())
    }

    pub async fn fetch_student_record(&self, id: &str) -> Result<StudentRecord, SchoolApiError> {
        let segments = ["students", id];
        let url = self.endpoint(&segments);
        let record: StudentRecord = Self::required(self.get(&segments, &[]).await?, &url)?;
        if record.is_blank() {
            return Err(SchoolApiError::EmptyPayload(url.path().to_owned()));
        }
        Ok(record)
    }

    #[instrument(skip(self))]
    pub async fn list_audit_logs(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<AuditLogEntry>, SchoolApiError> {
        let query = [("userId", user_id.to_owned()), ("limit", limit.to_string())];
        Ok(self.get(&["audit", "logs"], &query).await?.unwrap_or_default())
    }

    #[instrument(skip(self))]
    pub async fn list_sessions(&self, user_id: &str) -> Result<Vec<SessionInfo>, SchoolApiError> {
        let query = [("userId", user_id.to_owned())];
        Ok(self.get(&["sessions"], &query).await?.unwrap_or_default())
    }

    pub async fn list_results(&self, query: &ResultQuery) -> Result<Vec<Semester>, SchoolApiError> {
        Ok(self
            .get(&["results"], &query.to_pairs())
            .await?
            .unwrap_or_default())
    }

    /// Submit a new raw result. Callers are expected to have validated it.
    pub async fn create_result(&self, result: &NewResult) -> Result<ResultRecord, SchoolApiError> {
        let created = self.post(&["results"], Some(result)).await?;
        Self::required(created, &self.endpoint(&["results"]))
    }

    pub async fn list_semesters(&self) -> Result<Vec<SemesterInfo>, SchoolApiError> {
        Ok(self.get(&["semesters"], &[]).await?.unwrap_or_default())
    }

    /// The active semester, or `None` when the backend has none open.
    pub async fn current_semester(&self) -> Result<Option<SemesterInfo>, SchoolApiError> {
        match self.get(&["semesters", "current"], &[]).await {
            Err(SchoolApiError::NotFound(_)) => Ok(None),
            other => other,
        }
    }

    pub async fn start_new_semester(
        &self,
        request: &StartSemester,
    ) -> Result<SemesterInfo, SchoolApiError> {
        let segments = ["semesters", "start-new"];
        let started = self.post(&segments, Some(request)).await?;
        Self::required(started, &self.endpoint(&segments))
    }

    pub async fn close_current_semester(&self) -> Result<Option<SemesterInfo>, SchoolApiError> {
        self.post::<SemesterInfo, ()>(&["semesters", "close-current"], None)
            .await
    }
}

#[async_trait]
impl StudentDirectory for SchoolApi {
    async fn fetch_student(&self, id: &str) -> Result<StudentRecord, SchoolApiError> {
        self.fetch_student_record(id).await
    }
}
