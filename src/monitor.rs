//! Finance-admin activity monitoring.
//!
//! Loads the finance admin's audit trail and login sessions, resolves the
//! students those logs mention, and turns each log into a display-ready
//! [`Activity`]. The load never fails: problems are reported through
//! [`MonitoringData::error`] so the dashboard can show a retry panel.

use crate::api::models::{FinanceAdmin, SessionInfo};
use crate::api::{SchoolApi, SchoolApiError};
use crate::audit::{AuditDetails, AuditLogEntry, format_audit_details};
use crate::students::{StudentCache, StudentInfo, StudentLookup};
use crate::utils::humanize_identifier;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument, warn};
use ts_rs::TS;

pub const NO_FINANCE_ADMIN: &str = "No finance admin found";
pub const AUDIT_LOGS_UNAVAILABLE: &str = "Failed to load audit logs";

/// The backend calls monitoring depends on.
#[async_trait]
pub trait MonitoringBackend: Send + Sync {
    async fn find_finance_admin(&self) -> Result<Option<FinanceAdmin>, SchoolApiError>;
    async fn list_audit_logs(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<AuditLogEntry>, SchoolApiError>;
    async fn list_sessions(&self, user_id: &str) -> Result<Vec<SessionInfo>, SchoolApiError>;
}

#[async_trait]
impl MonitoringBackend for SchoolApi {
    async fn find_finance_admin(&self) -> Result<Option<FinanceAdmin>, SchoolApiError> {
        SchoolApi::find_finance_admin(self).await
    }

    async fn list_audit_logs(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<AuditLogEntry>, SchoolApiError> {
        SchoolApi::list_audit_logs(self, user_id, limit).await
    }

    async fn list_sessions(&self, user_id: &str) -> Result<Vec<SessionInfo>, SchoolApiError> {
        SchoolApi::list_sessions(self, user_id).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorOptions {
    pub audit_log_limit: u32,
    /// Serve demo data instead of an error when loading fails.
    pub mock_fallback: bool,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            audit_log_limit: 50,
            mock_fallback: false,
        }
    }
}

/// One audit log rendered for the activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Activity {
    pub action: String,
    pub description: String,
    pub timestamp: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub student: Option<StudentInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MonitoringData {
    pub finance_admin: Option<FinanceAdmin>,
    pub audit_logs: Vec<AuditLogEntry>,
    pub sessions: Vec<SessionInfo>,
    pub activities: Vec<Activity>,
    pub error: Option<String>,
}

impl MonitoringData {
    pub fn failed(message: &str) -> Self {
        Self {
            error: Some(message.to_owned()),
            ..Default::default()
        }
    }

    /// Demo payload shown when `mock_fallback` is enabled and loading fails.
    pub fn mock() -> Self {
        let admin = FinanceAdmin {
            id: "demo-finance-admin".to_owned(),
            username: Some("finance.demo".to_owned()),
            name: Some("Demo".to_owned()),
            surname: Some("Bursar".to_owned()),
            email: Some("finance.demo@school.test".to_owned()),
        };
        let audit_logs = vec![
            AuditLogEntry {
                action: "FEE_ASSIGNED".to_owned(),
                details: AuditDetails::from(json!({
                    "studentId": "demo-student-00000001",
                    "feeId": "FEE-1001",
                    "assignedAmount": 25000,
                    "dueDate": "2025-03-31",
                })),
                timestamp: "2025-03-01T09:15:00Z".to_owned(),
                success: Some(true),
            },
            AuditLogEntry {
                action: "LOGIN".to_owned(),
                details: AuditDetails::from(json!({
                    "ipAddress": "127.0.0.1",
                    "userAgent": "Mozilla/5.0 Chrome/120.0 Safari/537.36",
                })),
                timestamp: "2025-03-01T08:02:00Z".to_owned(),
                success: Some(true),
            },
        ];
        let sessions = vec![SessionInfo {
            created_at: "2025-03-01T08:02:00Z".to_owned(),
            ip_address: Some("127.0.0.1".to_owned()),
            user_agent: Some("Mozilla/5.0 Chrome/120.0 Safari/537.36".to_owned()),
        }];

        let demo_students = DemoStudents;
        let activities = build_activities(&audit_logs, &demo_students);
        Self {
            finance_admin: Some(admin),
            audit_logs,
            sessions,
            activities,
            error: None,
        }
    }
}

struct DemoStudents;

impl StudentLookup for DemoStudents {
    fn get(&self, id: &str) -> Option<StudentInfo> {
        Some(StudentInfo::fallback(id))
    }
}

/// Load everything the monitoring dashboard shows. Never returns an error.
#[instrument(skip_all)]
pub async fn get_monitoring_data(
    backend: &dyn MonitoringBackend,
    students: &StudentCache,
    options: MonitorOptions,
) -> MonitoringData {
    let admin = match backend.find_finance_admin().await {
        Ok(Some(admin)) => admin,
        Ok(None) => {
            warn!("No user holds the finance admin role");
            return degrade(NO_FINANCE_ADMIN, options);
        }
        Err(e) => {
            warn!(error = %e, "Finance admin lookup failed");
            return degrade(NO_FINANCE_ADMIN, options);
        }
    };

    let (logs, sessions) = tokio::join!(
        backend.list_audit_logs(&admin.id, options.audit_log_limit),
        backend.list_sessions(&admin.id),
    );

    let audit_logs = match logs {
        Ok(logs) => logs,
        Err(e) => {
            warn!(admin_id = %admin.id, error = %e, "Audit log fetch failed");
            if options.mock_fallback {
                return MonitoringData::mock();
            }
            return MonitoringData {
                finance_admin: Some(admin),
                error: Some(AUDIT_LOGS_UNAVAILABLE.to_owned()),
                ..Default::default()
            };
        }
    };
    let sessions = sessions.unwrap_or_else(|e| {
        warn!(admin_id = %admin.id, error = %e, "Session fetch failed, showing none");
        Vec::new()
    });

    let resolved = students.resolve_all(&audit_logs).await;
    let activities = build_activities(&audit_logs, students);

    info!(
        admin_id = %admin.id,
        logs = audit_logs.len(),
        sessions = sessions.len(),
        students = resolved,
        "Monitoring data loaded"
    );

    MonitoringData {
        finance_admin: Some(admin),
        audit_logs,
        sessions,
        activities,
        error: None,
    }
}

fn degrade(message: &str, options: MonitorOptions) -> MonitoringData {
    if options.mock_fallback {
        warn!(reason = message, "Serving mock monitoring data");
        MonitoringData::mock()
    } else {
        MonitoringData::failed(message)
    }
}

/// Activity feed entries, newest first. Entries without a parseable
/// timestamp sort last, keeping their relative order.
pub fn build_activities(logs: &[AuditLogEntry], students: &dyn StudentLookup) -> Vec<Activity> {
    let mut ordered: Vec<&AuditLogEntry> = logs.iter().collect();
    ordered.sort_by_key(|entry| std::cmp::Reverse(entry.parsed_timestamp()));

    ordered
        .into_iter()
        .map(|entry| Activity {
            action: humanize_identifier(&entry.action),
            description: format_audit_details(&entry.details, students),
            timestamp: entry.timestamp.clone(),
            success: entry.success.unwrap_or(true),
            student: entry.student_id().and_then(|id| students.get(&id)),
        })
        .collect()
}
