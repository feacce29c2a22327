use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::engine::status::{Priority, RequestKind, classify_priority};
use crate::error::ApiError;
use crate::model::leave::{LEAVE_REQUEST_COLUMNS, LeaveRequestRow};
use crate::model::overtime::{OVERTIME_REQUEST_COLUMNS, OvertimeRequestRow};

/// Read-model row of the HR approval queue: supervisor-approved leave and
/// overtime requests, annotated with a computed triage priority. Derived on
/// demand, never persisted.
#[derive(Serialize, ToSchema)]
pub struct ApprovalQueueItem {
    #[schema(example = "leave", value_type = String)]
    pub kind: RequestKind,
    pub id: u64,
    pub request_no: String,
    pub employee_id: u64,
    /// Days for leave requests, hours for overtime requests.
    pub quantity: f64,
    #[schema(value_type = Option<String>)]
    pub supervisor_approved_at: Option<NaiveDateTime>,
    #[schema(value_type = String)]
    pub created_at: NaiveDateTime,
    #[schema(example = "high", value_type = String)]
    pub priority: Priority,
}

#[utoipa::path(
    get,
    path = "/api/v1/approvals",
    responses((status = 200, description = "Combined HR approval queue", body = [ApprovalQueueItem])),
    security(("bearer_auth" = [])),
    tag = "Approvals"
)]
pub async fn approval_queue(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr()?;

    let now = Utc::now().naive_utc();

    let leave_sql = format!(
        "SELECT {LEAVE_REQUEST_COLUMNS} FROM leave_requests \
         WHERE company_id = ? AND status = 'supervisor_approved' ORDER BY created_at, id"
    );
    let leave_rows = sqlx::query_as::<_, LeaveRequestRow>(&leave_sql)
        .bind(auth.company_id)
        .fetch_all(pool.get_ref())
        .await
        .map_err(ApiError::from)?;

    let overtime_sql = format!(
        "SELECT {OVERTIME_REQUEST_COLUMNS} FROM overtime_requests \
         WHERE company_id = ? AND status = 'supervisor_approved' ORDER BY created_at, id"
    );
    let overtime_rows = sqlx::query_as::<_, OvertimeRequestRow>(&overtime_sql)
        .bind(auth.company_id)
        .fetch_all(pool.get_ref())
        .await
        .map_err(ApiError::from)?;

    let mut items: Vec<ApprovalQueueItem> = leave_rows
        .into_iter()
        .map(|row| ApprovalQueueItem {
            kind: RequestKind::Leave,
            id: row.id,
            request_no: row.request_no,
            employee_id: row.employee_id,
            quantity: row.days,
            priority: classify_priority(row.supervisor_approved_at, now),
            supervisor_approved_at: row.supervisor_approved_at,
            created_at: row.created_at,
        })
        .chain(overtime_rows.into_iter().map(|row| ApprovalQueueItem {
            kind: RequestKind::Overtime,
            id: row.id,
            request_no: row.request_no,
            employee_id: row.employee_id,
            quantity: row.hours,
            priority: classify_priority(row.supervisor_approved_at, now),
            supervisor_approved_at: row.supervisor_approved_at,
            created_at: row.created_at,
        }))
        .collect();

    // Priority descending, then the original chronological order.
    items.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });

    Ok(HttpResponse::Ok().json(json!({ "data": items, "total": items.len() })))
}
