use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::{MySql, MySqlPool, Transaction};
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::engine::round2;
use crate::engine::saga::{
    OverrideSaga, SupervisorSnapshot, override_final_remarks, synthesized_supervisor_remarks,
};
use crate::engine::status::{self, Decision, RequestKind, RequestStatus};
use crate::error::ApiError;
use crate::model::overtime::{OVERTIME_REQUEST_COLUMNS, OvertimeRequestRow};
use crate::model::role::Role;
use crate::store::{audit, hooks};

#[derive(Deserialize, ToSchema)]
pub struct CreateOvertime {
    #[schema(example = "2026-04-06", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "2026-04-06T18:00:00", value_type = String)]
    pub start_at: NaiveDateTime,
    #[schema(example = "2026-04-06T21:30:00", value_type = String)]
    pub end_at: NaiveDateTime,
    #[schema(example = "quarter-end closing")]
    pub reason: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct DecisionBody {
    pub remarks: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CancelBody {
    pub reason: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct OverrideBody {
    #[schema(example = "approve", value_type = String)]
    pub decision: Decision,
    pub remarks: Option<String>,
}

#[derive(Deserialize, ToSchema, utoipa::IntoParams)]
pub struct OvertimeFilter {
    pub employee_id: Option<u64>,
    pub status: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

fn now_stamp() -> NaiveDateTime {
    Utc::now().naive_utc()
}

async fn fetch_request_for_update(
    tx: &mut Transaction<'_, MySql>,
    company_id: u64,
    overtime_id: u64,
) -> Result<OvertimeRequestRow, ApiError> {
    let sql = format!(
        "SELECT {OVERTIME_REQUEST_COLUMNS} FROM overtime_requests \
         WHERE id = ? AND company_id = ? FOR UPDATE"
    );
    sqlx::query_as::<_, OvertimeRequestRow>(&sql)
        .bind(overtime_id)
        .bind(company_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(ApiError::NotFound {
            entity: "overtime request",
        })
}

/// Advisory-only heuristic: flag a compensatory-time-off conversion preview
/// when the requester is not overtime-eligible, or when the designated
/// approving manager has an active direct report (a proxy for the requester
/// holding a supervisory role themselves). Never blocks anything.
async fn cto_conversion_preview(
    pool: &MySqlPool,
    employee_id: u64,
    manager_id: Option<u64>,
) -> Result<bool, ApiError> {
    let eligible =
        sqlx::query_scalar::<_, bool>("SELECT is_overtime_eligible FROM employees WHERE id = ?")
            .bind(employee_id)
            .fetch_optional(pool)
            .await?
            .unwrap_or(false);
    if !eligible {
        return Ok(true);
    }
    let Some(manager_id) = manager_id else {
        return Ok(false);
    };
    let has_direct_report = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM employees WHERE supervisor_id = ? AND status = 'active')",
    )
    .bind(manager_id)
    .fetch_one(pool)
    .await?;
    Ok(has_direct_report)
}

/* =========================
Create overtime request
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/overtime",
    request_body = CreateOvertime,
    responses(
        (status = 201, description = "Overtime request submitted", body = Object, example = json!({
            "message": "Overtime request submitted",
            "request_no": "OT-2026-000001",
            "status": "pending",
            "hours": 3.5,
            "cto_conversion_preview": false
        })),
        (status = 400, description = "Invalid time span")
    ),
    security(("bearer_auth" = [])),
    tag = "Overtime"
)]
pub async fn create_overtime(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateOvertime>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;

    // An overtime span may cross midnight; the end then belongs to the
    // next calendar day.
    let mut end_at = payload.end_at;
    if end_at <= payload.start_at {
        end_at += Duration::days(1);
    }
    let hours = round2((end_at - payload.start_at).num_seconds() as f64 / 3600.0);
    if hours <= 0.0 {
        return Err(ApiError::Validation {
            field: "end_at",
            message: "overtime span must be longer than zero".to_string(),
        }
        .into());
    }

    let manager_id =
        sqlx::query_scalar::<_, Option<u64>>("SELECT supervisor_id FROM employees WHERE id = ?")
            .bind(employee_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(ApiError::from)?
            .flatten();

    let year = payload.date.year();
    let mut tx = pool.begin().await.map_err(ApiError::from)?;

    let result = sqlx::query(
        "INSERT INTO overtime_requests \
         (request_no, company_id, employee_id, date, start_at, end_at, hours, reason, \
          status, manager_id) \
         VALUES ('', ?, ?, ?, ?, ?, ?, ?, 'pending', ?)",
    )
    .bind(auth.company_id)
    .bind(employee_id)
    .bind(payload.date)
    .bind(payload.start_at)
    .bind(end_at)
    .bind(hours)
    .bind(payload.reason.as_deref())
    .bind(manager_id)
    .execute(&mut *tx)
    .await
    .map_err(ApiError::from)?;

    let overtime_id = result.last_insert_id();
    let request_no = format!("OT-{year}-{overtime_id:06}");
    sqlx::query("UPDATE overtime_requests SET request_no = ? WHERE id = ?")
        .bind(&request_no)
        .bind(overtime_id)
        .execute(&mut *tx)
        .await
        .map_err(ApiError::from)?;

    audit::record(
        &mut tx,
        "overtime_requests",
        overtime_id,
        "create",
        auth.user_id,
        "overtime request filed",
        None,
        Some(json!({
            "request_no": request_no,
            "date": payload.date,
            "hours": hours,
            "status": "pending",
        })),
    )
    .await?;

    tx.commit().await.map_err(ApiError::from)?;
    hooks::notify_changed("overtime_requests", overtime_id);

    let cto_preview = cto_conversion_preview(pool.get_ref(), employee_id, manager_id).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Overtime request submitted",
        "request_no": request_no,
        "status": "pending",
        "hours": hours,
        "cto_conversion_preview": cto_preview
    })))
}

/* =========================
Cancel overtime (employee)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/overtime/{overtime_id}/cancel",
    params(("overtime_id" = u64, Path, description = "Overtime request to cancel")),
    request_body = CancelBody,
    responses(
        (status = 200, description = "Overtime request cancelled"),
        (status = 409, description = "Not cancellable from its current status")
    ),
    security(("bearer_auth" = [])),
    tag = "Overtime"
)]
pub async fn cancel_overtime(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<CancelBody>,
) -> actix_web::Result<impl Responder> {
    let overtime_id = path.into_inner();

    let mut tx = pool.begin().await.map_err(ApiError::from)?;
    let row = fetch_request_for_update(&mut tx, auth.company_id, overtime_id).await?;

    if auth.role == Role::Employee && auth.employee_id != Some(row.employee_id) {
        return Err(ApiError::Forbidden("Not your overtime request".to_string()).into());
    }

    let current = row.status()?;
    status::cancel(current).map_err(|e| ApiError::InvalidCancellation {
        kind: RequestKind::Overtime,
        from: e.from,
    })?;

    let updated = sqlx::query(
        "UPDATE overtime_requests SET status = 'cancelled', cancelled_at = ?, \
         cancellation_reason = ? WHERE id = ? AND status = 'pending'",
    )
    .bind(now_stamp())
    .bind(payload.reason.as_deref())
    .bind(overtime_id)
    .execute(&mut *tx)
    .await
    .map_err(ApiError::from)?;
    if updated.rows_affected() == 0 {
        return Err(ApiError::InvalidCancellation {
            kind: RequestKind::Overtime,
            from: current,
        }
        .into());
    }

    audit::record(
        &mut tx,
        "overtime_requests",
        overtime_id,
        "cancel",
        auth.user_id,
        "overtime request cancelled",
        Some(json!({ "status": current })),
        Some(json!({ "status": "cancelled", "reason": payload.reason })),
    )
    .await?;

    tx.commit().await.map_err(ApiError::from)?;
    hooks::notify_changed("overtime_requests", overtime_id);

    Ok(HttpResponse::Ok().json(json!({ "message": "Overtime request cancelled" })))
}

/* =========================
Supervisor stage
========================= */
async fn supervisor_decide(
    auth: &AuthUser,
    pool: &MySqlPool,
    overtime_id: u64,
    decision: Decision,
    remarks: Option<String>,
) -> Result<HttpResponse, ApiError> {
    auth.require_supervisor()?;

    let mut tx = pool.begin().await?;
    let row = fetch_request_for_update(&mut tx, auth.company_id, overtime_id).await?;
    let current = row.status()?;
    let next =
        status::supervisor_decision(current, decision).map_err(|e| ApiError::InvalidTransition {
            kind: RequestKind::Overtime,
            decision,
            from: e.from,
        })?;

    let updated = sqlx::query(
        "UPDATE overtime_requests SET status = ?, supervisor_id = ?, supervisor_approved_at = ?, \
         supervisor_remarks = ? WHERE id = ? AND status = 'pending'",
    )
    .bind(next.to_string())
    .bind(auth.user_id)
    .bind(now_stamp())
    .bind(remarks.as_deref())
    .bind(overtime_id)
    .execute(&mut *tx)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(ApiError::InvalidTransition {
            kind: RequestKind::Overtime,
            decision,
            from: current,
        });
    }

    audit::record(
        &mut tx,
        "overtime_requests",
        overtime_id,
        "supervisor_decision",
        auth.user_id,
        "supervisor stage decision",
        Some(json!({ "status": current })),
        Some(json!({ "status": next, "decision": decision })),
    )
    .await?;

    tx.commit().await?;
    hooks::notify_changed("overtime_requests", overtime_id);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Supervisor decision recorded",
        "status": next
    })))
}

#[utoipa::path(
    put,
    path = "/api/v1/overtime/{overtime_id}/supervisor/approve",
    params(("overtime_id" = u64, Path, description = "Overtime request")),
    request_body = DecisionBody,
    responses(
        (status = 200, description = "Forwarded to HR"),
        (status = 409, description = "Wrong status for a supervisor decision")
    ),
    security(("bearer_auth" = [])),
    tag = "Overtime"
)]
pub async fn supervisor_approve_overtime(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<DecisionBody>,
) -> actix_web::Result<impl Responder> {
    Ok(supervisor_decide(
        &auth,
        pool.get_ref(),
        path.into_inner(),
        Decision::Approve,
        payload.into_inner().remarks,
    )
    .await?)
}

#[utoipa::path(
    put,
    path = "/api/v1/overtime/{overtime_id}/supervisor/reject",
    params(("overtime_id" = u64, Path, description = "Overtime request")),
    request_body = DecisionBody,
    responses(
        (status = 200, description = "Rejected at supervisor stage"),
        (status = 409, description = "Wrong status for a supervisor decision")
    ),
    security(("bearer_auth" = [])),
    tag = "Overtime"
)]
pub async fn supervisor_reject_overtime(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<DecisionBody>,
) -> actix_web::Result<impl Responder> {
    Ok(supervisor_decide(
        &auth,
        pool.get_ref(),
        path.into_inner(),
        Decision::Reject,
        payload.into_inner().remarks,
    )
    .await?)
}

/* =========================
HR finalize
========================= */
async fn finalize_overtime(
    pool: &MySqlPool,
    actor: &AuthUser,
    overtime_id: u64,
    decision: Decision,
    remarks: Option<String>,
) -> Result<RequestStatus, ApiError> {
    let mut tx = pool.begin().await?;
    let row = fetch_request_for_update(&mut tx, actor.company_id, overtime_id).await?;
    let current = row.status()?;
    let next = status::hr_decision(current, decision).map_err(|e| ApiError::InvalidTransition {
        kind: RequestKind::Overtime,
        decision,
        from: e.from,
    })?;

    let updated = sqlx::query(
        "UPDATE overtime_requests SET status = ?, hr_id = ?, hr_approved_at = ?, hr_remarks = ? \
         WHERE id = ? AND status = 'supervisor_approved'",
    )
    .bind(next.to_string())
    .bind(actor.user_id)
    .bind(now_stamp())
    .bind(remarks.as_deref())
    .bind(overtime_id)
    .execute(&mut *tx)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(ApiError::InvalidTransition {
            kind: RequestKind::Overtime,
            decision,
            from: current,
        });
    }

    audit::record(
        &mut tx,
        "overtime_requests",
        overtime_id,
        "hr_finalize",
        actor.user_id,
        "HR finalize decision",
        Some(json!({ "status": current })),
        Some(json!({ "status": next, "decision": decision })),
    )
    .await?;

    tx.commit().await?;
    hooks::notify_changed("overtime_requests", overtime_id);
    Ok(next)
}

#[utoipa::path(
    put,
    path = "/api/v1/overtime/{overtime_id}/approve",
    params(("overtime_id" = u64, Path, description = "Overtime request")),
    request_body = DecisionBody,
    responses(
        (status = 200, description = "Overtime approved"),
        (status = 409, description = "Wrong status for HR finalize")
    ),
    security(("bearer_auth" = [])),
    tag = "Overtime"
)]
pub async fn approve_overtime(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<DecisionBody>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr()?;
    let status = finalize_overtime(
        pool.get_ref(),
        &auth,
        path.into_inner(),
        Decision::Approve,
        payload.into_inner().remarks,
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Overtime approved", "status": status })))
}

#[utoipa::path(
    put,
    path = "/api/v1/overtime/{overtime_id}/reject",
    params(("overtime_id" = u64, Path, description = "Overtime request")),
    request_body = DecisionBody,
    responses(
        (status = 200, description = "Overtime rejected"),
        (status = 409, description = "Wrong status for HR finalize")
    ),
    security(("bearer_auth" = [])),
    tag = "Overtime"
)]
pub async fn reject_overtime(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<DecisionBody>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr()?;
    let status = finalize_overtime(
        pool.get_ref(),
        &auth,
        path.into_inner(),
        Decision::Reject,
        payload.into_inner().remarks,
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Overtime rejected", "status": status })))
}

/* =========================
Administrative override
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/overtime/{overtime_id}/override",
    params(("overtime_id" = u64, Path, description = "Overtime request")),
    request_body = OverrideBody,
    responses(
        (status = 200, description = "Request finalized by override"),
        (status = 403, description = "Requires an elevated role"),
        (status = 409, description = "Wrong status for an override")
    ),
    security(("bearer_auth" = [])),
    tag = "Overtime"
)]
pub async fn override_overtime(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<OverrideBody>,
) -> actix_web::Result<impl Responder> {
    auth.require_elevated()?;
    let overtime_id = path.into_inner();
    let body = payload.into_inner();

    let mut saga = OverrideSaga::new();

    {
        let mut tx = pool.begin().await.map_err(ApiError::from)?;
        let row = fetch_request_for_update(&mut tx, auth.company_id, overtime_id).await?;
        let current = row.status()?;
        match current {
            RequestStatus::Pending => {
                let snapshot = row.supervisor_snapshot(current);
                let approver = row.supervisor_id.unwrap_or(auth.user_id);
                let remarks = synthesized_supervisor_remarks(body.decision);
                let updated = sqlx::query(
                    "UPDATE overtime_requests SET status = 'supervisor_approved', \
                     supervisor_id = ?, supervisor_approved_at = ?, supervisor_remarks = ? \
                     WHERE id = ? AND status = 'pending'",
                )
                .bind(approver)
                .bind(now_stamp())
                .bind(&remarks)
                .bind(overtime_id)
                .execute(&mut *tx)
                .await
                .map_err(ApiError::from)?;
                if updated.rows_affected() == 0 {
                    return Err(ApiError::InvalidTransition {
                        kind: RequestKind::Overtime,
                        decision: body.decision,
                        from: current,
                    }
                    .into());
                }
                audit::record(
                    &mut tx,
                    "overtime_requests",
                    overtime_id,
                    "override_synthesize",
                    auth.user_id,
                    "supervisor step synthesized by override",
                    Some(json!({
                        "status": snapshot.status,
                        "supervisor_id": snapshot.approver_id,
                        "supervisor_approved_at": snapshot.approved_at,
                        "supervisor_remarks": snapshot.remarks,
                    })),
                    Some(json!({
                        "status": "supervisor_approved",
                        "supervisor_id": approver,
                        "supervisor_remarks": remarks,
                    })),
                )
                .await?;
                tx.commit().await.map_err(ApiError::from)?;
                saga.supervisor_synthesized(snapshot);
            }
            RequestStatus::SupervisorApproved => {}
            other => {
                return Err(ApiError::InvalidTransition {
                    kind: RequestKind::Overtime,
                    decision: body.decision,
                    from: other,
                }
                .into());
            }
        }
    }

    let final_remarks = override_final_remarks(body.decision, body.remarks.as_deref());
    match finalize_overtime(
        pool.get_ref(),
        &auth,
        overtime_id,
        body.decision,
        Some(final_remarks),
    )
    .await
    {
        Ok(final_status) => {
            saga.finalized();
            Ok(HttpResponse::Ok().json(json!({
                "message": "Request finalized by administrative override",
                "status": final_status
            })))
        }
        Err(finalize_err) => {
            if saga.needs_rollback() {
                if let Some(snapshot) = saga.rollback_snapshot() {
                    return match restore_supervisor_snapshot(
                        pool.get_ref(),
                        &auth,
                        overtime_id,
                        snapshot,
                    )
                    .await
                    {
                        Ok(()) => {
                            saga.rolled_back();
                            Err(finalize_err.into())
                        }
                        Err(rollback_err) => Err(ApiError::Compensation {
                            original: finalize_err.to_string(),
                            rollback: rollback_err.to_string(),
                        }
                        .into()),
                    };
                }
            }
            Err(finalize_err.into())
        }
    }
}

async fn restore_supervisor_snapshot(
    pool: &MySqlPool,
    actor: &AuthUser,
    overtime_id: u64,
    snapshot: &SupervisorSnapshot,
) -> Result<(), ApiError> {
    let mut tx = pool.begin().await?;
    sqlx::query(
        "UPDATE overtime_requests SET status = ?, supervisor_id = ?, supervisor_approved_at = ?, \
         supervisor_remarks = ? WHERE id = ?",
    )
    .bind(snapshot.status.to_string())
    .bind(snapshot.approver_id)
    .bind(snapshot.approved_at)
    .bind(snapshot.remarks.as_deref())
    .bind(overtime_id)
    .execute(&mut *tx)
    .await?;
    audit::record(
        &mut tx,
        "overtime_requests",
        overtime_id,
        "override_rollback",
        actor.user_id,
        "override finalize failed, supervisor step restored",
        None,
        Some(json!({
            "status": snapshot.status,
            "supervisor_id": snapshot.approver_id,
            "supervisor_approved_at": snapshot.approved_at,
            "supervisor_remarks": snapshot.remarks,
        })),
    )
    .await?;
    tx.commit().await?;
    Ok(())
}

/* =========================
Read endpoints
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/overtime/{overtime_id}",
    params(("overtime_id" = u64, Path, description = "Overtime request")),
    responses(
        (status = 200, description = "Overtime request found", body = Object),
        (status = 404, description = "Overtime request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Overtime"
)]
pub async fn get_overtime(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let overtime_id = path.into_inner();
    let sql = format!(
        "SELECT {OVERTIME_REQUEST_COLUMNS} FROM overtime_requests WHERE id = ? AND company_id = ?"
    );
    let row = sqlx::query_as::<_, OvertimeRequestRow>(&sql)
        .bind(overtime_id)
        .bind(auth.company_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(ApiError::from)?
        .ok_or(ApiError::NotFound {
            entity: "overtime request",
        })?;

    if auth.role == Role::Employee && auth.employee_id != Some(row.employee_id) {
        return Err(ApiError::Forbidden("Not your overtime request".to_string()).into());
    }

    let cto_preview = cto_conversion_preview(pool.get_ref(), row.employee_id, row.manager_id).await?;

    let mut body = serde_json::to_value(&row).map_err(|e| ApiError::Internal(e.to_string()))?;
    if let Some(obj) = body.as_object_mut() {
        obj.insert("cto_conversion_preview".to_string(), json!(cto_preview));
    }
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    get,
    path = "/api/v1/overtime",
    params(OvertimeFilter),
    responses((status = 200, description = "Paginated overtime list", body = Object)),
    security(("bearer_auth" = [])),
    tag = "Overtime"
)]
pub async fn overtime_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<OvertimeFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_supervisor()?;

    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE company_id = ?");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }
    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status));
    }

    let count_sql = format!("SELECT COUNT(*) FROM overtime_requests{where_sql}");
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql).bind(auth.company_id);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }
    let total = count_q
        .fetch_one(pool.get_ref())
        .await
        .map_err(ApiError::from)?;

    let data_sql = format!(
        "SELECT {OVERTIME_REQUEST_COLUMNS} FROM overtime_requests{where_sql} \
         ORDER BY created_at DESC LIMIT ? OFFSET ?"
    );
    let mut data_q = sqlx::query_as::<_, OvertimeRequestRow>(&data_sql).bind(auth.company_id);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }
    let rows = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(json!({
        "data": rows,
        "page": page,
        "per_page": per_page,
        "total": total
    })))
}
