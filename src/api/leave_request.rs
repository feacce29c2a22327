use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::{MySql, MySqlPool, Transaction};
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::engine::saga::{
    OverrideSaga, SupervisorSnapshot, override_final_remarks, synthesized_supervisor_remarks,
};
use crate::engine::status::{self, Decision, RequestKind, RequestStatus};
use crate::error::ApiError;
use crate::model::leave::{
    LEAVE_REQUEST_COLUMNS, LEAVE_TYPE_COLUMNS, LeaveRequestRow, LeaveTypeRow,
};
use crate::model::role::Role;
use crate::store::{audit, hooks, ledger};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = 1)]
    pub leave_type_id: u64,
    #[schema(example = "2026-04-06", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-04-08", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "family matter")]
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
pub struct LeaveFilter {
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    /// Filter by request status
    pub status: Option<String>,
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    /// Pagination per page number
    pub per_page: Option<u64>,
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

fn now_stamp() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Inclusive calendar days of the requested span.
fn span_days(start: NaiveDate, end: NaiveDate) -> f64 {
    ((end - start).num_days() + 1) as f64
}

async fn fetch_leave_type(
    tx: &mut Transaction<'_, MySql>,
    company_id: u64,
    leave_type_id: u64,
) -> Result<LeaveTypeRow, ApiError> {
    let sql =
        format!("SELECT {LEAVE_TYPE_COLUMNS} FROM leave_types WHERE id = ? AND company_id = ?");
    sqlx::query_as::<_, LeaveTypeRow>(&sql)
        .bind(leave_type_id)
        .bind(company_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(ApiError::NotFound {
            entity: "leave type",
        })
}

async fn fetch_request_for_update(
    tx: &mut Transaction<'_, MySql>,
    company_id: u64,
    leave_id: u64,
) -> Result<LeaveRequestRow, ApiError> {
    let sql = format!(
        "SELECT {LEAVE_REQUEST_COLUMNS} FROM leave_requests \
         WHERE id = ? AND company_id = ? FOR UPDATE"
    );
    sqlx::query_as::<_, LeaveRequestRow>(&sql)
        .bind(leave_id)
        .bind(company_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(ApiError::NotFound {
            entity: "leave request",
        })
}

/* =========================
Create leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body = CreateLeave,
    responses(
        (status = 201, description = "Leave request submitted", body = Object, example = json!({
            "message": "Leave request submitted",
            "request_no": "LV-2026-000001",
            "status": "pending"
        })),
        (status = 400, description = "Invalid dates"),
        (status = 422, description = "Insufficient leave balance")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;

    if payload.start_date > payload.end_date {
        return Err(ApiError::Validation {
            field: "start_date",
            message: "start_date cannot be after end_date".to_string(),
        }
        .into());
    }

    let days = span_days(payload.start_date, payload.end_date);
    let year = payload.start_date.year();

    let mut tx = pool.begin().await.map_err(ApiError::from)?;

    let leave_type = fetch_leave_type(&mut tx, auth.company_id, payload.leave_type_id).await?;
    if !leave_type.is_active {
        return Err(ApiError::Validation {
            field: "leave_type_id",
            message: format!("leave type {} is not active", leave_type.code),
        }
        .into());
    }

    let result = sqlx::query(
        "INSERT INTO leave_requests \
         (request_no, company_id, employee_id, leave_type_id, start_date, end_date, days, \
          reason, status) \
         VALUES ('', ?, ?, ?, ?, ?, ?, ?, 'pending')",
    )
    .bind(auth.company_id)
    .bind(employee_id)
    .bind(leave_type.id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(days)
    .bind(payload.reason.as_deref())
    .execute(&mut *tx)
    .await
    .map_err(ApiError::from)?;

    let leave_id = result.last_insert_id();
    let request_no = format!("LV-{year}-{leave_id:06}");
    sqlx::query("UPDATE leave_requests SET request_no = ? WHERE id = ?")
        .bind(&request_no)
        .bind(leave_id)
        .execute(&mut *tx)
        .await
        .map_err(ApiError::from)?;

    // Reserving inside the same transaction keeps request and ledger in
    // step: an insufficient balance aborts both.
    if leave_type.is_paid {
        ledger::reserve(
            &mut tx,
            employee_id,
            leave_type.id,
            year,
            days,
            &request_no,
            auth.user_id,
        )
        .await?;
    }

    audit::record(
        &mut tx,
        "leave_requests",
        leave_id,
        "create",
        auth.user_id,
        "leave request filed",
        None,
        Some(json!({
            "request_no": request_no,
            "leave_type_id": leave_type.id,
            "start_date": payload.start_date,
            "end_date": payload.end_date,
            "days": days,
            "status": "pending",
        })),
    )
    .await?;

    tx.commit().await.map_err(ApiError::from)?;
    hooks::notify_changed("leave_requests", leave_id);

    Ok(HttpResponse::Created().json(json!({
        "message": "Leave request submitted",
        "request_no": request_no,
        "status": "pending"
    })))
}

/* =========================
Cancel leave (employee)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/cancel",
    params(("leave_id" = u64, Path, description = "Leave request to cancel")),
    request_body = CancelBody,
    responses(
        (status = 200, description = "Leave request cancelled"),
        (status = 409, description = "Not cancellable from its current status")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<CancelBody>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let mut tx = pool.begin().await.map_err(ApiError::from)?;
    let row = fetch_request_for_update(&mut tx, auth.company_id, leave_id).await?;

    if auth.role == Role::Employee && auth.employee_id != Some(row.employee_id) {
        return Err(ApiError::Forbidden("Not your leave request".to_string()).into());
    }

    let current = row.status()?;
    status::cancel(current).map_err(|e| ApiError::InvalidCancellation {
        kind: RequestKind::Leave,
        from: e.from,
    })?;

    let updated = sqlx::query(
        "UPDATE leave_requests SET status = 'cancelled', cancelled_at = ?, \
         cancellation_reason = ? WHERE id = ? AND status = 'pending'",
    )
    .bind(now_stamp())
    .bind(payload.reason.as_deref())
    .bind(leave_id)
    .execute(&mut *tx)
    .await
    .map_err(ApiError::from)?;
    if updated.rows_affected() == 0 {
        return Err(ApiError::InvalidCancellation {
            kind: RequestKind::Leave,
            from: current,
        }
        .into());
    }

    // The status guard above makes a second release for this request
    // impossible, whatever the ledger happens to hold.
    let leave_type = fetch_leave_type(&mut tx, auth.company_id, row.leave_type_id).await?;
    if leave_type.is_paid && current.holds_reservation() {
        ledger::release(
            &mut tx,
            row.employee_id,
            row.leave_type_id,
            row.start_date.year(),
            row.days,
            &row.request_no,
            auth.user_id,
        )
        .await?;
    }

    audit::record(
        &mut tx,
        "leave_requests",
        leave_id,
        "cancel",
        auth.user_id,
        "leave request cancelled",
        Some(json!({ "status": current })),
        Some(json!({ "status": "cancelled", "reason": payload.reason })),
    )
    .await?;

    tx.commit().await.map_err(ApiError::from)?;
    hooks::notify_changed("leave_requests", leave_id);

    Ok(HttpResponse::Ok().json(json!({ "message": "Leave request cancelled" })))
}

/* =========================
Supervisor stage
========================= */
async fn supervisor_decide(
    auth: &AuthUser,
    pool: &MySqlPool,
    leave_id: u64,
    decision: Decision,
    remarks: Option<String>,
) -> Result<HttpResponse, ApiError> {
    auth.require_supervisor()?;

    let mut tx = pool.begin().await?;
    let row = fetch_request_for_update(&mut tx, auth.company_id, leave_id).await?;
    let current = row.status()?;
    let next =
        status::supervisor_decision(current, decision).map_err(|e| ApiError::InvalidTransition {
            kind: RequestKind::Leave,
            decision,
            from: e.from,
        })?;

    let updated = sqlx::query(
        "UPDATE leave_requests SET status = ?, supervisor_id = ?, supervisor_approved_at = ?, \
         supervisor_remarks = ? WHERE id = ? AND status = 'pending'",
    )
    .bind(next.to_string())
    .bind(auth.user_id)
    .bind(now_stamp())
    .bind(remarks.as_deref())
    .bind(leave_id)
    .execute(&mut *tx)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(ApiError::InvalidTransition {
            kind: RequestKind::Leave,
            decision,
            from: current,
        });
    }

    if decision == Decision::Reject {
        let leave_type = fetch_leave_type(&mut tx, auth.company_id, row.leave_type_id).await?;
        if leave_type.is_paid && current.holds_reservation() {
            ledger::release(
                &mut tx,
                row.employee_id,
                row.leave_type_id,
                row.start_date.year(),
                row.days,
                &row.request_no,
                auth.user_id,
            )
            .await?;
        }
    }

    audit::record(
        &mut tx,
        "leave_requests",
        leave_id,
        "supervisor_decision",
        auth.user_id,
        "supervisor stage decision",
        Some(json!({ "status": current })),
        Some(json!({ "status": next, "decision": decision })),
    )
    .await?;

    tx.commit().await?;
    hooks::notify_changed("leave_requests", leave_id);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Supervisor decision recorded",
        "status": next
    })))
}

#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/supervisor/approve",
    params(("leave_id" = u64, Path, description = "Leave request")),
    request_body = DecisionBody,
    responses(
        (status = 200, description = "Forwarded to HR"),
        (status = 409, description = "Wrong status for a supervisor decision")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn supervisor_approve_leave(
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
    path = "/api/v1/leave/{leave_id}/supervisor/reject",
    params(("leave_id" = u64, Path, description = "Leave request")),
    request_body = DecisionBody,
    responses(
        (status = 200, description = "Rejected at supervisor stage"),
        (status = 409, description = "Wrong status for a supervisor decision")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn supervisor_reject_leave(
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

/// The one finalize path: runs its own transaction, guards the status
/// transition, settles the ledger (deduct on approval, release on
/// rejection) and audits the change. The override reuses this as-is.
async fn finalize_leave(
    pool: &MySqlPool,
    actor: &AuthUser,
    leave_id: u64,
    decision: Decision,
    remarks: Option<String>,
) -> Result<RequestStatus, ApiError> {
    let mut tx = pool.begin().await?;
    let row = fetch_request_for_update(&mut tx, actor.company_id, leave_id).await?;
    let current = row.status()?;
    let next = status::hr_decision(current, decision).map_err(|e| ApiError::InvalidTransition {
        kind: RequestKind::Leave,
        decision,
        from: e.from,
    })?;

    let updated = sqlx::query(
        "UPDATE leave_requests SET status = ?, hr_id = ?, hr_approved_at = ?, hr_remarks = ? \
         WHERE id = ? AND status = 'supervisor_approved'",
    )
    .bind(next.to_string())
    .bind(actor.user_id)
    .bind(now_stamp())
    .bind(remarks.as_deref())
    .bind(leave_id)
    .execute(&mut *tx)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(ApiError::InvalidTransition {
            kind: RequestKind::Leave,
            decision,
            from: current,
        });
    }

    let leave_type = fetch_leave_type(&mut tx, actor.company_id, row.leave_type_id).await?;
    if leave_type.is_paid {
        let year = row.start_date.year();
        match decision {
            Decision::Approve => {
                ledger::deduct(
                    &mut tx,
                    row.employee_id,
                    row.leave_type_id,
                    year,
                    row.days,
                    &row.request_no,
                    actor.user_id,
                )
                .await?;
            }
            Decision::Reject => {
                if current.holds_reservation() {
                    ledger::release(
                        &mut tx,
                        row.employee_id,
                        row.leave_type_id,
                        year,
                        row.days,
                        &row.request_no,
                        actor.user_id,
                    )
                    .await?;
                }
            }
        }
    }

    audit::record(
        &mut tx,
        "leave_requests",
        leave_id,
        "hr_finalize",
        actor.user_id,
        "HR finalize decision",
        Some(json!({ "status": current })),
        Some(json!({ "status": next, "decision": decision })),
    )
    .await?;

    tx.commit().await?;
    hooks::notify_changed("leave_requests", leave_id);
    Ok(next)
}

#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/approve",
    params(("leave_id" = u64, Path, description = "Leave request")),
    request_body = DecisionBody,
    responses(
        (status = 200, description = "Leave approved and deducted"),
        (status = 409, description = "Wrong status for HR finalize")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<DecisionBody>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr()?;
    let status = finalize_leave(
        pool.get_ref(),
        &auth,
        path.into_inner(),
        Decision::Approve,
        payload.into_inner().remarks,
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Leave approved", "status": status })))
}

#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/reject",
    params(("leave_id" = u64, Path, description = "Leave request")),
    request_body = DecisionBody,
    responses(
        (status = 200, description = "Leave rejected and reservation released"),
        (status = 409, description = "Wrong status for HR finalize")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<DecisionBody>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr()?;
    let status = finalize_leave(
        pool.get_ref(),
        &auth,
        path.into_inner(),
        Decision::Reject,
        payload.into_inner().remarks,
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Leave rejected", "status": status })))
}

/* =========================
Administrative override
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/override",
    params(("leave_id" = u64, Path, description = "Leave request")),
    request_body = OverrideBody,
    responses(
        (status = 200, description = "Request finalized by override"),
        (status = 403, description = "Requires an elevated role"),
        (status = 409, description = "Wrong status for an override")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn override_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<OverrideBody>,
) -> actix_web::Result<impl Responder> {
    auth.require_elevated()?;
    let leave_id = path.into_inner();
    let body = payload.into_inner();

    let mut saga = OverrideSaga::new();

    // Step 1 (own transaction): synthesize the supervisor approval when the
    // request never reached a supervisor.
    {
        let mut tx = pool.begin().await.map_err(ApiError::from)?;
        let row = fetch_request_for_update(&mut tx, auth.company_id, leave_id).await?;
        let current = row.status()?;
        match current {
            RequestStatus::Pending => {
                let snapshot = row.supervisor_snapshot(current);
                // The override actor stands in as approver unless the
                // request already carries a designated one.
                let approver = row.supervisor_id.unwrap_or(auth.user_id);
                let remarks = synthesized_supervisor_remarks(body.decision);
                let updated = sqlx::query(
                    "UPDATE leave_requests SET status = 'supervisor_approved', \
                     supervisor_id = ?, supervisor_approved_at = ?, supervisor_remarks = ? \
                     WHERE id = ? AND status = 'pending'",
                )
                .bind(approver)
                .bind(now_stamp())
                .bind(&remarks)
                .bind(leave_id)
                .execute(&mut *tx)
                .await
                .map_err(ApiError::from)?;
                if updated.rows_affected() == 0 {
                    return Err(ApiError::InvalidTransition {
                        kind: RequestKind::Leave,
                        decision: body.decision,
                        from: current,
                    }
                    .into());
                }
                audit::record(
                    &mut tx,
                    "leave_requests",
                    leave_id,
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
                    kind: RequestKind::Leave,
                    decision: body.decision,
                    from: other,
                }
                .into());
            }
        }
    }

    // Step 2: the normal HR finalize, stamped as an override.
    let final_remarks = override_final_remarks(body.decision, body.remarks.as_deref());
    match finalize_leave(
        pool.get_ref(),
        &auth,
        leave_id,
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
                        leave_id,
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

/// Compensation for a failed override finalize: put the supervisor-step
/// fields back to their exact pre-synthesis values, in a transaction of
/// its own.
async fn restore_supervisor_snapshot(
    pool: &MySqlPool,
    actor: &AuthUser,
    leave_id: u64,
    snapshot: &SupervisorSnapshot,
) -> Result<(), ApiError> {
    let mut tx = pool.begin().await?;
    sqlx::query(
        "UPDATE leave_requests SET status = ?, supervisor_id = ?, supervisor_approved_at = ?, \
         supervisor_remarks = ? WHERE id = ?",
    )
    .bind(snapshot.status.to_string())
    .bind(snapshot.approver_id)
    .bind(snapshot.approved_at)
    .bind(snapshot.remarks.as_deref())
    .bind(leave_id)
    .execute(&mut *tx)
    .await?;
    audit::record(
        &mut tx,
        "leave_requests",
        leave_id,
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
    path = "/api/v1/leave/{leave_id}",
    params(("leave_id" = u64, Path, description = "Leave request")),
    responses(
        (status = 200, description = "Leave request found", body = Object),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();
    let sql = format!(
        "SELECT {LEAVE_REQUEST_COLUMNS} FROM leave_requests WHERE id = ? AND company_id = ?"
    );
    let row = sqlx::query_as::<_, LeaveRequestRow>(&sql)
        .bind(leave_id)
        .bind(auth.company_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(ApiError::from)?
        .ok_or(ApiError::NotFound {
            entity: "leave request",
        })?;

    if auth.role == Role::Employee && auth.employee_id != Some(row.employee_id) {
        return Err(ApiError::Forbidden("Not your leave request".to_string()).into());
    }

    Ok(HttpResponse::Ok().json(row))
}

#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses((status = 200, description = "Paginated leave list", body = Object)),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
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

    let count_sql = format!("SELECT COUNT(*) FROM leave_requests{where_sql}");
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
        "SELECT {LEAVE_REQUEST_COLUMNS} FROM leave_requests{where_sql} \
         ORDER BY created_at DESC LIMIT ? OFFSET ?"
    );
    let mut data_q = sqlx::query_as::<_, LeaveRequestRow>(&data_sql).bind(auth.company_id);
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
