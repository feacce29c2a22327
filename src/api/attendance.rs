use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::{MySql, MySqlPool, Transaction};
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::engine::metrics::{DayMetrics, MetricInput, compute};
use crate::engine::schedule::{ResolvedSchedule, WorkSchedule, resolve};
use crate::error::ApiError;
use crate::model::attendance::{
    ATTENDANCE_COLUMNS, ApprovalTag, AttendanceRow, TimeSource, derive_status,
};
use crate::model::employee::{EMPLOYEE_COLUMNS, EmployeeRow};
use crate::model::role::Role;
use crate::model::work_schedule::{ScheduleDayRow, WorkScheduleRow};
use crate::store::{audit, hooks};

#[derive(Deserialize, ToSchema)]
pub struct ManualEntry {
    #[schema(example = 1001)]
    pub employee_id: u64,
    #[schema(example = "2026-04-06", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "2026-04-06T08:02:00", value_type = String)]
    pub time_in: Option<NaiveDateTime>,
    #[schema(example = "2026-04-06T17:00:00", value_type = String)]
    pub time_out: Option<NaiveDateTime>,
    pub remarks: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct Correction {
    #[schema(example = "2026-04-06T08:02:00", value_type = String)]
    pub time_in: Option<NaiveDateTime>,
    #[schema(example = "2026-04-06T17:00:00", value_type = String)]
    pub time_out: Option<NaiveDateTime>,
    pub remarks: Option<String>,
}

#[derive(Deserialize, ToSchema, utoipa::IntoParams)]
pub struct AttendanceFilter {
    pub employee_id: Option<u64>,
    #[param(value_type = Option<String>)]
    pub from: Option<NaiveDate>,
    #[param(value_type = Option<String>)]
    pub to: Option<NaiveDate>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

fn now_stamp() -> NaiveDateTime {
    Utc::now().naive_utc()
}

async fn fetch_employee(
    pool: &MySqlPool,
    company_id: u64,
    employee_id: u64,
) -> Result<EmployeeRow, ApiError> {
    let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ? AND company_id = ?");
    sqlx::query_as::<_, EmployeeRow>(&sql)
        .bind(employee_id)
        .bind(company_id)
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::NotFound { entity: "employee" })
}

/// Load the employee's effective work schedule, weekday slots included.
/// No schedule assignment resolves to `None`, which downstream metric
/// computation treats as "keep stored values".
async fn load_engine_schedule(
    pool: &MySqlPool,
    schedule_id: Option<u64>,
) -> Result<Option<WorkSchedule>, ApiError> {
    let Some(schedule_id) = schedule_id else {
        return Ok(None);
    };
    let row = sqlx::query_as::<_, WorkScheduleRow>(
        "SELECT id, company_id, name, start_time, end_time, break_minutes, grace_minutes \
         FROM work_schedules WHERE id = ?",
    )
    .bind(schedule_id)
    .fetch_optional(pool)
    .await?;
    let Some(row) = row else {
        return Ok(None);
    };
    let days = sqlx::query_as::<_, ScheduleDayRow>(
        "SELECT weekday, is_working, start_time, end_time FROM work_schedule_days \
         WHERE schedule_id = ?",
    )
    .bind(schedule_id)
    .fetch_all(pool)
    .await?;
    Ok(Some(row.into_engine(&days)))
}

async fn fetch_record_for_update(
    tx: &mut Transaction<'_, MySql>,
    attendance_id: u64,
) -> Result<AttendanceRow, ApiError> {
    let sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE id = ? FOR UPDATE");
    sqlx::query_as::<_, AttendanceRow>(&sql)
        .bind(attendance_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(ApiError::NotFound {
            entity: "attendance record",
        })
}

async fn store_metrics(
    tx: &mut Transaction<'_, MySql>,
    attendance_id: u64,
    metrics: &DayMetrics,
    status: &str,
) -> Result<(), ApiError> {
    sqlx::query(
        "UPDATE attendance SET tardiness_minutes = ?, undertime_minutes = ?, \
         overtime_hours = ?, hours_worked = ?, night_diff_hours = ?, status = ? WHERE id = ?",
    )
    .bind(metrics.tardiness_minutes)
    .bind(metrics.undertime_minutes)
    .bind(metrics.overtime_hours)
    .bind(metrics.hours_worked)
    .bind(metrics.night_diff_hours)
    .bind(status)
    .bind(attendance_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/* =========================
Clock in / clock out
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/attendance/clock-in",
    responses(
        (status = 200, description = "Clocked in", body = Object, example = json!({
            "message": "Clocked in"
        })),
        (status = 400, description = "Already clocked in today")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn clock_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;
    let employee = fetch_employee(pool.get_ref(), auth.company_id, employee_id).await?;

    let now = now_stamp();
    let today = now.date();
    let schedule = load_engine_schedule(pool.get_ref(), employee.work_schedule_id).await?;
    let resolved = resolve(today, schedule.as_ref());

    let mut tx = pool.begin().await.map_err(ApiError::from)?;
    let result = sqlx::query(
        "INSERT INTO attendance (employee_id, date, time_in, scheduled_in, scheduled_out, \
         status, approval_status, time_in_source) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(employee_id)
    .bind(today)
    .bind(now)
    .bind(resolved.scheduled_in)
    .bind(resolved.scheduled_out)
    .bind("present")
    .bind(ApprovalTag::Pending.to_string())
    .bind(TimeSource::Automated.to_string())
    .execute(&mut *tx)
    .await;

    let result = match result {
        Ok(r) => r,
        Err(e) => {
            // One record per (employee, date)
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(json!({
                        "message": "Already clocked in today"
                    })));
                }
            }
            tracing::error!(error = %e, employee_id, "Clock-in failed");
            return Err(ApiError::Database(e).into());
        }
    };

    let attendance_id = result.last_insert_id();
    audit::record(
        &mut tx,
        "attendance",
        attendance_id,
        "clock_in",
        auth.user_id,
        "automated clock-in",
        None,
        Some(json!({ "date": today, "time_in": now })),
    )
    .await?;
    tx.commit().await.map_err(ApiError::from)?;
    hooks::notify_changed("attendance", attendance_id);

    Ok(HttpResponse::Ok().json(json!({ "message": "Clocked in" })))
}

#[utoipa::path(
    post,
    path = "/api/v1/attendance/clock-out",
    responses(
        (status = 200, description = "Clocked out, metrics computed", body = Object, example = json!({
            "message": "Clocked out"
        })),
        (status = 404, description = "No open record for today")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn clock_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;
    let employee = fetch_employee(pool.get_ref(), auth.company_id, employee_id).await?;

    let now = now_stamp();
    let today = now.date();
    let schedule = load_engine_schedule(pool.get_ref(), employee.work_schedule_id).await?;

    let mut tx = pool.begin().await.map_err(ApiError::from)?;
    let sql = format!(
        "SELECT {ATTENDANCE_COLUMNS} FROM attendance \
         WHERE employee_id = ? AND date = ? AND time_out IS NULL FOR UPDATE"
    );
    let row = sqlx::query_as::<_, AttendanceRow>(&sql)
        .bind(employee_id)
        .bind(today)
        .fetch_optional(&mut *tx)
        .await
        .map_err(ApiError::from)?
        .ok_or(ApiError::NotFound {
            entity: "open attendance record",
        })?;

    // Cached schedule instants win; they were resolved at clock-in and a
    // later schedule change must not reshuffle an existing day.
    let resolved = if row.scheduled_in.is_some() || row.scheduled_out.is_some() {
        ResolvedSchedule::from_cached(row.scheduled_in, row.scheduled_out)
    } else {
        resolve(row.date, schedule.as_ref())
    };
    let (grace, break_minutes) = schedule
        .as_ref()
        .map(|s| (s.grace_minutes, s.break_minutes))
        .unwrap_or((0, 0));

    let metrics = compute(&MetricInput {
        actual_in: row.time_in,
        actual_out: Some(now),
        schedule: resolved,
        grace_minutes: grace,
        break_minutes,
        previous: row.metrics(),
    });
    let status = derive_status(&metrics, true);

    sqlx::query(
        "UPDATE attendance SET time_out = ?, time_out_source = ? WHERE id = ?",
    )
    .bind(now)
    .bind(TimeSource::Automated.to_string())
    .bind(row.id)
    .execute(&mut *tx)
    .await
    .map_err(ApiError::from)?;
    store_metrics(&mut tx, row.id, &metrics, &status.to_string()).await?;

    audit::record(
        &mut tx,
        "attendance",
        row.id,
        "clock_out",
        auth.user_id,
        "automated clock-out",
        Some(json!({ "time_out": row.time_out })),
        Some(json!({ "time_out": now, "hours_worked": metrics.hours_worked })),
    )
    .await?;
    tx.commit().await.map_err(ApiError::from)?;
    hooks::notify_changed("attendance", row.id);

    Ok(HttpResponse::Ok().json(json!({ "message": "Clocked out" })))
}

/* =========================
Manual entry (HR)
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/attendance",
    request_body = ManualEntry,
    responses(
        (status = 201, description = "Attendance record created"),
        (status = 400, description = "Record already exists for that date")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn manual_entry(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<ManualEntry>,
) -> actix_web::Result<impl Responder> {
    auth.require_attendance_manager()?;

    let employee = fetch_employee(pool.get_ref(), auth.company_id, payload.employee_id).await?;
    let schedule = load_engine_schedule(pool.get_ref(), employee.work_schedule_id).await?;
    let resolved = resolve(payload.date, schedule.as_ref());
    let (grace, break_minutes) = schedule
        .as_ref()
        .map(|s| (s.grace_minutes, s.break_minutes))
        .unwrap_or((0, 0));

    let metrics = compute(&MetricInput {
        actual_in: payload.time_in,
        actual_out: payload.time_out,
        schedule: resolved,
        grace_minutes: grace,
        break_minutes,
        previous: DayMetrics::zero(),
    });
    let status = derive_status(&metrics, payload.time_in.is_some() || payload.time_out.is_some());

    let mut tx = pool.begin().await.map_err(ApiError::from)?;
    let result = sqlx::query(
        "INSERT INTO attendance (employee_id, date, time_in, time_out, scheduled_in, \
         scheduled_out, tardiness_minutes, undertime_minutes, overtime_hours, hours_worked, \
         night_diff_hours, status, approval_status, remarks, time_in_source, time_out_source) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(employee.id)
    .bind(payload.date)
    .bind(payload.time_in)
    .bind(payload.time_out)
    .bind(resolved.scheduled_in)
    .bind(resolved.scheduled_out)
    .bind(metrics.tardiness_minutes)
    .bind(metrics.undertime_minutes)
    .bind(metrics.overtime_hours)
    .bind(metrics.hours_worked)
    .bind(metrics.night_diff_hours)
    .bind(status.to_string())
    .bind(ApprovalTag::Approved.to_string())
    .bind(payload.remarks.as_deref())
    .bind(payload.time_in.map(|_| TimeSource::Manual.to_string()))
    .bind(payload.time_out.map(|_| TimeSource::Manual.to_string()))
    .execute(&mut *tx)
    .await;

    let result = match result {
        Ok(r) => r,
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(json!({
                        "message": "Attendance record already exists for that date"
                    })));
                }
            }
            tracing::error!(error = %e, employee_id = employee.id, "Manual entry failed");
            return Err(ApiError::Database(e).into());
        }
    };

    let attendance_id = result.last_insert_id();
    audit::record(
        &mut tx,
        "attendance",
        attendance_id,
        "manual_entry",
        auth.user_id,
        "manual attendance entry",
        None,
        Some(json!({
            "date": payload.date,
            "time_in": payload.time_in,
            "time_out": payload.time_out,
        })),
    )
    .await?;
    tx.commit().await.map_err(ApiError::from)?;
    hooks::notify_changed("attendance", attendance_id);

    Ok(HttpResponse::Created().json(json!({ "message": "Attendance record created" })))
}

/* =========================
Correction (HR)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/attendance/{attendance_id}",
    params(("attendance_id" = u64, Path, description = "Attendance record")),
    request_body = Correction,
    responses(
        (status = 200, description = "Record corrected, metrics recomputed"),
        (status = 404, description = "Record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn correct_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<Correction>,
) -> actix_web::Result<impl Responder> {
    auth.require_attendance_manager()?;
    let attendance_id = path.into_inner();

    let mut tx = pool.begin().await.map_err(ApiError::from)?;
    let row = fetch_record_for_update(&mut tx, attendance_id).await?;
    // Company scoping runs through the owning employee.
    let employee = fetch_employee(pool.get_ref(), auth.company_id, row.employee_id)
        .await
        .map_err(|_| ApiError::NotFound {
            entity: "attendance record",
        })?;

    let time_in = payload.time_in.or(row.time_in);
    let time_out = payload.time_out.or(row.time_out);

    let schedule = load_engine_schedule(pool.get_ref(), employee.work_schedule_id).await?;
    let resolved = {
        let fresh = resolve(row.date, schedule.as_ref());
        if fresh.is_resolved() {
            fresh
        } else {
            ResolvedSchedule::from_cached(row.scheduled_in, row.scheduled_out)
        }
    };
    let (grace, break_minutes) = schedule
        .as_ref()
        .map(|s| (s.grace_minutes, s.break_minutes))
        .unwrap_or((0, 0));

    // Correction recomputes every derived metric; stored values only
    // survive where the inputs cannot support a recomputation.
    let metrics = compute(&MetricInput {
        actual_in: time_in,
        actual_out: time_out,
        schedule: resolved,
        grace_minutes: grace,
        break_minutes,
        previous: row.metrics(),
    });
    let status = derive_status(&metrics, time_in.is_some() || time_out.is_some());

    sqlx::query(
        "UPDATE attendance SET time_in = ?, time_out = ?, scheduled_in = ?, scheduled_out = ?, \
         approval_status = ?, remarks = ?, time_in_source = ?, time_out_source = ? WHERE id = ?",
    )
    .bind(time_in)
    .bind(time_out)
    .bind(resolved.scheduled_in)
    .bind(resolved.scheduled_out)
    .bind(ApprovalTag::Approved.to_string())
    .bind(payload.remarks.as_deref().or(row.remarks.as_deref()))
    .bind(payload.time_in.map(|_| TimeSource::Manual.to_string()).or(row.time_in_source.clone()))
    .bind(payload.time_out.map(|_| TimeSource::Manual.to_string()).or(row.time_out_source.clone()))
    .bind(attendance_id)
    .execute(&mut *tx)
    .await
    .map_err(ApiError::from)?;
    store_metrics(&mut tx, attendance_id, &metrics, &status.to_string()).await?;

    audit::record(
        &mut tx,
        "attendance",
        attendance_id,
        "correction",
        auth.user_id,
        "attendance correction",
        Some(json!({
            "time_in": row.time_in,
            "time_out": row.time_out,
            "tardiness_minutes": row.tardiness_minutes,
            "undertime_minutes": row.undertime_minutes,
            "overtime_hours": row.overtime_hours,
            "hours_worked": row.hours_worked,
            "night_diff_hours": row.night_diff_hours,
        })),
        Some(json!({
            "time_in": time_in,
            "time_out": time_out,
            "tardiness_minutes": metrics.tardiness_minutes,
            "undertime_minutes": metrics.undertime_minutes,
            "overtime_hours": metrics.overtime_hours,
            "hours_worked": metrics.hours_worked,
            "night_diff_hours": metrics.night_diff_hours,
        })),
    )
    .await?;

    tx.commit().await.map_err(ApiError::from)?;
    hooks::notify_changed("attendance", attendance_id);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Attendance record corrected",
        "tardiness_minutes": metrics.tardiness_minutes,
        "undertime_minutes": metrics.undertime_minutes,
        "overtime_hours": metrics.overtime_hours,
        "hours_worked": metrics.hours_worked,
        "night_diff_hours": metrics.night_diff_hours
    })))
}

/* =========================
Listing
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceFilter),
    responses((status = 200, description = "Paginated attendance list", body = Object)),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn attendance_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceFilter>,
) -> actix_web::Result<impl Responder> {
    // Employees see their own records; anyone above sees the company.
    let employee_filter = if auth.role == Role::Employee {
        Some(auth.employee_id()?)
    } else {
        query.employee_id
    };

    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(
        " WHERE employee_id IN (SELECT id FROM employees WHERE company_id = ?)",
    );
    if employee_filter.is_some() {
        where_sql.push_str(" AND employee_id = ?");
    }
    if query.from.is_some() {
        where_sql.push_str(" AND date >= ?");
    }
    if query.to.is_some() {
        where_sql.push_str(" AND date <= ?");
    }

    let count_sql = format!("SELECT COUNT(*) FROM attendance{where_sql}");
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql).bind(auth.company_id);
    if let Some(emp) = employee_filter {
        count_q = count_q.bind(emp);
    }
    if let Some(from) = query.from {
        count_q = count_q.bind(from);
    }
    if let Some(to) = query.to {
        count_q = count_q.bind(to);
    }
    let total = count_q
        .fetch_one(pool.get_ref())
        .await
        .map_err(ApiError::from)?;

    let data_sql = format!(
        "SELECT {ATTENDANCE_COLUMNS} FROM attendance{where_sql} \
         ORDER BY date DESC, employee_id LIMIT ? OFFSET ?"
    );
    let mut data_q = sqlx::query_as::<_, AttendanceRow>(&data_sql).bind(auth.company_id);
    if let Some(emp) = employee_filter {
        data_q = data_q.bind(emp);
    }
    if let Some(from) = query.from {
        data_q = data_q.bind(from);
    }
    if let Some(to) = query.to {
        data_q = data_q.bind(to);
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
