use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::engine::ledger::{BalanceCounters, TransactionKind};
use crate::engine::proration::{carry_over_credit, prorated_entitlement};
use crate::error::ApiError;
use crate::model::employee::{EMPLOYEE_COLUMNS, EmployeeRow};
use crate::model::leave::{
    LEAVE_BALANCE_COLUMNS, LEAVE_TYPE_COLUMNS, LeaveBalanceRow, LeavePolicyRow, LeaveTypeRow,
};
use crate::store::{audit, hooks, ledger};

#[derive(Deserialize, ToSchema)]
pub struct InitializeYear {
    #[schema(example = 2026)]
    pub year: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InitializationSummary {
    pub year: i32,
    pub employees: u64,
    pub leave_types: u64,
    pub created: u64,
    pub skipped_existing: u64,
    pub skipped_no_policy: u64,
}

/* =========================
Year initialization batch
========================= */
/// One transaction per run; employee x leave-type pairs are walked
/// sequentially inside it, so a concurrent reader never sees a half
/// initialized year. Re-running is a no-op: existing rows are counted as
/// skipped and left alone.
#[utoipa::path(
    post,
    path = "/api/v1/leave/balances/initialize",
    request_body = InitializeYear,
    responses(
        (status = 200, description = "Batch finished", body = InitializationSummary),
        (status = 403, description = "Requires an elevated role")
    ),
    security(("bearer_auth" = [])),
    tag = "Balances"
)]
pub async fn initialize_year(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<InitializeYear>,
) -> actix_web::Result<impl Responder> {
    auth.require_elevated()?;

    let year = payload.year;
    let (Some(year_start), Some(year_end)) = (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year, 12, 31),
    ) else {
        return Err(ApiError::Validation {
            field: "year",
            message: format!("{year} is not a usable year"),
        }
        .into());
    };

    let mut tx = pool.begin().await.map_err(ApiError::from)?;

    let employee_sql = format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM employees \
         WHERE company_id = ? AND status = 'active' AND hire_date <= ? \
         AND (separation_date IS NULL OR separation_date >= ?) ORDER BY id"
    );
    let employees = sqlx::query_as::<_, EmployeeRow>(&employee_sql)
        .bind(auth.company_id)
        .bind(year_end)
        .bind(year_start)
        .fetch_all(&mut *tx)
        .await
        .map_err(ApiError::from)?;

    let type_sql = format!(
        "SELECT {LEAVE_TYPE_COLUMNS} FROM leave_types \
         WHERE company_id = ? AND is_active = 1 \
         AND (effective_from IS NULL OR effective_from <= ?) \
         AND (effective_to IS NULL OR effective_to >= ?) ORDER BY id"
    );
    let leave_types = sqlx::query_as::<_, LeaveTypeRow>(&type_sql)
        .bind(auth.company_id)
        .bind(year_end)
        .bind(year_start)
        .fetch_all(&mut *tx)
        .await
        .map_err(ApiError::from)?;

    let mut summary = InitializationSummary {
        year,
        employees: employees.len() as u64,
        leave_types: leave_types.len() as u64,
        created: 0,
        skipped_existing: 0,
        skipped_no_policy: 0,
    };
    let reference = format!("YEARINIT-{year}");

    for employee in &employees {
        for leave_type in &leave_types {
            let existing = sqlx::query_scalar::<_, u64>(
                "SELECT id FROM leave_balances \
                 WHERE employee_id = ? AND leave_type_id = ? AND year = ?",
            )
            .bind(employee.id)
            .bind(leave_type.id)
            .bind(year)
            .fetch_optional(&mut *tx)
            .await
            .map_err(ApiError::from)?;
            if existing.is_some() {
                summary.skipped_existing += 1;
                continue;
            }

            let policy = sqlx::query_as::<_, LeavePolicyRow>(
                "SELECT id, leave_type_id, employment_status, annual_entitlement, \
                 proration_method, effective_date, is_active FROM leave_policies \
                 WHERE leave_type_id = ? AND employment_status = ? AND is_active = 1 \
                 AND effective_date <= ? ORDER BY effective_date DESC LIMIT 1",
            )
            .bind(leave_type.id)
            .bind(&employee.employment_status)
            .bind(year_end)
            .fetch_optional(&mut *tx)
            .await
            .map_err(ApiError::from)?;

            let carried_over = if leave_type.allows_carry_over {
                let previous_sql = format!(
                    "SELECT {LEAVE_BALANCE_COLUMNS} FROM leave_balances \
                     WHERE employee_id = ? AND leave_type_id = ? AND year = ?"
                );
                let previous = sqlx::query_as::<_, LeaveBalanceRow>(&previous_sql)
                    .bind(employee.id)
                    .bind(leave_type.id)
                    .bind(year - 1)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(ApiError::from)?;
                match previous {
                    Some(previous) => carry_over_credit(
                        previous.counters().available_balance(),
                        leave_type.max_carry_over_days,
                    ),
                    None => 0.0,
                }
            } else {
                0.0
            };

            let Some(policy) = policy else {
                if carried_over <= 0.0 {
                    // Nothing to create for this pair.
                    summary.skipped_no_policy += 1;
                    continue;
                }
                let counters = BalanceCounters::open(carried_over, 0.0);
                let balance_id =
                    ledger::insert_balance(&mut tx, employee.id, leave_type.id, year, &counters)
                        .await?;
                ledger::append_transaction(
                    &mut tx,
                    balance_id,
                    TransactionKind::CarryOver,
                    carried_over,
                    carried_over,
                    &reference,
                    auth.user_id,
                )
                .await?;
                summary.created += 1;
                continue;
            };

            let earned = prorated_entitlement(
                policy.proration()?,
                policy.annual_entitlement,
                employee.hire_date,
                year,
            );

            let counters = BalanceCounters::open(carried_over, earned);
            let balance_id =
                ledger::insert_balance(&mut tx, employee.id, leave_type.id, year, &counters)
                    .await?;
            if carried_over > 0.0 {
                ledger::append_transaction(
                    &mut tx,
                    balance_id,
                    TransactionKind::CarryOver,
                    carried_over,
                    carried_over,
                    &reference,
                    auth.user_id,
                )
                .await?;
            }
            if earned > 0.0 {
                ledger::append_transaction(
                    &mut tx,
                    balance_id,
                    TransactionKind::Accrual,
                    earned,
                    counters.current_balance(),
                    &reference,
                    auth.user_id,
                )
                .await?;
            }
            summary.created += 1;
        }
    }

    audit::record(
        &mut tx,
        "leave_balances",
        0,
        "year_initialization",
        auth.user_id,
        "annual balance initialization batch",
        None,
        Some(json!({
            "year": summary.year,
            "employees": summary.employees,
            "leave_types": summary.leave_types,
            "created": summary.created,
            "skipped_existing": summary.skipped_existing,
            "skipped_no_policy": summary.skipped_no_policy,
        })),
    )
    .await?;

    tx.commit().await.map_err(ApiError::from)?;
    hooks::notify_changed("leave_balances", 0);

    tracing::info!(
        year,
        created = summary.created,
        skipped_existing = summary.skipped_existing,
        skipped_no_policy = summary.skipped_no_policy,
        "year initialization finished"
    );

    Ok(HttpResponse::Ok().json(summary))
}
