use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::leave::{
    LEAVE_BALANCE_COLUMNS, LeaveBalanceRow, LeaveBalanceTransactionRow,
};
use crate::model::role::Role;

#[derive(Deserialize, ToSchema, utoipa::IntoParams)]
pub struct BalanceFilter {
    pub employee_id: Option<u64>,
    pub year: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/api/v1/leave/balances",
    params(BalanceFilter),
    responses((status = 200, description = "Leave balances for one employee and year", body = Object)),
    security(("bearer_auth" = [])),
    tag = "Balances"
)]
pub async fn balance_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<BalanceFilter>,
) -> actix_web::Result<impl Responder> {
    let employee_id = match (auth.role, query.employee_id) {
        // Employees read their own balances only.
        (Role::Employee, _) => auth.employee_id()?,
        (_, Some(requested)) => requested,
        (_, None) => auth.employee_id()?,
    };
    let year = query.year.unwrap_or_else(|| Utc::now().year());

    // Scope through the owning employee.
    let in_scope = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM employees WHERE id = ? AND company_id = ?)",
    )
    .bind(employee_id)
    .bind(auth.company_id)
    .fetch_one(pool.get_ref())
    .await
    .map_err(ApiError::from)?;
    if !in_scope {
        return Err(ApiError::NotFound { entity: "employee" }.into());
    }

    let sql = format!(
        "SELECT {LEAVE_BALANCE_COLUMNS} FROM leave_balances \
         WHERE employee_id = ? AND year = ? ORDER BY leave_type_id"
    );
    let rows = sqlx::query_as::<_, LeaveBalanceRow>(&sql)
        .bind(employee_id)
        .bind(year)
        .fetch_all(pool.get_ref())
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(json!({
        "employee_id": employee_id,
        "year": year,
        "data": rows
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/leave/balances/{balance_id}/transactions",
    params(("balance_id" = u64, Path, description = "Leave balance account")),
    responses((status = 200, description = "Append-only transaction log, newest first", body = Object)),
    security(("bearer_auth" = [])),
    tag = "Balances"
)]
pub async fn balance_transactions(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let balance_id = path.into_inner();

    let owner = sqlx::query_scalar::<_, u64>(
        "SELECT b.employee_id FROM leave_balances b \
         JOIN employees e ON e.id = b.employee_id \
         WHERE b.id = ? AND e.company_id = ?",
    )
    .bind(balance_id)
    .bind(auth.company_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(ApiError::from)?
    .ok_or(ApiError::NotFound {
        entity: "leave balance",
    })?;

    if auth.role == Role::Employee && auth.employee_id != Some(owner) {
        return Err(ApiError::Forbidden("Not your leave balance".to_string()).into());
    }

    let rows = sqlx::query_as::<_, LeaveBalanceTransactionRow>(
        "SELECT id, balance_id, kind, amount, running_balance, reference, actor_id, created_at \
         FROM leave_balance_transactions WHERE balance_id = ? ORDER BY id DESC",
    )
    .bind(balance_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(json!({ "balance_id": balance_id, "data": rows })))
}
