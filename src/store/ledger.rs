use sqlx::{MySql, Transaction};

use crate::engine::ledger::{BalanceCounters, TransactionKind};
use crate::error::ApiError;
use crate::model::leave::{LEAVE_BALANCE_COLUMNS, LeaveBalanceRow};

/// Lock the balance row for the rest of the enclosing transaction. All
/// ledger mutations go through this, so two concurrent reservations against
/// the same account serialize on the row lock and can never jointly exceed
/// the available balance.
pub async fn lock_balance(
    tx: &mut Transaction<'_, MySql>,
    employee_id: u64,
    leave_type_id: u64,
    year: i32,
) -> Result<Option<LeaveBalanceRow>, ApiError> {
    let sql = format!(
        "SELECT {LEAVE_BALANCE_COLUMNS} FROM leave_balances \
         WHERE employee_id = ? AND leave_type_id = ? AND year = ? FOR UPDATE"
    );
    let row = sqlx::query_as::<_, LeaveBalanceRow>(&sql)
        .bind(employee_id)
        .bind(leave_type_id)
        .bind(year)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(row)
}

async fn store_counters(
    tx: &mut Transaction<'_, MySql>,
    balance_id: u64,
    counters: &BalanceCounters,
) -> Result<(), ApiError> {
    sqlx::query(
        "UPDATE leave_balances SET opening_balance = ?, credits_earned = ?, credits_used = ?, \
         credits_forfeited = ?, credits_converted = ?, credits_carried_over = ?, \
         pending_requests = ?, current_balance = ?, available_balance = ? WHERE id = ?",
    )
    .bind(counters.opening_balance())
    .bind(counters.credits_earned())
    .bind(counters.credits_used())
    .bind(counters.credits_forfeited())
    .bind(counters.credits_converted())
    .bind(counters.credits_carried_over())
    .bind(counters.pending_requests())
    .bind(counters.current_balance())
    .bind(counters.available_balance())
    .bind(balance_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Append one immutable ledger log row. `running_balance` is the current
/// balance after the mutation it documents.
pub async fn append_transaction(
    tx: &mut Transaction<'_, MySql>,
    balance_id: u64,
    kind: TransactionKind,
    amount: f64,
    running_balance: f64,
    reference: &str,
    actor_id: u64,
) -> Result<(), ApiError> {
    sqlx::query(
        "INSERT INTO leave_balance_transactions \
         (balance_id, kind, amount, running_balance, reference, actor_id) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(balance_id)
    .bind(kind.to_string())
    .bind(amount)
    .bind(running_balance)
    .bind(reference)
    .bind(actor_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Put a provisional hold on leave credits. Fails with the
/// INSUFFICIENT_BALANCE condition before anything is written; the caller's
/// transaction then rolls back whatever else it had already done.
pub async fn reserve(
    tx: &mut Transaction<'_, MySql>,
    employee_id: u64,
    leave_type_id: u64,
    year: i32,
    quantity: f64,
    reference: &str,
    actor_id: u64,
) -> Result<(), ApiError> {
    let row = lock_balance(tx, employee_id, leave_type_id, year)
        .await?
        .ok_or(ApiError::NotFound {
            entity: "leave balance",
        })?;
    let mut counters = row.counters();
    counters
        .reserve(quantity)
        .map_err(|e| ApiError::InsufficientBalance {
            requested: e.requested,
            available: e.available,
        })?;
    store_counters(tx, row.id, &counters).await?;
    append_transaction(
        tx,
        row.id,
        TransactionKind::Reserve,
        quantity,
        counters.current_balance(),
        reference,
        actor_id,
    )
    .await
}

/// Give a reservation back. Callers gate this on the originating request's
/// state, which is what makes a second invocation for the same request
/// impossible rather than merely unlikely.
pub async fn release(
    tx: &mut Transaction<'_, MySql>,
    employee_id: u64,
    leave_type_id: u64,
    year: i32,
    quantity: f64,
    reference: &str,
    actor_id: u64,
) -> Result<(), ApiError> {
    let row = lock_balance(tx, employee_id, leave_type_id, year)
        .await?
        .ok_or(ApiError::NotFound {
            entity: "leave balance",
        })?;
    let mut counters = row.counters();
    counters.release(quantity);
    store_counters(tx, row.id, &counters).await?;
    append_transaction(
        tx,
        row.id,
        TransactionKind::Release,
        quantity,
        counters.current_balance(),
        reference,
        actor_id,
    )
    .await
}

/// Final approval: move the already-reserved quantity into used credits.
pub async fn deduct(
    tx: &mut Transaction<'_, MySql>,
    employee_id: u64,
    leave_type_id: u64,
    year: i32,
    quantity: f64,
    reference: &str,
    actor_id: u64,
) -> Result<(), ApiError> {
    let row = lock_balance(tx, employee_id, leave_type_id, year)
        .await?
        .ok_or(ApiError::NotFound {
            entity: "leave balance",
        })?;
    let mut counters = row.counters();
    counters.deduct(quantity);
    store_counters(tx, row.id, &counters).await?;
    append_transaction(
        tx,
        row.id,
        TransactionKind::Deduct,
        quantity,
        counters.current_balance(),
        reference,
        actor_id,
    )
    .await
}

/// Create the balance row for a fresh (employee, leave type, year) account.
/// Returns the new row id so the batch can append its opening transactions.
pub async fn insert_balance(
    tx: &mut Transaction<'_, MySql>,
    employee_id: u64,
    leave_type_id: u64,
    year: i32,
    counters: &BalanceCounters,
) -> Result<u64, ApiError> {
    let result = sqlx::query(
        "INSERT INTO leave_balances (employee_id, leave_type_id, year, opening_balance, \
         credits_earned, credits_used, credits_forfeited, credits_converted, \
         credits_carried_over, pending_requests, current_balance, available_balance) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(employee_id)
    .bind(leave_type_id)
    .bind(year)
    .bind(counters.opening_balance())
    .bind(counters.credits_earned())
    .bind(counters.credits_used())
    .bind(counters.credits_forfeited())
    .bind(counters.credits_converted())
    .bind(counters.credits_carried_over())
    .bind(counters.pending_requests())
    .bind(counters.current_balance())
    .bind(counters.available_balance())
    .execute(&mut **tx)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.code().as_deref() == Some("23000") {
                return ApiError::DuplicateBalance {
                    employee_id,
                    leave_type_id,
                    year,
                };
            }
        }
        ApiError::Database(e)
    })?;
    Ok(result.last_insert_id())
}
