//! Employee deletion and its dependent-record cleanup.
//!
//! Kept out of the handler as an explicit function so the ordering and
//! atomicity of the cleanup are visible and testable.

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::validation::employee_exists;

/// Per-table counts reported back to the caller after a cascade.
#[derive(Debug, Serialize, ToSchema)]
pub struct CascadeSummary {
    #[schema(example = 2)]
    pub payroll_entries_deleted: u64,
    #[schema(example = 3)]
    pub attendance_deleted: u64,
    #[schema(example = 1)]
    pub payments_soft_deleted: u64,
}

/// Delete an employee together with its dependent records, atomically.
///
/// Order inside the transaction: payroll entries referencing the
/// employee's attendance go first (they hold the foreign keys), then the
/// attendance rows, then the employee's payments are soft-deleted, then
/// the employee row itself. Any failure rolls everything back, so the
/// employee is never left deleted with dependents behind.
pub async fn delete_employee_cascade(
    pool: &SqlitePool,
    employee_id: &str,
) -> Result<CascadeSummary, ApiError> {
    let mut tx = pool.begin().await?;

    if !employee_exists(&mut *tx, employee_id).await? {
        return Err(ApiError::NotFound("Employee"));
    }

    let payroll = sqlx::query(
        "DELETE FROM payroll_entries WHERE attendance_id IN \
         (SELECT id FROM attendance WHERE employee_id = ?)",
    )
    .bind(employee_id)
    .execute(&mut *tx)
    .await?;

    let attendance = sqlx::query("DELETE FROM attendance WHERE employee_id = ?")
        .bind(employee_id)
        .execute(&mut *tx)
        .await?;

    let now = Utc::now();
    let payments = sqlx::query(
        "UPDATE payments SET deleted_at = ?, updated_at = ? \
         WHERE employee_id = ? AND deleted_at IS NULL",
    )
    .bind(now)
    .bind(now)
    .bind(employee_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(employee_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(CascadeSummary {
        payroll_entries_deleted: payroll.rows_affected(),
        attendance_deleted: attendance.rows_affected(),
        payments_soft_deleted: payments.rows_affected(),
    })
}
