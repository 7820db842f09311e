use actix_web::{HttpResponse, Responder, web};
use chrono::{Months, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::info;
use utoipa::ToSchema;

use crate::{
    auth::auth::AuthUser,
    error::{ApiError, FieldErrors},
    ids,
    model::payroll::PayrollEntry,
    utils::db_utils::{build_update_sql, execute_update},
    validation,
};

#[derive(Deserialize, ToSchema)]
pub struct CreatePayroll {
    #[schema(example = "ABS-001")]
    pub attendance_id: Option<String>,
    #[schema(example = "PMB-001")]
    pub payment_id: Option<String>,
    #[schema(example = 5000000)]
    pub amount: Option<i64>,
    #[schema(example = "2026-01-31", value_type = String, format = "date")]
    pub date: Option<NaiveDate>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePayroll {
    #[schema(example = "ABS-002")]
    pub attendance_id: Option<String>,
    #[schema(example = "PMB-002")]
    pub payment_id: Option<String>,
    #[schema(example = 5500000)]
    pub amount: Option<i64>,
    #[schema(example = "2026-02-28", value_type = String, format = "date")]
    pub date: Option<NaiveDate>,
}

/// Create Payroll Entry
///
/// Both references must resolve at the time of the check, otherwise the
/// request fails with field-level detail and nothing is written.
#[utoipa::path(
    post,
    path = "/api/v1/payroll",
    request_body = CreatePayroll,
    responses(
        (status = 201, description = "Payroll entry created", body = PayrollEntry),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn create_payroll(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreatePayroll>,
) -> actix_web::Result<impl Responder> {
    let mut tx = pool.begin().await.map_err(ApiError::from)?;

    let record = validation::payroll_create(&mut *tx, &payload).await?;
    let id = ids::next_id(&mut *tx, "payroll_entries", ids::PAYROLL_PREFIX).await?;

    sqlx::query(
        "INSERT INTO payroll_entries (id, attendance_id, payment_id, amount, date) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&record.attendance_id)
    .bind(&record.payment_id)
    .bind(record.amount)
    .bind(record.date)
    .execute(&mut *tx)
    .await
    .map_err(ApiError::from)?;
    tx.commit().await.map_err(ApiError::from)?;

    info!(payroll_id = %id, caller = %auth.sub, "Payroll entry created");

    let entry = PayrollEntry {
        id,
        attendance_id: record.attendance_id,
        payment_id: record.payment_id,
        amount: record.amount,
        date: record.date,
    };

    Ok(HttpResponse::Created().json(json!({
        "status": "success",
        "message": "Payroll entry created successfully",
        "data": entry
    })))
}

/// List Payroll Entries
#[utoipa::path(
    get,
    path = "/api/v1/payroll",
    responses(
        (status = 200, description = "Payroll entry list", body = [PayrollEntry])
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_payrolls(pool: web::Data<SqlitePool>) -> actix_web::Result<impl Responder> {
    let entries =
        sqlx::query_as::<_, PayrollEntry>("SELECT * FROM payroll_entries ORDER BY LENGTH(id), id")
            .fetch_all(pool.get_ref())
            .await
            .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Payroll entries retrieved successfully",
        "data": entries
    })))
}

/// Get Payroll Entry by ID
#[utoipa::path(
    get,
    path = "/api/v1/payroll/{id}",
    params(
        ("id", Path, description = "Payroll entry ID")
    ),
    responses(
        (status = 200, body = PayrollEntry),
        (status = 404, description = "Payroll entry not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_payroll(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let payroll_id = path.into_inner();

    let entry = sqlx::query_as::<_, PayrollEntry>("SELECT * FROM payroll_entries WHERE id = ?")
        .bind(&payroll_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(ApiError::from)?;

    match entry {
        Some(entry) => Ok(HttpResponse::Ok().json(json!({
            "status": "success",
            "message": "Payroll entry retrieved successfully",
            "data": entry
        }))),
        None => Err(ApiError::NotFound("Payroll entry").into()),
    }
}

/// Update Payroll Entry
#[utoipa::path(
    put,
    path = "/api/v1/payroll/{id}",
    params(
        ("id", Path, description = "Payroll entry ID")
    ),
    request_body = UpdatePayroll,
    responses(
        (status = 200, description = "Payroll entry updated", body = PayrollEntry),
        (status = 404, description = "Payroll entry not found"),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn update_payroll(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
    payload: web::Json<UpdatePayroll>,
) -> actix_web::Result<impl Responder> {
    let payroll_id = path.into_inner();

    let mut tx = pool.begin().await.map_err(ApiError::from)?;

    let existing = sqlx::query_as::<_, PayrollEntry>("SELECT * FROM payroll_entries WHERE id = ?")
        .bind(&payroll_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(ApiError::from)?;
    if existing.is_none() {
        return Err(ApiError::NotFound("Payroll entry").into());
    }

    let columns = validation::payroll_patch(&mut *tx, &payload).await?;
    if !columns.is_empty() {
        let update = build_update_sql("payroll_entries", columns, "id", &payroll_id);
        execute_update(&mut *tx, update)
            .await
            .map_err(ApiError::from)?;
    }

    let entry = sqlx::query_as::<_, PayrollEntry>("SELECT * FROM payroll_entries WHERE id = ?")
        .bind(&payroll_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(ApiError::from)?;
    tx.commit().await.map_err(ApiError::from)?;

    info!(payroll_id = %payroll_id, caller = %auth.sub, "Payroll entry updated");

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Payroll entry updated successfully",
        "data": entry
    })))
}

/// Delete Payroll Entry
#[utoipa::path(
    delete,
    path = "/api/v1/payroll/{id}",
    params(
        ("id", Path, description = "Payroll entry ID")
    ),
    responses(
        (status = 200, description = "Payroll entry deleted"),
        (status = 404, description = "Payroll entry not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn delete_payroll(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let payroll_id = path.into_inner();

    let result = sqlx::query("DELETE FROM payroll_entries WHERE id = ?")
        .bind(&payroll_id)
        .execute(pool.get_ref())
        .await
        .map_err(ApiError::from)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Payroll entry").into());
    }

    info!(payroll_id = %payroll_id, caller = %auth.sub, "Payroll entry deleted");

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Payroll entry deleted successfully",
        "data": null
    })))
}

/// Payroll entries for one employee, joined through attendance
#[utoipa::path(
    get,
    path = "/api/v1/payroll/employee/{id}",
    params(
        ("id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Payroll entries for the employee", body = [PayrollEntry]),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn payroll_by_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let mut conn = pool.acquire().await.map_err(ApiError::from)?;
    if !validation::employee_exists(&mut conn, &employee_id).await? {
        return Err(ApiError::NotFound("Employee").into());
    }

    let entries = sqlx::query_as::<_, PayrollEntry>(
        "SELECT p.* FROM payroll_entries p \
         JOIN attendance a ON p.attendance_id = a.id \
         WHERE a.employee_id = ? ORDER BY LENGTH(p.id), p.id",
    )
    .bind(&employee_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Payroll entries retrieved successfully",
        "data": entries
    })))
}

/// Payroll entries referencing one attendance record
#[utoipa::path(
    get,
    path = "/api/v1/payroll/attendance/{id}",
    params(
        ("id", Path, description = "Attendance ID")
    ),
    responses(
        (status = 200, description = "Payroll entries for the attendance record", body = [PayrollEntry]),
        (status = 404, description = "Attendance not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn payroll_by_attendance(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let attendance_id = path.into_inner();

    let mut conn = pool.acquire().await.map_err(ApiError::from)?;
    if !validation::attendance_exists(&mut conn, &attendance_id).await? {
        return Err(ApiError::NotFound("Attendance").into());
    }

    let entries = sqlx::query_as::<_, PayrollEntry>(
        "SELECT * FROM payroll_entries WHERE attendance_id = ? ORDER BY LENGTH(id), id",
    )
    .bind(&attendance_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Payroll entries retrieved successfully",
        "data": entries
    })))
}

/// Payroll entries referencing one payment record
#[utoipa::path(
    get,
    path = "/api/v1/payroll/payment/{id}",
    params(
        ("id", Path, description = "Payment ID")
    ),
    responses(
        (status = 200, description = "Payroll entries for the payment", body = [PayrollEntry]),
        (status = 404, description = "Payment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn payroll_by_payment(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let payment_id = path.into_inner();

    let mut conn = pool.acquire().await.map_err(ApiError::from)?;
    if !validation::payment_exists(&mut conn, &payment_id).await? {
        return Err(ApiError::NotFound("Payment").into());
    }

    let entries = sqlx::query_as::<_, PayrollEntry>(
        "SELECT * FROM payroll_entries WHERE payment_id = ? ORDER BY LENGTH(id), id",
    )
    .bind(&payment_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Payroll entries retrieved successfully",
        "data": entries
    })))
}

/// Payroll entries dated within one calendar month
#[utoipa::path(
    get,
    path = "/api/v1/payroll/period/{year}/{month}",
    params(
        ("year", Path, description = "Calendar year"),
        ("month", Path, description = "Month (1-12)")
    ),
    responses(
        (status = 200, description = "Payroll entries in the month", body = [PayrollEntry]),
        (status = 422, description = "Invalid period")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn payroll_by_period(
    pool: web::Data<SqlitePool>,
    path: web::Path<(i32, u32)>,
) -> actix_web::Result<impl Responder> {
    let (year, month) = path.into_inner();

    if !(1..=12).contains(&month) {
        return Err(ApiError::Validation(FieldErrors::single(
            "month",
            "month must be between 1 and 12",
        ))
        .into());
    }
    let (start, end) = month_bounds(year, month).ok_or_else(|| {
        ApiError::Validation(FieldErrors::single("period", "period is out of range"))
    })?;

    let entries = sqlx::query_as::<_, PayrollEntry>(
        "SELECT * FROM payroll_entries WHERE date BETWEEN ? AND ? ORDER BY LENGTH(id), id",
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool.get_ref())
    .await
    .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Payroll entries retrieved successfully",
        "data": entries
    })))
}

/// First and last day of a calendar month, both inclusive.
fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = start.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_bounds_cover_the_whole_month() {
        let (start, end) = month_bounds(2026, 1).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 1, 31).unwrap());
    }

    #[test]
    fn december_rolls_into_the_next_year() {
        let (start, end) = month_bounds(2026, 12).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2026, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 12, 31).unwrap());
    }

    #[test]
    fn leap_february_ends_on_the_29th() {
        let (_, end) = month_bounds(2024, 2).unwrap();
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn invalid_months_produce_no_bounds() {
        assert!(month_bounds(2026, 0).is_none());
        assert!(month_bounds(2026, 13).is_none());
    }
}
