use std::fs;

use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::{
    auth::auth::AuthUser,
    config::Config,
    error::ApiError,
    ids,
    model::{employee::Employee, payment::PaymentRecord},
    utils::{
        db_utils::{SqlValue, build_update_sql, execute_update},
        receipt,
    },
    validation,
};

#[derive(Deserialize, ToSchema)]
pub struct CreatePayment {
    #[schema(example = "KRY-001")]
    pub employee_id: Option<String>,
    #[schema(example = "2026-01-31", value_type = String, format = "date")]
    pub paid_at: Option<NaiveDate>,
    /// One of `bank_transfer`, `cash`, `e_wallet`. `qris` is reserved for
    /// migrated history and is rejected here.
    #[schema(example = "bank_transfer")]
    pub method: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePayment {
    #[schema(example = "2026-02-28", value_type = String, format = "date")]
    pub paid_at: Option<NaiveDate>,
    #[schema(example = "cash")]
    pub method: Option<String>,
}

/// Record Payment
#[utoipa::path(
    post,
    path = "/api/v1/payments",
    request_body = CreatePayment,
    responses(
        (status = 201, description = "Payment recorded", body = PaymentRecord),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Payment"
)]
pub async fn create_payment(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreatePayment>,
) -> actix_web::Result<impl Responder> {
    let mut tx = pool.begin().await.map_err(ApiError::from)?;

    let record = validation::payment_create(&mut *tx, &payload).await?;
    let id = ids::next_id(&mut *tx, "payments", ids::PAYMENT_PREFIX).await?;
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO payments (id, employee_id, paid_at, method, receipt_path, created_at, updated_at, deleted_at) \
         VALUES (?, ?, ?, ?, NULL, ?, ?, NULL)",
    )
    .bind(&id)
    .bind(&record.employee_id)
    .bind(record.paid_at)
    .bind(record.method.to_string())
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(ApiError::from)?;
    tx.commit().await.map_err(ApiError::from)?;

    info!(payment_id = %id, caller = %auth.sub, "Payment recorded");

    let payment = PaymentRecord {
        id,
        employee_id: record.employee_id,
        paid_at: record.paid_at,
        method: record.method,
        receipt_path: None,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    };

    Ok(HttpResponse::Created().json(json!({
        "status": "success",
        "message": "Payment recorded successfully",
        "data": payment
    })))
}

/// List Payments
///
/// Soft-deleted payments never appear here.
#[utoipa::path(
    get,
    path = "/api/v1/payments",
    responses(
        (status = 200, description = "Payment list", body = [PaymentRecord])
    ),
    security(("bearer_auth" = [])),
    tag = "Payment"
)]
pub async fn list_payments(pool: web::Data<SqlitePool>) -> actix_web::Result<impl Responder> {
    let payments = sqlx::query_as::<_, PaymentRecord>(
        "SELECT * FROM payments WHERE deleted_at IS NULL ORDER BY LENGTH(id), id",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Payments retrieved successfully",
        "data": payments
    })))
}

/// Get Payment by ID
#[utoipa::path(
    get,
    path = "/api/v1/payments/{id}",
    params(
        ("id", Path, description = "Payment ID")
    ),
    responses(
        (status = 200, body = PaymentRecord),
        (status = 404, description = "Payment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payment"
)]
pub async fn get_payment(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let payment_id = path.into_inner();

    let payment = sqlx::query_as::<_, PaymentRecord>(
        "SELECT * FROM payments WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(&payment_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(ApiError::from)?;

    match payment {
        Some(payment) => Ok(HttpResponse::Ok().json(json!({
            "status": "success",
            "message": "Payment retrieved successfully",
            "data": payment
        }))),
        None => Err(ApiError::NotFound("Payment").into()),
    }
}

/// Update Payment
///
/// `qris` is accepted here so that migrated records can be corrected.
#[utoipa::path(
    put,
    path = "/api/v1/payments/{id}",
    params(
        ("id", Path, description = "Payment ID")
    ),
    request_body = UpdatePayment,
    responses(
        (status = 200, description = "Payment updated", body = PaymentRecord),
        (status = 404, description = "Payment not found"),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Payment"
)]
pub async fn update_payment(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
    payload: web::Json<UpdatePayment>,
) -> actix_web::Result<impl Responder> {
    let payment_id = path.into_inner();

    let mut tx = pool.begin().await.map_err(ApiError::from)?;

    let existing = sqlx::query_as::<_, PaymentRecord>(
        "SELECT * FROM payments WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(&payment_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(ApiError::from)?;
    if existing.is_none() {
        return Err(ApiError::NotFound("Payment").into());
    }

    let mut columns = validation::payment_patch(&payload)?;
    if !columns.is_empty() {
        columns.push(("updated_at", SqlValue::DateTime(Utc::now())));
        let update = build_update_sql("payments", columns, "id", &payment_id);
        execute_update(&mut *tx, update)
            .await
            .map_err(ApiError::from)?;
    }

    let payment = sqlx::query_as::<_, PaymentRecord>("SELECT * FROM payments WHERE id = ?")
        .bind(&payment_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(ApiError::from)?;
    tx.commit().await.map_err(ApiError::from)?;

    info!(payment_id = %payment_id, caller = %auth.sub, "Payment updated");

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Payment updated successfully",
        "data": payment
    })))
}

/// Delete Payment
///
/// Marks the record deleted and leaves the row in place. Repeating the
/// call reports the payment as missing.
#[utoipa::path(
    delete,
    path = "/api/v1/payments/{id}",
    params(
        ("id", Path, description = "Payment ID")
    ),
    responses(
        (status = 200, description = "Payment deleted"),
        (status = 404, description = "Payment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payment"
)]
pub async fn delete_payment(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let payment_id = path.into_inner();
    let now = Utc::now();

    let result = sqlx::query(
        "UPDATE payments SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(now)
    .bind(now)
    .bind(&payment_id)
    .execute(pool.get_ref())
    .await
    .map_err(ApiError::from)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Payment").into());
    }

    info!(payment_id = %payment_id, caller = %auth.sub, "Payment deleted");

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Payment deleted successfully",
        "data": null
    })))
}

/// Payments for one employee
#[utoipa::path(
    get,
    path = "/api/v1/payments/employee/{id}",
    params(
        ("id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Payments for the employee", body = [PaymentRecord]),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payment"
)]
pub async fn payments_by_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let mut conn = pool.acquire().await.map_err(ApiError::from)?;
    if !validation::employee_exists(&mut conn, &employee_id).await? {
        return Err(ApiError::NotFound("Employee").into());
    }

    let payments = sqlx::query_as::<_, PaymentRecord>(
        "SELECT * FROM payments WHERE employee_id = ? AND deleted_at IS NULL ORDER BY LENGTH(id), id",
    )
    .bind(&employee_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Payments retrieved successfully",
        "data": payments
    })))
}

/// Download Payment Receipt
///
/// Serves the stored receipt file when one exists, otherwise renders it
/// from the current payment and employee rows, stores the path, and
/// serves the fresh copy.
#[utoipa::path(
    get,
    path = "/api/v1/payments/{id}/receipt",
    params(
        ("id", Path, description = "Payment ID")
    ),
    responses(
        (status = 200, description = "Plain-text receipt attachment", content_type = "application/octet-stream"),
        (status = 404, description = "Payment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payment"
)]
#[instrument(
    name = "payment_receipt",
    skip(pool, config, path),
    fields(payment_id = %path.as_str())
)]
pub async fn payment_receipt(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let payment_id = path.into_inner();

    let payment = sqlx::query_as::<_, PaymentRecord>(
        "SELECT * FROM payments WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(&payment_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(ApiError::from)?;
    let payment = match payment {
        Some(payment) => payment,
        None => return Err(ApiError::NotFound("Payment").into()),
    };

    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(&payment.employee_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(ApiError::from)?;
    let employee = match employee {
        Some(employee) => employee,
        None => return Err(ApiError::NotFound("Employee").into()),
    };

    // A stored path can go stale if the file was removed out of band; fall
    // through and regenerate in that case.
    if let Some(stored) = &payment.receipt_path {
        if let Ok(bytes) = fs::read(stored) {
            return Ok(attachment(&payment.id, bytes));
        }
    }

    let written = receipt::write_receipt(
        std::path::Path::new(&config.receipt_dir),
        &payment,
        &employee,
    )
    .map_err(ApiError::from)?;
    let stored_path = written.to_string_lossy().into_owned();

    sqlx::query("UPDATE payments SET receipt_path = ?, updated_at = ? WHERE id = ?")
        .bind(&stored_path)
        .bind(Utc::now())
        .bind(&payment.id)
        .execute(pool.get_ref())
        .await
        .map_err(ApiError::from)?;

    info!(path = %stored_path, "Receipt generated");

    let bytes = fs::read(&written).map_err(ApiError::from)?;
    Ok(attachment(&payment.id, bytes))
}

fn attachment(payment_id: &str, bytes: Vec<u8>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/octet-stream")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{payment_id}.txt\""),
        ))
        .body(bytes)
}
