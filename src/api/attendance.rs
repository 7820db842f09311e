use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::info;
use utoipa::ToSchema;

use crate::{
    auth::auth::AuthUser,
    error::ApiError,
    ids,
    model::attendance::Attendance,
    utils::db_utils::{build_update_sql, execute_update},
    validation,
};

#[derive(Deserialize, ToSchema)]
pub struct CreateAttendance {
    #[schema(example = "KRY-001")]
    pub employee_id: Option<String>,
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: Option<NaiveDate>,
    #[schema(example = true)]
    pub present: Option<bool>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateAttendance {
    #[schema(example = "KRY-002")]
    pub employee_id: Option<String>,
    #[schema(example = "2026-01-06", value_type = String, format = "date")]
    pub date: Option<NaiveDate>,
    #[schema(example = false)]
    pub present: Option<bool>,
}

/// Create Attendance
#[utoipa::path(
    post,
    path = "/api/v1/attendance",
    request_body = CreateAttendance,
    responses(
        (status = 201, description = "Attendance created successfully", body = Attendance),
        (status = 422, description = "Validation failed", body = Object, example = json!({
            "status": "error",
            "message": "Validation failed",
            "errors": {"employee_id": ["employee_id is invalid"]}
        }))
    ),
    tag = "Attendance",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_attendance(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateAttendance>,
) -> actix_web::Result<impl Responder> {
    let mut tx = pool.begin().await.map_err(ApiError::from)?;

    let record = validation::attendance_create(&mut *tx, &payload).await?;
    let id = ids::next_id(&mut *tx, "attendance", ids::ATTENDANCE_PREFIX).await?;

    sqlx::query("INSERT INTO attendance (id, employee_id, date, present) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(&record.employee_id)
        .bind(record.date)
        .bind(record.present)
        .execute(&mut *tx)
        .await
        .map_err(ApiError::from)?;
    tx.commit().await.map_err(ApiError::from)?;

    info!(attendance_id = %id, caller = %auth.sub, "Attendance created");

    let attendance = Attendance {
        id,
        employee_id: record.employee_id,
        date: record.date,
        present: record.present,
    };

    Ok(HttpResponse::Created().json(json!({
        "status": "success",
        "message": "Attendance created successfully",
        "data": attendance
    })))
}

/// List Attendance
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    responses(
        (status = 200, description = "Attendance list", body = [Attendance])
    ),
    tag = "Attendance",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_attendance(pool: web::Data<SqlitePool>) -> actix_web::Result<impl Responder> {
    let rows = sqlx::query_as::<_, Attendance>("SELECT * FROM attendance ORDER BY LENGTH(id), id")
        .fetch_all(pool.get_ref())
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Attendance retrieved successfully",
        "data": rows
    })))
}

/// Get Attendance by ID
#[utoipa::path(
    get,
    path = "/api/v1/attendance/{id}",
    params(
        ("id", Path, description = "Attendance ID")
    ),
    responses(
        (status = 200, description = "Attendance found", body = Attendance),
        (status = 404, description = "Attendance not found")
    ),
    tag = "Attendance",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_attendance(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let attendance_id = path.into_inner();

    let attendance = sqlx::query_as::<_, Attendance>("SELECT * FROM attendance WHERE id = ?")
        .bind(&attendance_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(ApiError::from)?;

    match attendance {
        Some(attendance) => Ok(HttpResponse::Ok().json(json!({
            "status": "success",
            "message": "Attendance retrieved successfully",
            "data": attendance
        }))),
        None => Err(ApiError::NotFound("Attendance").into()),
    }
}

/// Update Attendance
#[utoipa::path(
    put,
    path = "/api/v1/attendance/{id}",
    params(
        ("id", Path, description = "Attendance ID")
    ),
    request_body = UpdateAttendance,
    responses(
        (status = 200, description = "Attendance updated successfully", body = Attendance),
        (status = 404, description = "Attendance not found"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Attendance",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_attendance(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
    payload: web::Json<UpdateAttendance>,
) -> actix_web::Result<impl Responder> {
    let attendance_id = path.into_inner();

    let mut tx = pool.begin().await.map_err(ApiError::from)?;

    let existing = sqlx::query_as::<_, Attendance>("SELECT * FROM attendance WHERE id = ?")
        .bind(&attendance_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(ApiError::from)?;
    if existing.is_none() {
        return Err(ApiError::NotFound("Attendance").into());
    }

    let columns = validation::attendance_patch(&mut *tx, &payload).await?;
    if !columns.is_empty() {
        let update = build_update_sql("attendance", columns, "id", &attendance_id);
        execute_update(&mut *tx, update)
            .await
            .map_err(ApiError::from)?;
    }

    let attendance = sqlx::query_as::<_, Attendance>("SELECT * FROM attendance WHERE id = ?")
        .bind(&attendance_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(ApiError::from)?;
    tx.commit().await.map_err(ApiError::from)?;

    info!(attendance_id = %attendance_id, caller = %auth.sub, "Attendance updated");

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Attendance updated successfully",
        "data": attendance
    })))
}

/// Delete Attendance
///
/// Refused while payroll entries still reference the row.
#[utoipa::path(
    delete,
    path = "/api/v1/attendance/{id}",
    params(
        ("id", Path, description = "Attendance ID")
    ),
    responses(
        (status = 200, description = "Attendance deleted"),
        (status = 404, description = "Attendance not found"),
        (status = 422, description = "Attendance still referenced by payroll entries")
    ),
    tag = "Attendance",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_attendance(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let attendance_id = path.into_inner();

    let mut tx = pool.begin().await.map_err(ApiError::from)?;

    if !validation::attendance_exists(&mut *tx, &attendance_id).await? {
        return Err(ApiError::NotFound("Attendance").into());
    }
    if validation::attendance_has_payroll(&mut *tx, &attendance_id).await? {
        return Err(
            ApiError::Conflict("Attendance is referenced by payroll entries".to_string()).into(),
        );
    }

    sqlx::query("DELETE FROM attendance WHERE id = ?")
        .bind(&attendance_id)
        .execute(&mut *tx)
        .await
        .map_err(ApiError::from)?;
    tx.commit().await.map_err(ApiError::from)?;

    info!(attendance_id = %attendance_id, caller = %auth.sub, "Attendance deleted");

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Attendance deleted successfully",
        "data": null
    })))
}

/// Attendance for one employee
#[utoipa::path(
    get,
    path = "/api/v1/attendance/employee/{id}",
    params(
        ("id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Attendance for the employee", body = [Attendance]),
        (status = 404, description = "Employee not found")
    ),
    tag = "Attendance",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn attendance_by_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let mut conn = pool.acquire().await.map_err(ApiError::from)?;
    if !validation::employee_exists(&mut conn, &employee_id).await? {
        return Err(ApiError::NotFound("Employee").into());
    }

    let rows = sqlx::query_as::<_, Attendance>(
        "SELECT * FROM attendance WHERE employee_id = ? ORDER BY LENGTH(id), id",
    )
    .bind(&employee_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Attendance retrieved successfully",
        "data": rows
    })))
}

/// Attendance within a date range, bounds inclusive
#[utoipa::path(
    get,
    path = "/api/v1/attendance/period/{from}/{to}",
    params(
        ("from", Path, description = "Start date (YYYY-MM-DD)"),
        ("to", Path, description = "End date (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Attendance in the period", body = [Attendance])
    ),
    tag = "Attendance",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn attendance_by_period(
    pool: web::Data<SqlitePool>,
    path: web::Path<(NaiveDate, NaiveDate)>,
) -> actix_web::Result<impl Responder> {
    let (from, to) = path.into_inner();

    let rows = sqlx::query_as::<_, Attendance>(
        "SELECT * FROM attendance WHERE date BETWEEN ? AND ? ORDER BY LENGTH(id), id",
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool.get_ref())
    .await
    .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Attendance retrieved successfully",
        "data": rows
    })))
}
