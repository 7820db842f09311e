use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::SqlitePool;
use tracing::info;
use utoipa::ToSchema;

use crate::{
    auth::auth::AuthUser,
    cascade,
    error::ApiError,
    ids,
    model::employee::Employee,
    utils::db_utils::{build_update_sql, execute_update},
    validation,
};

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "John")]
    pub name: Option<String>,
    #[schema(example = "Staff")]
    pub job_title: Option<String>,
    #[schema(example = 5000000)]
    pub base_salary: Option<i64>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateEmployee {
    #[schema(example = "Jane")]
    pub name: Option<String>,
    #[schema(example = "Supervisor")]
    pub job_title: Option<String>,
    #[schema(example = 6000000)]
    pub base_salary: Option<i64>,
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created successfully", body = Employee),
        (status = 422, description = "Validation failed", body = Object, example = json!({
            "status": "error",
            "message": "Validation failed",
            "errors": {"name": ["name is required"]}
        }))
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    let record = validation::employee_create(&payload)?;

    let mut tx = pool.begin().await.map_err(ApiError::from)?;
    let id = ids::next_id(&mut *tx, "employees", ids::EMPLOYEE_PREFIX).await?;

    sqlx::query("INSERT INTO employees (id, name, job_title, base_salary) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(&record.name)
        .bind(&record.job_title)
        .bind(record.base_salary)
        .execute(&mut *tx)
        .await
        .map_err(ApiError::from)?;
    tx.commit().await.map_err(ApiError::from)?;

    info!(employee_id = %id, caller = %auth.sub, "Employee created");

    let employee = Employee {
        id,
        name: record.name,
        job_title: record.job_title,
        base_salary: record.base_salary,
    };

    Ok(HttpResponse::Created().json(json!({
        "status": "success",
        "message": "Employee created successfully",
        "data": employee
    })))
}

/// List Employees
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    responses(
        (status = 200, description = "Employee list", body = [Employee])
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(pool: web::Data<SqlitePool>) -> actix_web::Result<impl Responder> {
    let employees =
        sqlx::query_as::<_, Employee>("SELECT * FROM employees ORDER BY LENGTH(id), id")
            .fetch_all(pool.get_ref())
            .await
            .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Employees retrieved successfully",
        "data": employees
    })))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}",
    params(
        ("id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "status": "error",
            "message": "Employee not found"
        }))
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(&employee_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(ApiError::from)?;

    match employee {
        Some(employee) => Ok(HttpResponse::Ok().json(json!({
            "status": "success",
            "message": "Employee retrieved successfully",
            "data": employee
        }))),
        None => Err(ApiError::NotFound("Employee").into()),
    }
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/v1/employees/{id}",
    params(
        ("id", Path, description = "Employee ID")
    ),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated successfully", body = Employee),
        (status = 404, description = "Employee not found"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
    payload: web::Json<UpdateEmployee>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let mut tx = pool.begin().await.map_err(ApiError::from)?;

    let existing = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(&employee_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(ApiError::from)?;
    if existing.is_none() {
        return Err(ApiError::NotFound("Employee").into());
    }

    let columns = validation::employee_patch(&payload)?;
    if !columns.is_empty() {
        let update = build_update_sql("employees", columns, "id", &employee_id);
        execute_update(&mut *tx, update)
            .await
            .map_err(ApiError::from)?;
    }

    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(&employee_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(ApiError::from)?;
    tx.commit().await.map_err(ApiError::from)?;

    info!(employee_id = %employee_id, caller = %auth.sub, "Employee updated");

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Employee updated successfully",
        "data": employee
    })))
}

/// Delete Employee
///
/// Cascades: payroll entries tied to the employee's attendance are
/// deleted, attendance rows are deleted, payments are soft-deleted, all
/// in one transaction.
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{id}",
    params(
        ("id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee deleted with dependents", body = Object, example = json!({
            "status": "success",
            "message": "Employee deleted successfully",
            "data": {"payroll_entries_deleted": 2, "attendance_deleted": 3, "payments_soft_deleted": 1}
        })),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_employee(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let summary = cascade::delete_employee_cascade(pool.get_ref(), &employee_id).await?;

    info!(
        employee_id = %employee_id,
        caller = %auth.sub,
        payroll_entries = summary.payroll_entries_deleted,
        attendance = summary.attendance_deleted,
        payments = summary.payments_soft_deleted,
        "Employee deleted"
    );

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Employee deleted successfully",
        "data": summary
    })))
}
