//! Shared request validation, one function per entity per operation.
//!
//! Create payloads arrive with every field optional so that missing input
//! turns into field-level messages instead of deserializer failures. Each
//! create validator returns a normalized `New*` record; each update
//! validator returns the whitelisted column/value pairs for the dynamic
//! UPDATE builder. Reference checks (`employee_id`, `attendance_id`,
//! `payment_id`) run as EXISTS lookups on the caller's connection, so a
//! validator inside a transaction sees that transaction's state.

use std::str::FromStr;

use sqlx::SqliteConnection;

use crate::api::attendance::{CreateAttendance, UpdateAttendance};
use crate::api::employee::{CreateEmployee, UpdateEmployee};
use crate::api::payment::{CreatePayment, UpdatePayment};
use crate::api::payroll::{CreatePayroll, UpdatePayroll};
use crate::error::{ApiError, FieldErrors};
use crate::model::payment::PaymentMethod;
use crate::utils::db_utils::SqlValue;

use chrono::NaiveDate;

#[derive(Debug)]
pub struct NewEmployee {
    pub name: String,
    pub job_title: String,
    pub base_salary: i64,
}

#[derive(Debug)]
pub struct NewAttendance {
    pub employee_id: String,
    pub date: NaiveDate,
    pub present: bool,
}

#[derive(Debug)]
pub struct NewPayrollEntry {
    pub attendance_id: String,
    pub payment_id: String,
    pub amount: i64,
    pub date: NaiveDate,
}

#[derive(Debug)]
pub struct NewPayment {
    pub employee_id: String,
    pub paid_at: NaiveDate,
    pub method: PaymentMethod,
}

/// Column/value pairs destined for `build_update_sql`. Empty means the
/// patch had no recognized fields; callers treat that as a no-op.
pub type PatchColumns = Vec<(&'static str, SqlValue)>;

pub fn employee_create(payload: &CreateEmployee) -> Result<NewEmployee, ApiError> {
    let mut errors = FieldErrors::default();

    let name = required_text(&mut errors, "name", &payload.name);
    let job_title = required_text(&mut errors, "job_title", &payload.job_title);
    let base_salary = required_amount(&mut errors, "base_salary", &payload.base_salary);

    match (name, job_title, base_salary) {
        (Some(name), Some(job_title), Some(base_salary)) if errors.is_empty() => Ok(NewEmployee {
            name,
            job_title,
            base_salary,
        }),
        _ => Err(ApiError::Validation(errors)),
    }
}

pub fn employee_patch(payload: &UpdateEmployee) -> Result<PatchColumns, ApiError> {
    let mut errors = FieldErrors::default();
    let mut columns = PatchColumns::new();

    if let Some(name) = optional_text(&mut errors, "name", &payload.name) {
        columns.push(("name", SqlValue::String(name)));
    }
    if let Some(job_title) = optional_text(&mut errors, "job_title", &payload.job_title) {
        columns.push(("job_title", SqlValue::String(job_title)));
    }
    if let Some(base_salary) = payload.base_salary {
        if base_salary < 0 {
            errors.add("base_salary", "base_salary must be at least 0");
        } else {
            columns.push(("base_salary", SqlValue::I64(base_salary)));
        }
    }

    errors.into_result()?;
    Ok(columns)
}

pub async fn attendance_create(
    conn: &mut SqliteConnection,
    payload: &CreateAttendance,
) -> Result<NewAttendance, ApiError> {
    let mut errors = FieldErrors::default();

    let employee_id = required_text(&mut errors, "employee_id", &payload.employee_id);
    if let Some(id) = &employee_id {
        if !employee_exists(conn, id).await? {
            errors.add("employee_id", "employee_id is invalid");
        }
    }
    let date = required(&mut errors, "date", &payload.date);
    let present = required(&mut errors, "present", &payload.present);

    match (employee_id, date, present) {
        (Some(employee_id), Some(date), Some(present)) if errors.is_empty() => Ok(NewAttendance {
            employee_id,
            date,
            present,
        }),
        _ => Err(ApiError::Validation(errors)),
    }
}

pub async fn attendance_patch(
    conn: &mut SqliteConnection,
    payload: &UpdateAttendance,
) -> Result<PatchColumns, ApiError> {
    let mut errors = FieldErrors::default();
    let mut columns = PatchColumns::new();

    if let Some(id) = optional_text(&mut errors, "employee_id", &payload.employee_id) {
        if employee_exists(conn, &id).await? {
            columns.push(("employee_id", SqlValue::String(id)));
        } else {
            errors.add("employee_id", "employee_id is invalid");
        }
    }
    if let Some(date) = payload.date {
        columns.push(("date", SqlValue::Date(date)));
    }
    if let Some(present) = payload.present {
        columns.push(("present", SqlValue::Bool(present)));
    }

    errors.into_result()?;
    Ok(columns)
}

pub async fn payroll_create(
    conn: &mut SqliteConnection,
    payload: &CreatePayroll,
) -> Result<NewPayrollEntry, ApiError> {
    let mut errors = FieldErrors::default();

    let attendance_id = required_text(&mut errors, "attendance_id", &payload.attendance_id);
    if let Some(id) = &attendance_id {
        if !attendance_exists(conn, id).await? {
            errors.add("attendance_id", "attendance_id is invalid");
        }
    }
    let payment_id = required_text(&mut errors, "payment_id", &payload.payment_id);
    if let Some(id) = &payment_id {
        if !payment_exists(conn, id).await? {
            errors.add("payment_id", "payment_id is invalid");
        }
    }
    let amount = required_amount(&mut errors, "amount", &payload.amount);
    let date = required(&mut errors, "date", &payload.date);

    match (attendance_id, payment_id, amount, date) {
        (Some(attendance_id), Some(payment_id), Some(amount), Some(date))
            if errors.is_empty() =>
        {
            Ok(NewPayrollEntry {
                attendance_id,
                payment_id,
                amount,
                date,
            })
        }
        _ => Err(ApiError::Validation(errors)),
    }
}

pub async fn payroll_patch(
    conn: &mut SqliteConnection,
    payload: &UpdatePayroll,
) -> Result<PatchColumns, ApiError> {
    let mut errors = FieldErrors::default();
    let mut columns = PatchColumns::new();

    if let Some(id) = optional_text(&mut errors, "attendance_id", &payload.attendance_id) {
        if attendance_exists(conn, &id).await? {
            columns.push(("attendance_id", SqlValue::String(id)));
        } else {
            errors.add("attendance_id", "attendance_id is invalid");
        }
    }
    if let Some(id) = optional_text(&mut errors, "payment_id", &payload.payment_id) {
        if payment_exists(conn, &id).await? {
            columns.push(("payment_id", SqlValue::String(id)));
        } else {
            errors.add("payment_id", "payment_id is invalid");
        }
    }
    if let Some(amount) = payload.amount {
        if amount < 0 {
            errors.add("amount", "amount must be at least 0");
        } else {
            columns.push(("amount", SqlValue::I64(amount)));
        }
    }
    if let Some(date) = payload.date {
        columns.push(("date", SqlValue::Date(date)));
    }

    errors.into_result()?;
    Ok(columns)
}

pub async fn payment_create(
    conn: &mut SqliteConnection,
    payload: &CreatePayment,
) -> Result<NewPayment, ApiError> {
    let mut errors = FieldErrors::default();

    let employee_id = required_text(&mut errors, "employee_id", &payload.employee_id);
    if let Some(id) = &employee_id {
        if !employee_exists(conn, id).await? {
            errors.add("employee_id", "employee_id is invalid");
        }
    }
    let paid_at = required(&mut errors, "paid_at", &payload.paid_at);
    let method = match &payload.method {
        Some(raw) => match parse_method(raw, false) {
            Ok(method) => Some(method),
            Err(message) => {
                errors.add("method", message);
                None
            }
        },
        None => {
            errors.add("method", "method is required");
            None
        }
    };

    match (employee_id, paid_at, method) {
        (Some(employee_id), Some(paid_at), Some(method)) if errors.is_empty() => Ok(NewPayment {
            employee_id,
            paid_at,
            method,
        }),
        _ => Err(ApiError::Validation(errors)),
    }
}

pub fn payment_patch(payload: &UpdatePayment) -> Result<PatchColumns, ApiError> {
    let mut errors = FieldErrors::default();
    let mut columns = PatchColumns::new();

    if let Some(paid_at) = payload.paid_at {
        columns.push(("paid_at", SqlValue::Date(paid_at)));
    }
    if let Some(raw) = &payload.method {
        match parse_method(raw, true) {
            Ok(method) => columns.push(("method", SqlValue::String(method.to_string()))),
            Err(message) => errors.add("method", message),
        }
    }

    errors.into_result()?;
    Ok(columns)
}

pub async fn employee_exists(conn: &mut SqliteConnection, id: &str) -> Result<bool, ApiError> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM employees WHERE id = ?)")
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(exists)
}

pub async fn attendance_exists(conn: &mut SqliteConnection, id: &str) -> Result<bool, ApiError> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM attendance WHERE id = ?)")
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;
    Ok(exists)
}

/// Soft-deleted payments do not count as referenceable.
pub async fn payment_exists(conn: &mut SqliteConnection, id: &str) -> Result<bool, ApiError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM payments WHERE id = ? AND deleted_at IS NULL)",
    )
    .bind(id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(exists)
}

/// True while any payroll entry still references the attendance row, in
/// which case the row must not be deleted.
pub async fn attendance_has_payroll(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<bool, ApiError> {
    let referenced = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM payroll_entries WHERE attendance_id = ?)",
    )
    .bind(id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(referenced)
}

fn required_text(errors: &mut FieldErrors, field: &str, value: &Option<String>) -> Option<String> {
    match value {
        Some(raw) => normalize_text(errors, field, raw),
        None => {
            errors.add(field, format!("{field} is required"));
            None
        }
    }
}

/// Like `required_text` but silent when the field is absent.
fn optional_text(errors: &mut FieldErrors, field: &str, value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .and_then(|raw| normalize_text(errors, field, raw))
}

fn normalize_text(errors: &mut FieldErrors, field: &str, raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.add(field, format!("{field} is required"));
        return None;
    }
    if trimmed.chars().count() > 255 {
        errors.add(field, format!("{field} must not exceed 255 characters"));
        return None;
    }
    Some(trimmed.to_string())
}

fn required<T: Copy>(errors: &mut FieldErrors, field: &str, value: &Option<T>) -> Option<T> {
    match value {
        Some(v) => Some(*v),
        None => {
            errors.add(field, format!("{field} is required"));
            None
        }
    }
}

fn required_amount(errors: &mut FieldErrors, field: &str, value: &Option<i64>) -> Option<i64> {
    match value {
        Some(v) if *v < 0 => {
            errors.add(field, format!("{field} must be at least 0"));
            None
        }
        Some(v) => Some(*v),
        None => {
            errors.add(field, format!("{field} is required"));
            None
        }
    }
}

fn parse_method(raw: &str, allow_qris: bool) -> Result<PaymentMethod, String> {
    let allowed = if allow_qris {
        "method must be one of bank_transfer, cash, e_wallet, qris"
    } else {
        "method must be one of bank_transfer, cash, e_wallet"
    };
    match PaymentMethod::from_str(raw.trim()) {
        Ok(PaymentMethod::Qris) if !allow_qris => Err(allowed.to_string()),
        Ok(method) => Ok(method),
        Err(_) => Err(allowed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employee_create_reports_every_missing_field() {
        let payload = CreateEmployee {
            name: None,
            job_title: None,
            base_salary: None,
        };
        let err = employee_create(&payload).unwrap_err();
        let ApiError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.get("name").is_some());
        assert!(errors.get("job_title").is_some());
        assert!(errors.get("base_salary").is_some());
    }

    #[test]
    fn employee_create_trims_and_normalizes() {
        let payload = CreateEmployee {
            name: Some("  John  ".to_string()),
            job_title: Some("Staff".to_string()),
            base_salary: Some(5_000_000),
        };
        let record = employee_create(&payload).unwrap();
        assert_eq!(record.name, "John");
        assert_eq!(record.base_salary, 5_000_000);
    }

    #[test]
    fn employee_create_rejects_blank_overlong_and_negative() {
        let payload = CreateEmployee {
            name: Some("   ".to_string()),
            job_title: Some("x".repeat(256)),
            base_salary: Some(-1),
        };
        let ApiError::Validation(errors) = employee_create(&payload).unwrap_err() else {
            panic!("expected validation error");
        };
        assert_eq!(errors.get("name").unwrap()[0], "name is required");
        assert_eq!(
            errors.get("job_title").unwrap()[0],
            "job_title must not exceed 255 characters"
        );
        assert_eq!(
            errors.get("base_salary").unwrap()[0],
            "base_salary must be at least 0"
        );
    }

    #[test]
    fn employee_patch_allows_any_subset() {
        let payload = UpdateEmployee {
            name: Some("Jane".to_string()),
            job_title: None,
            base_salary: None,
        };
        let columns = employee_patch(&payload).unwrap();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].0, "name");
    }

    #[test]
    fn empty_employee_patch_is_a_noop() {
        let payload = UpdateEmployee {
            name: None,
            job_title: None,
            base_salary: None,
        };
        assert!(employee_patch(&payload).unwrap().is_empty());
    }

    #[test]
    fn qris_is_rejected_on_create_but_allowed_on_update() {
        assert!(parse_method("qris", false).is_err());
        assert_eq!(parse_method("qris", true).unwrap(), PaymentMethod::Qris);
        assert_eq!(
            parse_method("bank_transfer", false).unwrap(),
            PaymentMethod::BankTransfer
        );
        assert!(parse_method("cheque", true).is_err());
    }

    #[test]
    fn payment_patch_maps_method_to_storage_form() {
        let payload = UpdatePayment {
            paid_at: None,
            method: Some("qris".to_string()),
        };
        let columns = payment_patch(&payload).unwrap();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].0, "method");
        match &columns[0].1 {
            SqlValue::String(v) => assert_eq!(v, "qris"),
            other => panic!("unexpected value {other:?}"),
        }
    }
}
