use std::collections::BTreeMap;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde::Serialize;
use serde_json::json;
use sqlx::error::ErrorKind;
use tracing::error;

/// Field-level validation messages, keyed by input field name.
///
/// Serializes as `{"field": ["message", ...]}` so clients can attach
/// messages to the offending inputs. BTreeMap keeps the output order
/// stable.
#[derive(Debug, Default, Serialize)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.0.get(field)
    }

    /// Finish a validation pass: `Ok` when no field failed.
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self))
        }
    }
}

/// Error type shared by every handler.
///
/// Validation failures and identifier conflicts are both 422
/// (conflicts are a validation-class outcome, not a server fault);
/// not-found is reported distinctly as 404. Storage and file-system
/// failures never leak details to the client.
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "Validation failed")]
    Validation(FieldErrors),

    #[display(fmt = "{} not found", _0)]
    NotFound(&'static str),

    #[display(fmt = "{}", _0)]
    Conflict(String),

    #[display(fmt = "database error")]
    Database(sqlx::Error),

    #[display(fmt = "i/o error")]
    Io(std::io::Error),
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.kind() {
                ErrorKind::UniqueViolation => {
                    return ApiError::Conflict("Duplicate identifier".to_string());
                }
                ErrorKind::ForeignKeyViolation => {
                    return ApiError::Conflict(
                        "Record is referenced by dependent records".to_string(),
                    );
                }
                _ => {}
            }
        }
        ApiError::Database(err)
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Io(err)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Validation(errors) => HttpResponse::UnprocessableEntity().json(json!({
                "status": "error",
                "message": "Validation failed",
                "errors": errors,
            })),
            ApiError::NotFound(what) => HttpResponse::NotFound().json(json!({
                "status": "error",
                "message": format!("{what} not found"),
            })),
            ApiError::Conflict(message) => HttpResponse::UnprocessableEntity().json(json!({
                "status": "error",
                "message": message,
            })),
            ApiError::Database(e) => {
                error!(error = %e, "Database failure");
                HttpResponse::InternalServerError().json(json!({
                    "status": "error",
                    "message": "Internal Server Error",
                }))
            }
            ApiError::Io(e) => {
                error!(error = %e, "File system failure");
                HttpResponse::InternalServerError().json(json!({
                    "status": "error",
                    "message": "Internal Server Error",
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_displays_subject() {
        let error = ApiError::NotFound("Employee");
        assert_eq!(error.to_string(), "Employee not found");
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_and_conflict_are_unprocessable() {
        let validation = ApiError::Validation(FieldErrors::single("name", "name is required"));
        assert_eq!(validation.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let conflict = ApiError::Conflict("Duplicate identifier".to_string());
        assert_eq!(conflict.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(conflict.to_string(), "Duplicate identifier");
    }

    #[test]
    fn field_errors_accumulate_per_field() {
        let mut errors = FieldErrors::default();
        errors.add("base_salary", "base_salary is required");
        errors.add("name", "name is required");
        errors.add("name", "name must not exceed 255 characters");

        assert_eq!(errors.get("name").map(Vec::len), Some(2));
        assert_eq!(errors.get("base_salary").map(Vec::len), Some(1));
        assert!(errors.get("job_title").is_none());
    }

    #[test]
    fn field_errors_serialize_as_field_map() {
        let errors = FieldErrors::single("employee_id", "employee_id is invalid");
        let value = serde_json::to_value(&errors).unwrap();
        assert_eq!(value["employee_id"][0], "employee_id is invalid");
    }

    #[test]
    fn empty_field_errors_resolve_ok() {
        assert!(FieldErrors::default().into_result().is_ok());
        assert!(
            FieldErrors::single("date", "date is required")
                .into_result()
                .is_err()
        );
    }

    #[test]
    fn plain_sqlx_errors_stay_internal() {
        let error = ApiError::from(sqlx::Error::RowNotFound);
        assert!(matches!(error, ApiError::Database(_)));
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
