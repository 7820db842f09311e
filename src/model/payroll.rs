use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A computed salary amount tied to one attendance record and one payment.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": "GJI-001",
        "attendance_id": "ABS-001",
        "payment_id": "PMB-001",
        "amount": 5000000,
        "date": "2026-01-31"
    })
)]
pub struct PayrollEntry {
    #[schema(example = "GJI-001")]
    pub id: String,

    #[schema(example = "ABS-001")]
    pub attendance_id: String,

    #[schema(example = "PMB-001")]
    pub payment_id: String,

    #[schema(example = 5000000)]
    pub amount: i64,

    #[schema(example = "2026-01-31", value_type = String, format = "date")]
    pub date: NaiveDate,
}
