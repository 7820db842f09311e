use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": "ABS-001",
        "employee_id": "KRY-001",
        "date": "2026-01-05",
        "present": true
    })
)]
pub struct Attendance {
    #[schema(example = "ABS-001")]
    pub id: String,

    #[schema(example = "KRY-001")]
    pub employee_id: String,

    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,

    pub present: bool,
}
