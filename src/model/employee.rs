use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": "KRY-001",
        "name": "John",
        "job_title": "Staff",
        "base_salary": 5000000
    })
)]
pub struct Employee {
    #[schema(example = "KRY-001")]
    pub id: String,

    #[schema(example = "John")]
    pub name: String,

    #[schema(example = "Staff")]
    pub job_title: String,

    /// Monthly base salary in whole rupiah.
    #[schema(example = 5000000)]
    pub base_salary: i64,
}
