use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

// Foreign keys exist only on payroll_entries; employee and payment
// relations are enforced at the validation layer so that soft-deleted
// payment rows can outlive their employee.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS employees (
        id          TEXT PRIMARY KEY,
        name        TEXT NOT NULL,
        job_title   TEXT NOT NULL,
        base_salary INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS attendance (
        id          TEXT PRIMARY KEY,
        employee_id TEXT NOT NULL,
        date        TEXT NOT NULL,
        present     INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS payments (
        id           TEXT PRIMARY KEY,
        employee_id  TEXT NOT NULL,
        paid_at      TEXT NOT NULL,
        method       TEXT NOT NULL,
        receipt_path TEXT,
        created_at   TEXT NOT NULL,
        updated_at   TEXT NOT NULL,
        deleted_at   TEXT
    )",
    "CREATE TABLE IF NOT EXISTS payroll_entries (
        id            TEXT PRIMARY KEY,
        attendance_id TEXT NOT NULL REFERENCES attendance(id),
        payment_id    TEXT NOT NULL REFERENCES payments(id),
        amount        INTEGER NOT NULL,
        date          TEXT NOT NULL
    )",
];

pub async fn init_db(database_url: &str) -> SqlitePool {
    let options = SqliteConnectOptions::from_str(database_url)
        .expect("DATABASE_URL must be a valid sqlite URL")
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .expect("Failed to connect to database");

    ensure_schema(&pool)
        .await
        .expect("Failed to prepare database schema");

    pool
}

/// Idempotent schema bootstrap so a fresh database file (or an in-memory
/// test database) is immediately usable.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
