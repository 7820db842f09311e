use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqliteConnection;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug)]
pub enum SqlValue {
    String(String),
    I64(i64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Null,
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
///
/// Columns come from the validation layer, never from raw client JSON, so
/// the SET clause is always a whitelisted set. Callers skip the call for
/// an empty patch.
pub fn build_update_sql(
    table: &str,
    columns: Vec<(&'static str, SqlValue)>,
    id_column: &str,
    id_value: &str,
) -> SqlUpdate {
    let set_clause = columns
        .iter()
        .map(|(column, _)| format!("{column} = ?"))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {table} SET {set_clause} WHERE {id_column} = ?");

    let mut values: Vec<SqlValue> = columns.into_iter().map(|(_, value)| value).collect();
    values.push(SqlValue::String(id_value.to_string()));

    SqlUpdate { sql, values }
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(
    conn: &mut SqliteConnection,
    update: SqlUpdate,
) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(&mut *conn).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_sql_lists_columns_in_order() {
        let update = build_update_sql(
            "employees",
            vec![
                ("name", SqlValue::String("Jane".to_string())),
                ("base_salary", SqlValue::I64(6_000_000)),
            ],
            "id",
            "KRY-001",
        );

        assert_eq!(
            update.sql,
            "UPDATE employees SET name = ?, base_salary = ? WHERE id = ?"
        );
        assert_eq!(update.values.len(), 3);
        match update.values.last().unwrap() {
            SqlValue::String(id) => assert_eq!(id, "KRY-001"),
            other => panic!("id bound as {other:?}"),
        }
    }

    #[test]
    fn single_column_update_has_no_trailing_comma() {
        let update = build_update_sql(
            "payments",
            vec![("method", SqlValue::String("qris".to_string()))],
            "id",
            "PMB-002",
        );
        assert_eq!(update.sql, "UPDATE payments SET method = ? WHERE id = ?");
    }
}
