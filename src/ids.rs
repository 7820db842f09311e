use sqlx::SqliteConnection;

use crate::error::ApiError;

pub const EMPLOYEE_PREFIX: &str = "KRY";
pub const ATTENDANCE_PREFIX: &str = "ABS";
pub const PAYROLL_PREFIX: &str = "GJI";
pub const PAYMENT_PREFIX: &str = "PMB";

/// Generate the next identifier for `table` as `<prefix>-NNN`.
///
/// Scans the existing ids, takes the largest numeric suffix matching the
/// prefix and increments it; an empty table starts at `<prefix>-001`. Runs
/// on the caller's transaction so the scan and the insert it feeds see the
/// same state. The primary key constraint is the backstop against
/// duplicates; a collision surfaces as a conflict, never corrupted state.
pub async fn next_id(
    conn: &mut SqliteConnection,
    table: &str,
    prefix: &str,
) -> Result<String, ApiError> {
    let sql = format!("SELECT id FROM {table}");
    let ids: Vec<String> = sqlx::query_scalar(&sql).fetch_all(&mut *conn).await?;
    Ok(next_from(prefix, &ids))
}

fn next_from(prefix: &str, ids: &[String]) -> String {
    let max = ids
        .iter()
        .filter_map(|id| numeric_suffix(prefix, id))
        .max()
        .unwrap_or(0);
    format!("{}-{:03}", prefix, max + 1)
}

/// Numeric part of `<prefix>-NNN`, or `None` when the id does not follow
/// the scheme.
fn numeric_suffix(prefix: &str, id: &str) -> Option<u64> {
    id.strip_prefix(prefix)?.strip_prefix('-')?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_table_starts_at_001() {
        assert_eq!(next_from(EMPLOYEE_PREFIX, &[]), "KRY-001");
    }

    #[test]
    fn increments_past_the_maximum() {
        let existing = ids(&["KRY-001", "KRY-003", "KRY-002"]);
        assert_eq!(next_from(EMPLOYEE_PREFIX, &existing), "KRY-004");
    }

    #[test]
    fn padding_widens_beyond_three_digits() {
        let existing = ids(&["KRY-999"]);
        assert_eq!(next_from(EMPLOYEE_PREFIX, &existing), "KRY-1000");

        let existing = ids(&["KRY-1000"]);
        assert_eq!(next_from(EMPLOYEE_PREFIX, &existing), "KRY-1001");
    }

    #[test]
    fn foreign_and_malformed_ids_are_ignored() {
        let existing = ids(&["ABS-007", "KRY-", "KRY-abc", "legacy-9", "KRY-002"]);
        assert_eq!(next_from(EMPLOYEE_PREFIX, &existing), "KRY-003");
    }

    #[test]
    fn suffix_parsing_requires_the_separator() {
        assert_eq!(numeric_suffix("KRY", "KRY-042"), Some(42));
        assert_eq!(numeric_suffix("KRY", "KRY042"), None);
        assert_eq!(numeric_suffix("KRY", "PMB-042"), None);
    }
}
