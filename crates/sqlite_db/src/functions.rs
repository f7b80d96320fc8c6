use rusqlite::{functions::FunctionFlags, Connection};
use sqlhist_core::histogram::width_bucket;

/// Registers the SQL functions the histogram aggregate relies on.
///
/// `width_bucket(value, min, max, count)` returns the 1-based bucket of
/// `value` over `[min, max]`, or NULL when `value` is NULL or out of range.
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "width_bucket",
        4,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<f64> = ctx.get(0)?;
            let min: f64 = ctx.get(1)?;
            let max: f64 = ctx.get(2)?;
            let count: i64 = ctx.get(3)?;
            let count = u32::try_from(count)
                .map_err(|e| rusqlite::Error::UserFunctionError(Box::new(e)))?;
            Ok(value.and_then(|v| width_bucket(v, min, max, count)))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        register_functions(&conn).unwrap();
        conn
    }

    fn bucket(conn: &Connection, sql: &str) -> Option<i64> {
        conn.query_row(sql, [], |row| row.get(0)).unwrap()
    }

    #[test]
    fn bins_values() {
        let conn = conn();
        assert_eq!(bucket(&conn, "SELECT width_bucket(1, 0, 10, 2)"), Some(1));
        assert_eq!(bucket(&conn, "SELECT width_bucket(5.0, 0, 10, 2)"), Some(2));
        assert_eq!(bucket(&conn, "SELECT width_bucket(10, 0, 10, 2)"), Some(2));
    }

    #[test]
    fn null_and_out_of_range_are_null() {
        let conn = conn();
        assert_eq!(bucket(&conn, "SELECT width_bucket(NULL, 0, 10, 2)"), None);
        assert_eq!(bucket(&conn, "SELECT width_bucket(-1, 0, 10, 2)"), None);
        assert_eq!(bucket(&conn, "SELECT width_bucket(11, 0, 10, 2)"), None);
    }

    #[test]
    fn negative_count_is_an_error() {
        let conn = conn();
        let res: rusqlite::Result<Option<i64>> =
            conn.query_row("SELECT width_bucket(1, 0, 10, -2)", [], |row| row.get(0));
        assert!(res.is_err());
    }
}
