use duckdb::types::ValueRef;
use duckdb::Connection;
use serde::Serialize;
use std::time::Instant;

/// A result set as the UI consumes it: column names in statement order and
/// rows of JSON cells. No typing is imposed beyond what the driver returns.
#[derive(Debug, Serialize)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
    pub row_count: usize,
    pub execution_time_ms: u64,
}

/// Runs a SQL string against a fresh connection and collects the result.
///
/// Every submission opens its own connection; nothing is pooled or reused
/// across queries on this path. Callers are expected to run this inside a
/// blocking task.
pub fn execute(connection_string: &str, sql: &str) -> Result<QueryOutput, duckdb::Error> {
    let conn = Connection::open(connection_string)?;
    execute_on(&conn, sql)
}

pub fn execute_on(conn: &Connection, sql: &str) -> Result<QueryOutput, duckdb::Error> {
    let start_time = Instant::now();

    let mut stmt = conn.prepare(sql)?;

    let column_count = stmt.column_count();
    let mut columns = Vec::with_capacity(column_count);
    for i in 0..column_count {
        match stmt.column_name(i) {
            Ok(name) => columns.push(name.to_string()),
            Err(_) => columns.push(format!("column_{}", i)),
        }
    }

    let mut collected = Vec::new();
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(column_count);
        for i in 0..column_count {
            let cell = match row.get_ref(i) {
                Ok(value_ref) => value_to_json(value_ref),
                Err(_) => serde_json::Value::Null,
            };
            cells.push(cell);
        }
        collected.push(cells);
    }

    let row_count = collected.len();
    Ok(QueryOutput {
        columns,
        rows: collected,
        row_count,
        execution_time_ms: start_time.elapsed().as_millis() as u64,
    })
}

/// Maps a DuckDB cell to JSON. Scalars map directly; anything exotic
/// (intervals, nested types) degrades to its textual form.
fn value_to_json(value: ValueRef<'_>) -> serde_json::Value {
    use serde_json::Value;

    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(i) => Value::from(i),
        ValueRef::SmallInt(i) => Value::from(i),
        ValueRef::Int(i) => Value::from(i),
        ValueRef::BigInt(i) => Value::from(i),
        ValueRef::HugeInt(i) => Value::from(i as f64),
        ValueRef::UTinyInt(i) => Value::from(i),
        ValueRef::USmallInt(i) => Value::from(i),
        ValueRef::UInt(i) => Value::from(i),
        ValueRef::UBigInt(i) => Value::from(i),
        ValueRef::Float(f) => Value::from(f),
        ValueRef::Double(f) => Value::from(f),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).to_string()),
        ValueRef::Blob(bytes) => Value::String(format!("<{} bytes>", bytes.len())),
        other => Value::String(format!("{:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_columns_and_rows() {
        let conn = Connection::open_in_memory().expect("open in-memory db");
        let output = execute_on(
            &conn,
            "SELECT 1 AS id, 'fr-FR' AS code UNION ALL SELECT 2, 'de-DE' ORDER BY id",
        )
        .expect("query");

        assert_eq!(output.columns, vec!["id", "code"]);
        assert_eq!(output.row_count, 2);
        assert_eq!(output.rows[0][0], serde_json::json!(1));
        assert_eq!(output.rows[1][1], serde_json::json!("de-DE"));
    }

    #[test]
    fn zero_row_results_are_not_errors() {
        let conn = Connection::open_in_memory().expect("open in-memory db");
        let output = execute_on(&conn, "SELECT 1 AS n WHERE 1 = 0").expect("query");
        assert_eq!(output.row_count, 0);
        assert_eq!(output.columns, vec!["n"]);
    }

    #[test]
    fn execution_errors_carry_the_driver_message() {
        let conn = Connection::open_in_memory().expect("open in-memory db");
        let err = execute_on(&conn, "SELECT * FROM no_such_table").unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn null_cells_map_to_json_null() {
        let conn = Connection::open_in_memory().expect("open in-memory db");
        let output = execute_on(&conn, "SELECT NULL AS missing").expect("query");
        assert_eq!(output.rows[0][0], serde_json::Value::Null);
    }
}
