use duckdb::Connection;

/// How many rows of each table are shown to the model as sample data.
const SAMPLE_ROWS: usize = 3;

/// Builds the textual schema description that gets substituted into the
/// prompt template: one section per table with a column listing and a few
/// sample rows. The output is treated as an opaque blob downstream.
pub fn describe_schema(conn: &Connection) -> Result<String, duckdb::Error> {
    let mut description = String::from("# DATABASE SCHEMA\n\n");

    let tables = list_tables(conn)?;
    if tables.is_empty() {
        description.push_str("No tables found in this database.\n");
        return Ok(description);
    }

    for table_name in &tables {
        description.push_str(&format!("## Table: {}\n\n", table_name));
        describe_columns(conn, table_name, &mut description)?;
        describe_sample_rows(conn, table_name, &mut description)?;
    }

    Ok(description)
}

/// Lists user tables. `sqlite_master` is the most reliable catalog for
/// DuckDB files; fall back to `information_schema` when it is unavailable.
pub fn list_tables(conn: &Connection) -> Result<Vec<String>, duckdb::Error> {
    let primary = "SELECT name FROM sqlite_master WHERE type='table' \
                   AND name NOT LIKE 'sqlite_%' AND name NOT LIKE 'duck_%' AND name NOT LIKE 'pg_%'";
    let fallback = "SELECT table_name FROM information_schema.tables WHERE table_schema = 'main'";

    let mut stmt = match conn.prepare(primary) {
        Ok(stmt) => stmt,
        Err(_) => conn.prepare(fallback)?,
    };

    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    Ok(rows.filter_map(Result::ok).collect())
}

fn describe_columns(
    conn: &Connection,
    table_name: &str,
    out: &mut String,
) -> Result<(), duckdb::Error> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info(\"{}\")", table_name))?;
    let columns: Vec<(String, String, bool)> = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(1)?,  // name
                row.get::<_, String>(2)?,  // type
                row.get::<_, i32>(3)? == 0, // notnull (0 = nullable)
            ))
        })?
        .filter_map(Result::ok)
        .collect();

    if columns.is_empty() {
        out.push_str("Table has no columns.\n\n");
        return Ok(());
    }

    out.push_str("| Column Name | Data Type | Nullable |\n");
    out.push_str("|------------|-----------|----------|\n");
    for (name, data_type, nullable) in columns {
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            name,
            data_type,
            if nullable { "YES" } else { "NO" }
        ));
    }
    out.push('\n');

    Ok(())
}

fn describe_sample_rows(
    conn: &Connection,
    table_name: &str,
    out: &mut String,
) -> Result<(), duckdb::Error> {
    let mut stmt = conn.prepare(&format!(
        "SELECT * FROM \"{}\" LIMIT {}",
        table_name, SAMPLE_ROWS
    ))?;

    let column_count = stmt.column_count();
    let mut column_names = Vec::new();
    for i in 0..column_count {
        if let Ok(name) = stmt.column_name(i) {
            column_names.push(name.to_string());
        }
    }

    out.push_str("### Sample Data:\n\n");
    out.push_str("| ");
    for name in &column_names {
        out.push_str(&format!("{} | ", name));
    }
    out.push_str("\n| ");
    for _ in 0..column_names.len() {
        out.push_str("--- | ");
    }
    out.push('\n');

    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        out.push_str("| ");
        for i in 0..column_count {
            let value = match row.get_ref(i) {
                Ok(value_ref) => render_value(value_ref),
                Err(_) => "?".to_string(),
            };
            out.push_str(&format!("{} | ", value));
        }
        out.push('\n');
    }
    out.push('\n');

    Ok(())
}

fn render_value(value: duckdb::types::ValueRef<'_>) -> String {
    use duckdb::types::ValueRef;

    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Boolean(b) => b.to_string(),
        ValueRef::TinyInt(i) => i.to_string(),
        ValueRef::SmallInt(i) => i.to_string(),
        ValueRef::Int(i) => i.to_string(),
        ValueRef::BigInt(i) => i.to_string(),
        ValueRef::HugeInt(i) => i.to_string(),
        ValueRef::UTinyInt(i) => i.to_string(),
        ValueRef::USmallInt(i) => i.to_string(),
        ValueRef::UInt(i) => i.to_string(),
        ValueRef::UBigInt(i) => i.to_string(),
        ValueRef::Float(f) => f.to_string(),
        ValueRef::Double(f) => f.to_string(),
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).to_string(),
        _ => "?".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_connection() -> Connection {
        let conn = Connection::open_in_memory().expect("open in-memory db");
        conn.execute_batch(
            "CREATE TABLE cities (name VARCHAR NOT NULL, population BIGINT);
             INSERT INTO cities VALUES ('Lyon', 522969), ('Nantes', 320732);",
        )
        .expect("seed table");
        conn
    }

    #[test]
    fn schema_description_lists_tables_and_columns() {
        let conn = seeded_connection();
        let description = describe_schema(&conn).expect("describe");

        assert!(description.contains("## Table: cities"));
        assert!(description.contains("| name |"));
        assert!(description.contains("| population |"));
        assert!(description.contains("Lyon"));
    }

    #[test]
    fn empty_database_reports_no_tables() {
        let conn = Connection::open_in_memory().expect("open in-memory db");
        let description = describe_schema(&conn).expect("describe");
        assert!(description.contains("No tables found"));
    }
}
