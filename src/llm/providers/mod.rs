pub mod ollama;
pub mod remote;

/// Pulls the SQL statement out of a model response. Tries fenced code
/// blocks first, then falls back to scanning for a line that starts with a
/// SQL keyword and collecting through the terminating semicolon.
pub fn extract_sql(content: &str) -> String {
    // ```sql fenced block
    if let Some(start) = content.find("```sql") {
        if let Some(end) = content[start + 6..].find("```") {
            return content[start + 6..start + 6 + end].trim().to_string();
        }
    }

    // Plain ``` fenced block
    if let Some(start) = content.find("```") {
        let after_fence = &content[start + 3..];
        if let Some(end) = after_fence.find("```") {
            return after_fence[..end].trim().to_string();
        }
    }

    // Line scan for a statement outside any fence
    let sql_keywords = [
        "SELECT", "WITH", "INSERT", "UPDATE", "DELETE", "CREATE", "ALTER", "DROP",
    ];
    let lines: Vec<&str> = content.lines().collect();

    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim().to_uppercase();
        if sql_keywords.iter().any(|kw| trimmed.starts_with(kw)) {
            let mut sql = line.trim().to_string();

            for next_line in lines.iter().skip(i + 1).map(|l| l.trim()) {
                if next_line.starts_with("```") {
                    break;
                }
                sql.push(' ');
                sql.push_str(next_line);
                if next_line.ends_with(';') {
                    break;
                }
            }

            return sql;
        }
    }

    // No recognizable SQL shape; hand back the raw content verbatim
    content.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_from_sql_fence() {
        let content = "Here you go:\n```sql\nSELECT a FROM t;\n```\nEnjoy!";
        assert_eq!(extract_sql(content), "SELECT a FROM t;");
    }

    #[test]
    fn extracts_from_bare_fence() {
        let content = "```\nSELECT 1;\n```";
        assert_eq!(extract_sql(content), "SELECT 1;");
    }

    #[test]
    fn line_scan_collects_through_semicolon() {
        let content = "The query is:\nSELECT name\nFROM users\nWHERE id = 1;\nHope that helps.";
        assert_eq!(extract_sql(content), "SELECT name FROM users WHERE id = 1;");
    }

    #[test]
    fn unrecognized_content_is_returned_verbatim() {
        assert_eq!(extract_sql("no query here"), "no query here");
    }
}
