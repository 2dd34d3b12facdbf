use regex::Regex;
use std::error::Error;
use std::fmt;
use std::sync::OnceLock;
use tracing::warn;

#[derive(Debug)]
pub enum GuardError {
    /// The statement would modify data or schema and mutations are disabled.
    Refused(String),
    /// Nothing executable was left after sanitizing.
    Empty,
}

impl fmt::Display for GuardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardError::Refused(keyword) => write!(
                f,
                "Refusing to run generated {} statement; set database.allow_mutations to permit writes",
                keyword
            ),
            GuardError::Empty => write!(f, "Generated SQL was empty"),
        }
    }
}

impl Error for GuardError {}

/// Strips the decorations LLMs wrap around SQL: markdown code fences and
/// stray backticks. The statement text itself is left untouched.
pub fn sanitize(raw: &str) -> String {
    let mut sql = raw.trim();

    if let Some(rest) = sql.strip_prefix("```sql") {
        sql = rest;
    } else if let Some(rest) = sql.strip_prefix("```") {
        sql = rest;
    }
    if let Some(rest) = sql.strip_suffix("```") {
        sql = rest;
    }

    sql.replace('`', "").trim().to_string()
}

fn leading_keyword_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\s*([a-z]+)").expect("valid keyword regex"))
}

/// Checks the leading keyword of a statement about to be executed. Read
/// statements always pass; everything else is refused unless mutations are
/// enabled, in which case the write is logged and let through.
pub fn check(sql: &str, allow_mutations: bool) -> Result<(), GuardError> {
    let keyword = match leading_keyword_re()
        .captures(sql)
        .and_then(|captures| captures.get(1))
    {
        Some(keyword) => keyword.as_str().to_uppercase(),
        None => return Err(GuardError::Empty),
    };

    match keyword.as_str() {
        "SELECT" | "WITH" | "SHOW" | "DESCRIBE" | "EXPLAIN" => Ok(()),
        _ => {
            if allow_mutations {
                warn!("Executing generated {} statement with mutations enabled", keyword);
                Ok(())
            } else {
                Err(GuardError::Refused(keyword))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_fences_and_backticks() {
        assert_eq!(
            sanitize("```sql\nSELECT * FROM users;\n```"),
            "SELECT * FROM users;"
        );
        assert_eq!(sanitize("SELECT `name` FROM t"), "SELECT name FROM t");
        assert_eq!(sanitize("  SELECT 1  "), "SELECT 1");
    }

    #[test]
    fn read_statements_pass() {
        assert!(check("SELECT * FROM orders", false).is_ok());
        assert!(check("  with t as (select 1) select * from t", false).is_ok());
        assert!(check("EXPLAIN SELECT 1", false).is_ok());
    }

    #[test]
    fn writes_are_refused_by_default() {
        let err = check("DROP TABLE orders", false).unwrap_err();
        assert!(err.to_string().contains("DROP"));
        assert!(check("DELETE FROM orders", false).is_err());
        assert!(check("insert into t values (1)", false).is_err());
    }

    #[test]
    fn writes_pass_when_mutations_are_enabled() {
        assert!(check("UPDATE t SET a = 1", true).is_ok());
    }

    #[test]
    fn empty_sql_is_rejected() {
        assert!(matches!(check("", false), Err(GuardError::Empty)));
        assert!(matches!(check("```", false), Err(GuardError::Empty)));
    }
}
