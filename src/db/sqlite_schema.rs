pub const SQLITE_SCHEMA_SQL: &str = include_str!("../../sql/sqlite_schema.sql");

pub const SCHEMA_VERSION: &str = "1.0.0";

pub fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut prev = '\0';

    for ch in sql.chars() {
        match ch {
            '\'' if !in_double_quote && prev != '\\' => {
                in_single_quote = !in_single_quote;
            }
            '"' if !in_single_quote => {
                in_double_quote = !in_double_quote;
            }
            ';' if !in_single_quote && !in_double_quote => {
                let stmt = current.trim();
                if !stmt.is_empty() {
                    statements.push(stmt.to_string());
                }
                current.clear();
                prev = ch;
                continue;
            }
            _ => {}
        }

        current.push(ch);
        prev = ch;
    }

    let tail = current.trim();
    if !tail.is_empty() {
        statements.push(tail.to_string());
    }

    statements
}

/// Drops `--` comment lines so a statement preceded only by comments is
/// recognised as empty.
pub fn strip_comment_lines(stmt: &str) -> String {
    stmt.lines()
        .filter(|line| !line.trim().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_semicolons_outside_quotes() {
        let sql = "CREATE TABLE \"a;b\" (x TEXT); INSERT INTO t VALUES ('1;2');";
        let statements = split_sql_statements(sql);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].contains("\"a;b\""));
        assert!(statements[1].contains("'1;2'"));
    }

    #[test]
    fn schema_declares_core_tables() {
        let statements = split_sql_statements(SQLITE_SCHEMA_SQL);
        for table in ["vocabulary", "word_progress", "quiz_results", "pending_quizzes", "users"] {
            assert!(
                statements
                    .iter()
                    .any(|s| s.contains(&format!("CREATE TABLE IF NOT EXISTS \"{table}\""))),
                "missing table {table}"
            );
        }
    }

    #[test]
    fn comment_only_statement_becomes_empty() {
        assert!(strip_comment_lines("-- just a note\n  -- another").trim().is_empty());
    }
}
