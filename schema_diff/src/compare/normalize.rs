//! Definition text normalization
//!
//! Catalogs and schema files format the same definition differently, so
//! definitional bodies are normalized before comparison: lowercase, runs of
//! whitespace collapsed to single spaces, trailing semicolons stripped.

/// Normalize a definition body for comparison
pub fn normalize(text: &str) -> String {
    let collapsed = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    collapsed.trim_end_matches(';').trim().to_string()
}

/// Whether two definition bodies are equal after normalization
pub fn normalized_eq(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// The base type of a SQL type string: `varchar(50)` becomes `varchar`
pub fn base_type(data_type: &str) -> String {
    let lower = data_type.trim().to_lowercase();
    match lower.find('(') {
        Some(pos) => lower[..pos].trim().to_string(),
        None => lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("SELECT  id\n  FROM users;", "select id from users")]
    #[case("select id from users", "select id from users")]
    #[case("  SELECT 1;  ", "select 1")]
    #[case("a   b\t\nc", "a b c")]
    fn normalization_collapses_formatting(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), expected);
    }

    #[test]
    fn formatting_only_changes_compare_equal() {
        assert!(normalized_eq(
            "SELECT id, name FROM users WHERE active;",
            "select id,\n       name\nfrom users\nwhere active"
        ));
        assert!(!normalized_eq("select id from users", "select id from people"));
    }

    #[rstest]
    #[case("varchar(50)", "varchar")]
    #[case("VARCHAR(20)", "varchar")]
    #[case("numeric(10, 2)", "numeric")]
    #[case("text", "text")]
    #[case("timestamp with time zone", "timestamp with time zone")]
    fn base_type_strips_size(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(base_type(input), expected);
    }
}
