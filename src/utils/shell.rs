// sqltool/src/utils/shell.rs
use std::collections::BTreeMap;

/// Quotes a value for POSIX shells. Values without shell metacharacters pass through.
pub fn escape_arg(value: &str) -> String {
    shell_words::quote(value).into_owned()
}

/// Turns `{key: value}` pairs into `--key=value` options. Only values are escaped.
pub fn params_to_options(parameters: &BTreeMap<String, String>) -> String {
    parameters
        .iter()
        .map(|(key, value)| format!("--{}={}", key, escape_arg(value)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Joins command fragments with single spaces, skipping empty ones.
pub fn join_fragments<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts
        .into_iter()
        .filter_map(|p| {
            let p = p.as_ref().trim();
            (!p.is_empty()).then(|| p.to_string())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_arg() {
        assert_eq!(escape_arg("/tmp/dump.sql"), "/tmp/dump.sql");
        assert_eq!(escape_arg("/tmp/out put.sql"), "'/tmp/out put.sql'");
        assert_eq!(escape_arg("it's"), r"'it'\''s'");
        assert_eq!(escape_arg(""), "''");
    }

    #[test]
    fn test_params_to_options() {
        let params: BTreeMap<String, String> = [
            ("user".to_string(), "admin".to_string()),
            ("host".to_string(), "db local".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(params_to_options(&params), "--host='db local' --user=admin");
        assert_eq!(params_to_options(&BTreeMap::new()), "");
    }

    #[test]
    fn test_join_fragments_skips_empty() {
        assert_eq!(join_fragments(["psql", "", "  ", "-q", "<", "'f'"]), "psql -q < 'f'");
    }
}
