use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    /// Matches `${VAR}` and `$VAR`
    static ref ENV_VAR_PATTERN: Regex =
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)").unwrap();
}

/// Expand Unix-style environment variables (`$VAR` and `${VAR}`).
///
/// Variables that are not set are left in place so a later validation step
/// reports them instead of silently producing an empty credential.
pub fn expand_env_vars(value: &str) -> String {
    ENV_VAR_PATTERN
        .replace_all(value, |caps: &Captures| {
            let name = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str()).unwrap_or_default();
            std::env::var(name).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

/// Read a non-empty environment variable
pub fn env_override(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// True if the value still holds an unexpanded variable reference
pub fn has_unresolved_vars(value: &str) -> bool {
    ENV_VAR_PATTERN.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_braced_and_bare() {
        std::env::set_var("UFILE_TEST_EXPAND_A", "alpha");
        std::env::set_var("UFILE_TEST_EXPAND_B", "beta");

        assert_eq!(expand_env_vars("${UFILE_TEST_EXPAND_A}"), "alpha");
        assert_eq!(expand_env_vars("$UFILE_TEST_EXPAND_B/suffix"), "beta/suffix");
        assert_eq!(
            expand_env_vars("pre-${UFILE_TEST_EXPAND_A}-$UFILE_TEST_EXPAND_B"),
            "pre-alpha-beta"
        );
    }

    #[test]
    fn test_unset_variables_are_kept() {
        std::env::remove_var("UFILE_TEST_NOT_SET");
        assert_eq!(expand_env_vars("${UFILE_TEST_NOT_SET}"), "${UFILE_TEST_NOT_SET}");
        assert_eq!(expand_env_vars("$UFILE_TEST_NOT_SET"), "$UFILE_TEST_NOT_SET");
        assert!(has_unresolved_vars("${UFILE_TEST_NOT_SET}"));
    }

    #[test]
    fn test_plain_values_untouched() {
        assert_eq!(expand_env_vars("my-bucket"), "my-bucket");
        assert_eq!(expand_env_vars("cost $5"), "cost $5");
        assert!(!has_unresolved_vars("my-bucket"));
    }

    #[test]
    fn test_env_override_ignores_blank() {
        std::env::set_var("UFILE_TEST_BLANK", "  ");
        assert_eq!(env_override("UFILE_TEST_BLANK"), None);
        std::env::set_var("UFILE_TEST_SET", "value");
        assert_eq!(env_override("UFILE_TEST_SET"), Some("value".to_string()));
    }
}
