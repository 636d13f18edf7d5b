//! `${VAR}` references in config values.

use std::borrow::Cow;

use crate::ConfigError;

/// Unset variable named in a `${VAR}` reference.
struct Unset(String);

/// Replace `${VAR}` and `${VAR:-default}` in `value`.
///
/// Values without `${` are returned as-is, so a literal `$` is safe.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let lookup = |name: &str| match std::env::var(name) {
        Ok(found) => Ok(Some(found)),
        Err(_) => Err(Unset(name.to_owned())),
    };

    shellexpand::env_with_context(value, lookup)
        .map(Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("variable {} is not set", e.cause.0),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_variable() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("XSERVE_TEST_SIMPLE", "/srv/sites");
        }
        assert_eq!(
            expand_env("${XSERVE_TEST_SIMPLE}/u", "site.output_dir").unwrap(),
            "/srv/sites/u"
        );
        unsafe {
            std::env::remove_var("XSERVE_TEST_SIMPLE");
        }
    }

    #[test]
    fn test_default_when_unset() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("XSERVE_TEST_UNSET");
        }
        assert_eq!(
            expand_env("${XSERVE_TEST_UNSET:-data/sites}", "site.output_dir").unwrap(),
            "data/sites"
        );
    }

    #[test]
    fn test_unset_without_default() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("XSERVE_TEST_MISSING");
        }
        let err = expand_env("${XSERVE_TEST_MISSING}/sites", "site.output_dir").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("XSERVE_TEST_MISSING"));
        assert!(message.contains("site.output_dir"));
    }

    #[test]
    fn test_plain_values_untouched() {
        assert_eq!(expand_env("data/sites", "f").unwrap(), "data/sites");
        assert_eq!(expand_env("$HOME/sites", "f").unwrap(), "$HOME/sites");
    }
}
