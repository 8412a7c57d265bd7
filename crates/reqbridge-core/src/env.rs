//! Environment variable utilities.
//!
//! Generic `env_get<T>` for parsing environment variables with defaults.

use std::str::FromStr;

/// Get environment variable parsed as type T, or return the default.
///
/// Works with any type that implements `FromStr`; unset or unparsable
/// values fall back to the default.
#[inline]
pub fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Get environment variable as boolean.
///
/// Accepts "1", "true", "yes", "on" (case-insensitive) as true; any other
/// set value is false, unset returns the default.
#[inline]
pub fn env_get_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => matches!(val.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_get_default() {
        let v: usize = env_get("RQB_TEST_UNSET_VAR", 7);
        assert_eq!(v, 7);
    }

    #[test]
    fn test_env_get_parsed() {
        std::env::set_var("RQB_TEST_COUNT", "42");
        let v: usize = env_get("RQB_TEST_COUNT", 0);
        assert_eq!(v, 42);
        std::env::remove_var("RQB_TEST_COUNT");
    }

    #[test]
    fn test_env_get_bool() {
        std::env::set_var("RQB_TEST_FLAG", "yes");
        assert!(env_get_bool("RQB_TEST_FLAG", false));
        std::env::set_var("RQB_TEST_FLAG", "0");
        assert!(!env_get_bool("RQB_TEST_FLAG", true));
        std::env::remove_var("RQB_TEST_FLAG");
        assert!(env_get_bool("RQB_TEST_FLAG", true));
    }
}
