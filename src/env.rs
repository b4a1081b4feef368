//! Environment variable abstraction for testability.
//!
//! Production code reads through [`Env::real()`]; tests pass an
//! [`Env::mock()`] so configuration and branch detection can be exercised
//! without mutating the process environment.

use std::collections::HashMap;

/// Environment variable reader.
#[derive(Clone, Debug, Default)]
pub struct Env {
    overrides: Option<HashMap<String, String>>,
}

impl Env {
    /// Read from the real process environment.
    pub fn real() -> Self {
        Self { overrides: None }
    }

    /// Read only from the given key-value pairs.
    pub fn mock(vars: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        Self {
            overrides: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Look up an environment variable by name.
    pub fn var(&self, name: &str) -> Result<String, std::env::VarError> {
        match &self.overrides {
            Some(map) => map.get(name).cloned().ok_or(std::env::VarError::NotPresent),
            None => std::env::var(name),
        }
    }

    /// First non-empty value among `names`, in order.
    pub fn first_of(&self, names: &[&str]) -> Option<String> {
        names
            .iter()
            .filter_map(|name| self.var(name).ok())
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
    }

    /// Interpret a variable as a boolean switch.
    ///
    /// Returns `None` when unset or unrecognised.
    pub fn flag(&self, name: &str) -> Option<bool> {
        let val = self.var(name).ok()?;
        match val.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => {
                tracing::warn!(variable = name, value = %val, "ignoring unrecognised boolean value");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_env_reads_cargo_manifest_dir() {
        let env = Env::real();
        assert!(env.var("CARGO_MANIFEST_DIR").is_ok());
    }

    #[test]
    fn mock_env_returns_not_present_for_missing() {
        let env = Env::mock(Vec::<(&str, &str)>::new());
        assert!(env.var("NONEXISTENT").is_err());
    }

    #[test]
    fn first_of_skips_blank_values() {
        let env = Env::mock([("A", "  "), ("B", "value")]);
        assert_eq!(env.first_of(&["A", "B"]), Some("value".to_string()));
        assert_eq!(env.first_of(&["C"]), None);
    }

    #[test]
    fn flag_parses_common_spellings() {
        let env = Env::mock([("ON", "Yes"), ("OFF", "0"), ("BAD", "maybe")]);
        assert_eq!(env.flag("ON"), Some(true));
        assert_eq!(env.flag("OFF"), Some(false));
        assert_eq!(env.flag("BAD"), None);
        assert_eq!(env.flag("MISSING"), None);
    }
}
