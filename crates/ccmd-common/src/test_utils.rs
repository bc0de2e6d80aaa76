//! Test utilities and shared test helpers for the custom commands bot.
//!
//! This module provides common testing utilities and fixtures that can be
//! used across all crates in the workspace for unit and integration testing.

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Create a temporary directory for tests that automatically cleans up.
#[cfg(any(test, feature = "tempfile"))]
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Configuration-related test utilities.
pub mod config_fixtures {
    /// Create a minimal valid test configuration as YAML string.
    pub fn minimal_config_yaml() -> &'static str {
        r#"
discord:
  token: "test_token"

custom_commands:
  - name: ip
    description: "Shows the IP and port of the server"
    enabled: true
    allow_in_dm: true
"#
    }

    /// Create a full test configuration as YAML string.
    pub fn full_config_yaml() -> &'static str {
        concat!(
            "discord:\n",
            "  token: \"test_token_full\"\n",
            "  request_timeout_seconds: 5\n",
            "\n",
            "state:\n",
            "  path: \"state/registered.json\"\n",
            "\n",
            "reload:\n",
            "  watch: false\n",
            "  debounce_ms: 250\n",
            "\n",
            "logging:\n",
            "  level: \"debug\"\n",
            "  json_format: true\n",
            "\n",
            "placeholders:\n",
            "  server.address: \"10.0.0.1\"\n",
            "  server.port: \"28015\"\n",
            "\n",
            "custom_commands:\n",
            "  - name: ip\n",
            "    description: \"Shows the IP and port of the server\"\n",
            "    enabled: true\n",
            "    allow_in_dm: true\n",
            "    reply:\n",
            "      description: \"Connect to `{server.address}:{server.port}`\"\n",
            "      color: \"#43B581\"\n",
            "  - name: rules\n",
            "    description: \"Shows the server rules\"\n",
            "    enabled: true\n",
            "    allow_in_dm: false\n",
            "  - name: wipe\n",
            "    description: \"Shows the next wipe date\"\n",
            "    enabled: false\n",
            "    allow_in_dm: true\n"
        )
    }

    /// Create a configuration that declares the same command twice.
    pub fn duplicate_commands_yaml() -> &'static str {
        r#"
discord:
  token: "test_token"

custom_commands:
  - name: ip
    description: "First declaration"
    enabled: true
  - name: ip
    description: "Second declaration"
    enabled: true
"#
    }
}

/// Property-based testing utilities using proptest.
#[cfg(any(test, feature = "proptest"))]
pub mod property_testing {
    use proptest::prelude::*;

    /// Strategy for generating valid chat input command names.
    pub fn command_name_strategy() -> impl Strategy<Value = String> {
        r"[a-z][a-z0-9_-]{0,11}".prop_map(|s| s.to_string())
    }

    /// Strategy for generating small sets of distinct command names.
    pub fn command_names_strategy(max: usize) -> impl Strategy<Value = Vec<String>> {
        proptest::collection::btree_set(command_name_strategy(), 0..=max)
            .prop_map(|names| names.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::is_valid_command_name;
    use proptest::prelude::*;

    #[test]
    fn test_init_logging_multiple_calls() {
        // Should not panic when called multiple times
        init_test_logging();
        init_test_logging();
        init_test_logging();
    }

    #[test]
    fn test_create_temp_dir() {
        let dir = create_temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_fixtures_are_valid_yaml() {
        for fixture in [
            config_fixtures::minimal_config_yaml(),
            config_fixtures::full_config_yaml(),
            config_fixtures::duplicate_commands_yaml(),
        ] {
            let parsed: serde_yaml::Value = serde_yaml::from_str(fixture).unwrap();
            assert!(parsed.get("custom_commands").is_some());
        }
    }

    proptest! {
        #[test]
        fn test_property_command_names_valid(name in property_testing::command_name_strategy()) {
            prop_assert!(is_valid_command_name(&name));
        }
    }
}
