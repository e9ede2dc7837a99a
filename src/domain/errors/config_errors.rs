/// Errors raised while validating application configuration
///
/// Raised before any network client is built; never caught internally, so a
/// misconfigured deployment fails at startup rather than at first use.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// One or more required environment variables are absent.
    /// Collects every missing key, not just the first one found.
    MissingKeys(Vec<String>),

    /// A variable is present but its value is not usable
    Invalid {
        key: String,
        value: String,
        expected: String,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingKeys(keys) => {
                write!(
                    f,
                    "Missing required environment variables: {}",
                    keys.join(", ")
                )
            }
            ConfigError::Invalid {
                key,
                value,
                expected,
            } => {
                write!(
                    f,
                    "Invalid value for {}: '{}' (expected: {})",
                    key, value, expected
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}
