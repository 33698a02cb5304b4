use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Scanned text does not start with an admissible ticket prefix.
    ///
    /// The message embeds the literal rejected text and is shown to the
    /// person at the gate as-is.
    #[error("{0} is not permitted")]
    Rejected(String),

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid pin identifier: {0}")]
    InvalidPin(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_display_embeds_text() {
        let error = Error::Rejected("XX_123".to_string());
        assert_eq!(error.to_string(), "XX_123 is not permitted");
    }

    #[test]
    fn test_config_error_display() {
        let error = Error::config("signal_duration_ms must be at least 1");
        assert_eq!(
            error.to_string(),
            "Configuration error: signal_duration_ms must be at least 1"
        );
    }
}
