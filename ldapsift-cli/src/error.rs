//! CLI-specific error types and exit code mapping

use ldapsift_engine::EngineError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration validation failure (bad flag combination or value).
    #[error("configuration error: {0}")]
    Config(String),

    /// The log file could not be opened or followed.
    #[error("source error: {0}")]
    Source(String),

    /// IO error (stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything else that stops processing (task join, pattern compile).
    #[error("{0}")]
    Internal(String),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                |
    /// |------|------------------------|
    /// | 0    | Success                |
    /// | 1    | Internal error         |
    /// | 2    | Configuration error    |
    /// | 10   | Source / IO error      |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Source(_) | Self::Io(_) => 10,
            Self::Internal(_) => 1,
        }
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Config { .. } => Self::Config(e.to_string()),
            EngineError::Source { .. } => Self::Source(e.to_string()),
            EngineError::Io(io) => Self::Io(io),
            EngineError::Pattern(_) | EngineError::Channel(_) => Self::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_config_error() {
        let err = CliError::Config("bad poll interval".to_owned());
        assert_eq!(err.exit_code(), 2, "config error should return exit code 2");
    }

    #[test]
    fn test_exit_code_source_error() {
        let err = CliError::Source("no such file".to_owned());
        assert_eq!(err.exit_code(), 10, "source error should return exit code 10");
    }

    #[test]
    fn test_exit_code_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = CliError::Io(io_err);
        assert_eq!(err.exit_code(), 10, "io error should return exit code 10");
    }

    #[test]
    fn test_exit_code_internal_error() {
        let err = CliError::Internal("task panicked".to_owned());
        assert_eq!(err.exit_code(), 1, "internal error should return exit code 1");
    }

    #[test]
    fn test_from_engine_config_error() {
        let engine_err = EngineError::Config {
            field: "poll_interval_ms".to_owned(),
            reason: "must be 1-60000".to_owned(),
        };
        let cli_err: CliError = engine_err.into();
        match cli_err {
            CliError::Config(msg) => assert!(msg.contains("poll_interval_ms")),
            _ => panic!("expected Config error variant"),
        }
    }

    #[test]
    fn test_from_engine_source_error() {
        let engine_err = EngineError::Source {
            path: "/var/log/dirsrv/access".to_owned(),
            reason: "permission denied".to_owned(),
        };
        let cli_err: CliError = engine_err.into();
        match cli_err {
            CliError::Source(msg) => assert!(msg.contains("permission denied")),
            _ => panic!("expected Source error variant"),
        }
    }

    #[test]
    fn test_error_display_config() {
        let err = CliError::Config("invalid value".to_owned());
        let display_str = format!("{}", err);
        assert!(display_str.contains("configuration error"));
        assert!(display_str.contains("invalid value"));
    }
}
