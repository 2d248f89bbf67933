//! Error handling for cluster submission.

use thiserror::Error;

/// Result type for submission operations.
pub type SubmitResult<T> = Result<T, SubmitError>;

/// Errors that can occur while preparing or submitting a job.
#[derive(Error, Debug)]
pub enum SubmitError {
    /// The request is unusable before any file is written.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A path-like option value names nothing on disk.
    #[error("Path does not exist: {0}")]
    InvalidPath(String),

    /// The submission command exited with a non-zero status.
    #[error("PBS submission failed: {0}")]
    SubmitFailed(String),

    /// The submission command could not be run, or printed output
    /// that does not contain a job identifier.
    #[error("PBS command failed: {command} - {message}")]
    CommandFailed { command: String, message: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SubmitError::Config("one of module_name and job_string required".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: one of module_name and job_string required"
        );

        let err = SubmitError::InvalidPath("/no/such/file".to_string());
        assert_eq!(err.to_string(), "Path does not exist: /no/such/file");

        let err = SubmitError::CommandFailed {
            command: "qsub".to_string(),
            message: "command not found".to_string(),
        };
        assert_eq!(err.to_string(), "PBS command failed: qsub - command not found");
    }
}
