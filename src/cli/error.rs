//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("unknown service: {0}")]
    UnknownService(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        Self::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::UnknownService(_) => crate::exitcode::NOINPUT,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Application(app) => match app {
                    ApplicationError::Domain(DomainError::NotFound(_)) => crate::exitcode::NOINPUT,
                    ApplicationError::Domain(DomainError::Validation(_))
                    | ApplicationError::Catalog { .. } => crate::exitcode::DATAERR,
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NodeId, ValidationError};

    #[test]
    fn test_exit_codes() {
        let not_found: CliError = ApplicationError::Domain(DomainError::NotFound(NodeId(9))).into();
        assert_eq!(not_found.exit_code(), crate::exitcode::NOINPUT);

        let invalid: CliError =
            ApplicationError::from(ValidationError::SelfParent(NodeId(1))).into();
        assert_eq!(invalid.exit_code(), crate::exitcode::DATAERR);

        let unknown = CliError::UnknownService("tea".into());
        assert_eq!(unknown.exit_code(), crate::exitcode::NOINPUT);
    }
}
