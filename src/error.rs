use thiserror::Error;

/// Top-level error joining the subsystem errors that can stop a run.
#[derive(Debug, Error)]
pub enum DriftwatchError {
    #[error(transparent)]
    State(#[from] crate::state::StateError),

    #[error(transparent)]
    Provider(#[from] crate::providers::ProviderError),

    #[error(transparent)]
    Check(#[from] crate::checker::CheckError),

    #[error(transparent)]
    Report(#[from] crate::reporter::ReportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
