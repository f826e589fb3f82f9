use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum AppError {
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} failed: {message}")]
    ExternalCommand { command: String, message: String },

    #[error("failed to read VM inventory: {message}")]
    Inventory { message: String },
}

/// Why a single VM contributed no addresses. Never aborts the whole run.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("{name}({id}) not running")]
    NotRunning { name: String, id: String },

    #[error("{os} is not supported")]
    UnsupportedOs { os: String },

    #[error("no command to get ip address on {name}")]
    NoListingCommand { name: String },

    #[error(transparent)]
    Command(#[from] AppError),
}

/// Ends an interactive session without a value.
#[derive(Debug, Error)]
pub enum UiError {
    #[error("terminal unavailable: {0}")]
    Surface(#[source] std::io::Error),

    #[error("cancelled")]
    Cancelled,

    #[error("interrupted")]
    Interrupted,

    #[error("nothing to select")]
    NothingToSelect,
}
