use thiserror::Error;

/// Why a submitted link was refused before any request was made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("No link supplied")]
    Empty,

    #[error("Not a recognized link")]
    Unrecognized,
}

/// Operation a backend failure belongs to, used to pick the fallback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Resolve,
    Download,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error(transparent)]
    InvalidLink(#[from] LinkError),

    #[error("Connection failure, check your network and try again")]
    Connection,

    /// Backend reported a failure. `message` is shown verbatim when present.
    #[error("{}", backend_message(.operation, .message))]
    Backend {
        operation: Operation,
        message: Option<String>,
    },
}

fn backend_message(operation: &Operation, message: &Option<String>) -> String {
    match message {
        Some(message) => message.clone(),
        None => match operation {
            Operation::Resolve => "Could not retrieve file information".to_string(),
            Operation::Download => "Download failed".to_string(),
        },
    }
}

impl AppError {
    /// Converts a client failure into the message-carrying form the workflow shows.
    pub fn from_api(operation: Operation, error: &crate::api::ApiError) -> Self {
        use crate::api::ApiError;

        match error {
            ApiError::Connection(_) | ApiError::Setup(_) => AppError::Connection,
            ApiError::Backend { message, .. } => AppError::Backend {
                operation,
                message: message.clone(),
            },
            ApiError::InvalidResponse(_) | ApiError::MissingFileInfo => AppError::Backend {
                operation,
                message: None,
            },
        }
    }
}
