//! Error types shared by the remote interfaces and the service wrappers.
//!
//! Backend failures arrive as tags (`{"err": {"NotFound": null}}`) and decode straight
//! into [`UserError`], [`ChamaError`] or [`TransactionError`], whose `Display` is the
//! sentence shown to the user. Transport failures carry diagnostic detail for the logs
//! and a fixed user-facing sentence from [`TransportError::user_message`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum UserError {
    #[error("User profile not found. Please try logging in again.")]
    NotFound,
    #[error(
        "This email address is already registered. Please use a different email or try logging in."
    )]
    AlreadyExists,
    #[error("You are not authorized to perform this action. Please log in again.")]
    NotAuthorized,
    #[error("The information provided is invalid. Please check your details and try again.")]
    InvalidData,
    #[error("Account verification is required before proceeding.")]
    VerificationRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ChamaError {
    #[error("Chama not found")]
    NotFound,
    #[error("Chama already exists")]
    AlreadyExists,
    #[error("Not authorized to perform this action")]
    NotAuthorized,
    #[error("Invalid data provided")]
    InvalidData,
    #[error("Maximum members limit reached")]
    MaxMembersReached,
    #[error("Insufficient funds")]
    InsufficientFunds,
    #[error("Chama is not active")]
    NotActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum TransactionError {
    #[error("Transaction not found")]
    NotFound,
    #[error("Invalid amount specified")]
    InvalidAmount,
    #[error("Insufficient funds")]
    InsufficientFunds,
    #[error("Not authorized to perform this action")]
    NotAuthorized,
    #[error("Duplicate transaction detected")]
    DuplicateTransaction,
    #[error("Transaction processing failed")]
    ProcessingFailed,
}

/// Failure to complete a call at all, independent of what the backend would have said.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("network request failed: {0}")]
    Network(String),
    #[error("delegation rejected: {0}")]
    Certificate(String),
    #[error("canister rejected the call ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("could not decode reply: {0}")]
    Decode(String),
    #[error("client misconfigured: {0}")]
    Config(String),
}

impl TransportError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network(_) => {
                "Network connection failed. Please check your internet connection and try again."
            }
            Self::Certificate(_) => "Authentication session expired. Please log in again.",
            Self::Rejected { .. } => {
                "Service temporarily unavailable. Please try again in a few moments."
            }
            Self::Decode(_) | Self::Config(_) => "An unexpected error occurred",
        }
    }
}

impl From<store::ConfigError> for TransportError {
    fn from(e: store::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

/// Outcome of a result-returning remote method that did not succeed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CallError<E> {
    #[error("{0}")]
    Backend(E),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// What a view sees when a service call fails. `Display` is always a finished sentence.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    User(#[from] UserError),
    #[error("{0}")]
    Chama(#[from] ChamaError),
    #[error("{0}")]
    Transaction(#[from] TransactionError),
    #[error("{}", .0.user_message())]
    Transport(#[from] TransportError),
    /// A fixed message for calls whose page shows a generic retry banner.
    #[error("{0}")]
    Failed(&'static str),
}

impl<E: Into<ServiceError>> From<CallError<E>> for ServiceError {
    fn from(e: CallError<E>) -> Self {
        match e {
            CallError::Backend(tag) => tag.into(),
            CallError::Transport(t) => Self::Transport(t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_decode_from_variant_records() {
        let e: ChamaError = serde_json::from_str(r#"{"MaxMembersReached":null}"#).unwrap();
        assert_eq!(e, ChamaError::MaxMembersReached);
        let e: TransactionError = serde_json::from_str(r#""DuplicateTransaction""#).unwrap();
        assert_eq!(e.to_string(), "Duplicate transaction detected");
    }

    #[test]
    fn test_service_error_messages() {
        let e: ServiceError = CallError::Backend(ChamaError::NotActive).into();
        assert_eq!(e.to_string(), "Chama is not active");

        let e: ServiceError = CallError::<UserError>::Transport(TransportError::Certificate(
            "bad signature".into(),
        ))
        .into();
        assert_eq!(e.to_string(), "Authentication session expired. Please log in again.");

        let e: ServiceError = TransportError::Decode("eof".into()).into();
        assert_eq!(e.to_string(), "An unexpected error occurred");
    }
}
