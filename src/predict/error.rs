//! Forward Errors

/// Result type for forward calls.
pub type ForwardResult<T> = Result<T, ForwardError>;

/// Errors that can occur while running a forward pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardError {
    /// A signature string could not be parsed.
    InvalidSignature {
        signature: String,
        reason: String,
    },
    /// A required input field was not supplied.
    MissingInput(String),
    /// The model reply lacked a declared output field.
    MissingOutput(String),
    /// The model backend failed.
    Model(String),
}

impl std::fmt::Display for ForwardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForwardError::InvalidSignature { signature, reason } => {
                write!(f, "Invalid signature '{}': {}", signature, reason)
            }
            ForwardError::MissingInput(field) => write!(f, "Missing input field '{}'", field),
            ForwardError::MissingOutput(field) => write!(f, "Model reply lacks output field '{}'", field),
            ForwardError::Model(msg) => write!(f, "Model error: {}", msg),
        }
    }
}

impl std::error::Error for ForwardError {}
