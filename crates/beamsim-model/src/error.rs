//! Errors raised by device constructors.

/// Errors a device constructor can return while validating its arguments.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeviceError {
    #[error("{class}: missing required parameter '{param}'")]
    MissingParam { class: String, param: String },

    #[error("{class}: invalid value for '{param}': {reason}")]
    InvalidParam {
        class: String,
        param: String,
        reason: String,
    },

    #[error("{class}: unknown parameter '{param}'")]
    UnknownParam { class: String, param: String },

    #[error("{class}: requires a parent device")]
    MissingParent { class: String },
}

impl DeviceError {
    /// Create an INVALID_PARAM error.
    pub fn invalid(class: &str, param: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParam {
            class: class.to_string(),
            param: param.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a MISSING_PARAM error.
    pub fn missing(class: &str, param: &str) -> Self {
        Self::MissingParam {
            class: class.to_string(),
            param: param.to_string(),
        }
    }
}
