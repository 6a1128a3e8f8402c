use specify_domain::model::{AddressFormatError, FieldDetail, KeyFormatError};
use thiserror::Error;

/// Errors surfaced to integrators by [`crate::Specify::serve`]. Exactly one of
/// {resolved ad, no fill, one of these errors} comes back per call; SDK errors
/// are never wrapped in each other.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpecifyError {
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        details: Vec<FieldDetail>,
    },
    /// Any other non-success outcome. Status 0 marks failures without an HTTP
    /// status, such as connection errors or an undecodable success body.
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl SpecifyError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: Vec::new(),
        }
    }

    /// Numeric HTTP status for `Api` errors, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SpecifyError {
    fn from(value: reqwest::Error) -> Self {
        let status = value.status().map(|code| code.as_u16()).unwrap_or(0);
        Self::Api {
            status,
            message: format!("failed to fetch ad content: {value}"),
        }
    }
}

impl From<KeyFormatError> for SpecifyError {
    fn from(value: KeyFormatError) -> Self {
        Self::Authentication(value.to_string())
    }
}

impl From<AddressFormatError> for SpecifyError {
    fn from(value: AddressFormatError) -> Self {
        Self::validation(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use specify_domain::model::{PublisherKey, WalletAddress};

    use super::*;

    #[test]
    fn key_format_failures_convert_to_authentication() {
        let err = PublisherKey::parse("invalid_key").unwrap_err();
        assert_eq!(
            SpecifyError::from(err),
            SpecifyError::Authentication("publisher key must start with `spk_`".into())
        );
    }

    #[test]
    fn address_format_failures_convert_to_validation() {
        let err = WalletAddress::parse("0x123").unwrap_err();
        assert!(matches!(
            SpecifyError::from(err),
            SpecifyError::Validation { .. }
        ));
    }

    #[test]
    fn only_api_errors_expose_a_status() {
        assert_eq!(SpecifyError::validation("nope").status(), None);
        let api = SpecifyError::Api {
            status: 502,
            message: "bad gateway".into(),
        };
        assert_eq!(api.status(), Some(502));
    }
}
