use crate::error::BankError;

/// Classification of a user-visible message. No further semantics are
/// attached to the channel.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Severity {
    Success,
    Info,
    Error,
}

/// A message destined for whatever surface is driving the engine.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Feedback {
    pub severity: Severity,
    pub message: String,
}

impl Feedback {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

impl From<&BankError> for Feedback {
    fn from(err: &BankError) -> Self {
        Self::error(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_surfaces_detail_verbatim() {
        let err = BankError::rejected("Max 25 CKB per day");
        let feedback = Feedback::from(&err);
        assert_eq!(feedback.severity, Severity::Error);
        assert_eq!(feedback.message, "Max 25 CKB per day");
    }

    #[test]
    fn test_transport_errors_get_generic_prefix() {
        let err = BankError::transport("connection refused");
        let feedback = Feedback::from(&err);
        assert!(feedback.message.starts_with("server unreachable"));
    }
}
