use crate::model::{DialogueRole, SessionStatus};

/// Errors surfaced by moderation engine operations.
///
/// Variants stay distinguishable so the surrounding service can map each
/// one to its own transport result.
#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    /// The operation is not available while the session is in this status.
    #[error("session status {actual:?} does not allow this operation")]
    WrongSessionStatus { actual: SessionStatus },

    /// The operation belongs to the other speaker, or no turn is open yet.
    /// Nothing was mutated.
    #[error("the {required} does not hold the current turn (speaker: {actual:?})")]
    WrongSpeaker {
        required: DialogueRole,
        actual: Option<DialogueRole>,
    },

    /// A data precondition does not hold.
    #[error("invalid session state: {0}")]
    InvalidState(String),

    /// Persisted session state cannot be reconciled with any known shape.
    #[error("restored session state is inconsistent: {0}")]
    RestoreInconsistency(String),

    /// A storage backend or content generator failed. Propagated as-is,
    /// never retried.
    #[error("collaborator failure: {0}")]
    Collaborator(anyhow::Error),
}

impl ModerationError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    pub fn restore_inconsistency(message: impl Into<String>) -> Self {
        Self::RestoreInconsistency(message.into())
    }
}

impl From<anyhow::Error> for ModerationError {
    fn from(err: anyhow::Error) -> Self {
        Self::Collaborator(err)
    }
}

pub type Result<T> = std::result::Result<T, ModerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModerationError::WrongSpeaker {
            required: DialogueRole::Child,
            actual: Some(DialogueRole::Parent),
        };
        assert_eq!(
            format!("{}", err),
            "the child does not hold the current turn (speaker: Some(Parent))"
        );

        let err = ModerationError::WrongSessionStatus {
            actual: SessionStatus::Terminated,
        };
        assert_eq!(
            format!("{}", err),
            "session status Terminated does not allow this operation"
        );

        let err = ModerationError::invalid_state("cannot confirm an empty card selection");
        assert_eq!(
            format!("{}", err),
            "invalid session state: cannot confirm an empty card selection"
        );
    }

    #[test]
    fn test_collaborator_conversion() {
        fn storage_call() -> anyhow::Result<()> {
            anyhow::bail!("connection refused")
        }

        fn engine_op() -> Result<()> {
            storage_call()?;
            Ok(())
        }

        let err = engine_op().unwrap_err();
        assert!(matches!(err, ModerationError::Collaborator(_)));
        assert_eq!(format!("{}", err), "collaborator failure: connection refused");
    }

    #[test]
    fn test_restore_inconsistency_constructor() {
        let err = ModerationError::restore_inconsistency("latest turn is closed");
        assert!(matches!(err, ModerationError::RestoreInconsistency(_)));
        assert!(format!("{}", err).contains("latest turn is closed"));
    }
}
