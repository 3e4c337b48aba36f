use crate::domain::errors::FetchError;

/// Outcome of the most recent metadata fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    SucceededEmpty,
    Failed(FetchError),
}

impl RequestStatus {
    /// Returns true once a fetch has completed, successfully or not.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::SucceededEmpty | Self::Failed(_)
        )
    }

    /// Returns the failure reason, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&FetchError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::InFlight => write!(f, "in flight"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::SucceededEmpty => write!(f, "succeeded (empty)"),
            Self::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}
