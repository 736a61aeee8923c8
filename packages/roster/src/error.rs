use thiserror::Error;

use crate::model::MembershipId;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Roster API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode roster response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Membership has no id")]
    MissingId,

    #[error("Membership not found: {0}")]
    NotFound(MembershipId),

    #[error("No edit session is active")]
    NotEditing,

    #[error("Edit dialog closed before answering")]
    DialogClosed,

    #[error("Remote call failed: {0}")]
    Remote(String),
}

impl RosterError {
    /// Whether the failure came from the remote side rather than local state.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            RosterError::Http(_) | RosterError::Api { .. } | RosterError::Decode(_) | RosterError::Remote(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RosterError>;
