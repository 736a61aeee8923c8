//! Edit dialog boundary.
//!
//! The engine never renders anything. It hands an [`EditPrompt`] to an
//! [`EditDialog`] and gets back an [`EditDecision`]. [`DialogChannel`] turns
//! that into message passing so a UI task can answer prompts from its own
//! loop.

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::error::{Result, RosterError};
use crate::model::{MembershipId, PermissionLevel};

/// What the dialog should show when it opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditPrompt {
    pub membership_id: MembershipId,
    pub member_name: String,
    pub title: String,
    pub permission_level: PermissionLevel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditDecision {
    Confirmed {
        title: String,
        permission_level: PermissionLevel,
    },
    Cancelled,
}

#[async_trait]
pub trait EditDialog: Send + Sync {
    async fn prompt(&self, prompt: EditPrompt) -> Result<EditDecision>;
}

/// A prompt waiting for an answer on the UI side of a [`DialogChannel`].
#[derive(Debug)]
pub struct DialogRequest {
    pub prompt: EditPrompt,
    reply: oneshot::Sender<EditDecision>,
}

impl DialogRequest {
    pub fn respond(self, decision: EditDecision) {
        // Asker may have given up
        let _ = self.reply.send(decision);
    }

    pub fn confirm(self, title: impl Into<String>, permission_level: PermissionLevel) {
        self.respond(EditDecision::Confirmed {
            title: title.into(),
            permission_level,
        });
    }

    pub fn cancel(self) {
        self.respond(EditDecision::Cancelled);
    }
}

/// [`EditDialog`] that forwards prompts over a channel.
#[derive(Debug, Clone)]
pub struct DialogChannel {
    sender: mpsc::Sender<DialogRequest>,
}

impl DialogChannel {
    /// Create the asking side and the receiver the UI answers from.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<DialogRequest>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl EditDialog for DialogChannel {
    async fn prompt(&self, prompt: EditPrompt) -> Result<EditDecision> {
        let (reply, answer) = oneshot::channel();
        self.sender
            .send(DialogRequest { prompt, reply })
            .await
            .map_err(|_| RosterError::DialogClosed)?;
        answer.await.map_err(|_| RosterError::DialogClosed)
    }
}
