//! One request/response turn against the conversation store and the chat
//! responder.
//!
//! A turn loads the transcript, appends the human message, asks the responder
//! for a reply with that transcript as context, appends the reply, and saves
//! the whole document. Nothing is written unless the responder succeeded, so
//! the stored transcript only ever contains complete turns.
//!
//! Turns on the same conversation are serialized in-process by [`TurnLocks`].
//! Writers in other processes are caught by the conditional save; on conflict
//! the completed turn is re-applied on top of the newer transcript.

use std::sync::Arc;

use chatkeep_core::models::{ConversationId, Message, MessageHistory};
use chatkeep_core::responder::ChatResponder;
use chatkeep_storage::conversation::{ConversationStore, Revision, Snapshot};
use chatkeep_storage::error::ConversationStoreError;
use tracing::{debug, info, warn};

use crate::error::HandlerError;
use crate::locks::TurnLocks;

pub const DEFAULT_MAX_SAVE_ATTEMPTS: u32 = 3;

pub struct ConversationHandler {
    store: ConversationStore,
    responder: Arc<dyn ChatResponder>,
    locks: TurnLocks,
    max_save_attempts: u32,
}

impl ConversationHandler {
    pub fn new(store: ConversationStore, responder: Arc<dyn ChatResponder>) -> Self {
        Self {
            store,
            responder,
            locks: TurnLocks::new(),
            max_save_attempts: DEFAULT_MAX_SAVE_ATTEMPTS,
        }
    }

    /// How many conditional saves a turn may try before giving up. At least 1.
    pub fn with_max_save_attempts(mut self, attempts: u32) -> Self {
        self.max_save_attempts = attempts.max(1);
        self
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Run one turn and return the assistant's reply.
    ///
    /// If the object store cannot be read the turn proceeds with an empty
    /// transcript (logged), and the conditional save then refuses to clobber
    /// any transcript that does exist. A corrupt transcript fails the turn
    /// before the responder is called.
    pub async fn handle_message(
        &self,
        id: &ConversationId,
        user_text: &str,
    ) -> Result<String, HandlerError> {
        let _turn = self.locks.acquire(id).await;

        let snapshot = match self.store.fetch(id).await {
            Ok(snapshot) => snapshot,
            Err(ConversationStoreError::Unavailable(e)) => {
                warn!(conversation_id = %id, error = %e, "object store unavailable, continuing without history");
                Snapshot::empty()
            }
            Err(e) => return Err(HandlerError::Corrupt(e)),
        };

        let human = Message::human(user_text);
        let mut history = snapshot.history;
        history.push(human.clone());

        let reply = self
            .responder
            .respond(&history)
            .await
            .map_err(HandlerError::Responder)?;

        let assistant = Message::assistant(reply.into_content());
        history.push(assistant.clone());

        if let Err(cause) = self
            .persist(id, history, snapshot.revision, &human, &assistant)
            .await
        {
            warn!(conversation_id = %id, error = %cause, "turn answered but not saved");
            return Err(HandlerError::NotSaved {
                reply: assistant.into_content(),
                cause,
            });
        }

        info!(conversation_id = %id, "turn completed");
        Ok(assistant.into_content())
    }

    async fn persist(
        &self,
        id: &ConversationId,
        mut history: MessageHistory,
        mut revision: Revision,
        human: &Message,
        assistant: &Message,
    ) -> Result<(), ConversationStoreError> {
        let mut attempt = 1;
        loop {
            match self.store.save_if_unchanged(id, &history, &revision).await {
                Ok(_) => return Ok(()),
                Err(ConversationStoreError::Conflict { .. }) if attempt < self.max_save_attempts => {
                    debug!(conversation_id = %id, attempt, "conversation changed during turn, reapplying");
                    let latest = self.store.fetch(id).await?;
                    history = latest.history;
                    history.push(human.clone());
                    history.push(assistant.clone());
                    revision = latest.revision;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
