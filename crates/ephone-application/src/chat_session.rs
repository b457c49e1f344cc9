//! Chat Session
//!
//! A persisted question/answer transcript with the shopping assistant.
//! The user's message is appended as soon as it is sent; the assistant's
//! reply is appended, and the whole transcript persisted, only when the AI
//! call succeeds.

use crate::persistence::{SnapshotWriter, load_snapshot};
use crate::shopping_assistant::ShoppingAssistant;
use ephone_core::chat::{ChatMessage, MessageIdGenerator};
use ephone_core::error::EphoneError;
use ephone_core::product::Product;
use ephone_core::storage::{CHAT_STORAGE_KEY, KeyValueStore};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Error state shown after a failed reply.
pub const SEND_ERROR_MESSAGE: &str = "Failed to get response. Please try again.";

/// Result of [`ChatSession::send_message`] and [`ChatSession::retry`].
#[derive(Debug, Clone)]
pub enum SendOutcome {
    /// Blank input, or nothing to retry.
    Ignored,
    /// Another reply is still pending.
    Busy,
    Replied(ChatMessage),
    /// The user message stays in the transcript; nothing was persisted.
    Failed(EphoneError),
    /// The transcript was cleared while the reply was pending.
    Cancelled,
}

#[derive(Default)]
struct ChatState {
    messages: Vec<ChatMessage>,
    ids: MessageIdGenerator,
    sending: bool,
    error: Option<String>,
    products: Vec<Product>,
    /// Bumped by `clear_chat` so replies to a discarded transcript are dropped.
    generation: u64,
}

struct PendingReply {
    content: String,
    history: Vec<ChatMessage>,
    products: Vec<Product>,
    generation: u64,
}

/// Releases the `sending` flag when a reply finishes or its future is dropped.
struct SendingGuard<'a> {
    state: &'a Mutex<ChatState>,
}

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        lock_state(self.state).sending = false;
    }
}

fn lock_state(state: &Mutex<ChatState>) -> MutexGuard<'_, ChatState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct ChatSession {
    assistant: Arc<ShoppingAssistant>,
    state: Mutex<ChatState>,
    writer: SnapshotWriter,
}

impl ChatSession {
    /// Restores the transcript from `store`. Unreadable data is logged and
    /// the session starts empty.
    pub async fn load(store: Arc<dyn KeyValueStore>, assistant: Arc<ShoppingAssistant>) -> Self {
        let messages = match load_snapshot::<Vec<ChatMessage>>(store.as_ref(), CHAT_STORAGE_KEY).await {
            Ok(Some(messages)) => {
                tracing::info!(messages = messages.len(), "Restored chat history");
                messages
            }
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::error!(error = %err, "Failed to load chat history");
                Vec::new()
            }
        };

        let last_id = messages.iter().map(|m| m.id).max().unwrap_or_default();
        let state = ChatState {
            messages,
            ids: MessageIdGenerator::seeded(last_id),
            ..ChatState::default()
        };

        Self {
            assistant,
            state: Mutex::new(state),
            writer: SnapshotWriter::spawn(store, CHAT_STORAGE_KEY),
        }
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock().messages.clone()
    }

    pub fn is_sending(&self) -> bool {
        self.lock().sending
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    /// Products described to the assistant on every turn.
    pub fn set_product_context(&self, products: Vec<Product>) {
        self.lock().products = products;
    }

    /// Appends `text` as a user message and asks the assistant for a reply.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        let content = text.trim();
        if content.is_empty() {
            return SendOutcome::Ignored;
        }

        let pending = {
            let mut state = self.lock();
            if state.sending {
                tracing::debug!("Send already in flight");
                return SendOutcome::Busy;
            }
            let history = state.messages.clone();
            let id = state.ids.next_id();
            state.messages.push(ChatMessage::user(id, content));
            state.sending = true;
            state.error = None;
            PendingReply {
                content: content.to_string(),
                history,
                products: state.products.clone(),
                generation: state.generation,
            }
        };

        self.complete(pending).await
    }

    /// Requests a reply for a trailing unanswered user message.
    pub async fn retry(&self) -> SendOutcome {
        let pending = {
            let mut state = self.lock();
            if state.sending {
                return SendOutcome::Busy;
            }
            let Some((last, history)) = state.messages.split_last() else {
                return SendOutcome::Ignored;
            };
            if !last.is_user() {
                return SendOutcome::Ignored;
            }
            let pending = PendingReply {
                content: last.content.clone(),
                history: history.to_vec(),
                products: state.products.clone(),
                generation: state.generation,
            };
            state.sending = true;
            state.error = None;
            pending
        };

        tracing::debug!("Retrying last message");
        self.complete(pending).await
    }

    /// Empties the transcript and deletes the persisted copy.
    pub async fn clear_chat(&self) {
        {
            let mut state = self.lock();
            state.messages.clear();
            state.error = None;
            state.generation += 1;
            self.writer.delete();
        }
        tracing::info!("Chat history cleared");
        self.writer.flush().await;
    }

    /// Waits for every scheduled transcript write to be attempted.
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    async fn complete(&self, pending: PendingReply) -> SendOutcome {
        let _guard = SendingGuard { state: &self.state };

        let reply = self
            .assistant
            .converse(&pending.content, &pending.history, &pending.products)
            .await;

        let mut state = self.lock();
        if state.generation != pending.generation {
            tracing::debug!("Dropping reply to a cleared transcript");
            return SendOutcome::Cancelled;
        }

        match reply {
            Ok(text) => {
                let id = state.ids.next_id();
                let message = ChatMessage::assistant(id, text);
                state.messages.push(message.clone());
                self.writer.save(&state.messages);
                SendOutcome::Replied(message)
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to send message");
                state.error = Some(SEND_ERROR_MESSAGE.to_string());
                SendOutcome::Failed(err)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, ChatState> {
        lock_state(&self.state)
    }
}
