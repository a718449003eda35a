//! Messenger that records instead of sending

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use async_trait::async_trait;
use tokio::sync::Mutex;

use StarlyBot::models::Keyboard;
use StarlyBot::models::Payload;
use StarlyBot::services::{Messenger, TextFormat};
use StarlyBot::{Result, StarlyError};

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text {
        chat_id: i64,
        text: String,
        format: TextFormat,
        keyboard: Option<Keyboard>,
    },
    Payload {
        chat_id: i64,
        payload: Payload,
    },
}

impl Sent {
    pub fn chat_id(&self) -> i64 {
        match self {
            Sent::Text { chat_id, .. } | Sent::Payload { chat_id, .. } => *chat_id,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Sent::Text { text, .. } => Some(text),
            Sent::Payload { .. } => None,
        }
    }
}

#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<Sent>>,
    failing_chats: Mutex<HashSet<i64>>,
    fail_all: AtomicBool,
    handles: Mutex<HashMap<i64, String>>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send fails while set
    pub fn set_failing(&self, failing: bool) {
        self.fail_all.store(failing, Ordering::SeqCst);
    }

    /// Sends to this chat fail, as when a user blocked the bot
    pub async fn fail_chat(&self, chat_id: i64) {
        self.failing_chats.lock().await.insert(chat_id);
    }

    pub async fn set_handle(&self, user_id: i64, handle: &str) {
        self.handles.lock().await.insert(user_id, handle.to_string());
    }

    pub async fn sent(&self) -> Vec<Sent> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_to(&self, chat_id: i64) -> Vec<Sent> {
        self.sent().await.into_iter().filter(|s| s.chat_id() == chat_id).collect()
    }

    async fn check(&self, chat_id: i64) -> Result<()> {
        if self.fail_all.load(Ordering::SeqCst) || self.failing_chats.lock().await.contains(&chat_id) {
            return Err(StarlyError::Delivery(format!("chat {} unreachable", chat_id)));
        }
        Ok(())
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        format: TextFormat,
        keyboard: Option<Keyboard>,
    ) -> Result<()> {
        self.check(chat_id).await?;
        self.sent.lock().await.push(Sent::Text {
            chat_id,
            text: text.to_string(),
            format,
            keyboard,
        });
        Ok(())
    }

    async fn send_payload(&self, chat_id: i64, payload: &Payload) -> Result<()> {
        if let Payload::Unsupported { kind } = payload {
            return Err(StarlyError::UnsupportedContent(kind.clone()));
        }
        self.check(chat_id).await?;
        self.sent.lock().await.push(Sent::Payload {
            chat_id,
            payload: payload.clone(),
        });
        Ok(())
    }

    async fn lookup_handle(&self, user_id: i64) -> Option<String> {
        self.handles.lock().await.get(&user_id).cloned()
    }
}
