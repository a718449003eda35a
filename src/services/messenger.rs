//! Outbound messaging seam
//!
//! Services talk to users through [`Messenger`] so delivery can be swapped
//! out in tests. [`TelegramMessenger`] is the production implementation.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageEntity, ParseMode};
use tracing::debug;
use crate::models::Keyboard;
use crate::models::{Media, Payload};
use crate::utils::errors::{StarlyError, Result};

/// How Telegram should interpret the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Plain,
    Html,
}

#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        format: TextFormat,
        keyboard: Option<Keyboard>,
    ) -> Result<()>;

    /// Re-send a broadcast payload. Unsupported payloads fail without a request.
    async fn send_payload(&self, chat_id: i64, payload: &Payload) -> Result<()>;

    /// Current public handle of a user, if they have one and it can be read
    async fn lookup_handle(&self, user_id: i64) -> Option<String>;
}

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn media_parts(media: &Media) -> (InputFile, String, Vec<MessageEntity>) {
    (
        InputFile::file_id(media.file_id.clone()),
        media.caption.clone().unwrap_or_default(),
        media.caption_entities.clone(),
    )
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        format: TextFormat,
        keyboard: Option<Keyboard>,
    ) -> Result<()> {
        let mut request = self.bot.send_message(ChatId(chat_id), text);
        if format == TextFormat::Html {
            request = request.parse_mode(ParseMode::Html);
        }
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(keyboard.markup());
        }
        request.await?;

        debug!(chat_id = chat_id, "Text message sent");
        Ok(())
    }

    async fn send_payload(&self, chat_id: i64, payload: &Payload) -> Result<()> {
        let chat = ChatId(chat_id);

        match payload {
            Payload::Text { text, entities } => {
                let mut request = self.bot.send_message(chat, text);
                if !entities.is_empty() {
                    request = request.entities(entities.clone());
                }
                request.await?;
            }
            Payload::Photo(media) => {
                let (file, caption, entities) = media_parts(media);
                self.bot.send_photo(chat, file).caption(caption).caption_entities(entities).await?;
            }
            Payload::Document(media) => {
                let (file, caption, entities) = media_parts(media);
                self.bot.send_document(chat, file).caption(caption).caption_entities(entities).await?;
            }
            Payload::Video(media) => {
                let (file, caption, entities) = media_parts(media);
                self.bot.send_video(chat, file).caption(caption).caption_entities(entities).await?;
            }
            Payload::Audio(media) => {
                let (file, caption, entities) = media_parts(media);
                self.bot.send_audio(chat, file).caption(caption).caption_entities(entities).await?;
            }
            Payload::Animation(media) => {
                let (file, caption, entities) = media_parts(media);
                self.bot.send_animation(chat, file).caption(caption).caption_entities(entities).await?;
            }
            Payload::Voice(media) => {
                let (file, caption, entities) = media_parts(media);
                self.bot.send_voice(chat, file).caption(caption).caption_entities(entities).await?;
            }
            Payload::Sticker { file_id } => {
                self.bot.send_sticker(chat, InputFile::file_id(file_id.clone())).await?;
            }
            Payload::Location { latitude, longitude } => {
                self.bot.send_location(chat, *latitude, *longitude).await?;
            }
            Payload::Contact { phone_number, first_name, last_name } => {
                let mut request = self.bot.send_contact(chat, phone_number, first_name);
                if let Some(last_name) = last_name {
                    request = request.last_name(last_name);
                }
                request.await?;
            }
            Payload::Unsupported { kind } => {
                return Err(StarlyError::UnsupportedContent(kind.clone()));
            }
        }

        debug!(chat_id = chat_id, kind = payload.kind(), "Payload sent");
        Ok(())
    }

    async fn lookup_handle(&self, user_id: i64) -> Option<String> {
        match self.bot.get_chat(ChatId(user_id)).await {
            Ok(chat) => chat.username().map(str::to_string),
            Err(e) => {
                debug!(user_id = user_id, error = %e, "Handle lookup failed");
                None
            }
        }
    }
}
