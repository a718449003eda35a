//! Broadcast payloads
//!
//! Everything an admin can fan out, as a closed set. Media is re-sent by
//! Telegram file id, so nothing is downloaded.

use teloxide::types::{Message, MessageEntity};

/// A file already on Telegram's servers plus its caption
#[derive(Debug, Clone, PartialEq)]
pub struct Media {
    pub file_id: String,
    pub caption: Option<String>,
    pub caption_entities: Vec<MessageEntity>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text {
        text: String,
        entities: Vec<MessageEntity>,
    },
    Photo(Media),
    Document(Media),
    Video(Media),
    Audio(Media),
    Animation(Media),
    Voice(Media),
    Sticker {
        file_id: String,
    },
    Location {
        latitude: f64,
        longitude: f64,
    },
    Contact {
        phone_number: String,
        first_name: String,
        last_name: Option<String>,
    },
    /// Content kind that cannot be re-sent
    Unsupported {
        kind: String,
    },
}

impl Payload {
    pub fn text(text: impl Into<String>) -> Self {
        Payload::Text {
            text: text.into(),
            entities: Vec::new(),
        }
    }

    /// Short kind name for logs and reports
    pub fn kind(&self) -> &str {
        match self {
            Payload::Text { .. } => "text",
            Payload::Photo(_) => "photo",
            Payload::Document(_) => "document",
            Payload::Video(_) => "video",
            Payload::Audio(_) => "audio",
            Payload::Animation(_) => "animation",
            Payload::Voice(_) => "voice",
            Payload::Sticker { .. } => "sticker",
            Payload::Location { .. } => "location",
            Payload::Contact { .. } => "contact",
            Payload::Unsupported { kind } => kind,
        }
    }

    /// Classify an existing message, keeping captions and formatting
    pub fn from_message(msg: &Message) -> Self {
        let media = |file_id: &str| Media {
            file_id: file_id.to_string(),
            caption: msg.caption().map(str::to_string),
            caption_entities: msg.caption_entities().map(<[_]>::to_vec).unwrap_or_default(),
        };

        if let Some(text) = msg.text() {
            return Payload::Text {
                text: text.to_string(),
                entities: msg.entities().map(<[_]>::to_vec).unwrap_or_default(),
            };
        }
        if let Some(largest) = msg.photo().and_then(|sizes| sizes.last()) {
            return Payload::Photo(media(&largest.file.id));
        }
        if let Some(animation) = msg.animation() {
            return Payload::Animation(media(&animation.file.id));
        }
        if let Some(document) = msg.document() {
            return Payload::Document(media(&document.file.id));
        }
        if let Some(video) = msg.video() {
            return Payload::Video(media(&video.file.id));
        }
        if let Some(audio) = msg.audio() {
            return Payload::Audio(media(&audio.file.id));
        }
        if let Some(voice) = msg.voice() {
            return Payload::Voice(media(&voice.file.id));
        }
        if let Some(sticker) = msg.sticker() {
            return Payload::Sticker {
                file_id: sticker.file.id.clone(),
            };
        }
        if let Some(location) = msg.location() {
            return Payload::Location {
                latitude: location.latitude,
                longitude: location.longitude,
            };
        }
        if let Some(contact) = msg.contact() {
            return Payload::Contact {
                phone_number: contact.phone_number.clone(),
                first_name: contact.first_name.clone(),
                last_name: contact.last_name.clone(),
            };
        }

        let kind = if msg.poll().is_some() {
            "poll"
        } else if msg.video_note().is_some() {
            "video_note"
        } else if msg.dice().is_some() {
            "dice"
        } else if msg.venue().is_some() {
            "venue"
        } else {
            "unknown"
        };
        Payload::Unsupported {
            kind: kind.to_string(),
        }
    }
}
