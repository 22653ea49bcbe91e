//! Adapters from Telegram (teloxide) types to classibot_core types.
//! Depends only on teloxide and core type definitions.

use classibot_core::{Attachment, Chat, Message, User};

/// Telegram photos arrive without a filename; they are always JPEG.
const PHOTO_FILENAME: &str = "photo.jpg";

/// Wraps a teloxide Message for conversion to core [`Message`].
pub struct TelegramMessageWrapper<'a>(pub &'a teloxide::types::Message);

impl<'a> TelegramMessageWrapper<'a> {
    pub fn to_core(&self) -> Message {
        Message {
            id: self.0.id.to_string(),
            user: self
                .0
                .from
                .as_ref()
                .map(|u| User {
                    id: u.id.0 as i64,
                    username: u.username.clone(),
                    is_bot: u.is_bot,
                })
                .unwrap_or_else(|| User {
                    id: 0,
                    username: None,
                    is_bot: false,
                }),
            chat: Chat {
                id: self.0.chat.id.0,
                chat_type: format!("{:?}", self.0.chat.kind),
            },
            content: self
                .0
                .text()
                .or_else(|| self.0.caption())
                .unwrap_or("")
                .to_string(),
            attachments: self.attachments(),
            created_at: chrono::Utc::now(),
            reply_to_message_id: self.0.reply_to_message().map(|m| m.id.to_string()),
        }
    }

    /// Photos (largest size) and documents become attachments. Commands only
    /// ever consume the first one.
    fn attachments(&self) -> Vec<Attachment> {
        let mut attachments = Vec::new();

        if let Some(sizes) = self.0.photo() {
            if let Some(best) = sizes.last() {
                attachments.push(Attachment {
                    file_id: best.file.id.to_string(),
                    filename: PHOTO_FILENAME.to_string(),
                });
            }
        }

        if let Some(doc) = self.0.document() {
            attachments.push(Attachment {
                file_id: doc.file.id.to_string(),
                filename: doc
                    .file_name
                    .clone()
                    .unwrap_or_else(|| "file".to_string()),
            });
        }

        attachments
    }
}
