//! Chat transport boundary: inbound updates, file download, replies
//! Author: kartik4091

use std::path::Path;

use async_trait::async_trait;

use crate::error::TransportError;

pub mod multipart;
pub mod telegram;

pub use telegram::TelegramClient;

pub type ChatId = i64;

/// A file attached to an inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_id: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

/// How an inbound message was classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A `/command`, stored without the slash or bot suffix
    Command(String),
    Document(Attachment),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub update_id: i64,
    pub chat_id: ChatId,
    pub inbound: Inbound,
}

/// One long-poll round
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateBatch {
    pub updates: Vec<Update>,
    /// Offset acknowledging everything received, including updates that
    /// carried nothing this bot handles
    pub next_offset: Option<i64>,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn next_updates(&self, offset: Option<i64>) -> Result<UpdateBatch, TransportError>;

    /// Store the attachment's bytes at `destination`, returning the size
    async fn download(&self, attachment: &Attachment, destination: &Path) -> Result<u64, TransportError>;

    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), TransportError>;

    async fn send_document(
        &self,
        chat_id: ChatId,
        path: &Path,
        file_name: &str,
        caption: &str,
    ) -> Result<(), TransportError>;

    async fn send_typing(&self, chat_id: ChatId) -> Result<(), TransportError>;
}
