//! Telegram Bot API client
//! Author: kartik4091

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, trace};

use crate::config::BotConfig;
use crate::error::TransportError;
use crate::transport::multipart::MultipartForm;
use crate::transport::{Attachment, ChatId, Inbound, Transport, Update, UpdateBatch};

/// Extra read time on top of the long-poll window before a request is abandoned
const READ_MARGIN: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawUpdate {
    update_id: i64,
    message: Option<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    chat: RawChat,
    text: Option<String>,
    document: Option<RawDocument>,
}

#[derive(Debug, Deserialize)]
struct RawChat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    file_id: String,
    file_name: Option<String>,
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFile {
    file_path: Option<String>,
}

/// Blocking Bot API client; the async [`Transport`] impl moves each call
/// onto the blocking pool
#[derive(Clone)]
pub struct TelegramClient {
    agent: ureq::Agent,
    base_url: String,
    token: String,
    poll_timeout_secs: u64,
}

impl TelegramClient {
    pub fn new(config: &BotConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout_read(Duration::from_secs(config.poll_timeout_secs) + READ_MARGIN)
            .build();
        Self {
            agent,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            poll_timeout_secs: config.poll_timeout_secs,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{}", self.base_url, self.token, file_path)
    }

    fn call<T: DeserializeOwned>(&self, method: &str, body: Value) -> Result<T, TransportError> {
        trace!("Bot API call {}", method);
        let response = self.agent.post(&self.method_url(method)).send_json(body)?;
        unwrap_response(method, response)
    }

    pub fn get_updates(&self, offset: Option<i64>) -> Result<UpdateBatch, TransportError> {
        let mut body = json!({
            "timeout": self.poll_timeout_secs,
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }
        let raw: Vec<RawUpdate> = self.call("getUpdates", body)?;

        let next_offset = raw.iter().map(|u| u.update_id + 1).max();
        let updates = raw.into_iter().filter_map(classify).collect();
        Ok(UpdateBatch { updates, next_offset })
    }

    pub fn download_file(&self, file_id: &str, destination: &Path) -> Result<u64, TransportError> {
        let file: RawFile = self.call("getFile", json!({ "file_id": file_id }))?;
        let file_path = file
            .file_path
            .ok_or_else(|| TransportError::Malformed("getFile returned no file_path".into()))?;

        let response = self.agent.get(&self.file_url(&file_path)).call()?;
        let mut reader = response.into_reader();
        let mut writer = BufWriter::new(File::create(destination)?);
        let size = io::copy(&mut reader, &mut writer)?;
        writer.flush()?;
        debug!("Downloaded {} bytes to {}", size, destination.display());
        Ok(size)
    }

    pub fn post_message(&self, chat_id: ChatId, text: &str) -> Result<(), TransportError> {
        let _: Value = self.call("sendMessage", json!({ "chat_id": chat_id, "text": text }))?;
        Ok(())
    }

    pub fn post_chat_action(&self, chat_id: ChatId, action: &str) -> Result<(), TransportError> {
        let _: Value = self.call("sendChatAction", json!({ "chat_id": chat_id, "action": action }))?;
        Ok(())
    }

    pub fn post_document(
        &self,
        chat_id: ChatId,
        path: &Path,
        file_name: &str,
        caption: &str,
    ) -> Result<(), TransportError> {
        let content = fs::read(path)?;
        let (content_type, body) = MultipartForm::new()
            .text("chat_id", &chat_id.to_string())
            .text("caption", caption)
            .file("document", file_name, "application/pdf", &content)
            .finish();

        let response = self
            .agent
            .post(&self.method_url("sendDocument"))
            .set("Content-Type", &content_type)
            .send_bytes(&body)?;
        let _: Value = unwrap_response("sendDocument", response)?;
        debug!("Sent {} ({} bytes) to chat {}", file_name, content.len(), chat_id);
        Ok(())
    }

    async fn blocking<T, F>(&self, job: F) -> Result<T, TransportError>
    where
        T: Send + 'static,
        F: FnOnce(TelegramClient) -> Result<T, TransportError> + Send + 'static,
    {
        let client = self.clone();
        tokio::task::spawn_blocking(move || job(client))
            .await
            .map_err(|e| TransportError::Http(format!("request task failed: {}", e)))?
    }
}

fn unwrap_response<T: DeserializeOwned>(method: &str, response: ureq::Response) -> Result<T, TransportError> {
    let parsed: ApiResponse<T> = response
        .into_json()
        .map_err(|e| TransportError::Malformed(format!("{}: {}", method, e)))?;
    if !parsed.ok {
        return Err(TransportError::Api(
            parsed.description.unwrap_or_else(|| format!("{} failed", method)),
        ));
    }
    parsed
        .result
        .ok_or_else(|| TransportError::Malformed(format!("{}: response has no result", method)))
}

fn classify(update: RawUpdate) -> Option<Update> {
    let message = update.message?;
    let inbound = match (message.document, message.text) {
        (Some(document), _) => Inbound::Document(Attachment {
            file_id: document.file_id,
            file_name: document.file_name,
            mime_type: document.mime_type,
        }),
        (None, Some(text)) if text.starts_with('/') => Inbound::Command(command_name(&text)),
        _ => Inbound::Other,
    };
    Some(Update {
        update_id: update.update_id,
        chat_id: message.chat.id,
        inbound,
    })
}

// "/start@my_bot payload" -> "start"
fn command_name(text: &str) -> String {
    let word = text.trim_start_matches('/').split_whitespace().next().unwrap_or("");
    word.split('@').next().unwrap_or("").to_string()
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("base_url", &self.base_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish()
    }
}

#[async_trait]
impl Transport for TelegramClient {
    async fn next_updates(&self, offset: Option<i64>) -> Result<UpdateBatch, TransportError> {
        self.blocking(move |client| client.get_updates(offset)).await
    }

    async fn download(&self, attachment: &Attachment, destination: &Path) -> Result<u64, TransportError> {
        let file_id = attachment.file_id.clone();
        let destination = destination.to_path_buf();
        self.blocking(move |client| client.download_file(&file_id, &destination))
            .await
    }

    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), TransportError> {
        let text = text.to_string();
        self.blocking(move |client| client.post_message(chat_id, &text)).await
    }

    async fn send_document(
        &self,
        chat_id: ChatId,
        path: &Path,
        file_name: &str,
        caption: &str,
    ) -> Result<(), TransportError> {
        let path = path.to_path_buf();
        let file_name = file_name.to_string();
        let caption = caption.to_string();
        self.blocking(move |client| client.post_document(chat_id, &path, &file_name, &caption))
            .await
    }

    async fn send_typing(&self, chat_id: ChatId) -> Result<(), TransportError> {
        self.blocking(move |client| client.post_chat_action(chat_id, "typing"))
            .await
    }
}
