//! Request handling on top of a chat transport
//! Author: kartik4091

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use crate::config::{BotConfig, MetadataTarget};
use crate::error::{Error, Result, TransportError};
use crate::normalizer::normalize;
use crate::transport::{Attachment, ChatId, Inbound, Transport, Update};

pub mod messages;

pub use messages::is_pdf;

/// Pause after a failed poll before asking again
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

pub struct Bot<T> {
    transport: Arc<T>,
    target: MetadataTarget,
    process_timeout: Duration,
}

impl<T: Transport + 'static> Bot<T> {
    pub fn new(transport: T, config: &BotConfig) -> Self {
        Self::with_target(transport, config.target.clone(), config.process_timeout())
    }

    pub fn with_target(transport: T, target: MetadataTarget, process_timeout: Duration) -> Self {
        Self {
            transport: Arc::new(transport),
            target,
            process_timeout,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Long-poll forever, handling every update in its own task
    pub async fn run(self: Arc<Self>) -> Result<()> {
        info!("Polling for updates");
        let mut offset = None;
        loop {
            let batch = match self.transport.next_updates(offset).await {
                Ok(batch) => batch,
                Err(e) => {
                    warn!("Polling failed: {}", e);
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                    continue;
                }
            };
            if batch.next_offset.is_some() {
                offset = batch.next_offset;
            }
            Arc::clone(&self).dispatch(batch.updates);
        }
    }

    pub fn dispatch(self: Arc<Self>, updates: Vec<Update>) -> Vec<JoinHandle<()>> {
        updates
            .into_iter()
            .map(|update| {
                let bot = Arc::clone(&self);
                tokio::spawn(async move {
                    let update_id = update.update_id;
                    if let Err(e) = bot.handle_update(update).await {
                        error!("Reply for update {} failed: {}", update_id, e);
                    }
                })
            })
            .collect()
    }

    /// Answer one update with exactly one reply
    #[instrument(skip_all, fields(update = update.update_id, chat = update.chat_id))]
    pub async fn handle_update(&self, update: Update) -> std::result::Result<(), TransportError> {
        let chat_id = update.chat_id;
        match update.inbound {
            Inbound::Command(command) if command == "start" => {
                self.transport
                    .send_message(chat_id, &messages::start_text(&self.target))
                    .await
            }
            Inbound::Document(attachment) => self.handle_document(chat_id, attachment).await,
            Inbound::Command(_) | Inbound::Other => {
                self.transport.send_message(chat_id, messages::SEND_AS_DOCUMENT).await
            }
        }
    }

    async fn handle_document(&self, chat_id: ChatId, attachment: Attachment) -> std::result::Result<(), TransportError> {
        let file_name = match attachment.file_name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return self.transport.send_message(chat_id, messages::SEND_AS_FILE).await,
        };
        if !is_pdf(attachment.mime_type.as_deref(), &file_name) {
            info!("Rejected upload {:?} declared as {:?}", file_name, attachment.mime_type);
            return self.transport.send_message(chat_id, messages::NOT_A_PDF).await;
        }

        if let Err(e) = self.transport.send_typing(chat_id).await {
            warn!("Could not send typing action: {}", e);
        }

        match self.process(&attachment).await {
            Ok((workspace, output)) => {
                info!("Processed {}", file_name);
                let sent = self
                    .transport
                    .send_document(chat_id, &output, &file_name, messages::DONE_CAPTION)
                    .await;
                drop(workspace);
                sent
            }
            Err(e) => {
                error!("Failed to process {}: {:?}", file_name, e);
                self.transport
                    .send_message(chat_id, &messages::failure_text(&e))
                    .await
            }
        }
    }

    /// Download into a fresh working directory and normalize there.
    ///
    /// The directory travels with the blocking job and comes back with its
    /// result, so a job abandoned on timeout still owns it until it finishes.
    async fn process(&self, attachment: &Attachment) -> Result<(TempDir, PathBuf)> {
        let workspace = TempDir::new()?;
        let input = workspace.path().join("input.pdf");
        let output = workspace.path().join("output.pdf");
        self.transport.download(attachment, &input).await?;

        let target = self.target.clone();
        let job_output = output.clone();
        let job = tokio::task::spawn_blocking(move || {
            let result = normalize(&input, &job_output, &target);
            (workspace, result)
        });

        match tokio::time::timeout(self.process_timeout, job).await {
            Err(_) => {
                warn!(
                    "Normalizer still running after {:?}; it keeps its working directory until it finishes",
                    self.process_timeout
                );
                Err(Error::TimeoutError(self.process_timeout.as_secs()))
            }
            Ok(Err(join)) => Err(Error::InternalError(format!("normalizer task failed: {}", join))),
            Ok(Ok((workspace, result))) => {
                result?;
                Ok((workspace, output))
            }
        }
    }
}
