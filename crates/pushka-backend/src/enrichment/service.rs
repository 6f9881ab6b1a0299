use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use pushka_bridge::notification::{AttachmentDescriptor, EnrichedNotification, NotificationContent};
use tokio::{sync::watch, task::JoinHandle};

use super::{
    attachment::build_attachment, extractor::extract_image_url, fetcher::BoundedFetcher,
    latch::CompletionLatch, media_type::resolve_attachment_type,
};
use crate::error::EnrichmentError;

/// Where a single enrichment currently is.
///
/// Stages only move forward. `Completed` and `Expired` are terminal, and
/// `Expired` can be entered from any non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentStage {
    Started,
    ExtractingUrl,
    Fetching,
    Resolving,
    Building,
    Completed,
    Expired,
}

impl EnrichmentStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, EnrichmentStage::Completed | EnrichmentStage::Expired)
    }
}

/// Adds an image attachment to delivered notifications.
#[derive(Debug, Clone)]
pub struct NotificationEnricher {
    fetcher: Arc<BoundedFetcher>,
}

impl NotificationEnricher {
    pub fn new(fetcher: BoundedFetcher) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
        }
    }

    /// Starts enriching `content` and returns a handle for the host.
    ///
    /// `handler` runs exactly once: when the pipeline finishes (with or
    /// without an attachment) or when [`EnrichmentSession::time_will_expire`]
    /// is called, whichever happens first. Downloads are written under
    /// `scope`, which must not be shared with other sessions.
    ///
    /// Must be called from within a tokio runtime.
    pub fn did_receive(
        &self,
        content: NotificationContent,
        scope: PathBuf,
        handler: impl FnOnce(EnrichedNotification) + Send + 'static,
    ) -> EnrichmentSession {
        let latch = Arc::new(CompletionLatch::new(handler));
        let best_attempt = Arc::new(Mutex::new(EnrichedNotification::unmodified(
            content.clone(),
        )));
        let (stage_tx, _) = watch::channel(EnrichmentStage::Started);
        let stage = Arc::new(stage_tx);
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let pipeline = Pipeline {
            fetcher: self.fetcher.clone(),
            stage: stage.clone(),
            cancel: cancel_rx,
            scope,
        };
        let task = tokio::spawn({
            let latch = latch.clone();
            let best_attempt = best_attempt.clone();
            let stage = stage.clone();
            async move {
                let notification = match pipeline.run(&content).await {
                    Ok(attachment) => {
                        log::info!(
                            "Attached {} ({}) to notification",
                            attachment.location.display(),
                            attachment.media_type
                        );
                        EnrichedNotification::with_attachment(content, attachment)
                    }
                    Err(EnrichmentError::NoUrlFound) => {
                        log::debug!("No image URL in payload, delivering as is");
                        EnrichedNotification::unmodified(content)
                    }
                    Err(error) => {
                        log::warn!("Delivering notification without attachment: {error}");
                        EnrichedNotification::unmodified(content)
                    }
                };

                store_best_attempt(&best_attempt, &notification);
                advance(&stage, EnrichmentStage::Completed);
                if !latch.complete(notification) {
                    log::debug!("Enrichment finished after content was already delivered");
                }
            }
        });

        EnrichmentSession {
            latch,
            best_attempt,
            stage,
            cancel: cancel_tx,
            task,
        }
    }
}

/// Host-side handle for one enrichment.
#[derive(Debug)]
pub struct EnrichmentSession {
    latch: Arc<CompletionLatch<EnrichedNotification>>,
    best_attempt: Arc<Mutex<EnrichedNotification>>,
    stage: Arc<watch::Sender<EnrichmentStage>>,
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl EnrichmentSession {
    /// The host is about to kill the process. Delivers the best content
    /// gathered so far and abandons any in-flight download.
    ///
    /// Returns `false` when the handler already ran.
    pub fn time_will_expire(&self) -> bool {
        advance(&self.stage, EnrichmentStage::Expired);
        let _ = self.cancel.send(true);

        let best = match self.best_attempt.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        let delivered = self.latch.complete(best);
        if delivered {
            log::warn!("Enrichment deadline reached, delivering best attempt");
        }
        delivered
    }

    pub fn stage(&self) -> EnrichmentStage {
        *self.stage.borrow()
    }

    /// Whether the handler has already run.
    pub fn is_delivered(&self) -> bool {
        self.latch.is_completed()
    }

    /// Waits for the pipeline task itself to wind down.
    pub async fn join(self) {
        if let Err(error) = self.task.await {
            log::error!("Enrichment task failed: {error}");
        }
    }
}

struct Pipeline {
    fetcher: Arc<BoundedFetcher>,
    stage: Arc<watch::Sender<EnrichmentStage>>,
    cancel: watch::Receiver<bool>,
    scope: PathBuf,
}

impl Pipeline {
    async fn run(
        &self,
        content: &NotificationContent,
    ) -> Result<AttachmentDescriptor, EnrichmentError> {
        self.enter(EnrichmentStage::ExtractingUrl)?;
        let reference =
            extract_image_url(&content.user_info).ok_or(EnrichmentError::NoUrlFound)?;
        log::debug!("Found image URL {} via {:?}", reference.url, reference.rule);

        self.enter(EnrichmentStage::Fetching)?;
        let fetched = self
            .fetcher
            .fetch(&reference.url, &self.scope, self.cancel.clone())
            .await?;

        self.enter(EnrichmentStage::Resolving)?;
        let attachment_type =
            resolve_attachment_type(&fetched.source_url, fetched.mime_type.as_deref());

        self.enter(EnrichmentStage::Building)?;
        let attachment = build_attachment(&fetched.location, attachment_type).await?;
        Ok(attachment)
    }

    fn enter(&self, next: EnrichmentStage) -> Result<(), EnrichmentError> {
        if advance(&self.stage, next) {
            Ok(())
        } else {
            Err(EnrichmentError::TimedOut)
        }
    }
}

/// Moves the stage forward unless it is already terminal.
fn advance(stage: &watch::Sender<EnrichmentStage>, next: EnrichmentStage) -> bool {
    stage.send_if_modified(|current| {
        if current.is_terminal() {
            return false;
        }
        *current = next;
        true
    })
}

fn store_best_attempt(slot: &Mutex<EnrichedNotification>, notification: &EnrichedNotification) {
    match slot.lock() {
        Ok(mut guard) => *guard = notification.clone(),
        Err(poisoned) => *poisoned.into_inner() = notification.clone(),
    }
}
