//! Account annotation service.
//!
//! Runs the biography or caption job over every account of a dataset.
//! Separated from UI concerns - emits events for progress tracking.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex, Semaphore};
use tracing::{debug, info, warn};

use crate::corenlp::TextAnnotator;
use crate::dataset::{
    Account, AnnotatedCaption, CaptionDocument, Dataset, Picture, PictureMetadata,
};
use crate::nlp::{aggregate, AnnotationResponse, NlpError, NlpResult};

/// Which text of an account gets annotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationJob {
    /// Account biography (`bio.json` → `nlp.json`)
    Bio,
    /// Post captions (`info.json` → `didascalia_nlp.json`)
    Captions,
}

impl AnnotationJob {
    pub fn display_name(&self) -> &'static str {
        match self {
            AnnotationJob::Bio => "biographies",
            AnnotationJob::Captions => "captions",
        }
    }

    pub fn input_path(&self, account: &Account) -> PathBuf {
        match self {
            AnnotationJob::Bio => account.bio_path(),
            AnnotationJob::Captions => account.info_path(),
        }
    }

    pub fn output_path(&self, account: &Account) -> PathBuf {
        match self {
            AnnotationJob::Bio => account.bio_output_path(),
            AnnotationJob::Captions => account.captions_output_path(),
        }
    }
}

/// Events emitted during a batch run.
/// Fields are populated when events are created, even if consumers don't read all of them.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum AnnotationEvent {
    /// Batch started
    Started { total_accounts: usize },
    /// Account processing started
    AccountStarted { account: String },
    /// Account output written
    AccountCompleted { account: String, texts: usize },
    /// Account skipped (already done, no input, nothing annotated)
    AccountSkipped { account: String, reason: String },
    /// Account failed; the batch continues
    AccountFailed { account: String, error: String },
    /// Batch complete
    Complete {
        succeeded: usize,
        failed: usize,
        skipped: usize,
    },
}

/// Result of a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Outcome of processing one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountOutcome {
    /// Output was written; `texts` is how many texts were aggregated.
    Written { texts: usize },
    /// Nothing was written.
    Skipped(String),
}

/// Service for annotating dataset accounts.
pub struct AnnotationService<A: TextAnnotator + 'static> {
    annotator: Arc<A>,
    dataset: Dataset,
}

impl<A: TextAnnotator + 'static> AnnotationService<A> {
    /// Create a new annotation service.
    pub fn new(annotator: A, dataset: Dataset) -> Self {
        Self {
            annotator: Arc::new(annotator),
            dataset,
        }
    }

    pub fn annotator(&self) -> &A {
        &self.annotator
    }

    /// Check if the annotation backend is available.
    pub async fn is_available(&self) -> bool {
        self.annotator.is_available().await
    }

    /// Run `job` over all accounts with up to `workers` accounts in flight.
    ///
    /// Per-account failures are reported as events and counted; they never
    /// abort the batch.
    pub async fn run(
        &self,
        job: AnnotationJob,
        workers: usize,
        force: bool,
        event_tx: mpsc::Sender<AnnotationEvent>,
    ) -> anyhow::Result<BatchResult> {
        let accounts = self.dataset.accounts()?;
        let total = accounts.len();

        let _ = event_tx
            .send(AnnotationEvent::Started {
                total_accounts: total,
            })
            .await;

        info!(
            "Annotating {} for {} accounts in {}",
            job.display_name(),
            total,
            self.dataset.root().display()
        );

        // Pop from the back, so reverse to keep alphabetical processing order.
        let work_queue = Arc::new(Mutex::new(
            accounts.into_iter().rev().collect::<Vec<Account>>(),
        ));
        let succeeded = Arc::new(AtomicUsize::new(0));
        let failed = Arc::new(AtomicUsize::new(0));
        let skipped = Arc::new(AtomicUsize::new(0));
        let semaphore = Arc::new(Semaphore::new(workers.max(1)));

        let mut handles = Vec::new();
        for _ in 0..workers.max(1) {
            let work_queue = work_queue.clone();
            let annotator = self.annotator.clone();
            let succeeded = succeeded.clone();
            let failed = failed.clone();
            let skipped = skipped.clone();
            let semaphore = semaphore.clone();
            let event_tx = event_tx.clone();

            let handle = tokio::spawn(async move {
                loop {
                    let Ok(_permit) = semaphore.acquire().await else {
                        break;
                    };

                    let account = {
                        let mut queue = work_queue.lock().await;
                        queue.pop()
                    };
                    let Some(account) = account else {
                        break;
                    };

                    let _ = event_tx
                        .send(AnnotationEvent::AccountStarted {
                            account: account.name.clone(),
                        })
                        .await;

                    let event = match process_account(annotator.as_ref(), job, &account, force)
                        .await
                    {
                        Ok(AccountOutcome::Written { texts }) => {
                            succeeded.fetch_add(1, Ordering::Relaxed);
                            AnnotationEvent::AccountCompleted {
                                account: account.name.clone(),
                                texts,
                            }
                        }
                        Ok(AccountOutcome::Skipped(reason)) => {
                            skipped.fetch_add(1, Ordering::Relaxed);
                            AnnotationEvent::AccountSkipped {
                                account: account.name.clone(),
                                reason,
                            }
                        }
                        Err(e) => {
                            warn!("{}: {}", account.name, e);
                            failed.fetch_add(1, Ordering::Relaxed);
                            AnnotationEvent::AccountFailed {
                                account: account.name.clone(),
                                error: e.to_string(),
                            }
                        }
                    };
                    let _ = event_tx.send(event).await;
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.await?;
        }

        let result = BatchResult {
            succeeded: succeeded.load(Ordering::Relaxed),
            failed: failed.load(Ordering::Relaxed),
            skipped: skipped.load(Ordering::Relaxed),
        };

        let _ = event_tx
            .send(AnnotationEvent::Complete {
                succeeded: result.succeeded,
                failed: result.failed,
                skipped: result.skipped,
            })
            .await;

        Ok(result)
    }
}

/// Process one account for `job`, honoring the resume policy.
pub async fn process_account<A: TextAnnotator + ?Sized>(
    annotator: &A,
    job: AnnotationJob,
    account: &Account,
    force: bool,
) -> Result<AccountOutcome, NlpError> {
    let output_path = job.output_path(account);
    if !force && output_path.exists() {
        return Ok(AccountOutcome::Skipped("already annotated".to_string()));
    }
    if !job.input_path(account).is_file() {
        return Ok(AccountOutcome::Skipped(format!(
            "no {}",
            job.input_path(account)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        )));
    }

    match job {
        AnnotationJob::Bio => annotate_bio(annotator, account).await,
        AnnotationJob::Captions => annotate_captions(annotator, account).await,
    }
}

/// Annotate an account biography and write `nlp.json`.
///
/// When the service fails on the text, nothing is written.
pub async fn annotate_bio<A: TextAnnotator + ?Sized>(
    annotator: &A,
    account: &Account,
) -> Result<AccountOutcome, NlpError> {
    let bio = match account.read_bio().await? {
        Some(text) if !text.trim().is_empty() => text,
        _ => return Ok(AccountOutcome::Skipped("empty biography".to_string())),
    };

    let Some(result) = annotate_text(annotator, &account.name, &bio).await? else {
        return Ok(AccountOutcome::Skipped("annotation failed upstream".to_string()));
    };

    write_json(&account.bio_output_path(), &result).await?;
    Ok(AccountOutcome::Written { texts: 1 })
}

/// Annotate every post caption of an account and write `didascalia_nlp.json`.
///
/// Posts keep their location, tagged users and alt text even when the caption
/// annotation fails upstream; only the `didascalia` entry is dropped.
pub async fn annotate_captions<A: TextAnnotator + ?Sized>(
    annotator: &A,
    account: &Account,
) -> Result<AccountOutcome, NlpError> {
    let posts = account.read_posts().await?;
    let mut document = CaptionDocument::default();
    let mut texts = 0;

    for post in &posts {
        let mut metadata: PictureMetadata = post.base_metadata();

        if let Some(text) = post.caption_text() {
            if let Some(nlp) = annotate_text(annotator, &account.name, text).await? {
                metadata.caption = Some(AnnotatedCaption {
                    text: text.to_string(),
                    nlp,
                });
                texts += 1;
            }
        }

        document.pictures.push(Picture { metadata });
    }

    write_json(&account.captions_output_path(), &document).await?;
    Ok(AccountOutcome::Written { texts })
}

/// Annotate and aggregate one text. `None` means the service failed on it.
async fn annotate_text<A: TextAnnotator + ?Sized>(
    annotator: &A,
    account: &str,
    text: &str,
) -> Result<Option<NlpResult>, NlpError> {
    match annotator.annotate(text).await? {
        AnnotationResponse::Structured(result) => Ok(Some(aggregate(&result))),
        AnnotationResponse::Failure(message) => {
            warn!("{}: annotation failed upstream: {}", account, message);
            Ok(None)
        }
    }
}

async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), NlpError> {
    let json = serde_json::to_vec(value)?;
    tokio::fs::write(path, json).await?;
    debug!("Wrote {}", path.display());
    Ok(())
}
