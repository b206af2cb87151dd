//! Batch annotation and server status commands.

use std::sync::Arc;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Settings;
use crate::corenlp::{CoreNlpClient, TextAnnotator};
use crate::dataset::Dataset;
use crate::services::{AnnotationEvent, AnnotationJob, AnnotationService};

use super::helpers::truncate;

/// Annotate every account of the dataset for `job`.
pub async fn cmd_annotate(
    settings: &Settings,
    job: AnnotationJob,
    workers: Option<usize>,
    force: bool,
) -> anyhow::Result<()> {
    use tokio::sync::mpsc;

    let dataset = match Dataset::open(&settings.dataset_path) {
        Ok(dataset) => dataset,
        Err(e) => {
            println!("{} {}", style("✗").red(), e);
            println!("  Pass --dataset or set DATASET_PATH");
            return Ok(());
        }
    };

    let client = CoreNlpClient::new(settings.corenlp.clone())?;
    let service = AnnotationService::new(client, dataset);

    if !service.is_available().await {
        println!(
            "{} CoreNLP server not available at {}",
            style("✗").red(),
            settings.corenlp.endpoint
        );
        println!("  Start it with: java -mx4g edu.stanford.nlp.pipeline.StanfordCoreNLPServer -port 9000");
        return Ok(());
    }

    println!(
        "{} Connected to {} at {}",
        style("✓").green(),
        service.annotator().display_name(),
        settings.corenlp.endpoint
    );

    let workers = workers.unwrap_or(settings.workers).max(1);
    println!(
        "{} Annotating {} with {} workers{}",
        style("→").cyan(),
        job.display_name(),
        workers,
        if force { " (forced)" } else { "" }
    );

    // Create event channel for progress tracking
    let (event_tx, mut event_rx) = mpsc::channel::<AnnotationEvent>(100);

    // State for progress bar
    let pb = Arc::new(tokio::sync::Mutex::new(None::<ProgressBar>));
    let pb_clone = pb.clone();

    // Spawn event handler for UI
    let event_handler = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                AnnotationEvent::Started { total_accounts } => {
                    let progress = ProgressBar::new(total_accounts as u64);
                    progress.set_style(
                        ProgressStyle::default_bar()
                            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
                            .unwrap_or_else(|_| ProgressStyle::default_bar())
                            .progress_chars("█▓░"),
                    );
                    progress.set_message("Annotating...");
                    *pb_clone.lock().await = Some(progress);
                }
                AnnotationEvent::AccountStarted { account } => {
                    if let Some(ref progress) = *pb_clone.lock().await {
                        progress.set_message(truncate(&account, 40));
                    }
                }
                AnnotationEvent::AccountCompleted { .. } => {
                    if let Some(ref progress) = *pb_clone.lock().await {
                        progress.inc(1);
                    }
                }
                AnnotationEvent::AccountSkipped { account, reason } => {
                    if let Some(ref progress) = *pb_clone.lock().await {
                        if reason != "already annotated" {
                            progress.println(format!(
                                "{} {}: {}",
                                style("!").yellow(),
                                account,
                                reason
                            ));
                        }
                        progress.inc(1);
                    }
                }
                AnnotationEvent::AccountFailed { account, error } => {
                    if let Some(ref progress) = *pb_clone.lock().await {
                        progress.println(format!("{} {}: {}", style("✗").red(), account, error));
                        progress.inc(1);
                    }
                }
                AnnotationEvent::Complete {
                    succeeded,
                    failed,
                    skipped,
                } => {
                    if let Some(ref progress) = *pb_clone.lock().await {
                        progress.finish_and_clear();
                    }
                    *pb_clone.lock().await = None;

                    println!(
                        "{} Annotation complete: {} written, {} failed",
                        style("✓").green(),
                        succeeded,
                        failed
                    );
                    if skipped > 0 {
                        println!("  {} {} accounts skipped", style("→").dim(), skipped);
                    }
                }
            }
        }
    });

    let result = service.run(job, workers, force, event_tx).await;

    // Wait for event handler to finish
    let _ = event_handler.await;

    result.map(|_| ())
}

/// Report whether the CoreNLP server is reachable.
pub async fn cmd_status(settings: &Settings) -> anyhow::Result<()> {
    let client = CoreNlpClient::new(settings.corenlp.clone())?;

    println!("{}", style("CoreNLP").bold());
    println!("  {:<12} {}", "Endpoint:", settings.corenlp.endpoint);
    println!("  {:<12} {}", "Annotators:", settings.corenlp.annotators);
    println!("  {:<12} {} ms", "Timeout:", settings.corenlp.timeout_ms);

    if client.is_available().await {
        println!("  {:<12} {}", "Status:", style("ready").green());
    } else {
        println!("  {:<12} {}", "Status:", style("unreachable").red());
    }

    println!();
    println!("{}", style("Dataset").bold());
    println!("  {:<12} {}", "Path:", settings.dataset_path.display());
    match Dataset::open(&settings.dataset_path).and_then(|d| d.accounts()) {
        Ok(accounts) => println!("  {:<12} {}", "Accounts:", accounts.len()),
        Err(_) => println!("  {:<12} {}", "Accounts:", style("missing").yellow()),
    }
    println!("  {:<12} {}", "Workers:", settings.workers);

    Ok(())
}
