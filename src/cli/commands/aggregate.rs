//! Single-text commands: offline aggregation and ad-hoc annotation.

use std::path::Path;

use console::style;

use crate::config::Settings;
use crate::corenlp::{CoreNlpClient, TextAnnotator};
use crate::nlp::{aggregate_response, AnnotationResponse};

use super::helpers::to_json;

/// Aggregate a saved CoreNLP response and print the result.
pub async fn cmd_aggregate(file: &Path, pretty: bool) -> anyhow::Result<()> {
    let contents = tokio::fs::read_to_string(file)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", file.display(), e))?;

    let response = AnnotationResponse::from_json(&contents)?;
    let result = aggregate_response(&response)?;

    println!("{}", to_json(&result, pretty)?);
    Ok(())
}

/// Send one text to the CoreNLP server and print the aggregated result.
pub async fn cmd_annotate_text(settings: &Settings, text: &str, pretty: bool) -> anyhow::Result<()> {
    let client = CoreNlpClient::new(settings.corenlp.clone())?;

    let response = client.annotate(text).await?;
    if let AnnotationResponse::Failure(ref message) = response {
        eprintln!("{} CoreNLP failed on the text: {}", style("✗").red(), message);
        return Ok(());
    }
    let result = aggregate_response(&response)?;

    println!("{}", to_json(&result, pretty)?);
    Ok(())
}
