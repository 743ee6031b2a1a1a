//! `lcforge map`: run the field mapper over raw text.

use std::path::Path;

use anyhow::{Context, Result};
use lcforge_core::{merge, FieldRecord};
use tokio::io::AsyncReadExt;

use crate::runtime::Runtime;
use crate::terminal_output::{note_error, note_success, render_form};

async fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

/// Returns whether the mapping produced a usable result.
pub async fn run(runtime: &Runtime, file: Option<&Path>, json: bool) -> Result<bool> {
    let text = read_input(file).await?;
    let mapper = runtime.mapper();
    let attempt = mapper.map(&text, None).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&attempt)?);
        return Ok(attempt.failure().is_none());
    }

    if let Some(err) = attempt.failure() {
        note_error(&err.to_string());
        return Ok(false);
    }
    if let Some(partial) = attempt.partial() {
        note_success(&format!("Mapped {} field(s)", partial.len()));
        print!(
            "{}",
            render_form(&merge(&FieldRecord::new(), partial), &partial.fields())
        );
    }
    Ok(true)
}
