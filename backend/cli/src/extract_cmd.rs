//! `lcforge extract`: one upload through a fresh session.

use std::path::Path;

use anyhow::{Context, Result};
use lcforge_autofill::SubmitOutcome;
use lcforge_core::ImageUpload;

use crate::runtime::Runtime;
use crate::terminal_output::{note_error, note_info, note_success, render_form};

/// Returns whether the upload merged.
pub async fn run(runtime: &Runtime, image: &Path, json: bool) -> Result<bool> {
    let bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("Failed to read image: {}", image.display()))?;
    let filename = image.file_name().map(|n| n.to_string_lossy().into_owned());

    let session = runtime.session().await?;
    let outcome = session.submit(ImageUpload::new(bytes, filename)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(outcome.is_merged());
    }

    match &outcome {
        SubmitOutcome::Merged {
            form,
            updated,
            noop,
            tier,
            ..
        } => {
            if *noop {
                note_info("No fields could be filled from this document");
            } else {
                note_success(&format!("Filled {} field(s) ({tier:?})", updated.len()));
            }
            print!("{}", render_form(form, updated));
        }
        SubmitOutcome::Failed(info) => note_error(&info.message),
    }
    Ok(outcome.is_merged())
}
