//! `lcforge status`: ask a running server for its health report.

use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::terminal_output::{note_error, note_success, render_table, Column};

pub async fn run(base_url: &str) -> Result<bool> {
    let url = format!("{}/api/health", base_url.trim_end_matches('/'));
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .context("Failed to build HTTP client")?;

    let resp = match client.get(&url).send().await {
        Ok(resp) => resp,
        Err(e) => {
            note_error(&format!("LcForge is not running at {base_url} ({e})"));
            return Ok(false);
        }
    };
    if !resp.status().is_success() {
        note_error(&format!("Health check returned {}", resp.status()));
        return Ok(false);
    }

    let body: Value = resp.json().await.context("Health response was not JSON")?;
    note_success(&format!("LcForge is running at {base_url}"));
    print!("{}", render_table(&[Column::left("Key"), Column::left("Value")], &health_rows(&body)));
    Ok(true)
}

fn health_rows(body: &Value) -> Vec<Vec<String>> {
    const KEYS: [(&str, &str); 6] = [
        ("version", "Version"),
        ("ocrProvider", "OCR provider"),
        ("engineProvider", "Engine provider"),
        ("model", "Model"),
        ("sessions", "Open sessions"),
        ("uptimeSeconds", "Uptime (s)"),
    ];
    KEYS.iter()
        .filter_map(|(key, label)| {
            let value = match body.get(*key)? {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some(vec![label.to_string(), value])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn picks_known_keys_in_order() {
        let body = json!({ "model": "gpt-4", "version": "0.1.0", "sessions": 2, "extra": true });
        let rows = health_rows(&body);
        assert_eq!(
            rows,
            vec![
                vec!["Version".to_string(), "0.1.0".to_string()],
                vec!["Model".to_string(), "gpt-4".to_string()],
                vec!["Open sessions".to_string(), "2".to_string()],
            ]
        );
    }
}
