//! Output operations for extraction results.
//!
//! Snapshots are written as JSON to a file or to stdout.

use dbintrospect_core::{IntrospectError, Result, SchemaSnapshot};
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Serializes a snapshot, pretty-printed unless `compact` is set.
///
/// The rendered document always ends with a newline.
pub fn render(snapshot: &SchemaSnapshot, compact: bool) -> Result<String> {
    let rendered = if compact {
        serde_json::to_string(snapshot)
    } else {
        serde_json::to_string_pretty(snapshot)
    };

    let mut json_data = rendered.map_err(|e| IntrospectError::Serialization {
        context: "JSON serialization of schema snapshot".to_string(),
        source: e,
    })?;
    json_data.push('\n');
    Ok(json_data)
}

/// Writes a snapshot to `output_path`, or to stdout when no path is given.
pub async fn write_snapshot(
    snapshot: &SchemaSnapshot,
    output_path: Option<&Path>,
    compact: bool,
) -> Result<()> {
    let json_data = render(snapshot, compact)?;
    match output_path {
        Some(path) => save_json(&json_data, path).await,
        None => print_json(&json_data).await,
    }
}

/// Saves JSON data to file.
pub async fn save_json(json_data: &str, output_path: &Path) -> Result<()> {
    tokio::fs::write(output_path, json_data)
        .await
        .map_err(|e| IntrospectError::Io {
            context: format!("Failed to write to {}", output_path.display()),
            source: e,
        })
}

async fn print_json(json_data: &str) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(json_data.as_bytes())
        .await
        .map_err(|e| IntrospectError::Io {
            context: "Failed to write to stdout".to_string(),
            source: e,
        })?;
    stdout.flush().await.map_err(|e| IntrospectError::Io {
        context: "Failed to flush stdout".to_string(),
        source: e,
    })
}
