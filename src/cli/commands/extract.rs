//! Offline contact extraction command.

use std::path::Path;

use anyhow::Context;
use tokio::io::AsyncReadExt;

use crate::extract::extract_contacts;

/// Print the contact fields found in a text file (or stdin) as JSON.
pub async fn cmd_extract(file: Option<&Path>) -> anyhow::Result<()> {
    let text = match file {
        Some(path) if path != Path::new("-") => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        _ => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read stdin")?;
            text
        }
    };

    let contacts = extract_contacts(&text);
    println!("{}", serde_json::to_string_pretty(&contacts)?);
    Ok(())
}
