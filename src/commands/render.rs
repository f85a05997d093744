//! Render a rich-text JSON file to HTML

use anyhow::Result;
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::render::{to_plain_text, Renderer};

/// Render a block array (or an object with a `body` array) read from `path`
pub fn run(renderer: &Renderer, path: &Path, plain: bool) -> Result<()> {
    let content = fs::read_to_string(path)?;
    println!("{}", render_str(renderer, &content, plain)?);
    Ok(())
}

pub fn render_str(renderer: &Renderer, content: &str, plain: bool) -> Result<String> {
    let value: Value = serde_json::from_str(content)?;
    let blocks = match value {
        Value::Array(blocks) => blocks,
        Value::Object(mut doc) => match doc.remove("body") {
            Some(Value::Array(blocks)) => blocks,
            _ => anyhow::bail!("Expected an array of blocks or an object with a body array"),
        },
        _ => anyhow::bail!("Expected an array of blocks or an object with a body array"),
    };
    tracing::debug!("Rendering {} blocks", blocks.len());

    if plain {
        Ok(to_plain_text(&blocks))
    } else {
        Ok(renderer.render_html(&blocks))
    }
}
