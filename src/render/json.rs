//! JSON renderer — the descriptors as serialized by serde.
//!
//! This is the form an external serializer or validator consumes.

use crate::render::Renderer;
use anyhow::{Context, Result};
use modeldoc::ModelClass;

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, models: &[ModelClass]) -> Result<String> {
        let mut out =
            serde_json::to_string_pretty(models).context("failed to serialize descriptors")?;
        out.push('\n');
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}
