//! Informational HTML page served at `/`

use rust_embed::Embed;
use serde::Serialize;
use tera::Tera;
use thiserror::Error;

use crate::core::factors::{DURATION_F3, SPECIES_F1};
use crate::core::report::GENERAL_CAVEATS;
use crate::server::request::FIELDS;

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

const INDEX_TEMPLATE: &str = "index.html.tera";

#[derive(Debug, Error)]
pub enum PageError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Template rendering error: {0}")]
    RenderError(String),
}

#[derive(Serialize)]
struct FactorRow {
    key: &'static str,
    value: f64,
}

fn rows(table: &[(&'static str, f64)]) -> Vec<FactorRow> {
    table
        .iter()
        .map(|(key, value)| FactorRow { key, value: *value })
        .collect()
}

/// Embedded page templates
pub struct Pages {
    tera: Tera,
}

impl Pages {
    /// Load the embedded templates
    pub fn new() -> Result<Self, PageError> {
        let mut tera = Tera::default();

        for file in EmbeddedTemplates::iter() {
            let filename = file.as_ref();
            if let Some(content) = EmbeddedTemplates::get(filename) {
                if let Ok(template_str) = std::str::from_utf8(&content.data) {
                    tera.add_raw_template(filename, template_str)
                        .map_err(|e| PageError::RenderError(e.to_string()))?;
                }
            }
        }

        if !tera.get_template_names().any(|n| n == INDEX_TEMPLATE) {
            return Err(PageError::NotFound(INDEX_TEMPLATE.to_string()));
        }

        Ok(Self { tera })
    }

    /// Render the landing page
    pub fn index(&self) -> Result<String, PageError> {
        let mut context = tera::Context::new();
        context.insert("version", env!("CARGO_PKG_VERSION"));
        context.insert("fields", FIELDS);
        context.insert("species", &rows(SPECIES_F1));
        context.insert("durations", &rows(DURATION_F3));
        context.insert("caveats", GENERAL_CAVEATS);

        self.tera
            .render(INDEX_TEMPLATE, &context)
            .map_err(|e| PageError::RenderError(e.to_string()))
    }
}
