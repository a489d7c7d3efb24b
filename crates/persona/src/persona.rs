//! The identity the assistant speaks for, and the documents it answers from
use lopdf::Document;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::ContextError;
use crate::prompt_template::{load_prompt, load_prompt_file};

const SYSTEM_PROMPT: &str = include_str!("prompts/system.md");

/// Name, background summary and profile text of the person the assistant represents.
///
/// Built once at startup and shared read-only by every conversation.
#[derive(Debug, Clone, Serialize)]
pub struct Persona {
    name: String,
    summary: String,
    profile: String,
    #[serde(skip)]
    template: Option<PathBuf>,
}

impl Persona {
    pub fn new<N, S, P>(name: N, summary: S, profile: P) -> Self
    where
        N: Into<String>,
        S: Into<String>,
        P: Into<String>,
    {
        Self {
            name: name.into(),
            summary: summary.into(),
            profile: profile.into(),
            template: None,
        }
    }

    /// Load the persona from a PDF profile export and a plain-text summary.
    ///
    /// Profile text is extracted page by page and concatenated in page order.
    pub fn load(
        name: impl Into<String>,
        profile_pdf: impl AsRef<Path>,
        summary_txt: impl AsRef<Path>,
    ) -> Result<Self, ContextError> {
        let profile = read_pdf_text(profile_pdf.as_ref())?;
        let summary_path = summary_txt.as_ref();
        let summary = fs::read_to_string(summary_path).map_err(|source| ContextError::Read {
            path: summary_path.display().to_string(),
            source,
        })?;

        tracing::info!(
            profile_chars = profile.len(),
            summary_chars = summary.len(),
            "Loaded persona context"
        );
        Ok(Self::new(name, summary, profile))
    }

    /// Render the system prompt from a tera template file instead of the built-in one
    pub fn with_template(mut self, template: impl Into<PathBuf>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn system_prompt(&self) -> Result<String, ContextError> {
        let prompt = match &self.template {
            Some(path) => load_prompt_file(path, self)?,
            None => load_prompt(SYSTEM_PROMPT, self)?,
        };
        Ok(prompt)
    }
}

fn read_pdf_text(path: &Path) -> Result<String, ContextError> {
    let bytes = fs::read(path).map_err(|source| ContextError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let document = Document::load_mem(&bytes).map_err(|source| ContextError::Pdf {
        path: path.display().to_string(),
        source,
    })?;

    let mut text = String::new();
    // get_pages is keyed by page number, so iteration is in page order
    for page_number in document.get_pages().keys() {
        match document.extract_text(&[*page_number]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => {
                tracing::warn!("No text extracted from page {}: {}", page_number, e);
            }
        }
    }
    Ok(text)
}
