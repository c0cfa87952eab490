//! Render orchestrator
//!
//! Drives one UIF tree through validation, styling, the builders,
//! serialization and verification:
//!
//! ```text
//! Validating -> Styling -> RenderingTitle -> RenderingSections
//!            -> Serializing -> Verifying -> Done
//! ```
//!
//! Any failing step moves the renderer to [`RenderStage::Error`].

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use trialdoc_uif::UniversalDocument;

use crate::archive::OoxmlArchive;
use crate::error::{RenderError, Result};
use crate::styles::{DocumentStyles, StyleEngine};
use crate::verify::{verify_bytes, verify_file};
use crate::writer::DocxWriter;

/// Where a render is, or where it stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    Idle,
    Validating,
    Styling,
    RenderingTitle,
    RenderingSections,
    Serializing,
    Verifying,
    Done,
    Error,
}

/// Knobs for a render
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Reject trees that fail validation
    pub validate: bool,
    /// Wait after flushing a file before re-reading it
    pub settle_delay: Duration,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            validate: true,
            settle_delay: Duration::from_millis(50),
        }
    }
}

/// Facts about a finished render
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSummary {
    pub section_count: usize,
    pub content_block_count: usize,
    /// Size of the container in bytes
    pub byte_size: usize,
    /// Parts found by verification, sorted
    pub parts: Vec<String>,
}

/// Bytes of a verified container plus what went into it
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub bytes: Vec<u8>,
    pub styles: DocumentStyles,
    pub summary: RenderSummary,
}

/// Renders UIF trees to DOCX
#[derive(Debug)]
pub struct DocumentRenderer {
    options: RenderOptions,
    stage: RenderStage,
}

impl Default for DocumentRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentRenderer {
    pub fn new() -> Self {
        Self::with_options(RenderOptions::default())
    }

    pub fn with_options(options: RenderOptions) -> Self {
        Self {
            options,
            stage: RenderStage::Idle,
        }
    }

    /// Stage reached by the last render
    pub fn stage(&self) -> RenderStage {
        self.stage
    }

    fn enter(&mut self, stage: RenderStage) {
        log::debug!("render stage {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    /// Render to an in-memory container and verify it
    pub fn render_to_bytes(&mut self, doc: &UniversalDocument) -> Result<RenderOutput> {
        let result = self.render_inner(doc);
        self.settle(result)
    }

    /// Render to a file, flush it to disk and verify what was written
    pub fn render_to_file(
        &mut self,
        doc: &UniversalDocument,
        path: impl AsRef<Path>,
    ) -> Result<RenderOutput> {
        let path = path.as_ref();
        let result = self.render_inner(doc).and_then(|mut output| {
            self.enter(RenderStage::Serializing);
            write_synced(path, &output.bytes)?;
            std::thread::sleep(self.options.settle_delay);

            self.enter(RenderStage::Verifying);
            output.summary.parts = verify_file(path)?;
            Ok(output)
        });
        let output = self.settle(result)?;
        log::info!(
            "rendered '{}' to {} ({} bytes)",
            doc.title,
            path.display(),
            output.summary.byte_size
        );
        Ok(output)
    }

    fn settle(&mut self, result: Result<RenderOutput>) -> Result<RenderOutput> {
        match result {
            Ok(output) => {
                self.enter(RenderStage::Done);
                Ok(output)
            }
            Err(e) => {
                log::debug!("render failed in {:?}: {}", self.stage, e);
                self.stage = RenderStage::Error;
                Err(e)
            }
        }
    }

    fn render_inner(&mut self, doc: &UniversalDocument) -> Result<RenderOutput> {
        self.enter(RenderStage::Validating);
        if self.options.validate {
            let report = trialdoc_validate::validate(doc);
            for warning in report.warnings() {
                log::warn!("{}", warning.render_message());
            }
            if !report.is_valid() {
                return Err(RenderError::Validation {
                    errors: report.error_messages(),
                });
            }
        }

        self.enter(RenderStage::Styling);
        let mut engine = StyleEngine::new();
        engine
            .apply_styling(&doc.styling)
            .setup_page_layout(&doc.page_setup)
            .apply_header_footer(&doc.header_footer);
        let styles = engine.finish();

        let archive = self.build(doc, &styles)?;

        self.enter(RenderStage::Serializing);
        let bytes = archive.to_bytes()?;

        self.enter(RenderStage::Verifying);
        let parts = verify_bytes(&bytes)?;

        let summary = RenderSummary {
            section_count: doc.count_sections(),
            content_block_count: doc.count_content_blocks(),
            byte_size: bytes.len(),
            parts,
        };
        Ok(RenderOutput {
            bytes,
            styles,
            summary,
        })
    }

    fn build(&mut self, doc: &UniversalDocument, styles: &DocumentStyles) -> Result<OoxmlArchive> {
        let mut writer = DocxWriter::new(styles);

        self.enter(RenderStage::RenderingTitle);
        writer.write_title(&doc.title)?;

        self.enter(RenderStage::RenderingSections);
        for section in &doc.sections {
            writer.write_section(section)?;
        }
        writer.finish(doc)
    }
}

/// Write, flush and fsync; a failed fsync is logged, not fatal
fn write_synced(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    if let Err(e) = file.sync_all() {
        log::warn!("Could not sync {} to disk: {}", path.display(), e);
    }
    Ok(())
}

/// Render with default options
pub fn render_to_bytes(doc: &UniversalDocument) -> Result<RenderOutput> {
    DocumentRenderer::new().render_to_bytes(doc)
}
