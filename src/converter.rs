//! Batch orchestration: one conversion runs start-to-finish per document, a
//! failed document is recorded and skipped, and the surviving articles are
//! written out, manifested, and zipped.

use crate::cli::Cli;
use crate::content::{self, BuildOptions};
use crate::docx_reader::DocxData;
use crate::error::ConvertError;
use crate::html;
use crate::image::AssetStore;
use crate::manifest::{self, ArticleRecord};
use crate::package;
use anyhow::{bail, Context, Result};
use log::{info, warn};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of converting one source document.
#[derive(Debug)]
pub struct ConversionResult {
    /// Source filename without its .docx extension; article and manifest
    /// names derive from it.
    pub stem: String,
    pub html: String,
    pub diagnostics: Vec<String>,
}

#[derive(Debug)]
pub struct BatchSummary {
    pub converted: Vec<String>,
    pub skipped: Vec<String>,
    /// Every warning recorded during the batch, also on overall success.
    pub diagnostics: Vec<String>,
    pub bundle: Option<PathBuf>,
}

pub fn run(cli: &Cli) -> Result<()> {
    if cli.clean {
        clean_workroot(&cli.output)?;
        info!("cleared working root {}", cli.output.display());
        if cli.inputs.is_empty() {
            return Ok(());
        }
    }

    let options = BuildOptions {
        keep_empty_paragraphs: cli.keep_empty_paragraphs,
        sibling_images: cli.sibling_images,
    };
    let summary = convert_batch(&cli.inputs, &cli.output, options, !cli.no_zip)?;

    eprintln!(
        "Converted {} of {} documents to {}",
        summary.converted.len(),
        summary.converted.len() + summary.skipped.len(),
        cli.output.display()
    );
    if let Some(ref bundle) = summary.bundle {
        eprintln!("Bundle: {}", bundle.display());
    }
    Ok(())
}

pub fn convert_batch(
    inputs: &[PathBuf],
    workroot: &Path,
    options: BuildOptions,
    bundle: bool,
) -> Result<BatchSummary> {
    let data_dir = workroot.join("data");
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create working root {}", workroot.display()))?;
    let store = AssetStore::create(workroot)?;

    let mut records: Vec<ArticleRecord> = Vec::new();
    let mut converted = Vec::new();
    let mut skipped = Vec::new();
    let mut diagnostics = Vec::new();
    let mut used_stems: HashSet<String> = HashSet::new();

    for path in inputs {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let is_docx = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("docx"));
        if !is_docx {
            warn!("{}: skipped, not a .docx file", name);
            diagnostics.push(format!("{}: skipped, not a .docx file", name));
            skipped.push(name);
            continue;
        }

        match convert_document(path, &store, options) {
            Ok(result) => {
                // Same filename from two directories would overwrite the
                // first article; give the later one a suffixed name.
                let mut stem = result.stem.clone();
                if !used_stems.insert(stem.clone()) {
                    let mut n = 2;
                    stem = loop {
                        let candidate = format!("{}-{}", result.stem, n);
                        if used_stems.insert(candidate.clone()) {
                            break candidate;
                        }
                        n += 1;
                    };
                    warn!(
                        "{}: article name '{}' already taken; writing as '{}'",
                        name, result.stem, stem
                    );
                    diagnostics.push(format!(
                        "{}: article name '{}' already taken; written as '{}'",
                        name, result.stem, stem
                    ));
                }
                let html_filename = format!("{}.html", stem);
                let dest = data_dir.join(&html_filename);
                fs::write(&dest, &result.html)
                    .with_context(|| format!("failed to write article {}", dest.display()))?;
                for diagnostic in &result.diagnostics {
                    warn!("{}: {}", name, diagnostic);
                    diagnostics.push(format!("{}: {}", name, diagnostic));
                }
                records.push(ArticleRecord::from_stem(&stem));
                info!("converted {} -> data/{}", name, html_filename);
                converted.push(name);
            }
            // Asset or output write failures are fatal for the whole batch.
            Err(ConvertError::Io(err)) => {
                return Err(err)
                    .with_context(|| format!("write failure while converting {}", name));
            }
            Err(err) => {
                warn!("{}: {}; document skipped", name, err);
                diagnostics.push(format!("{}: {}; document skipped", name, err));
                skipped.push(name);
            }
        }
    }

    if records.is_empty() {
        bail!(
            "no output produced: none of the {} input document(s) could be converted",
            inputs.len()
        );
    }

    manifest::write_properties(workroot)?;
    manifest::write_manifest(workroot, &records)?;
    let bundle_path = if bundle {
        Some(package::write_bundle(workroot)?)
    } else {
        None
    };

    Ok(BatchSummary {
        converted,
        skipped,
        diagnostics,
        bundle: bundle_path,
    })
}

fn convert_document(
    path: &Path,
    store: &AssetStore,
    options: BuildOptions,
) -> Result<ConversionResult, ConvertError> {
    let doc = DocxData::open(path)?;
    let extraction = doc.extract()?;

    let mut diagnostics = Vec::new();
    let nodes = match content::build_tree(&extraction, store, options, &mut diagnostics) {
        Ok(nodes) => nodes,
        Err(ConvertError::Serialization(reason)) => {
            diagnostics.push(format!(
                "structure could not be rendered ({}); fell back to plain text",
                reason
            ));
            content::plain_text_nodes(&extraction.blocks)
        }
        Err(err) => return Err(err),
    };

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let title = stem.replace('_', " ");
    let html = html::serialize(&nodes, &title);

    Ok(ConversionResult {
        stem,
        html,
        diagnostics,
    })
}

/// Wipes the working root back to empty. The root itself is kept.
pub fn clean_workroot(workroot: &Path) -> Result<()> {
    if !workroot.exists() {
        return Ok(());
    }
    let entries = fs::read_dir(workroot)
        .with_context(|| format!("failed to read working root {}", workroot.display()))?;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let removed = if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.with_context(|| format!("failed to remove {}", path.display()))?;
    }
    Ok(())
}
