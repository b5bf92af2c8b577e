//! Bundle assembly: properties and manifest at the archive root, the data/
//! tree (articles and images) preserved beneath it.

use crate::manifest::{MANIFEST_FILE, PROPERTIES_FILE};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const BUNDLE_FILE: &str = "KnowledgeArticlesImport.zip";

pub fn write_bundle(workroot: &Path) -> Result<PathBuf> {
    let zip_path = workroot.join(BUNDLE_FILE);
    let file = File::create(&zip_path)
        .with_context(|| format!("failed to create {}", zip_path.display()))?;
    let mut zip = ZipWriter::new(file);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    add_file(&mut zip, &workroot.join(PROPERTIES_FILE), PROPERTIES_FILE, deflated)?;
    add_file(&mut zip, &workroot.join(MANIFEST_FILE), MANIFEST_FILE, deflated)?;

    let data_dir = workroot.join("data");
    for name in list_files(&data_dir, Some("html"))? {
        add_file(&mut zip, &data_dir.join(&name), &format!("data/{}", name), deflated)?;
    }

    let images_dir = data_dir.join("images");
    if images_dir.is_dir() {
        for name in list_files(&images_dir, None)? {
            add_file(
                &mut zip,
                &images_dir.join(&name),
                &format!("data/images/{}", name),
                deflated,
            )?;
        }
    }

    zip.finish().context("failed to finalize bundle")?;
    Ok(zip_path)
}

/// Direct children of `dir`, sorted for a deterministic archive layout.
fn list_files(dir: &Path, extension: Option<&str>) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let keep = match extension {
            Some(ext) => Path::new(&name)
                .extension()
                .is_some_and(|e| e.eq_ignore_ascii_case(ext)),
            None => true,
        };
        if keep {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

fn add_file(
    zip: &mut ZipWriter<File>,
    src: &Path,
    dest: &str,
    options: SimpleFileOptions,
) -> Result<()> {
    let bytes = fs::read(src).with_context(|| format!("failed to read {}", src.display()))?;
    zip.start_file(dest, options)
        .with_context(|| format!("failed to add {} to bundle", dest))?;
    zip.write_all(&bytes)?;
    Ok(())
}
