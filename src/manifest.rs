//! Import bundle bookkeeping: the fixed properties file and the article
//! manifest CSV consumed by the knowledge-base importer.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub const PROPERTIES_FILE: &str = "content.properties";
pub const MANIFEST_FILE: &str = "KnowledgeArticlesImport.csv";

const PROPERTIES_BODY: &str = "CSVEncoding=UTF8\nRTAEncoding=UTF8\nCSVSeparator=,\n#DateFormat=yyyy-MM-dd\n";

/// One manifest row per successfully converted document.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleRecord {
    pub title: String,
    pub url_name: String,
    /// Bundle-root-relative path, e.g. `data/<slug>.html`
    pub content_path: String,
}

impl ArticleRecord {
    /// Derives title and URL name from the source filename stem: underscores
    /// become spaces in the title, and any whitespace becomes hyphens in the
    /// URL name.
    pub fn from_stem(stem: &str) -> Self {
        let title = stem.replace('_', " ");
        let url_name = title.split_whitespace().collect::<Vec<_>>().join("-");
        Self {
            title,
            url_name,
            content_path: format!("data/{}.html", stem),
        }
    }
}

pub fn write_properties(workroot: &Path) -> Result<()> {
    fs::write(workroot.join(PROPERTIES_FILE), PROPERTIES_BODY)
        .context("failed to write content.properties")
}

pub fn write_manifest(workroot: &Path, records: &[ArticleRecord]) -> Result<()> {
    let path = workroot.join(MANIFEST_FILE);
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("failed to create manifest {}", path.display()))?;

    writer.write_record(["Title", "Summary", "URLName", "channels", "Content__c"])?;
    for record in records {
        writer.write_record([
            record.title.as_str(),
            // The importer wants a summary; the title doubles as one.
            record.title.as_str(),
            record.url_name.as_str(),
            "application",
            record.content_path.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_derivation_from_stem() {
        let record = ArticleRecord::from_stem("Password_Reset_Guide");
        assert_eq!(record.title, "Password Reset Guide");
        assert_eq!(record.url_name, "Password-Reset-Guide");
        assert_eq!(record.content_path, "data/Password_Reset_Guide.html");
    }

    #[test]
    fn plain_stem_passes_through() {
        let record = ArticleRecord::from_stem("faq");
        assert_eq!(record.title, "faq");
        assert_eq!(record.url_name, "faq");
    }

    #[test]
    fn properties_file_has_the_fixed_four_lines() {
        let tmp = tempfile::tempdir().unwrap();
        write_properties(tmp.path()).unwrap();
        let body = fs::read_to_string(tmp.path().join(PROPERTIES_FILE)).unwrap();
        assert_eq!(
            body,
            "CSVEncoding=UTF8\nRTAEncoding=UTF8\nCSVSeparator=,\n#DateFormat=yyyy-MM-dd\n"
        );
    }

    #[test]
    fn manifest_row_count_matches_records() {
        let tmp = tempfile::tempdir().unwrap();
        let records = vec![
            ArticleRecord::from_stem("first_doc"),
            ArticleRecord::from_stem("second_doc"),
        ];
        write_manifest(tmp.path(), &records).unwrap();

        let body = fs::read_to_string(tmp.path().join(MANIFEST_FILE)).unwrap();
        let lines: Vec<_> = body.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Title,Summary,URLName,channels,Content__c");
        assert_eq!(lines[1], "first doc,first doc,first-doc,application,data/first_doc.html");
    }
}
