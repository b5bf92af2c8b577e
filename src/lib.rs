//! docx2kb converts batches of DOCX documents into a knowledge-base import
//! bundle: one HTML article per document, deduplicated image assets, a CSV
//! manifest, a properties file, and a ZIP combining all of it.

pub mod cli;
pub mod content;
pub mod converter;
pub mod docx_reader;
pub mod error;
pub mod html;
pub mod image;
pub mod manifest;
pub mod package;

pub use content::{BuildOptions, ContentNode};
pub use converter::{convert_batch, BatchSummary};
pub use error::ConvertError;
