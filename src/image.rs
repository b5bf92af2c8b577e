use crate::error::ConvertError;
use std::fs;
use std::path::{Path, PathBuf};

/// A deduplicated image asset on disk. Identity is the content hash: two
/// byte-identical images anywhere in a batch share one file.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedImage {
    pub content_hash: String,
    pub byte_length: usize,
    pub extension: String,
    /// Path relative to the bundle root, e.g. `data/images/<hash>.png`
    pub rel_path: String,
}

/// Directory holding extracted image assets for one batch.
pub struct AssetStore {
    dir: PathBuf,
}

impl AssetStore {
    pub fn create(workroot: &Path) -> Result<Self, ConvertError> {
        let dir = workroot.join("data").join("images");
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Writes the bytes under a content-derived filename. The filename is a
    /// function of the bytes, so if it already exists the write is skipped;
    /// an overwrite would store identical content, which keeps the
    /// check-then-write race-free within a batch.
    pub fn store(
        &self,
        bytes: &[u8],
        source_path: Option<&str>,
    ) -> Result<ExtractedImage, ConvertError> {
        let content_hash = fingerprint(bytes);
        let extension = detect_extension(source_path);
        let filename = format!("{}.{}", content_hash, extension);
        let dest = self.dir.join(&filename);

        if !dest.exists() {
            fs::write(&dest, bytes)?;
        }

        Ok(ExtractedImage {
            content_hash,
            byte_length: bytes.len(),
            extension,
            rel_path: format!("data/images/{}", filename),
        })
    }
}

/// 128-bit content fingerprint, hex encoded.
fn fingerprint(bytes: &[u8]) -> String {
    let hex = blake3::hash(bytes).to_hex();
    hex.as_str()[..32].to_string()
}

/// Extension from the media path inside the package. A missing or unknown
/// one falls back to a generic image extension rather than failing the
/// conversion.
fn detect_extension(source_path: Option<&str>) -> String {
    if let Some(source_path) = source_path {
        if let Some(ext) = Path::new(source_path).extension().and_then(|e| e.to_str()) {
            if !ext.is_empty() {
                return ext.to_ascii_lowercase();
            }
        }
    }

    "png".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_STUB: &[u8] = b"\x89PNG\r\n\x1a\nstub-bytes";

    #[test]
    fn identical_bytes_share_one_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = AssetStore::create(tmp.path()).unwrap();

        let first = store.store(PNG_STUB, Some("word/media/image1.png")).unwrap();
        let second = store.store(PNG_STUB, Some("word/media/image2.png")).unwrap();
        assert_eq!(first.rel_path, second.rel_path);

        let images_dir = tmp.path().join("data").join("images");
        let count = fs::read_dir(images_dir).unwrap().count();
        assert_eq!(count, 1);
    }

    #[test]
    fn distinct_bytes_get_distinct_files() {
        let tmp = tempfile::tempdir().unwrap();
        let store = AssetStore::create(tmp.path()).unwrap();

        let a = store.store(b"first", Some("word/media/image1.png")).unwrap();
        let b = store.store(b"second", Some("word/media/image2.png")).unwrap();
        assert_ne!(a.content_hash, b.content_hash);

        let images_dir = tmp.path().join("data").join("images");
        assert_eq!(fs::read_dir(images_dir).unwrap().count(), 2);
    }

    #[test]
    fn stored_file_exists_at_rel_path() {
        let tmp = tempfile::tempdir().unwrap();
        let store = AssetStore::create(tmp.path()).unwrap();

        let img = store.store(PNG_STUB, Some("word/media/image1.png")).unwrap();
        assert!(tmp.path().join(&img.rel_path).is_file());
        assert_eq!(img.byte_length, PNG_STUB.len());
    }

    #[test]
    fn fingerprint_is_128_bits_of_hex() {
        assert_eq!(fingerprint(b"abc").len(), 32);
        assert_eq!(fingerprint(b"abc"), fingerprint(b"abc"));
        assert_ne!(fingerprint(b"abc"), fingerprint(b"abd"));
    }

    #[test]
    fn extension_comes_from_the_media_path() {
        assert_eq!(detect_extension(Some("word/media/image1.JPEG")), "jpeg");
        assert_eq!(detect_extension(Some("word/media/chart.gif")), "gif");
    }

    #[test]
    fn missing_extension_falls_back_to_generic_image() {
        assert_eq!(detect_extension(None), "png");
        assert_eq!(detect_extension(Some("word/media/noext")), "png");
    }
}
