// src/form.rs
use crate::error::FormmarkError;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// The bytes of a form document that passed the file-type check.
#[derive(Debug, Clone)]
pub struct FormDocument {
    path: PathBuf,
    bytes: Arc<[u8]>,
}

impl FormDocument {
    /// Reads and validates the document at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FormmarkError> {
        let path = path.as_ref();
        check_extension(path)?;
        let bytes = fs::read(path)?;
        Self::from_bytes(path, bytes)
    }

    /// Validates bytes that were read elsewhere. `path` is only used in errors
    /// and logs.
    pub fn from_bytes<P: AsRef<Path>>(path: P, bytes: Vec<u8>) -> Result<Self, FormmarkError> {
        let path = path.as_ref().to_path_buf();
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(FormmarkError::InvalidFile {
                path,
                reason: "missing %PDF- header".to_string(),
            });
        }
        log::info!("Loaded form '{}' ({} bytes).", path.display(), bytes.len());
        Ok(Self {
            path,
            bytes: bytes.into(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }
}

fn check_extension(path: &Path) -> Result<(), FormmarkError> {
    let is_pdf = path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if is_pdf {
        Ok(())
    } else {
        Err(FormmarkError::InvalidFile {
            path: path.to_path_buf(),
            reason: "expected a .pdf file".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bytes_without_magic() {
        let err = FormDocument::from_bytes("order.pdf", b"PK\x03\x04".to_vec()).unwrap_err();
        assert!(matches!(err, FormmarkError::InvalidFile { .. }));
    }

    #[test]
    fn accepts_pdf_header() {
        let form = FormDocument::from_bytes("order.pdf", b"%PDF-1.7\n".to_vec()).unwrap();
        assert_eq!(form.path(), Path::new("order.pdf"));
        assert_eq!(form.bytes().len(), 9);
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(check_extension(Path::new("ORDER.PDF")).is_ok());
        assert!(check_extension(Path::new("order.docx")).is_err());
        assert!(check_extension(Path::new("order")).is_err());
    }
}
