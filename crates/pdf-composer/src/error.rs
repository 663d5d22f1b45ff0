use formmark_traits::AuthoringError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposerError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Invalid page tree: {0}")]
    PageTree(String),

    #[error("{0}")]
    Other(String),
}

impl ComposerError {
    pub(crate) fn into_draw_error(self, page: usize) -> AuthoringError {
        AuthoringError::Draw {
            page,
            message: self.to_string(),
        }
    }
}
