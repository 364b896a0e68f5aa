use thiserror::Error;

use crate::error::{SessionError, SiteError, StorageError, TranslateError};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Site(#[from] SiteError),

    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Cover download from '{url}' failed after {attempts} attempts")]
    CoverRetriesExhausted { url: String, attempts: u32 },
}

impl PipelineError {
    /// True when the failure means the browser session should be discarded.
    pub fn poisons_session(&self) -> bool {
        match self {
            PipelineError::Session(err) => err.poisons_session(),
            PipelineError::Site(SiteError::Session(err)) => err.poisons_session(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_poison_through_site_wrapper() {
        let err = PipelineError::Site(SiteError::Session(SessionError::Protocol {
            error: "invalid session id".to_string(),
            message: "session deleted".to_string(),
        }));
        assert!(err.poisons_session());
    }

    #[test]
    fn page_level_failures_do_not_poison() {
        let err = PipelineError::Site(SiteError::ElementMissing {
            what: "poster thumbnail".to_string(),
        });
        assert!(!err.poisons_session());

        let exhausted = PipelineError::CoverRetriesExhausted {
            url: "https://images.example/cover.png".to_string(),
            attempts: 3,
        };
        assert!(!exhausted.poisons_session());
    }
}
