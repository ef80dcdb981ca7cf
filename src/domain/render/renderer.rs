use std::fmt::Debug;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;

use super::MailerDocument;
use crate::domain::DomainError;

/// A per-client document produced by the renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedMailer {
    pub index: usize,
    pub path: PathBuf,
}

/// Turns mailer documents into artefacts and combines them into one batch file
#[async_trait]
pub trait MailerRenderer: Send + Sync + Debug {
    /// Render the document for the `index`-th matched client
    async fn render(
        &self,
        index: usize,
        document: &MailerDocument,
    ) -> Result<RenderedMailer, DomainError>;

    /// Combine rendered documents in order; `None` when there is nothing to merge
    async fn merge(&self, rendered: &[RenderedMailer]) -> Result<Option<PathBuf>, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    pub struct MockRenderer {
        documents: Mutex<Vec<MailerDocument>>,
        failing_addresses: Mutex<HashSet<String>>,
        merge_error: Mutex<Option<String>>,
    }

    impl MockRenderer {
        pub fn new() -> Self {
            Self::default()
        }

        /// Fail rendering for clients at this street address
        pub fn failing_on(self, address: impl Into<String>) -> Self {
            self.failing_addresses.lock().unwrap().insert(address.into());
            self
        }

        pub fn with_merge_error(self, error: impl Into<String>) -> Self {
            *self.merge_error.lock().unwrap() = Some(error.into());
            self
        }

        pub fn documents(&self) -> Vec<MailerDocument> {
            self.documents.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MailerRenderer for MockRenderer {
        async fn render(
            &self,
            index: usize,
            document: &MailerDocument,
        ) -> Result<RenderedMailer, DomainError> {
            if self
                .failing_addresses
                .lock()
                .unwrap()
                .contains(&document.address)
            {
                return Err(DomainError::render("template exploded"));
            }

            self.documents.lock().unwrap().push(document.clone());
            Ok(RenderedMailer {
                index,
                path: PathBuf::from(format!("mock/mailer_{}.html", index)),
            })
        }

        async fn merge(
            &self,
            rendered: &[RenderedMailer],
        ) -> Result<Option<PathBuf>, DomainError> {
            if let Some(error) = self.merge_error.lock().unwrap().clone() {
                return Err(DomainError::storage(error));
            }

            Ok((!rendered.is_empty()).then(|| PathBuf::from("mock/final_mailers.html")))
        }
    }
}
