use async_trait::async_trait;

use crate::error::LookupError;
use crate::models::Work;

/// Results requested per query unless configured otherwise.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub language: Option<String>,
    pub limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            language: None,
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl SearchOptions {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn english(self) -> Self {
        self.language(Some("eng".to_string()))
    }
}

/// Bibliographic data source consumed by the aggregator and the session.
#[async_trait]
pub trait WorkLookup: Send + Sync {
    fn name(&self) -> &str;

    async fn resolve_work_by_id(&self, id: &str) -> Result<Work, LookupError>;

    async fn search_by_subject(
        &self,
        subject: &str,
        opts: &SearchOptions,
    ) -> Result<Vec<Work>, LookupError>;

    async fn search_by_title(
        &self,
        title: &str,
        opts: &SearchOptions,
    ) -> Result<Vec<Work>, LookupError>;
}

#[async_trait]
impl<T: WorkLookup + ?Sized> WorkLookup for std::sync::Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn resolve_work_by_id(&self, id: &str) -> Result<Work, LookupError> {
        (**self).resolve_work_by_id(id).await
    }

    async fn search_by_subject(
        &self,
        subject: &str,
        opts: &SearchOptions,
    ) -> Result<Vec<Work>, LookupError> {
        (**self).search_by_subject(subject, opts).await
    }

    async fn search_by_title(
        &self,
        title: &str,
        opts: &SearchOptions,
    ) -> Result<Vec<Work>, LookupError> {
        (**self).search_by_title(title, opts).await
    }
}
