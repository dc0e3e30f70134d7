//! In-memory lookup used by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::LookupError;
use crate::lookup::{SearchOptions, WorkLookup};
use crate::models::Work;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Resolve(String),
    Subject(String, Option<String>),
    Title(String),
}

#[derive(Default)]
pub struct FakeLookup {
    works: HashMap<String, Work>,
    by_subject: HashMap<String, Vec<Work>>,
    by_title: HashMap<String, Vec<Work>>,
    failing: HashSet<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<Call>>,
}

impl FakeLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_work(mut self, work: Work) -> Self {
        self.works.insert(work.id.clone(), work);
        self
    }

    pub fn with_subject(mut self, subject: &str, works: Vec<Work>) -> Self {
        self.by_subject.insert(subject.to_string(), works);
        self
    }

    pub fn with_title(mut self, title: &str, works: Vec<Work>) -> Self {
        self.by_title.insert(title.to_string(), works);
        self
    }

    /// Make any query for `term` (subject or title) fail.
    pub fn failing(mut self, term: &str) -> Self {
        self.failing.insert(term.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn answer(
        &self,
        table: &HashMap<String, Vec<Work>>,
        term: &str,
        opts: &SearchOptions,
    ) -> Result<Vec<Work>, LookupError> {
        if self.failing.contains(term) {
            return Err(LookupError::failure("fake", format!("query failed: {term}")));
        }
        Ok(table
            .get(term)
            .map(|works| {
                works
                    .iter()
                    .filter(|w| match &opts.language {
                        Some(lang) => w.languages.is_empty() || w.languages.contains(lang),
                        None => true,
                    })
                    .take(opts.limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

pub fn work(id: &str, title: &str, subjects: &[&str]) -> Work {
    Work::new(id, title).with_subjects(subjects.iter().copied())
}

#[async_trait]
impl WorkLookup for FakeLookup {
    fn name(&self) -> &str {
        "fake"
    }

    async fn resolve_work_by_id(&self, id: &str) -> Result<Work, LookupError> {
        self.record(Call::Resolve(id.to_string()));
        self.pause().await;
        self.works
            .get(id)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(id.to_string()))
    }

    async fn search_by_subject(
        &self,
        subject: &str,
        opts: &SearchOptions,
    ) -> Result<Vec<Work>, LookupError> {
        self.record(Call::Subject(subject.to_string(), opts.language.clone()));
        self.pause().await;
        self.answer(&self.by_subject, subject, opts)
    }

    async fn search_by_title(
        &self,
        title: &str,
        opts: &SearchOptions,
    ) -> Result<Vec<Work>, LookupError> {
        self.record(Call::Title(title.to_string()));
        self.pause().await;
        self.answer(&self.by_title, title, opts)
    }
}
