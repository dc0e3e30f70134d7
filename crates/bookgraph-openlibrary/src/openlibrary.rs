use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bookgraph_core::{LookupError, OpenLibraryConfig, SearchOptions, Work, WorkLookup};
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SourceError};
use crate::http::{DiskCache, RateLimitedClient};

pub const SOURCE_NAME: &str = "openlibrary";
const SEARCH_FIELDS: &str = "key,title,subject,language,author_name,first_publish_year,cover_i";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Subject,
    Title,
}

impl SearchField {
    fn param(self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::Title => "title",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceStatus {
    pub available: bool,
    pub latency_ms: Option<u64>,
    pub last_checked: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

/// Build a [`Work`] from a `/works/{id}.json` record or a `search.json` doc.
/// Returns `None` when the key or title is missing.
pub fn work_from_json(v: &Value) -> Option<Work> {
    let id = v
        .get("key")
        .and_then(Value::as_str)
        .map(normalize_work_id)
        .filter(|id| !id.is_empty())?;
    let title = v
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())?;

    let strings = |field: &str| -> Vec<String> {
        v.get(field)
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .map(ToOwned::to_owned)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
    };

    let subjects = match strings("subjects") {
        s if s.is_empty() => strings("subject"),
        s => s,
    };

    let first_publish_year = v
        .get("first_publish_year")
        .and_then(Value::as_i64)
        .and_then(|y| i32::try_from(y).ok())
        .or_else(|| {
            v.get("first_publish_date")
                .and_then(Value::as_str)
                .and_then(parse_year_from_date_string)
        });

    let cover_id = v.get("cover_i").and_then(Value::as_i64).or_else(|| {
        v.get("covers")
            .and_then(Value::as_array)
            .and_then(|arr| arr.iter().filter_map(Value::as_i64).find(|id| *id > 0))
    });

    let mut work = Work::new(id, title)
        .with_subjects(subjects)
        .with_languages(strings("language"))
        .with_authors(strings("author_name"));
    work.first_publish_year = first_publish_year;
    work.cover_id = cover_id;
    Some(work)
}

/// `/works/OL45883W`, `OL45883W` and full work URLs all map to `OL45883W`.
pub fn normalize_work_id(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    let tail = match trimmed.rfind("/works/") {
        Some(pos) => &trimmed[pos + "/works/".len()..],
        None => trimmed,
    };
    tail.split('/').next().unwrap_or_default().to_string()
}

pub struct OpenLibrarySource {
    client: RateLimitedClient,
    cache: DiskCache,
    base_url: String,
}

impl OpenLibrarySource {
    pub fn new() -> Result<Self> {
        Self::from_config(&OpenLibraryConfig::default(), None)
    }

    /// Build from config. `cache_dir` is used when caching is enabled.
    pub fn from_config(cfg: &OpenLibraryConfig, cache_dir: Option<PathBuf>) -> Result<Self> {
        let cache = match cache_dir {
            Some(dir) if cfg.cache_enabled => {
                DiskCache::new(dir.join(SOURCE_NAME), Duration::from_secs(cfg.cache_ttl_secs))
            }
            _ => DiskCache::disabled(),
        };
        Ok(Self {
            client: RateLimitedClient::new(
                Duration::from_millis(cfg.min_interval_ms),
                cfg.max_retries,
                &cfg.user_agent,
            )?,
            cache,
            base_url: cfg.base_url.clone(),
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SourceError::Parse(format!("invalid URL {}: {e}", self.base_url)))?;
        {
            let mut segs = url
                .path_segments_mut()
                .map_err(|_| SourceError::Parse("invalid Open Library base URL".to_string()))?;
            segs.pop_if_empty();
            for seg in segments {
                segs.push(seg);
            }
        }
        Ok(url)
    }

    pub async fn fetch_work(&self, id: &str) -> Result<Work> {
        let id = normalize_work_id(id);
        if id.is_empty() {
            return Err(SourceError::NotFound("empty work id".to_string()));
        }

        let cache_key = format!("work:{id}");
        if let Some(cached) = self.cache.get::<Work>(&cache_key).await {
            return Ok(cached);
        }

        let url = self.url(&["works", &format!("{id}.json")])?;
        let json: Value = match self.client.get_json(url.as_str()).await {
            Err(SourceError::NotFound(_)) => return Err(SourceError::NotFound(id)),
            other => other?,
        };

        // Redirect and deleted records carry a type other than /type/work.
        if let Some(kind) = json.pointer("/type/key").and_then(Value::as_str)
            && kind != "/type/work"
        {
            return Err(SourceError::NotFound(id));
        }

        let work = work_from_json(&json)
            .ok_or_else(|| SourceError::Parse(format!("work {id} is missing key or title")))?;
        self.cache.set(&cache_key, &work).await;
        Ok(work)
    }

    pub async fn search(
        &self,
        field: SearchField,
        term: &str,
        opts: &SearchOptions,
    ) -> Result<Vec<Work>> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let cache_key = format!(
            "{}:{}:{}:{}",
            field.param(),
            opts.language.as_deref().unwrap_or("*"),
            opts.limit,
            term.to_lowercase()
        );
        if let Some(cached) = self.cache.get::<Vec<Work>>(&cache_key).await {
            return Ok(cached);
        }

        let mut url = self.url(&["search.json"])?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair(field.param(), term)
                .append_pair("limit", &opts.limit.to_string())
                .append_pair("fields", SEARCH_FIELDS);
            if let Some(lang) = &opts.language {
                query.append_pair("language", lang);
            }
        }

        let json: Value = self.client.get_json(url.as_str()).await?;
        let docs = json
            .get("docs")
            .and_then(Value::as_array)
            .ok_or_else(|| SourceError::Parse("search response has no docs".to_string()))?;

        let works: Vec<Work> = docs
            .iter()
            .filter_map(work_from_json)
            .take(opts.limit)
            .collect();
        debug!(field = field.param(), term, hits = works.len(), "open library search");

        self.cache.set(&cache_key, &works).await;
        Ok(works)
    }

    pub async fn health_check(&self) -> SourceStatus {
        let start = Instant::now();
        let result = self
            .search(SearchField::Title, "dune", &SearchOptions::with_limit(1))
            .await;
        SourceStatus {
            available: result.is_ok(),
            latency_ms: Some(start.elapsed().as_millis() as u64),
            last_checked: Some(Utc::now()),
            error: result.err().map(|e| e.to_string()),
        }
    }
}

#[async_trait]
impl WorkLookup for OpenLibrarySource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn resolve_work_by_id(&self, id: &str) -> std::result::Result<Work, LookupError> {
        self.fetch_work(id)
            .await
            .map_err(|e| e.into_lookup(SOURCE_NAME))
    }

    async fn search_by_subject(
        &self,
        subject: &str,
        opts: &SearchOptions,
    ) -> std::result::Result<Vec<Work>, LookupError> {
        self.search(SearchField::Subject, subject, opts)
            .await
            .map_err(|e| e.into_lookup(SOURCE_NAME))
    }

    async fn search_by_title(
        &self,
        title: &str,
        opts: &SearchOptions,
    ) -> std::result::Result<Vec<Work>, LookupError> {
        self.search(SearchField::Title, title, opts)
            .await
            .map_err(|e| e.into_lookup(SOURCE_NAME))
    }
}

fn parse_year_from_date_string(input: &str) -> Option<i32> {
    input.chars().collect::<Vec<_>>().windows(4).find_map(|w| {
        let candidate = w.iter().collect::<String>();
        if candidate.chars().all(|c| c.is_ascii_digit()) {
            candidate.parse::<i32>().ok()
        } else {
            None
        }
    })
}
