//! Recommendation aggregation.
//!
//! Queries run in three passes: subjects shared by every root, each root's
//! own subjects, then a title search for roots still without a match.
//! Discoveries are merged by work id into a working map owned by a single
//! [`Aggregator::aggregate`] call, ranked, and capped.

use std::cmp::Ordering;
use std::collections::HashMap;

use futures::StreamExt;
use futures::stream::FuturesOrdered;
use tracing::{debug, info, warn};

use crate::config::RecommendConfig;
use crate::error::LookupError;
use crate::lookup::{SearchOptions, WorkLookup};
use crate::models::{Recommendation, RootIds, Work};
use crate::subjects::SubjectFilter;

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub cap: usize,
    pub per_query_limit: usize,
    pub concurrency: usize,
    pub intersection_language: Option<String>,
    pub filter: SubjectFilter,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self::from(&RecommendConfig::default())
    }
}

impl From<&RecommendConfig> for AggregatorConfig {
    fn from(cfg: &RecommendConfig) -> Self {
        Self {
            cap: cfg.cap.max(1),
            per_query_limit: cfg.per_query_limit,
            concurrency: cfg.concurrency.max(1),
            intersection_language: cfg.intersection_language.clone(),
            filter: SubjectFilter::new().with_extra(&cfg.extra_generic_subjects),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Query {
    Subject(String),
    Title(String),
}

impl Query {
    fn term(&self) -> &str {
        match self {
            Self::Subject(s) | Self::Title(s) => s,
        }
    }
}

/// Working map of discoveries for one aggregation run.
struct Discoveries<'a> {
    roots: &'a RootIds,
    cap: usize,
    by_id: HashMap<String, Recommendation>,
}

impl<'a> Discoveries<'a> {
    fn new(roots: &'a RootIds, cap: usize) -> Self {
        Self {
            roots,
            cap,
            by_id: HashMap::new(),
        }
    }

    fn is_full(&self) -> bool {
        self.by_id.len() >= self.cap
    }

    fn tags(&self, root_id: &str) -> bool {
        self.by_id
            .values()
            .any(|rec| rec.matching_root_ids.contains(root_id))
    }

    fn merge(&mut self, works: Vec<Work>, matching: &RootIds, is_intersection: bool) {
        for work in works {
            if work.id.is_empty() || self.roots.contains(&work.id) {
                continue;
            }
            match self.by_id.get_mut(&work.id) {
                Some(existing) => existing.absorb(matching, is_intersection),
                None => {
                    self.by_id.insert(
                        work.id.clone(),
                        Recommendation::new(work, matching.clone(), is_intersection),
                    );
                }
            }
        }
    }

    fn finish(self) -> Vec<Recommendation> {
        let mut recs: Vec<Recommendation> = self.by_id.into_values().collect();
        rank(&mut recs);
        recs.truncate(self.cap);
        recs
    }
}

/// Order by number of matching roots (descending), then title, then id.
pub fn compare(a: &Recommendation, b: &Recommendation) -> Ordering {
    b.matching_root_ids
        .len()
        .cmp(&a.matching_root_ids.len())
        .then_with(|| a.title().cmp(b.title()))
        .then_with(|| a.id().cmp(b.id()))
}

pub fn rank(recs: &mut [Recommendation]) {
    recs.sort_by(compare);
}

pub struct Aggregator<L> {
    lookup: L,
    config: AggregatorConfig,
}

impl<L: WorkLookup> Aggregator<L> {
    pub fn new(lookup: L) -> Self {
        Self::with_config(lookup, AggregatorConfig::default())
    }

    pub fn with_config(lookup: L, config: AggregatorConfig) -> Self {
        Self { lookup, config }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Ranked, de-duplicated, capped recommendations for `roots`.
    ///
    /// Lookup failures are logged and treated as empty results; this never
    /// fails.
    pub async fn aggregate(&self, roots: &[Work]) -> Vec<Recommendation> {
        if roots.is_empty() {
            return Vec::new();
        }

        let root_ids: RootIds = roots.iter().map(|r| r.id.clone()).collect();
        let mut found = Discoveries::new(&root_ids, self.config.cap);

        if root_ids.len() >= 2 {
            let shared = self.config.filter.shared(roots);
            debug!(subjects = ?shared, "intersection pass");
            let opts = SearchOptions::with_limit(self.config.per_query_limit)
                .language(self.config.intersection_language.clone());
            let queries = shared.into_iter().map(Query::Subject).collect();
            self.run_batch(queries, &opts, &root_ids, true, &mut found)
                .await;
        }

        let opts = SearchOptions::with_limit(self.config.per_query_limit);

        for root in roots {
            if found.is_full() {
                break;
            }
            let subjects = self.config.filter.filtered(root);
            debug!(root = %root.id, subjects = ?subjects, "per-root pass");
            let queries = subjects.into_iter().map(Query::Subject).collect();
            let tag = RootIds::single(root.id.as_str());
            self.run_batch(queries, &opts, &tag, false, &mut found)
                .await;
        }

        for root in roots {
            if found.is_full() {
                break;
            }
            if found.tags(&root.id) || root.title.trim().is_empty() {
                continue;
            }
            debug!(root = %root.id, title = %root.title, "title fallback");
            let tag = RootIds::single(root.id.as_str());
            self.run_batch(
                vec![Query::Title(root.title.clone())],
                &opts,
                &tag,
                false,
                &mut found,
            )
            .await;
        }

        let recs = found.finish();
        info!(
            roots = roots.len(),
            recommendations = recs.len(),
            bridging = recs.iter().filter(|r| r.is_bridging()).count(),
            "aggregation finished"
        );
        recs
    }

    /// Run `queries` with bounded concurrency. Results are merged in
    /// submission order, and no query is launched once the cap is reached.
    async fn run_batch(
        &self,
        queries: Vec<Query>,
        opts: &SearchOptions,
        matching: &RootIds,
        is_intersection: bool,
        found: &mut Discoveries<'_>,
    ) {
        let mut pending = queries.into_iter();
        let mut in_flight = FuturesOrdered::new();

        loop {
            while in_flight.len() < self.config.concurrency && !found.is_full() {
                let Some(query) = pending.next() else {
                    break;
                };
                in_flight.push_back(self.run_query(query, opts));
            }

            let Some(works) = in_flight.next().await else {
                break;
            };
            found.merge(works, matching, is_intersection);
        }
    }

    async fn run_query(&self, query: Query, opts: &SearchOptions) -> Vec<Work> {
        let result: Result<Vec<Work>, LookupError> = match &query {
            Query::Subject(subject) => self.lookup.search_by_subject(subject, opts).await,
            Query::Title(title) => self.lookup.search_by_title(title, opts).await,
        };
        match result {
            Ok(works) => {
                debug!(query = ?query, hits = works.len(), "lookup returned");
                works
            }
            Err(e) => {
                warn!(
                    source = self.lookup.name(),
                    term = query.term(),
                    error = %e,
                    "lookup failed, treating as empty"
                );
                Vec::new()
            }
        }
    }
}
