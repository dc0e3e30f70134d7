//! Ordered root selection with from-scratch rebuilds.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::aggregate::{Aggregator, AggregatorConfig};
use crate::error::{BookgraphError, LookupError, Result};
use crate::graph::{Graph, build_graph};
use crate::lookup::WorkLookup;
use crate::models::{Recommendation, Work};

/// Output of one rebuild, tagged with the roots it was computed for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rebuilt {
    pub roots: Vec<Work>,
    pub recommendations: Vec<Recommendation>,
    pub graph: Graph,
}

/// A rebuild running on the tokio runtime.
pub struct RebuildHandle {
    token: CancellationToken,
    join: JoinHandle<Result<Rebuilt>>,
}

impl RebuildHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub async fn wait(self) -> Result<Rebuilt> {
        self.join
            .await
            .map_err(|e| BookgraphError::Task(e.to_string()))?
    }
}

async fn compute<L: WorkLookup>(
    aggregator: &Aggregator<L>,
    roots: Vec<Work>,
    cancel: &CancellationToken,
) -> Result<Rebuilt> {
    let recommendations = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(BookgraphError::Cancelled),
        recs = aggregator.aggregate(&roots) => recs,
    };
    let graph = build_graph(&roots, &recommendations);
    Ok(Rebuilt {
        roots,
        recommendations,
        graph,
    })
}

pub struct RootSession<L> {
    lookup: Arc<L>,
    config: AggregatorConfig,
    roots: Vec<Work>,
    recommendations: Vec<Recommendation>,
    graph: Graph,
    in_flight: Option<CancellationToken>,
}

impl<L: WorkLookup + 'static> RootSession<L> {
    pub fn new(lookup: Arc<L>, config: AggregatorConfig) -> Self {
        Self {
            lookup,
            config,
            roots: Vec::new(),
            recommendations: Vec::new(),
            graph: Graph::default(),
            in_flight: None,
        }
    }

    pub fn roots(&self) -> &[Work] {
        &self.roots
    }

    pub fn recommendations(&self) -> &[Recommendation] {
        &self.recommendations
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn contains(&self, id: &str) -> bool {
        self.roots.iter().any(|r| r.id == id)
    }

    /// Resolve `id` and append it as a root. Returns `Ok(false)` without a
    /// lookup when the id is already a root.
    pub async fn add_root(&mut self, id: &str) -> Result<bool> {
        if self.contains(id) {
            debug!(id, "root already selected");
            return Ok(false);
        }
        match self.lookup.resolve_work_by_id(id).await {
            Ok(work) => Ok(self.add_resolved_root(work)),
            Err(LookupError::NotFound(missing)) => Err(BookgraphError::RootNotFound(missing)),
            Err(e) => Err(e.into()),
        }
    }

    /// Append an already resolved work. Returns `false` for a duplicate id.
    pub fn add_resolved_root(&mut self, work: Work) -> bool {
        if self.contains(&work.id) {
            return false;
        }
        info!(id = %work.id, title = %work.title, "root added");
        self.roots.push(work);
        true
    }

    /// Recompute recommendations and the graph from the current roots.
    ///
    /// Cancels any spawned rebuild still running. On cancellation the
    /// previous graph stays in place.
    pub async fn rebuild(&mut self, cancel: CancellationToken) -> Result<&Graph> {
        self.cancel_in_flight();
        let aggregator = Aggregator::with_config(Arc::clone(&self.lookup), self.config.clone());
        let rebuilt = compute(&aggregator, self.roots.clone(), &cancel).await?;
        self.install(rebuilt);
        Ok(&self.graph)
    }

    /// Start a rebuild for a snapshot of the current roots, cancelling any
    /// rebuild started earlier by this session.
    pub fn spawn_rebuild(&mut self) -> RebuildHandle {
        self.cancel_in_flight();
        let token = CancellationToken::new();
        self.in_flight = Some(token.clone());

        let aggregator = Aggregator::with_config(Arc::clone(&self.lookup), self.config.clone());
        let roots = self.roots.clone();
        let task_token = token.clone();
        let join = tokio::spawn(async move { compute(&aggregator, roots, &task_token).await });

        RebuildHandle { token, join }
    }

    /// Install a finished rebuild if it still matches the current roots.
    /// Returns `false` for a stale result.
    pub fn apply(&mut self, rebuilt: Rebuilt) -> bool {
        let current = self.roots.iter().map(|r| r.id.as_str());
        let computed = rebuilt.roots.iter().map(|r| r.id.as_str());
        if !current.eq(computed) {
            debug!("discarding stale rebuild");
            return false;
        }
        self.install(rebuilt);
        true
    }

    fn install(&mut self, rebuilt: Rebuilt) {
        let stats = rebuilt.graph.stats();
        info!(
            roots = stats.roots,
            recommendations = stats.recommendations,
            links = stats.links,
            "graph rebuilt"
        );
        self.recommendations = rebuilt.recommendations;
        self.graph = rebuilt.graph;
    }

    // The token stays tracked after its result is applied; cancelling a
    // finished rebuild is a no-op.
    fn cancel_in_flight(&mut self) {
        if let Some(previous) = self.in_flight.take() {
            if !previous.is_cancelled() {
                debug!("cancelling superseded rebuild");
            }
            previous.cancel();
        }
    }
}
