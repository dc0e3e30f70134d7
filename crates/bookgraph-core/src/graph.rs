//! Node/link graph handed to the renderer.
//!
//! Links reference node ids, never node values, so the output serializes as
//! plain JSON with no cycles.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{Recommendation, RootIds, Work};
use crate::subjects::normalize_subject;

/// Link weight for a recommendation reached from a single root.
pub const SINGLE_MATCH_WEIGHT: u8 = 1;
/// Link weight for a recommendation reached through shared subjects.
pub const INTERSECTION_WEIGHT: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Root,
    Rec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub subjects: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matching_root_ids: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_intersection: Option<bool>,
}

impl GraphNode {
    fn root(work: &Work) -> Self {
        Self {
            id: work.id.clone(),
            title: work.title.clone(),
            node_type: NodeType::Root,
            subjects: work.subjects.iter().map(|s| normalize_subject(s)).collect(),
            authors: work.authors.clone(),
            matching_root_ids: None,
            is_intersection: None,
        }
    }

    fn rec(rec: &Recommendation) -> Self {
        Self {
            id: rec.work.id.clone(),
            title: rec.work.title.clone(),
            node_type: NodeType::Rec,
            subjects: rec.work.subjects.iter().map(|s| normalize_subject(s)).collect(),
            authors: rec.work.authors.clone(),
            matching_root_ids: Some(rec.matching_root_ids.to_vec()),
            is_intersection: Some(rec.is_intersection),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    pub value: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub roots: usize,
    pub recommendations: usize,
    pub links: usize,
    pub bridging: usize,
    pub intersection: usize,
}

impl Graph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn links_to(&self, target: &str) -> impl Iterator<Item = &GraphLink> {
        self.links.iter().filter(move |l| l.target == target)
    }

    pub fn stats(&self) -> GraphStats {
        let recs = || self.nodes.iter().filter(|n| n.node_type == NodeType::Rec);
        GraphStats {
            roots: self
                .nodes
                .iter()
                .filter(|n| n.node_type == NodeType::Root)
                .count(),
            recommendations: recs().count(),
            links: self.links.len(),
            bridging: recs()
                .filter(|n| n.matching_root_ids.as_ref().is_some_and(|ids| ids.len() > 1))
                .count(),
            intersection: recs().filter(|n| n.is_intersection == Some(true)).count(),
        }
    }
}

/// Build the graph for `roots` and their ranked recommendations.
///
/// Root nodes come first in root order, then rec nodes in the given order.
/// Each node id appears once; a rec whose id collides with an earlier node
/// is skipped along with its links.
pub fn build_graph(roots: &[Work], recs: &[Recommendation]) -> Graph {
    let mut graph = Graph::default();
    let mut seen: HashSet<&str> = HashSet::new();
    let root_ids: RootIds = roots.iter().map(|r| r.id.clone()).collect();

    for root in roots {
        if seen.insert(root.id.as_str()) {
            graph.nodes.push(GraphNode::root(root));
        }
    }

    for rec in recs {
        if !seen.insert(rec.id()) {
            continue;
        }
        graph.nodes.push(GraphNode::rec(rec));

        let value = if rec.is_intersection {
            INTERSECTION_WEIGHT
        } else {
            SINGLE_MATCH_WEIGHT
        };
        for root_id in rec.matching_root_ids.iter() {
            if !root_ids.contains(root_id) {
                continue;
            }
            graph.links.push(GraphLink {
                source: root_id.to_string(),
                target: rec.id().to_string(),
                value,
            });
        }
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::work;

    fn rec(id: &str, title: &str, roots: &[&str], is_intersection: bool) -> Recommendation {
        Recommendation::new(
            work(id, title, &["Dragons"]),
            roots.iter().copied().collect(),
            is_intersection,
        )
    }

    #[test]
    fn intersection_recs_link_every_root_with_weight_two() {
        let roots = [
            work("W1", "First", &["dragons", "fantasy"]),
            work("W2", "Second", &["dragons", "adventure"]),
        ];
        let recs = [rec("R1", "Eragon", &["W1", "W2"], true)];

        let graph = build_graph(&roots, &recs);
        assert_eq!(
            graph.links,
            vec![
                GraphLink { source: "W1".into(), target: "R1".into(), value: 2 },
                GraphLink { source: "W2".into(), target: "R1".into(), value: 2 },
            ]
        );
        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.stats().bridging, 1);
    }

    #[test]
    fn single_root_links_have_weight_one() {
        let roots = [work("W1", "Only", &["dragons"])];
        let recs = [
            rec("R1", "Eragon", &["W1"], false),
            rec("R2", "Temeraire", &["W1"], false),
        ];

        let graph = build_graph(&roots, &recs);
        assert!(graph.links.iter().all(|l| l.value == 1 && l.source == "W1"));
        assert_eq!(graph.links.len(), 2);
    }

    #[test]
    fn nodes_keep_root_then_ranked_order_without_duplicates() {
        let roots = [work("W1", "One", &[]), work("W2", "Two", &[])];
        let recs = [
            rec("R2", "Bridge", &["W1", "W2"], false),
            rec("R1", "Solo", &["W1"], false),
            rec("R2", "Bridge again", &["W2"], false),
        ];

        let graph = build_graph(&roots, &recs);
        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["W1", "W2", "R2", "R1"]);
        assert_eq!(graph.links_to("R2").count(), 2);
        assert_eq!(graph.node("R2").unwrap().title, "Bridge");
    }

    #[test]
    fn links_only_reference_current_roots() {
        let roots = [work("W1", "One", &[])];
        let recs = [rec("R1", "Stale", &["W1", "W9"], false)];
        let graph = build_graph(&roots, &recs);
        assert_eq!(graph.links.len(), 1);
        assert_eq!(graph.links[0].source, "W1");
    }

    #[test]
    fn build_is_deterministic() {
        let roots = [work("W1", "One", &["a"]), work("W2", "Two", &["b"])];
        let recs = [
            rec("R1", "x", &["W2", "W1"], true),
            rec("R2", "y", &["W1"], false),
        ];
        assert_eq!(build_graph(&roots, &recs), build_graph(&roots, &recs));
        let graph = build_graph(&roots, &recs);
        let links: Vec<&str> = graph.links.iter().map(|l| l.source.as_str()).collect();
        assert_eq!(links, vec!["W2", "W1", "W1"]);
    }

    #[test]
    fn serializes_for_the_renderer() {
        let roots = [work("W1", "One", &["Dragons"])];
        let recs = [rec("R1", "Eragon", &["W1"], false)];
        let json = serde_json::to_value(build_graph(&roots, &recs)).unwrap();

        assert_eq!(json["nodes"][0]["type"], "root");
        assert_eq!(json["nodes"][0]["subjects"], serde_json::json!(["dragons"]));
        assert!(json["nodes"][0].get("matchingRootIds").is_none());
        assert_eq!(json["nodes"][1]["type"], "rec");
        assert_eq!(json["nodes"][1]["matchingRootIds"], serde_json::json!(["W1"]));
        assert_eq!(json["nodes"][1]["isIntersection"], false);
        assert_eq!(json["links"][0], serde_json::json!({"source": "W1", "target": "R1", "value": 1}));
    }
}
