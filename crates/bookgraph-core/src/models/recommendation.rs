use serde::{Deserialize, Serialize};

use super::{RootIds, Work};

/// A work discovered by aggregation, tagged with the roots that led to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(flatten)]
    pub work: Work,
    pub matching_root_ids: RootIds,
    pub is_intersection: bool,
}

impl Recommendation {
    pub fn new(work: Work, matching_root_ids: RootIds, is_intersection: bool) -> Self {
        Self {
            work,
            matching_root_ids,
            is_intersection,
        }
    }

    pub fn id(&self) -> &str {
        &self.work.id
    }

    pub fn title(&self) -> &str {
        &self.work.title
    }

    /// Fold a later discovery of the same work into this one. Work fields
    /// recorded first are kept.
    pub fn absorb(&mut self, matching_root_ids: &RootIds, is_intersection: bool) {
        self.matching_root_ids.union(matching_root_ids);
        self.is_intersection |= is_intersection;
    }

    /// Matches more than one root.
    pub fn is_bridging(&self) -> bool {
        self.matching_root_ids.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorb_unions_roots_and_keeps_intersection_flag() {
        let mut rec = Recommendation::new(
            Work::new("OL9W", "The Hobbit"),
            ["W1", "W2"].into_iter().collect(),
            true,
        );
        rec.absorb(&RootIds::single("W1"), false);
        assert!(rec.is_intersection);
        assert_eq!(rec.matching_root_ids.len(), 2);
        assert!(rec.is_bridging());
    }

    #[test]
    fn serializes_with_camel_case_provenance() {
        let rec = Recommendation::new(Work::new("OL9W", "Eragon"), RootIds::single("W1"), false);
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["id"], "OL9W");
        assert_eq!(json["matchingRootIds"], serde_json::json!(["W1"]));
        assert_eq!(json["isIntersection"], false);
    }

    #[test]
    fn flattened_work_fields_share_the_key_style() {
        let mut work = Work::new("OL9W", "Eragon");
        work.first_publish_year = Some(2002);
        work.cover_id = Some(7);
        let rec = Recommendation::new(work, RootIds::single("W1"), true);
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["firstPublishYear"], 2002);
        assert_eq!(json["coverId"], 7);
        assert!(json.get("cover_id").is_none());
    }
}
