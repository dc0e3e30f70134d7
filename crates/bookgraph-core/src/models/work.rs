use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::subjects::normalize_subject;

/// Upper bound on subjects kept per work.
pub const MAX_SUBJECTS: usize = 10;

/// A bibliographic work as returned by a lookup source.
///
/// Search endpoints return the same shape, so a search hit and a resolved
/// work share this type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    pub id: String,
    pub title: String,

    #[serde(default)]
    pub subjects: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub languages: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_publish_year: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_id: Option<i64>,
}

impl Work {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Replace subjects, lower-casing them, dropping blanks and repeats, and
    /// keeping at most [`MAX_SUBJECTS`] in source order.
    pub fn with_subjects<I, S>(mut self, subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for subject in subjects {
            if out.len() == MAX_SUBJECTS {
                break;
            }
            let normalized = normalize_subject(subject.as_ref());
            if !normalized.is_empty() && !out.contains(&normalized) {
                out.push(normalized);
            }
        }
        self.subjects = out;
        self
    }

    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = authors.into_iter().map(Into::into).collect();
        self
    }
}
