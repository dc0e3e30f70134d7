//! Subject normalization and the generic-subject filter.
//!
//! Broad tags like "fiction" match thousands of unrelated works, so they are
//! never used as query terms.

use crate::models::Work;

/// Tags excluded from every subject query.
pub const GENERIC_SUBJECTS: &[&str] = &[
    "fiction",
    "novels",
    "novel",
    "literature",
    "biography",
    "history",
    "poetry",
    "drama",
    "juvenile fiction",
    "juvenile literature",
    "fiction in english",
    "english fiction",
    "american fiction",
    "literary fiction",
    "general",
    "classics",
    "classic literature",
    "accessible book",
    "protected daisy",
    "in library",
    "large type books",
    "open library staff picks",
    "long now manual for civilization",
];

/// Prefixes of machine-generated tags (reading levels, bestseller lists).
const GENERIC_PREFIXES: &[&str] = &["reading level", "nyt:"];

pub fn normalize_subject(subject: &str) -> String {
    subject.trim().to_lowercase()
}

/// Generic-subject filter, optionally extended from config.
#[derive(Debug, Clone, Default)]
pub struct SubjectFilter {
    extra: Vec<String>,
}

impl SubjectFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extra = extra
            .into_iter()
            .map(|s| normalize_subject(s.as_ref()))
            .filter(|s| !s.is_empty())
            .collect();
        self
    }

    pub fn is_generic(&self, subject: &str) -> bool {
        let subject = normalize_subject(subject);
        GENERIC_SUBJECTS.contains(&subject.as_str())
            || GENERIC_PREFIXES.iter().any(|p| subject.starts_with(p))
            || self.extra.iter().any(|e| *e == subject)
    }

    /// Normalized subjects of `work` minus generic ones, in source order.
    pub fn filtered(&self, work: &Work) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for subject in &work.subjects {
            let subject = normalize_subject(subject);
            if subject.is_empty() || self.is_generic(&subject) || out.contains(&subject) {
                continue;
            }
            out.push(subject);
        }
        out
    }

    /// Filtered subjects common to every root, in the first root's order.
    /// Empty for fewer than two roots.
    pub fn shared(&self, roots: &[Work]) -> Vec<String> {
        let [first, rest @ ..] = roots else {
            return Vec::new();
        };
        if rest.is_empty() {
            return Vec::new();
        }
        let others: Vec<Vec<String>> = rest.iter().map(|w| self.filtered(w)).collect();
        self.filtered(first)
            .into_iter()
            .filter(|s| others.iter().all(|list| list.contains(s)))
            .collect()
    }
}

pub fn is_generic(subject: &str) -> bool {
    SubjectFilter::default().is_generic(subject)
}

pub fn filtered_subjects(work: &Work) -> Vec<String> {
    SubjectFilter::default().filtered(work)
}

pub fn shared_subjects(roots: &[Work]) -> Vec<String> {
    SubjectFilter::default().shared(roots)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn work(id: &str, subjects: &[&str]) -> Work {
        Work::new(id, id).with_subjects(subjects.iter().copied())
    }

    #[test]
    fn generic_tags_are_dropped() {
        let w = work("W1", &["Fiction", "Dragons", "Reading Level-Grade 7", "nyt:young-adult"]);
        assert_eq!(filtered_subjects(&w), vec!["dragons"]);
        assert!(is_generic("  HISTORY "));
        assert!(!is_generic("dragons"));
    }

    #[test]
    fn extra_generic_subjects_from_config() {
        let filter = SubjectFilter::new().with_extra(["Fantasy"]);
        let w = work("W1", &["fantasy", "dragons"]);
        assert_eq!(filter.filtered(&w), vec!["dragons"]);
    }

    #[test]
    fn shared_subjects_follow_first_root_order() {
        let roots = [
            work("W1", &["magic", "dragons", "fantasy"]),
            work("W2", &["fantasy", "dragons", "adventure"]),
        ];
        assert_eq!(shared_subjects(&roots), vec!["dragons", "fantasy"]);
    }

    #[test]
    fn shared_subjects_need_two_roots() {
        assert!(shared_subjects(&[work("W1", &["dragons"])]).is_empty());
        assert!(shared_subjects(&[]).is_empty());
    }

    #[test]
    fn shared_subjects_ignore_generic_overlap() {
        let roots = [work("W1", &["fiction", "ships"]), work("W2", &["fiction", "trains"])];
        assert!(shared_subjects(&roots).is_empty());
    }
}
