use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Insertion-ordered set of root work identifiers.
///
/// Root sets are tiny (a handful of user picks), so a vector with linear
/// membership checks keeps iteration order stable for serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootIds(Vec<String>);

impl RootIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(id: impl Into<String>) -> Self {
        Self(vec![id.into()])
    }

    /// Insert `id`, returning `false` if it was already present.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.contains(&id) {
            return false;
        }
        self.0.push(id);
        true
    }

    pub fn union(&mut self, other: &RootIds) {
        for id in &other.0 {
            self.insert(id.as_str());
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|existing| existing == id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }
}

impl<S: Into<String>> FromIterator<S> for RootIds {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut ids = RootIds::new();
        for id in iter {
            ids.insert(id);
        }
        ids
    }
}

impl Serialize for RootIds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RootIds {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}
