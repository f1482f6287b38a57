use derive_more::derive::{Constructor, Deref, IntoIterator};
use indexmap::IndexMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier to text mapping that keeps insertion order
///
/// This is the source form of a container: feeding it to [`crate::LocalizationBinary::build`]
/// lays the strings out in the order they appear here.
#[derive(Constructor, Clone, Debug, Default, PartialEq, Eq, Deref, IntoIterator)]
#[into_iterator(owned, ref)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct StringTable(IndexMap<String, String>);

impl StringTable {
    /// Add or overwrite the text of `identifier`.
    pub fn insert(&mut self, identifier: impl Into<String>, text: impl Into<String>) -> Option<String> {
        self.0.insert(identifier.into(), text.into())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StringTable {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
