use super::Stat;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A point-in-time view of every populated namespace.
///
/// Entries are ordered the same way the collector orders its populated namespaces: by nesting
/// depth first, and then alphabetically.  This is what exporters consume.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    stats: Vec<(String, Stat)>,
}

impl Snapshot {
    pub(crate) fn push(&mut self, namespace: String, stat: Stat) { self.stats.push((namespace, stat)); }

    /// Gets the stat recorded for the given full namespace.
    ///
    /// Returns `None` if the namespace was not populated when this snapshot was taken.
    pub fn get(&self, namespace: &str) -> Option<&Stat> {
        self.stats.iter().find(|(ns, _)| ns == namespace).map(|(_, stat)| stat)
    }

    /// Number of populated namespaces in this snapshot.
    pub fn len(&self) -> usize { self.stats.len() }

    /// Whether or not this snapshot is empty.
    pub fn is_empty(&self) -> bool { self.stats.is_empty() }

    /// Iterates the namespaces and their stats, in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Stat)> { self.stats.iter().map(|(ns, stat)| (ns.as_str(), stat)) }

    /// Gets the full namespaces held by this snapshot, in order.
    pub fn namespaces(&self) -> Vec<&str> { self.stats.iter().map(|(ns, _)| ns.as_str()).collect() }

    /// Converts this [`Snapshot`] to the underlying vector of namespace/stat pairs.
    pub fn into_vec(self) -> Vec<(String, Stat)> { self.stats }
}

impl IntoIterator for Snapshot {
    type IntoIter = std::vec::IntoIter<(String, Stat)>;
    type Item = (String, Stat);

    fn into_iter(self) -> Self::IntoIter { self.stats.into_iter() }
}

impl Serialize for Snapshot {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.stats.len()))?;
        for (k, v) in &self.stats {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::Snapshot;
    use crate::data::Stat;

    #[test]
    fn test_snapshot_simple_push_and_get() {
        let mut snapshot = Snapshot::default();
        assert!(snapshot.is_empty());

        snapshot.push("milky_way.planets".to_owned(), Stat::from(8));
        snapshot.push("milky_way.moons".to_owned(), Stat::from(vec![1, 2]));

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("milky_way.planets"), Some(&Stat::from(8)));
        assert_eq!(snapshot.get("milky_way.moons"), Some(&Stat::from(vec![1, 2])));
        assert!(snapshot.get("milky_way").is_none());
        assert_eq!(snapshot.namespaces(), vec!["milky_way.planets", "milky_way.moons"]);
    }

    #[test]
    fn test_snapshot_serializes_in_order() {
        let mut snapshot = Snapshot::default();
        snapshot.push("b".to_owned(), Stat::from(1));
        snapshot.push("a.c".to_owned(), Stat::from(vec![2, 3]));

        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, r#"{"b":1,"a.c":[2,3]}"#);
    }
}
