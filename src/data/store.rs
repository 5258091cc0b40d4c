use super::Stat;
use crate::namespace::SEPARATOR;
use fnv::FnvBuildHasher;
use hashbrown::HashMap;

#[derive(Debug, Default)]
struct Node {
    value: Option<Stat>,
    children: HashMap<String, Node, FnvBuildHasher>,
}

impl Node {
    fn is_empty(&self) -> bool { self.value.is_none() && self.children.is_empty() }

    fn remove(&mut self, segments: &[&str]) -> Option<Stat> {
        match segments.split_first() {
            None => self.value.take(),
            Some((head, rest)) => {
                let child = self.children.get_mut(*head)?;
                let removed = child.remove(rest);
                if child.is_empty() {
                    let _ = self.children.remove(*head);
                }
                removed
            },
        }
    }
}

/// Nested storage of stats, addressed by full dotted paths.
///
/// The store has no notion of namespaces beyond splitting a path on the separator: callers are
/// expected to hand it absolute paths.  Each node can hold a value and children at the same time,
/// so `a.b` and `a.b.c` can both be populated.
#[derive(Debug, Default)]
pub(crate) struct Store {
    root: Node,
}

impl Store {
    pub(crate) fn new() -> Store { Default::default() }

    fn node(&self, path: &str) -> Option<&Node> {
        let mut node = &self.root;
        for segment in path.split(SEPARATOR) {
            node = node.children.get(segment)?;
        }
        Some(node)
    }

    fn node_mut(&mut self, path: &str) -> &mut Node {
        let mut node = &mut self.root;
        for segment in path.split(SEPARATOR) {
            node = node.children.entry(segment.to_owned()).or_insert_with(Node::default);
        }
        node
    }

    /// Whether or not a value is assigned at exactly this path.
    pub(crate) fn has(&self, path: &str) -> bool { self.get(path).is_some() }

    /// Gets the value at the given path.
    pub(crate) fn get(&self, path: &str) -> Option<&Stat> { self.node(path).and_then(|n| n.value.as_ref()) }

    /// Assigns a value, overwriting anything already at the path.
    pub(crate) fn set(&mut self, path: &str, value: Stat) { self.node_mut(path).value = Some(value); }

    /// Appends values to whatever is at the path.
    ///
    /// A scalar already at the path is promoted to a one-element compound stat first, then each
    /// of `values` is pushed as its own element.  If nothing is at the path, the values are stored
    /// as a compound stat.
    pub(crate) fn append<I>(&mut self, path: &str, values: I)
    where
        I: IntoIterator<Item = Stat>,
    {
        let node = self.node_mut(path);
        let mut items = match node.value.take() {
            None => Vec::new(),
            Some(Stat::Compound(items)) => items,
            Some(scalar) => vec![scalar],
        };
        items.extend(values);
        node.value = Some(Stat::Compound(items));
    }

    /// Removes the value at the path, pruning any intermediate nodes left empty.
    pub(crate) fn remove(&mut self, path: &str) -> Option<Stat> {
        let segments = path.split(SEPARATOR).collect::<Vec<_>>();
        self.root.remove(&segments)
    }

    /// Whether or not the store holds nothing at all.
    pub(crate) fn is_empty(&self) -> bool { self.root.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::Store;
    use crate::data::Stat;

    #[test]
    fn test_store_missing_path() {
        let store = Store::new();
        assert!(!store.has("a.b.c"));
        assert!(store.get("a.b.c").is_none());
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = Store::new();
        store.set("a.b.c", Stat::from(1));

        assert!(store.has("a.b.c"));
        assert_eq!(store.get("a.b.c"), Some(&Stat::from(1)));

        // Intermediate nodes aren't values.
        assert!(!store.has("a.b"));
        assert!(!store.has("a"));

        store.set("a.b.c", Stat::from(2));
        assert_eq!(store.get("a.b.c"), Some(&Stat::from(2)));
    }

    #[test]
    fn test_store_value_and_children_coexist() {
        let mut store = Store::new();
        store.set("a.b", Stat::from(1));
        store.set("a.b.c", Stat::from(2));

        assert_eq!(store.get("a.b"), Some(&Stat::from(1)));
        assert_eq!(store.get("a.b.c"), Some(&Stat::from(2)));

        assert_eq!(store.remove("a.b"), Some(Stat::from(1)));
        assert!(!store.has("a.b"));
        assert_eq!(store.get("a.b.c"), Some(&Stat::from(2)));
    }

    #[test]
    fn test_store_append() {
        let mut store = Store::new();
        store.set("x", Stat::from(1));
        store.append("x", vec![Stat::from(2)]);
        assert_eq!(store.get("x"), Some(&Stat::from(vec![1, 2])));

        store.append("x", vec![Stat::from(vec![3, 4])]);
        assert_eq!(
            store.get("x"),
            Some(&Stat::Compound(vec![Stat::from(1), Stat::from(2), Stat::from(vec![3, 4])]))
        );

        store.append("y", vec![Stat::from(5), Stat::from(6)]);
        assert_eq!(store.get("y"), Some(&Stat::from(vec![5, 6])));
    }

    #[test]
    fn test_store_remove_prunes() {
        let mut store = Store::new();
        store.set("a.b.c", Stat::from(1));
        assert!(store.remove("a.b.missing").is_none());
        assert!(store.remove("nope").is_none());

        assert_eq!(store.remove("a.b.c"), Some(Stat::from(1)));
        assert!(store.is_empty());
    }
}
