use crate::{
    configuration::Configuration,
    data::{Number, Snapshot, Stat, Store, Value},
    error::CollectorError,
    helper,
    namespace::{compare, join, strip_absolute, PathExpr, Pattern, SEPARATOR},
};
use fnv::FnvBuildHasher;
use hashbrown::HashSet;
use log::{debug, trace, warn};
use std::iter;

/// Namespace/value pairs, as returned by the keyed lookups.
///
/// A value of `None` means the namespace was not populated and no default was given.
pub type KeyedStats = Vec<(String, Option<Stat>)>;

/// Options controlling how `Collector::add_stat_with` stores a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddOptions {
    flatten: bool,
    clobber: bool,
}

impl Default for AddOptions {
    fn default() -> AddOptions {
        AddOptions {
            flatten: true,
            clobber: false,
        }
    }
}

impl AddOptions {
    /// Creates a new `AddOptions` with default values: flatten, but don't clobber.
    pub fn new() -> AddOptions { Default::default() }

    /// Sets whether nested lists are flattened to a single list of scalars.
    pub fn flatten(mut self, flatten: bool) -> Self {
        self.flatten = flatten;
        self
    }

    /// Sets whether an existing stat is overwritten rather than appended to.
    pub fn clobber(mut self, clobber: bool) -> Self {
        self.clobber = clobber;
        self
    }
}

/// The result of resolving a path expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolved {
    /// A single concrete namespace.
    One(String),

    /// Zero or more namespaces, from a wildcard expansion.
    Many(Vec<String>),
}

impl Resolved {
    /// Converts this into a list of namespaces, regardless of how many there are.
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Resolved::One(ns) => vec![ns],
            Resolved::Many(nss) => nss,
        }
    }
}

/// Namespaced statistics collector.
///
/// Stats are recorded against dot-separated namespaces such as `donation.count.jan`.  The
/// collector keeps a current namespace which is prefixed to every relative path, so with a
/// current namespace of `donation.count`, the path `jan` refers to `donation.count.jan`.  Paths
/// starting with `.` are absolute, and paths containing `*` are expanded against every populated
/// namespace.
///
/// Lookups are tolerant: asking for a stat that doesn't exist gives back a default.  Mutations and
/// aggregates are strict, and fail with a `CollectorError` instead.
#[derive(Debug)]
pub struct Collector {
    root_namespace: String,
    namespace: Option<String>,
    defaults: AddOptions,
    store: Store,
    populated: Vec<String>,
}

impl Default for Collector {
    fn default() -> Collector { Configuration::default().build() }
}

impl Collector {
    pub(crate) fn from_config(conf: Configuration) -> Collector {
        let defaults = conf.add_options();
        Collector {
            root_namespace: conf.root_namespace,
            namespace: None,
            defaults,
            store: Store::new(),
            populated: Vec::new(),
        }
    }

    /// Creates a `Collector` with the default configuration.
    pub fn new() -> Collector { Default::default() }

    /// Gets a builder to configure a `Collector` instance with.
    pub fn builder() -> Configuration { Configuration::default() }

    /// Sets the current namespace.
    pub fn set_namespace(&mut self, namespace: &str) -> &mut Self {
        trace!("current namespace set to {}", namespace);
        self.namespace = Some(namespace.to_owned());
        self
    }

    /// Gets the current namespace, which is the root namespace unless one has been set.
    pub fn current_namespace(&self) -> &str { self.namespace.as_deref().unwrap_or(self.root_namespace.as_str()) }

    /// Gets the root namespace this collector was configured with.
    pub fn root_namespace(&self) -> &str { &self.root_namespace }

    /// Gets the options `add_stat` uses.
    pub fn add_options(&self) -> AddOptions { self.defaults }

    /// Gets every populated namespace, shallowest first and then in alphabetical order.
    pub fn populated_namespaces(&self) -> &[String] { &self.populated }

    fn view(&self) -> View<'_> { self.view_at(self.current_namespace()) }

    /// Gets a read-only view resolving relative paths against `cursor`.
    pub(crate) fn view_at<'c>(&'c self, cursor: &'c str) -> View<'c> { View { collector: self, cursor } }

    /// Resolves a path expression to the namespace(s) it refers to.
    ///
    /// Relative paths are prefixed with the current namespace, absolute paths have their leading
    /// separator stripped, and wildcards are expanded against the populated namespaces.  Wildcard
    /// matches keep a leading separator so that they can be fed back in as absolute paths.  If
    /// `absolute` is set, relative and absolute paths keep a leading separator too.
    ///
    /// A single namespace comes back as `Resolved::One`, even from a wildcard.
    pub fn resolve(&self, expr: &str, absolute: bool) -> Resolved { self.view().resolve(expr, absolute) }

    /// Resolves a list of path expressions, dropping duplicates but otherwise keeping order.
    pub fn resolve_all<I, S>(&self, exprs: I, absolute: bool) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.view().resolve_all(exprs, absolute)
    }

    fn register(&mut self, namespace: String) {
        if let Err(idx) = self.populated.binary_search_by(|ns| compare(ns, &namespace)) {
            self.populated.insert(idx, namespace);
        }
    }

    fn deregister(&mut self, namespace: &str) {
        if let Ok(idx) = self.populated.binary_search_by(|ns| compare(ns, namespace)) {
            let _ = self.populated.remove(idx);
        }
    }

    /// Records a stat using the configured default options.
    ///
    /// See `add_stat_with`.
    pub fn add_stat<V: Into<Stat>>(&mut self, name: &str, value: V) -> Result<&mut Self, CollectorError> {
        let options = self.defaults;
        self.add_stat_with(name, value, options)
    }

    /// Records a stat.
    ///
    /// If nothing is recorded at the target namespace yet, the value is stored there, flattened
    /// first if it's a list and `flatten` is set.  If something is recorded already, the value
    /// is either appended to it, turning it into a compound stat, or replaces it if `clobber` is
    /// set.  With `flatten` set, appending a list concatenates its flattened values; otherwise the
    /// list is appended as a single element.
    ///
    /// Wildcards can't be used to add stats.
    pub fn add_stat_with<V: Into<Stat>>(
        &mut self, name: &str, value: V, options: AddOptions,
    ) -> Result<&mut Self, CollectorError> {
        let path = self.view().target(name)?;
        self.add_at(path, value.into(), options);
        Ok(self)
    }

    pub(crate) fn add_at(&mut self, path: String, value: Stat, options: AddOptions) {
        let exists = self.store.has(&path);
        if exists && !options.clobber {
            if options.flatten && value.is_compound() {
                self.store.append(&path, value.flatten().into_iter().map(Stat::Scalar));
            } else {
                self.store.append(&path, iter::once(value));
            }
            debug!("appended to stat {}", path);
        } else {
            let value = if options.flatten && value.is_compound() {
                Stat::Compound(value.flatten().into_iter().map(Stat::Scalar).collect())
            } else {
                value
            };
            self.store.set(&path, value);

            if exists {
                debug!("overwrote stat {}", path);
            } else {
                debug!("added stat {}", path);
                self.register(path);
            }
        }
    }

    /// Removes a stat.
    ///
    /// Fails if the stat does not exist.  Wildcards are forbidden, to avoid wiping out swathes of
    /// stats by accident.
    pub fn remove_stat(&mut self, namespace: &str) -> Result<&mut Self, CollectorError> {
        let path = self.view().target(namespace)?;
        self.remove_at(path)?;
        Ok(self)
    }

    pub(crate) fn remove_at(&mut self, path: String) -> Result<(), CollectorError> {
        match self.store.remove(&path) {
            Some(_) => {
                self.deregister(&path);
                debug!("removed stat {}", path);
                Ok(())
            },
            None => Err(CollectorError::NamespaceNotFound { namespace: path }),
        }
    }

    /// Increments a stat by one.
    pub fn increment_stat(&mut self, namespace: &str) -> Result<&mut Self, CollectorError> {
        self.increment_stat_by(namespace, 1)
    }

    /// Increments a stat by the given amount.
    ///
    /// A stat that doesn't exist yet is created as `0` first.  Fails if the stat isn't a single
    /// number.
    pub fn increment_stat_by<N: Into<Number>>(&mut self, namespace: &str, amount: N) -> Result<&mut Self, CollectorError> {
        let path = self.view().target(namespace)?;
        self.increment_at(path, amount.into())?;
        Ok(self)
    }

    pub(crate) fn increment_at(&mut self, path: String, amount: Number) -> Result<(), CollectorError> {
        self.update_at(path, |current| current.add(amount))
    }

    /// Decrements a stat by one.
    pub fn decrement_stat(&mut self, namespace: &str) -> Result<&mut Self, CollectorError> {
        self.decrement_stat_by(namespace, 1)
    }

    /// Decrements a stat by the given amount.
    ///
    /// The sign of `amount` is ignored, so decrementing by `-5` and by `5` are the same thing.  A
    /// stat that doesn't exist yet is created as `0` first.  Fails if the stat isn't a single
    /// number.
    pub fn decrement_stat_by<N: Into<Number>>(&mut self, namespace: &str, amount: N) -> Result<&mut Self, CollectorError> {
        let path = self.view().target(namespace)?;
        self.decrement_at(path, amount.into())?;
        Ok(self)
    }

    pub(crate) fn decrement_at(&mut self, path: String, amount: Number) -> Result<(), CollectorError> {
        let amount = amount.abs();
        self.update_at(path, |current| current.sub(amount))
    }

    fn update_at<F>(&mut self, path: String, f: F) -> Result<(), CollectorError>
    where
        F: FnOnce(Number) -> Number,
    {
        if !self.store.has(&path) {
            self.store.set(&path, Stat::from(0));
            self.register(path.clone());
        }

        let current = match self.store.get(&path) {
            Some(stat) => stat,
            None => return Err(CollectorError::NamespaceNotFound { namespace: path }),
        };

        let updated = match current.as_number() {
            Some(n) => f(n),
            None => {
                return Err(CollectorError::NotIncrementable {
                    kind: kind(current),
                    namespace: path,
                });
            },
        };

        debug!("updated stat {} to {}", path, updated);
        self.store.set(&path, Stat::from(updated));
        Ok(())
    }

    /// Gets the stat recorded at a namespace.
    ///
    /// Wildcards are expanded: if they match a single stat, that stat is returned, otherwise the
    /// values of every match are merged into one compound stat.  Returns `None` if nothing
    /// matches.
    pub fn get_stat(&self, namespace: &str) -> Option<Stat> { self.view().get_stat(namespace) }

    /// Gets the stat recorded at a namespace, or `default` if there's nothing there.
    pub fn get_stat_or(&self, namespace: &str, default: Stat) -> Stat { self.get_stat(namespace).unwrap_or(default) }

    /// Gets the stat recorded at a namespace, keyed by the namespace it resolved to.
    ///
    /// If the stat does not exist, it's keyed by `namespace` exactly as given, with `default` as
    /// the value.  Wildcards are handled by `get_stats_with_keys`.
    pub fn get_stat_with_keys(&self, namespace: &str, default: Option<Stat>) -> KeyedStats {
        self.view().get_stat_with_keys(namespace, default)
    }

    /// Gets the stats recorded at several namespaces, as one flat list.
    ///
    /// Wildcards are expanded, and duplicate namespaces are only looked up once.  Compound stats
    /// contribute each of their values to the list.  Namespaces without a stat contribute
    /// `default`, or nothing at all if there's no default.
    pub fn get_stats<I, S>(&self, namespaces: I, default: Option<Stat>) -> Vec<Stat>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.view().get_stats(namespaces, default)
    }

    /// Gets the stats recorded at several namespaces, keyed by the namespace they resolved to.
    pub fn get_stats_with_keys<I, S>(&self, namespaces: I, default: Option<Stat>) -> KeyedStats
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.view().get_stats_with_keys(namespaces, default)
    }

    /// Counts the values recorded at a namespace.
    ///
    /// A scalar stat counts as one, a compound stat counts each of its values, and a namespace
    /// without a stat counts as zero.
    pub fn get_stat_count(&self, namespace: &str) -> usize { self.view().get_stat_count(namespace) }

    /// Counts the values recorded across several namespaces.
    pub fn get_stats_count<I, S>(&self, namespaces: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.view().get_stats_count(namespaces)
    }

    /// Sums the values recorded at a namespace.
    pub fn get_stat_sum(&self, namespace: &str) -> Result<Number, CollectorError> { self.get_stats_sum(&[namespace]) }

    /// Sums the values recorded across several namespaces.
    ///
    /// Fails if any namespace is missing, if any value isn't a number, or if there are no values
    /// at all.
    pub fn get_stats_sum<I, S>(&self, namespaces: I) -> Result<Number, CollectorError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.view().get_stats_sum(namespaces)
    }

    /// Averages the values recorded at a namespace.
    pub fn get_stat_average(&self, namespace: &str) -> Result<f64, CollectorError> {
        self.get_stats_average(&[namespace])
    }

    /// Averages the values recorded across several namespaces.
    ///
    /// Fails if any namespace is missing, if any value isn't a number, or if there are no values
    /// at all.
    pub fn get_stats_average<I, S>(&self, namespaces: I) -> Result<f64, CollectorError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.view().get_stats_average(namespaces)
    }

    /// Gets every recorded stat, keyed by full namespace.
    pub fn get_all_stats(&self) -> Snapshot {
        let mut snapshot = Snapshot::default();
        for ns in &self.populated {
            if let Some(stat) = self.store.get(ns) {
                snapshot.push(ns.clone(), stat.clone());
            }
        }
        snapshot
    }

    /// Whether or not no stats are recorded at all.
    pub fn is_empty(&self) -> bool { self.store.is_empty() }

    /// Drops every recorded stat and resets the current namespace to the root namespace.
    pub fn clear(&mut self) {
        self.store = Store::new();
        self.populated.clear();
        self.namespace = None;
    }
}

/// Read access to a collector, with relative paths resolved against `cursor`.
///
/// The collector reads through a view at its current namespace, and `Scope` through a view at
/// its own, so neither has to move the collector's cursor around.
#[derive(Clone, Copy)]
pub(crate) struct View<'c> {
    collector: &'c Collector,
    cursor: &'c str,
}

impl<'c> View<'c> {
    pub(crate) fn resolve(&self, expr: &str, absolute: bool) -> Resolved {
        let resolved = match PathExpr::parse(expr) {
            PathExpr::Wildcard(expr) => {
                let mut expanded = self.expand_wildcard(expr);
                if expanded.len() == 1 {
                    Resolved::One(expanded.remove(0))
                } else {
                    Resolved::Many(expanded)
                }
            },
            PathExpr::Absolute(expr) => {
                if absolute {
                    Resolved::One(expr.to_owned())
                } else {
                    Resolved::One(strip_absolute(expr).to_owned())
                }
            },
            PathExpr::Relative(expr) => {
                let path = join(self.cursor, expr);
                if absolute {
                    Resolved::One(format!("{}{}", SEPARATOR, path))
                } else {
                    Resolved::One(path)
                }
            },
        };

        trace!("resolved {} to {:?}", expr, resolved);
        resolved
    }

    pub(crate) fn resolve_all<I, S>(&self, exprs: I, absolute: bool) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen_exprs = HashSet::with_hasher(FnvBuildHasher::default());
        let mut seen = HashSet::with_hasher(FnvBuildHasher::default());
        let mut resolved = Vec::new();
        for expr in exprs {
            let expr = expr.as_ref();
            if !seen_exprs.insert(expr.to_owned()) {
                continue;
            }

            for ns in self.resolve(expr, absolute).into_vec() {
                if seen.insert(ns.clone()) {
                    resolved.push(ns);
                }
            }
        }
        resolved
    }

    /// Expands a wildcard against the populated namespaces.
    ///
    /// The expression is matched both as given and relative to the cursor, with one compiled
    /// pattern covering both.  An expression too large to compile matches nothing.
    fn expand_wildcard(&self, expr: &str) -> Vec<String> {
        let expr = strip_absolute(expr);
        let pattern = match Pattern::new(&[expr.to_owned(), join(self.cursor, expr)]) {
            Ok(pattern) => pattern,
            Err(e) => {
                warn!("wildcard expression could not be compiled, matching nothing: {}", e);
                return Vec::new();
            },
        };

        self.collector
            .populated
            .iter()
            .filter(|ns| pattern.matches(ns))
            .map(|ns| format!("{}{}", SEPARATOR, ns))
            .collect()
    }

    /// Resolves the single namespace a mutation applies to.
    pub(crate) fn target(&self, namespace: &str) -> Result<String, CollectorError> {
        match PathExpr::parse(namespace) {
            PathExpr::Wildcard(_) => Err(CollectorError::WildcardForbidden {
                namespace: namespace.to_owned(),
            }),
            PathExpr::Absolute(expr) => Ok(strip_absolute(expr).to_owned()),
            PathExpr::Relative(expr) => Ok(join(self.cursor, expr)),
        }
    }

    fn lookup(&self, namespace: &str) -> Option<&'c Stat> {
        self.target(namespace).ok().and_then(|path| self.collector.store.get(&path))
    }

    pub(crate) fn get_stat(&self, namespace: &str) -> Option<Stat> {
        if let PathExpr::Wildcard(_) = PathExpr::parse(namespace) {
            let mut stats = self.get_stats(&[namespace], None);
            return match stats.len() {
                0 => None,
                1 => stats.pop(),
                _ => Some(Stat::Compound(stats)),
            };
        }

        self.lookup(namespace).cloned()
    }

    pub(crate) fn get_stat_with_keys(&self, namespace: &str, default: Option<Stat>) -> KeyedStats {
        if let PathExpr::Wildcard(_) = PathExpr::parse(namespace) {
            return self.get_stats_with_keys(&[namespace], default);
        }

        match self.target(namespace) {
            Ok(path) => match self.collector.store.get(&path) {
                Some(stat) => vec![(path, Some(stat.clone()))],
                None => vec![(namespace.to_owned(), default)],
            },
            Err(_) => vec![(namespace.to_owned(), default)],
        }
    }

    pub(crate) fn get_stats<I, S>(&self, namespaces: I, default: Option<Stat>) -> Vec<Stat>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stats = Vec::new();
        for path in self.resolve_all(namespaces, true) {
            let found = self.collector.store.get(strip_absolute(&path)).cloned().or_else(|| default.clone());
            if let Some(stat) = found {
                stats.extend(stat.into_elements());
            }
        }
        stats
    }

    pub(crate) fn get_stats_with_keys<I, S>(&self, namespaces: I, default: Option<Stat>) -> KeyedStats
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.resolve_all(namespaces, true)
            .into_iter()
            .map(|path| {
                let path = strip_absolute(&path).to_owned();
                let stat = self.collector.store.get(&path).cloned().or_else(|| default.clone());
                (path, stat)
            })
            .collect()
    }

    pub(crate) fn get_stat_count(&self, namespace: &str) -> usize {
        self.get_stat(namespace).map(|s| s.count()).unwrap_or(0)
    }

    pub(crate) fn get_stats_count<I, S>(&self, namespaces: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        namespaces.into_iter().map(|ns| self.get_stat_count(ns.as_ref())).sum()
    }

    pub(crate) fn get_stats_sum<I, S>(&self, namespaces: I) -> Result<Number, CollectorError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let values = self.gather(namespaces)?;
        if values.is_empty() {
            return Err(CollectorError::EmptyAggregate);
        }
        Ok(helper::sum(&values))
    }

    pub(crate) fn get_stats_average<I, S>(&self, namespaces: I) -> Result<f64, CollectorError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let values = self.gather(namespaces)?;
        helper::mean(&values).ok_or(CollectorError::EmptyAggregate)
    }

    fn gather<I, S>(&self, namespaces: I) -> Result<Vec<Number>, CollectorError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut numbers = Vec::new();
        for namespace in namespaces {
            let namespace = namespace.as_ref();
            let paths = match PathExpr::parse(namespace) {
                PathExpr::Wildcard(expr) => self.expand_wildcard(expr),
                _ => vec![self.target(namespace)?],
            };

            for path in &paths {
                let path = strip_absolute(path);
                let stat = self.collector.store.get(path).ok_or_else(|| CollectorError::NamespaceNotFound {
                    namespace: path.to_owned(),
                })?;

                for value in stat.values() {
                    numbers.push(value.as_number().ok_or(CollectorError::NotAggregatable)?);
                }
            }
        }
        Ok(numbers)
    }
}

fn kind(stat: &Stat) -> &'static str {
    match stat {
        Stat::Scalar(Value::Int(_)) => "integer",
        Stat::Scalar(Value::Float(_)) => "float",
        Stat::Scalar(Value::Str(_)) => "string",
        Stat::Compound(_) => "compound",
    }
}
