use crate::{
    collector::{Collector, KeyedStats},
    data::{Number, Snapshot, Stat},
    error::CollectorError,
};

/// One or more path expressions, as taken by the shorthand methods.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target<'a> {
    /// A single expression.
    One(&'a str),

    /// A list of expressions.
    Many(Vec<&'a str>),
}

impl<'a> Target<'a> {
    /// Gets the expressions in this target, in order.
    pub fn expressions(&self) -> Vec<&'a str> {
        match self {
            Target::One(expr) => vec![*expr],
            Target::Many(exprs) => exprs.clone(),
        }
    }
}

impl<'a> From<&'a str> for Target<'a> {
    fn from(expr: &'a str) -> Self { Target::One(expr) }
}

impl<'a> From<&'a String> for Target<'a> {
    fn from(expr: &'a String) -> Self { Target::One(expr.as_str()) }
}

impl<'a> From<&'a [&'a str]> for Target<'a> {
    fn from(exprs: &'a [&'a str]) -> Self { Target::Many(exprs.to_vec()) }
}

impl<'a, const N: usize> From<[&'a str; N]> for Target<'a> {
    fn from(exprs: [&'a str; N]) -> Self { Target::Many(exprs.to_vec()) }
}

impl<'a, const N: usize> From<&'a [&'a str; N]> for Target<'a> {
    fn from(exprs: &'a [&'a str; N]) -> Self { Target::Many(exprs.to_vec()) }
}

impl<'a> From<Vec<&'a str>> for Target<'a> {
    fn from(exprs: Vec<&'a str>) -> Self { Target::Many(exprs) }
}

impl<'a> From<&'a [String]> for Target<'a> {
    fn from(exprs: &'a [String]) -> Self { Target::Many(exprs.iter().map(String::as_str).collect()) }
}

/// Short aliases for the common collector operations.
///
/// These exist for call sites that record a lot of stats, where `c.inc("requests", 1)?` reads
/// better than the full method names.  Reads accept either a single expression or a list.
impl Collector {
    /// Records a stat.  Alias for `add_stat`.
    pub fn add<V: Into<Stat>>(&mut self, name: &str, value: V) -> Result<&mut Self, CollectorError> {
        self.add_stat(name, value)
    }

    /// Records a stat, overwriting whatever is there.
    pub fn clobber<V: Into<Stat>>(&mut self, name: &str, value: V) -> Result<&mut Self, CollectorError> {
        let options = self.add_options().clobber(true);
        self.add_stat_with(name, value, options)
    }

    /// Removes a stat.  Alias for `remove_stat`.
    pub fn del(&mut self, namespace: &str) -> Result<&mut Self, CollectorError> { self.remove_stat(namespace) }

    /// Increments a stat.  Alias for `increment_stat_by`.
    pub fn inc<N: Into<Number>>(&mut self, namespace: &str, amount: N) -> Result<&mut Self, CollectorError> {
        self.increment_stat_by(namespace, amount)
    }

    /// Decrements a stat.  Alias for `decrement_stat_by`.
    pub fn dec<N: Into<Number>>(&mut self, namespace: &str, amount: N) -> Result<&mut Self, CollectorError> {
        self.decrement_stat_by(namespace, amount)
    }

    /// Gets a stat, or several.
    ///
    /// A single expression behaves like `get_stat`.  A list behaves like `get_stats`, with the
    /// results gathered into one compound stat, or `None` if nothing was found.
    pub fn get<'t, T: Into<Target<'t>>>(&self, target: T) -> Option<Stat> {
        match target.into() {
            Target::One(expr) => self.get_stat(expr),
            Target::Many(exprs) => {
                let stats = self.get_stats(exprs, None);
                if stats.is_empty() {
                    None
                } else {
                    Some(Stat::Compound(stats))
                }
            },
        }
    }

    /// Gets a stat, or several, keyed by the namespace each resolved to.
    pub fn get_with_keys<'t, T: Into<Target<'t>>>(&self, target: T) -> KeyedStats {
        match target.into() {
            Target::One(expr) => self.get_stat_with_keys(expr, None),
            Target::Many(exprs) => self.get_stats_with_keys(exprs, None),
        }
    }

    /// Averages a stat, or several.  See `get_stats_average`.
    pub fn avg<'t, T: Into<Target<'t>>>(&self, target: T) -> Result<f64, CollectorError> {
        self.get_stats_average(target.into().expressions())
    }

    /// Sums a stat, or several.  See `get_stats_sum`.
    pub fn sum<'t, T: Into<Target<'t>>>(&self, target: T) -> Result<Number, CollectorError> {
        self.get_stats_sum(target.into().expressions())
    }

    /// Counts the values of a stat, or several.  See `get_stats_count`.
    pub fn count<'t, T: Into<Target<'t>>>(&self, target: T) -> usize {
        self.get_stats_count(target.into().expressions())
    }

    /// Gets every recorded stat.  Alias for `get_all_stats`.
    pub fn all(&self) -> Snapshot { self.get_all_stats() }

    /// Gets the current namespace.  Alias for `current_namespace`.
    pub fn ns(&self) -> &str { self.current_namespace() }

    /// Sets the current namespace.  Alias for `set_namespace`.
    pub fn use_ns(&mut self, namespace: &str) -> &mut Self { self.set_namespace(namespace) }
}
