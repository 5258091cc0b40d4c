use crate::{
    collector::{AddOptions, Collector, KeyedStats, Resolved, View},
    data::{Number, Stat},
    error::CollectorError,
    namespace::join,
};

impl Collector {
    /// Creates a scoped view of this collector.
    ///
    /// Relative paths given to the scope resolve against `namespace` instead of the collector's
    /// current namespace, which is left untouched.  This makes it easy to hand a subsystem its own
    /// corner of the collector without it having to juggle the current namespace:
    ///
    /// - `listener.a.messages_sent`
    /// - `listener.b.messages_sent`
    /// - `listener.c.messages_sent`
    ///
    /// Absolute paths and wildcards behave exactly as they do on the collector.  An empty
    /// namespace is rejected.
    pub fn scoped(&mut self, namespace: &str) -> Result<Scope<'_>, CollectorError> {
        if namespace.is_empty() {
            return Err(CollectorError::InvalidNamespace {
                namespace: namespace.to_owned(),
            });
        }

        Ok(Scope {
            collector: self,
            namespace: namespace.to_owned(),
        })
    }
}

/// A view of a `Collector` with its own current namespace.
///
/// Created by `Collector::scoped`.  The collector's own current namespace is never touched.
pub struct Scope<'a> {
    collector: &'a mut Collector,
    namespace: String,
}

impl<'a> Scope<'a> {
    /// Gets the namespace relative paths resolve against.
    pub fn namespace(&self) -> &str { &self.namespace }

    /// Creates a nested scope.
    ///
    /// Scopes are merged together using a `.` as the separator, so scoping `listener` by `a`
    /// gives `listener.a`.
    pub fn scoped(&mut self, namespace: &str) -> Result<Scope<'_>, CollectorError> {
        if namespace.is_empty() {
            return Err(CollectorError::InvalidNamespace {
                namespace: namespace.to_owned(),
            });
        }

        Ok(Scope {
            namespace: join(&self.namespace, namespace),
            collector: &mut *self.collector,
        })
    }

    fn view(&self) -> View<'_> { self.collector.view_at(&self.namespace) }

    /// Resolves a path expression.  See `Collector::resolve`.
    pub fn resolve(&self, expr: &str, absolute: bool) -> Resolved { self.view().resolve(expr, absolute) }

    /// Records a stat.  See `Collector::add_stat`.
    pub fn add_stat<V: Into<Stat>>(&mut self, name: &str, value: V) -> Result<&mut Self, CollectorError> {
        let options = self.collector.add_options();
        self.add_stat_with(name, value, options)
    }

    /// Records a stat with explicit options.  See `Collector::add_stat_with`.
    pub fn add_stat_with<V: Into<Stat>>(
        &mut self, name: &str, value: V, options: AddOptions,
    ) -> Result<&mut Self, CollectorError> {
        let path = self.view().target(name)?;
        self.collector.add_at(path, value.into(), options);
        Ok(self)
    }

    /// Removes a stat.  See `Collector::remove_stat`.
    pub fn remove_stat(&mut self, namespace: &str) -> Result<&mut Self, CollectorError> {
        let path = self.view().target(namespace)?;
        self.collector.remove_at(path)?;
        Ok(self)
    }

    /// Increments a stat by one.
    pub fn increment_stat(&mut self, namespace: &str) -> Result<&mut Self, CollectorError> {
        self.increment_stat_by(namespace, 1)
    }

    /// Increments a stat.  See `Collector::increment_stat_by`.
    pub fn increment_stat_by<N: Into<Number>>(&mut self, namespace: &str, amount: N) -> Result<&mut Self, CollectorError> {
        let path = self.view().target(namespace)?;
        self.collector.increment_at(path, amount.into())?;
        Ok(self)
    }

    /// Decrements a stat by one.
    pub fn decrement_stat(&mut self, namespace: &str) -> Result<&mut Self, CollectorError> {
        self.decrement_stat_by(namespace, 1)
    }

    /// Decrements a stat.  See `Collector::decrement_stat_by`.
    pub fn decrement_stat_by<N: Into<Number>>(&mut self, namespace: &str, amount: N) -> Result<&mut Self, CollectorError> {
        let path = self.view().target(namespace)?;
        self.collector.decrement_at(path, amount.into())?;
        Ok(self)
    }

    /// Gets a stat.  See `Collector::get_stat`.
    pub fn get_stat(&self, namespace: &str) -> Option<Stat> { self.view().get_stat(namespace) }

    /// Gets a stat, or `default` if there's nothing there.
    pub fn get_stat_or(&self, namespace: &str, default: Stat) -> Stat { self.get_stat(namespace).unwrap_or(default) }

    /// Gets a stat keyed by its full namespace.  See `Collector::get_stat_with_keys`.
    pub fn get_stat_with_keys(&self, namespace: &str, default: Option<Stat>) -> KeyedStats {
        self.view().get_stat_with_keys(namespace, default)
    }

    /// Gets several stats.  See `Collector::get_stats`.
    pub fn get_stats(&self, namespaces: &[&str], default: Option<Stat>) -> Vec<Stat> {
        self.view().get_stats(namespaces, default)
    }

    /// Gets several stats keyed by full namespace.  See `Collector::get_stats_with_keys`.
    pub fn get_stats_with_keys(&self, namespaces: &[&str], default: Option<Stat>) -> KeyedStats {
        self.view().get_stats_with_keys(namespaces, default)
    }

    /// Counts the values of a stat.  See `Collector::get_stat_count`.
    pub fn get_stat_count(&self, namespace: &str) -> usize { self.view().get_stat_count(namespace) }

    /// Counts the values of several stats.  See `Collector::get_stats_count`.
    pub fn get_stats_count(&self, namespaces: &[&str]) -> usize { self.view().get_stats_count(namespaces) }

    /// Sums a stat.  See `Collector::get_stat_sum`.
    pub fn get_stat_sum(&self, namespace: &str) -> Result<Number, CollectorError> { self.get_stats_sum(&[namespace]) }

    /// Sums several stats.  See `Collector::get_stats_sum`.
    pub fn get_stats_sum(&self, namespaces: &[&str]) -> Result<Number, CollectorError> {
        self.view().get_stats_sum(namespaces)
    }

    /// Averages a stat.  See `Collector::get_stat_average`.
    pub fn get_stat_average(&self, namespace: &str) -> Result<f64, CollectorError> {
        self.get_stats_average(&[namespace])
    }

    /// Averages several stats.  See `Collector::get_stats_average`.
    pub fn get_stats_average(&self, namespaces: &[&str]) -> Result<f64, CollectorError> {
        self.view().get_stats_average(namespaces)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        collector::{Collector, Resolved},
        data::{Number, Stat},
        error::CollectorError,
    };
    use std::panic::{self, AssertUnwindSafe};

    #[test]
    fn test_scoped_resolves_relative_paths() {
        let mut c = Collector::new();
        c.set_namespace("elsewhere");

        {
            let mut listener = c.scoped("listener").unwrap();
            let mut a = listener.scoped("a").unwrap();
            assert_eq!(a.namespace(), "listener.a");
            assert_eq!(a.resolve("messages_sent", false), Resolved::One("listener.a.messages_sent".to_owned()));
            a.add_stat("messages_sent", 10).unwrap().increment_stat_by("messages_sent", 5).unwrap();
            assert_eq!(a.get_stat("messages_sent"), Some(Stat::from(15)));
        }

        // The collector's own namespace is untouched.
        assert_eq!(c.current_namespace(), "elsewhere");
        assert_eq!(c.get_stat(".listener.a.messages_sent"), Some(Stat::from(15)));
        assert_eq!(c.get_stat("messages_sent"), None);
    }

    #[test]
    fn test_scoped_absolute_and_wildcard() {
        let mut c = Collector::new();
        c.add_stat(".general.clicks", 3).unwrap();

        let mut scope = c.scoped("listener").unwrap();
        scope.add_stat("b.sent", 4).unwrap();
        scope.add_stat("c.sent", 6).unwrap();

        assert_eq!(scope.get_stat(".general.clicks"), Some(Stat::from(3)));
        assert_eq!(scope.get_stats_sum(&["*.sent"]).unwrap(), Number::Int(10));
        assert_eq!(scope.get_stats_count(&["*.sent", ".general.clicks"]), 3);
        assert_eq!(scope.get_stats(&["b.sent", "missing"], Some(Stat::from(0))), vec![Stat::from(4), Stat::from(0)]);

        scope.remove_stat("b.sent").unwrap();
        assert_eq!(scope.get_stats_average(&["*.sent"]).unwrap(), 6.0);
    }

    #[test]
    fn test_scoped_single_target_reads() {
        let mut c = Collector::new();
        let mut scope = c.scoped("listener").unwrap();
        scope.add_stat("latency", vec![10, 20, 30]).unwrap();
        scope.increment_stat("requests").unwrap();
        scope.increment_stat("requests").unwrap();
        scope.decrement_stat("requests").unwrap();

        let scope = &scope;
        assert_eq!(scope.get_stat_count("latency"), 3);
        assert_eq!(scope.get_stat_sum("latency").unwrap(), Number::Int(60));
        assert_eq!(scope.get_stat_average("latency").unwrap(), 20.0);
        assert_eq!(scope.get_stat_or("missing", Stat::from(0)), Stat::from(0));
        assert_eq!(scope.get_stat("requests"), Some(Stat::from(1)));
        assert_eq!(
            scope.get_stats_with_keys(&["requests", "missing"], None),
            vec![
                ("listener.requests".to_owned(), Some(Stat::from(1))),
                ("listener.missing".to_owned(), None),
            ]
        );
    }

    #[test]
    fn test_scoped_errors_leave_namespace() {
        let mut c = Collector::new();
        c.set_namespace("outer");

        {
            let mut scope = c.scoped("inner").unwrap();
            assert!(scope.remove_stat("missing").is_err());
            assert!(matches!(scope.add_stat("*", 1), Err(CollectorError::WildcardForbidden { .. })));
            assert!(matches!(scope.scoped(""), Err(CollectorError::InvalidNamespace { .. })));
        }

        assert_eq!(c.current_namespace(), "outer");
        assert!(matches!(c.scoped(""), Err(CollectorError::InvalidNamespace { .. })));
    }

    #[test]
    fn test_scoped_panic_leaves_namespace() {
        let mut c = Collector::new();
        c.set_namespace("outer");

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut scope = c.scoped("inner").unwrap();
            scope.add_stat("before_panic", 1).unwrap();
            panic!("subsystem failed mid-update");
        }));
        assert!(result.is_err());

        assert_eq!(c.current_namespace(), "outer");
        assert_eq!(c.get_stat(".inner.before_panic"), Some(Stat::from(1)));
    }
}
