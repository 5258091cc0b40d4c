use crate::{collector::Collector, configuration::Configuration, error::CollectorError};
use fnv::FnvBuildHasher;
use hashbrown::HashMap;
use log::debug;
use std::sync::{Arc, Mutex, MutexGuard};

type Collectors = HashMap<String, Arc<Mutex<Collector>>, FnvBuildHasher>;

/// A set of named collectors.
///
/// Collectors are created on first use from a template configuration, and handed out as
/// `Arc<Mutex<Collector>>` so that every part of a program asking for `queue` gets the same one.
/// The registry is meant to be created once and passed around, or held in whatever shared state
/// the application already has.
pub struct Registry {
    template: Configuration,
    collectors: Mutex<Collectors>,
}

impl Default for Registry {
    fn default() -> Registry { Registry::new(Configuration::default()) }
}

impl Registry {
    /// Creates an empty registry.
    ///
    /// Collectors created on demand are built from `template`.
    pub fn new(template: Configuration) -> Registry {
        Registry {
            template,
            collectors: Mutex::new(HashMap::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Collectors> { self.collectors.lock().unwrap_or_else(|err| err.into_inner()) }

    /// Gets the collector with the given name, creating it if it doesn't exist yet.
    pub fn collector(&self, name: &str) -> Arc<Mutex<Collector>> {
        let mut collectors = self.lock();
        collectors
            .entry(name.to_owned())
            .or_insert_with(|| {
                debug!("creating collector {}", name);
                Arc::new(Mutex::new(self.template.clone().build()))
            })
            .clone()
    }

    /// Registers a collector built from its own configuration.
    ///
    /// Fails if a collector with the same name already exists.
    pub fn register(&self, name: &str, config: Configuration) -> Result<Arc<Mutex<Collector>>, CollectorError> {
        let mut collectors = self.lock();
        if collectors.contains_key(name) {
            return Err(CollectorError::CollectorConflict { name: name.to_owned() });
        }

        debug!("registering collector {}", name);
        let collector = Arc::new(Mutex::new(config.build()));
        let _ = collectors.insert(name.to_owned(), collector.clone());
        Ok(collector)
    }

    /// Gets the collector with the given name, if it exists.
    pub fn get(&self, name: &str) -> Option<Arc<Mutex<Collector>>> { self.lock().get(name).cloned() }

    /// Removes a collector from the registry.
    ///
    /// Handles already given out stay usable, but the next call to `collector` with the same name
    /// creates a fresh one.
    pub fn remove(&self, name: &str) -> Option<Arc<Mutex<Collector>>> {
        let removed = self.lock().remove(name);
        if removed.is_some() {
            debug!("removed collector {}", name);
        }
        removed
    }

    /// Gets the names of every registered collector, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names = self.lock().keys().cloned().collect::<Vec<_>>();
        names.sort();
        names
    }

    /// Removes every collector.
    pub fn clear(&self) {
        self.lock().clear();
        debug!("cleared collector registry");
    }
}

#[cfg(test)]
mod tests {
    use super::Registry;
    use crate::{
        configuration::Configuration,
        data::{Number, Stat},
        error::CollectorError,
    };
    use std::{sync::Arc, thread};

    #[test]
    fn test_collector_is_shared() {
        let registry = Registry::default();
        let first = registry.collector("general");
        let second = registry.collector("general");
        assert!(Arc::ptr_eq(&first, &second));

        first.lock().unwrap().add_stat("clicks", 1).unwrap();
        assert_eq!(second.lock().unwrap().get_stat(".root.clicks"), Some(Stat::from(1)));
    }

    #[test]
    fn test_template_configuration() {
        let registry = Registry::new(Configuration::new().root_namespace("queue"));
        let collector = registry.collector("jobs");
        assert_eq!(collector.lock().unwrap().current_namespace(), "queue");
    }

    #[test]
    fn test_register_conflict() {
        let registry = Registry::default();
        let _ = registry.collector("general");

        assert_eq!(
            registry.register("general", Configuration::new()).unwrap_err(),
            CollectorError::CollectorConflict {
                name: "general".to_owned()
            }
        );

        let custom = registry.register("custom", Configuration::new().root_namespace("app")).unwrap();
        assert_eq!(custom.lock().unwrap().current_namespace(), "app");
        assert_eq!(registry.names(), vec!["custom".to_owned(), "general".to_owned()]);
    }

    #[test]
    fn test_remove_and_clear() {
        let registry = Registry::default();
        let old = registry.collector("general");
        old.lock().unwrap().add_stat("clicks", 1).unwrap();

        assert!(registry.remove("general").is_some());
        assert!(registry.remove("general").is_none());
        assert!(registry.get("general").is_none());

        let fresh = registry.collector("general");
        assert!(!Arc::ptr_eq(&old, &fresh));
        assert!(fresh.lock().unwrap().get_all_stats().is_empty());

        registry.clear();
        assert!(registry.names().is_empty());
    }

    #[test]
    fn test_concurrent_increments() {
        let registry = Arc::new(Registry::default());
        let handles = (0..8)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        let collector = registry.collector("shared");
                        collector.lock().unwrap().increment_stat("requests").unwrap();
                    }
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.join().unwrap();
        }

        let collector = registry.collector("shared");
        let total = collector.lock().unwrap().get_stat_sum("requests").unwrap();
        assert_eq!(total, Number::Int(800));
    }
}
