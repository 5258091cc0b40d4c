use crate::collector::{AddOptions, Collector};

/// A configuration builder for `Collector`.
#[derive(Clone, Debug)]
pub struct Configuration {
    pub(crate) root_namespace: String,
    pub(crate) flatten: bool,
    pub(crate) clobber: bool,
}

impl Default for Configuration {
    fn default() -> Configuration {
        Configuration {
            root_namespace: "root".to_owned(),
            flatten: true,
            clobber: false,
        }
    }
}

impl Configuration {
    /// Creates a new `Configuration` with default values.
    pub fn new() -> Configuration { Default::default() }

    /// Sets the root namespace.
    ///
    /// Defaults to `root`.
    ///
    /// This is the current namespace of a freshly built collector, and so the prefix applied to
    /// relative paths until `Collector::set_namespace` is called.  Collectors dedicated to a
    /// subsystem usually set this to the subsystem's name, e.g. `queue`.
    pub fn root_namespace(mut self, root_namespace: &str) -> Self {
        self.root_namespace = root_namespace.to_owned();
        self
    }

    /// Sets whether added values are flattened by default.
    ///
    /// Defaults to `true`.
    ///
    /// When enabled, nested lists are reduced to a single flat list of scalars before being
    /// stored or merged into an existing stat.  When disabled, a list added to an existing stat
    /// is appended as a single nested element.
    pub fn flatten(mut self, flatten: bool) -> Self {
        self.flatten = flatten;
        self
    }

    /// Sets whether added values overwrite existing stats by default.
    ///
    /// Defaults to `false`, which means adding a value to a populated namespace appends to it.
    pub fn clobber(mut self, clobber: bool) -> Self {
        self.clobber = clobber;
        self
    }

    pub(crate) fn add_options(&self) -> AddOptions { AddOptions::new().flatten(self.flatten).clobber(self.clobber) }

    /// Create a `Collector` based on this configuration.
    pub fn build(self) -> Collector { Collector::from_config(self) }
}
