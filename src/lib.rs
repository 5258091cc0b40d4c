mod collector;
mod configuration;
mod data;
mod error;
mod export;
mod helper;
mod namespace;
mod registry;
mod scope;
mod shorthand;

pub use self::{
    collector::{AddOptions, Collector, KeyedStats, Resolved},
    configuration::Configuration,
    data::{Number, Snapshot, Stat, Value},
    error::CollectorError,
    export::{Exporter, FileExporter, PrometheusExporter},
    namespace::{is_absolute, is_wildcard, SEPARATOR, WILDCARD},
    registry::Registry,
    scope::Scope,
    shorthand::Target,
};
