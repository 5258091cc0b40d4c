use thiserror::Error;

/// Errors raised by collector operations.
///
/// Lookups never fail: a missing stat falls back to a default.  Mutations and aggregates fail
/// fast with one of these instead of coercing values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CollectorError {
    /// An increment or decrement targeted a value that isn't a single number.
    #[error("attempted to modify a value which cannot be incremented or decremented ({namespace}: {kind})")]
    NotIncrementable { namespace: String, kind: &'static str },

    /// The target namespace holds no value.
    #[error("namespace does not exist: {namespace}")]
    NamespaceNotFound { namespace: String },

    /// A wildcard was given to an operation that writes or removes.
    #[error("wildcard usage forbidden when modifying stats: {namespace}")]
    WildcardForbidden { namespace: String },

    /// A sum or average was requested over a value that isn't a number.
    #[error("unable to aggregate this collection of values (are they all numbers?)")]
    NotAggregatable,

    /// A sum or average was requested over no values at all.
    #[error("unable to aggregate an empty collection of values")]
    EmptyAggregate,

    /// The namespace given was invalid, i.e. empty.
    #[error("invalid namespace: {namespace:?}")]
    InvalidNamespace { namespace: String },

    /// A collector is already registered under this name.
    #[error("a collector named {name} is already registered")]
    CollectorConflict { name: String },
}
