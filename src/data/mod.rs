use serde::Serialize;
use std::fmt::{self, Display};

pub mod snapshot;
pub mod store;

pub use self::snapshot::Snapshot;
pub(crate) use self::store::Store;

/// A single scalar measurement.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// An integer value.
    Int(i64),

    /// A floating-point value.
    Float(f64),

    /// A string value.
    ///
    /// Strings can be stored and retrieved like any other value, but they can't be incremented,
    /// summed or averaged.
    Str(String),
}

impl Value {
    /// Gets this value as a number, if it is one.
    pub fn as_number(&self) -> Option<Number> {
        match *self {
            Value::Int(i) => Some(Number::Int(i)),
            Value::Float(f) => Some(Number::Float(f)),
            Value::Str(_) => None,
        }
    }

    /// Whether or not this value is an integer or a float.
    pub fn is_numeric(&self) -> bool { self.as_number().is_some() }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

/// A numeric value.
///
/// This is what sums produce, and what increments and decrements operate with.  Arithmetic stays
/// integral as long as every operand is an integer and nothing overflows; otherwise the result
/// is promoted to a float.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Gets this number as a float.
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    /// Gets the absolute value of this number.
    pub fn abs(self) -> Number {
        match self {
            Number::Int(i) => i.checked_abs().map(Number::Int).unwrap_or(Number::Float((i as f64).abs())),
            Number::Float(f) => Number::Float(f.abs()),
        }
    }

    /// Adds two numbers together.
    pub fn add(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => match a.checked_add(b) {
                Some(sum) => Number::Int(sum),
                None => Number::Float(a as f64 + b as f64),
            },
            (a, b) => Number::Float(a.as_f64() + b.as_f64()),
        }
    }

    /// Subtracts `other` from this number.
    pub fn sub(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => match a.checked_sub(b) {
                Some(diff) => Number::Int(diff),
                None => Number::Float(a as f64 - b as f64),
            },
            (a, b) => Number::Float(a.as_f64() - b.as_f64()),
        }
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Value {
        match n {
            Number::Int(i) => Value::Int(i),
            Number::Float(f) => Value::Float(f),
        }
    }
}

macro_rules! number_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Number {
                fn from(n: $t) -> Number { Number::Int(i64::from(n)) }
            }
        )*
    };
}

number_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Number {
    fn from(n: f32) -> Number { Number::Float(f64::from(n)) }
}

impl From<f64> for Number {
    fn from(n: f64) -> Number { Number::Float(n) }
}

/// A recorded statistic.
///
/// A stat is either a single scalar, or a compound stat: an ordered list of values.  Recording a
/// second value against a namespace that already holds one turns it into a compound stat.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Stat {
    Scalar(Value),
    Compound(Vec<Stat>),
}

impl Stat {
    /// Whether or not this stat holds multiple values.
    pub fn is_compound(&self) -> bool {
        match self {
            Stat::Compound(_) => true,
            Stat::Scalar(_) => false,
        }
    }

    /// Gets the scalar value of this stat, if it is a scalar.
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Stat::Scalar(v) => Some(v),
            Stat::Compound(_) => None,
        }
    }

    /// Gets the stat as a single number, if it is a numeric scalar.
    pub fn as_number(&self) -> Option<Number> { self.as_scalar().and_then(Value::as_number) }

    /// Collapses any nesting into a single flat list of scalars.
    ///
    /// A scalar flattens to a one-element list.
    pub fn flatten(self) -> Vec<Value> {
        let mut flattened = Vec::new();
        self.flatten_into(&mut flattened);
        flattened
    }

    fn flatten_into(self, out: &mut Vec<Value>) {
        match self {
            Stat::Scalar(v) => out.push(v),
            Stat::Compound(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            },
        }
    }

    /// Iterates every scalar held by this stat, depth-first.
    pub fn values(&self) -> Vec<&Value> {
        let mut values = Vec::new();
        self.collect_values(&mut values);
        values
    }

    fn collect_values<'a>(&'a self, out: &mut Vec<&'a Value>) {
        match self {
            Stat::Scalar(v) => out.push(v),
            Stat::Compound(items) => {
                for item in items {
                    item.collect_values(out);
                }
            },
        }
    }

    /// Number of scalar values held by this stat.
    pub fn count(&self) -> usize {
        match self {
            Stat::Scalar(_) => 1,
            Stat::Compound(items) => items.iter().map(Stat::count).sum(),
        }
    }

    /// Splits this stat into its top-level elements.
    ///
    /// Scalars become a one-element list, compound stats give up their elements as-is.
    pub fn into_elements(self) -> Vec<Stat> {
        match self {
            Stat::Scalar(v) => vec![Stat::Scalar(v)],
            Stat::Compound(items) => items,
        }
    }
}

impl Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Stat::Scalar(v) => write!(f, "{}", v),
            Stat::Compound(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            },
        }
    }
}

impl From<Value> for Stat {
    fn from(v: Value) -> Stat { Stat::Scalar(v) }
}

impl From<Number> for Stat {
    fn from(n: Number) -> Stat { Stat::Scalar(n.into()) }
}

macro_rules! stat_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Stat {
                fn from(n: $t) -> Stat { Stat::Scalar(Value::Int(i64::from(n))) }
            }
        )*
    };
}

stat_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Stat {
    fn from(n: f32) -> Stat { Stat::Scalar(Value::Float(f64::from(n))) }
}

impl From<f64> for Stat {
    fn from(n: f64) -> Stat { Stat::Scalar(Value::Float(n)) }
}

impl From<&str> for Stat {
    fn from(s: &str) -> Stat { Stat::Scalar(Value::Str(s.to_owned())) }
}

impl From<String> for Stat {
    fn from(s: String) -> Stat { Stat::Scalar(Value::Str(s)) }
}

impl<T: Into<Stat>> From<Vec<T>> for Stat {
    fn from(items: Vec<T>) -> Stat { Stat::Compound(items.into_iter().map(Into::into).collect()) }
}

impl<T: Into<Stat>, const N: usize> From<[T; N]> for Stat {
    fn from(items: [T; N]) -> Stat { Stat::Compound(IntoIterator::into_iter(items).map(Into::into).collect()) }
}

impl PartialEq<i64> for Stat {
    fn eq(&self, other: &i64) -> bool { matches!(self, Stat::Scalar(Value::Int(i)) if i == other) }
}

impl PartialEq<f64> for Stat {
    fn eq(&self, other: &f64) -> bool { matches!(self, Stat::Scalar(Value::Float(f)) if f == other) }
}

impl PartialEq<&str> for Stat {
    fn eq(&self, other: &&str) -> bool { matches!(self, Stat::Scalar(Value::Str(s)) if s == other) }
}

impl PartialEq<i64> for Number {
    fn eq(&self, other: &i64) -> bool { matches!(self, Number::Int(i) if i == other) }
}

impl PartialEq<f64> for Number {
    fn eq(&self, other: &f64) -> bool { self.as_f64() == *other }
}
