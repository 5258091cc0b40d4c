use regex::{Regex, RegexBuilder};
use std::cmp::Ordering;

/// Separator between namespace segments.
pub const SEPARATOR: char = '.';

/// Wildcard operator.
pub const WILDCARD: char = '*';

/// A classified path expression.
///
/// - `Wildcard` if the expression contains `*` anywhere;
/// - `Absolute` if it starts with the separator, e.g. `.donation.count.jan`;
/// - `Relative` otherwise, whether it's a leaf like `jan` or a sub path like `count.jan`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PathExpr<'a> {
    Relative(&'a str),
    Absolute(&'a str),
    Wildcard(&'a str),
}

impl<'a> PathExpr<'a> {
    pub(crate) fn parse(expr: &'a str) -> PathExpr<'a> {
        if is_wildcard(expr) {
            PathExpr::Wildcard(expr)
        } else if is_absolute(expr) {
            PathExpr::Absolute(expr)
        } else {
            PathExpr::Relative(expr)
        }
    }
}

/// Whether or not the expression contains the wildcard operator.
pub fn is_wildcard(expr: &str) -> bool { expr.contains(WILDCARD) }

/// Whether or not the expression is an absolute path.
pub fn is_absolute(expr: &str) -> bool { expr.starts_with(SEPARATOR) }

/// Strips a leading separator, if any.
pub(crate) fn strip_absolute(expr: &str) -> &str { expr.strip_prefix(SEPARATOR).unwrap_or(expr) }

/// Joins a parent namespace and a child path.
pub(crate) fn join(parent: &str, child: &str) -> String {
    let mut joined = String::with_capacity(parent.len() + child.len() + 1);
    joined.push_str(parent);
    joined.push(SEPARATOR);
    joined.push_str(child);
    joined
}

/// Nesting depth of a namespace, i.e. the number of separators in it.
pub(crate) fn depth(namespace: &str) -> usize { namespace.matches(SEPARATOR).count() }

/// Ordering of populated namespaces: shallower namespaces first, then alphabetical.
pub(crate) fn compare(a: &str, b: &str) -> Ordering { depth(a).cmp(&depth(b)).then_with(|| a.cmp(b)) }

/// A compiled wildcard expression.
///
/// Matching follows shell-style `fnmatch` semantics for `*`: it matches any run of characters,
/// including separators and newlines, so `a.*` matches both `a.b` and `a.b.c`.  Every other
/// character, separators included, only matches itself.  A pattern may hold several expressions,
/// in which case a namespace matching any one of them matches the pattern.
#[derive(Clone, Debug)]
pub(crate) struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compiles one or more wildcard expressions into a single pattern.
    ///
    /// Fails if the compiled pattern exceeds the regex size limit, which only very long
    /// expressions can hit.
    pub(crate) fn new<I, S>(exprs: I) -> Result<Pattern, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut source = String::from("^(?:");
        for (i, expr) in exprs.into_iter().enumerate() {
            if i > 0 {
                source.push('|');
            }
            translate(expr.as_ref(), &mut source);
        }
        source.push_str(")$");

        let regex = RegexBuilder::new(&source).dot_matches_new_line(true).build()?;
        Ok(Pattern { regex })
    }

    pub(crate) fn matches(&self, namespace: &str) -> bool { self.regex.is_match(namespace) }
}

/// Appends the regex form of a wildcard expression, collapsing runs of `*` into one `.*`.
fn translate(expr: &str, source: &mut String) {
    let mut pieces = expr.split(WILDCARD);
    if let Some(first) = pieces.next() {
        source.push_str(&regex::escape(first));
    }

    let mut in_star = false;
    for literal in pieces {
        if !in_star {
            source.push_str(".*");
            in_star = true;
        }
        if !literal.is_empty() {
            source.push_str(&regex::escape(literal));
            in_star = false;
        }
    }
}
