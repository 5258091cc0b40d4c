use crate::data::Number;

/// Sums a collection of numbers.
///
/// An empty collection sums to zero.
pub(crate) fn sum(values: &[Number]) -> Number { values.iter().fold(Number::Int(0), |acc, v| acc.add(*v)) }

/// Gets the arithmetic mean of a collection of numbers.
///
/// Returns `None` for an empty collection.
pub(crate) fn mean(values: &[Number]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    Some(sum(values).as_f64() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::{mean, sum};
    use crate::data::Number;

    #[test]
    fn test_sum() {
        assert_eq!(sum(&[]), Number::Int(0));
        assert_eq!(sum(&[Number::Int(1), Number::Int(2), Number::Int(3)]), Number::Int(6));
        assert_eq!(sum(&[Number::Int(1), Number::Float(0.5)]), Number::Float(1.5));
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);

        let ages = [23, 12, 74, 49, 9].iter().map(|a| Number::Int(*a)).collect::<Vec<_>>();
        assert_eq!(mean(&ages), Some(33.4));
    }
}
