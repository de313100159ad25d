//! Expansion of `key=v1,v2,...` arguments into a cartesian product of jobs.
//!
//! Values are taken verbatim: the first `=` separates the key, and every `,`
//! after it separates values. There is no escaping.

use std::iter::FusedIterator;

use crate::contract::{OverrideAxis, Point};
use crate::error::SweepError;

/// Largest product a sweep may expand to. Every point is materialized before
/// the first batch launches.
pub const MAX_TOTAL_POINTS: usize = 1_000_000;

/// Parses one `key=v1,v2,...` argument into its axis of `key=v` overrides.
pub fn parse_override_axis(argument: &str) -> Result<OverrideAxis, SweepError> {
    let Some((key, values)) = argument.split_once('=') else {
        return Err(SweepError::MissingSeparator {
            argument: argument.to_string(),
        });
    };

    if key.is_empty() {
        return Err(SweepError::EmptyKey {
            argument: argument.to_string(),
        });
    }

    if values.is_empty() {
        return Err(SweepError::EmptyValueList {
            argument: argument.to_string(),
        });
    }

    Ok(values.split(',').map(|value| format!("{key}={value}")).collect())
}

/// Parses every argument into an axis, preserving input order.
pub fn expand_arguments<S: AsRef<str>>(arguments: &[S]) -> Result<Vec<OverrideAxis>, SweepError> {
    arguments
        .iter()
        .map(|argument| parse_override_axis(argument.as_ref()))
        .collect()
}

/// Number of points in the product of `axes`. Zero axes make one empty point.
///
/// Fails with [`SweepError::ProductTooLarge`] above [`MAX_TOTAL_POINTS`].
pub fn point_count(axes: &[OverrideAxis]) -> Result<usize, SweepError> {
    axes.iter().try_fold(1usize, |total, axis| {
        let total = total.saturating_mul(axis.len());
        if total > MAX_TOTAL_POINTS {
            return Err(SweepError::ProductTooLarge);
        }
        Ok(total)
    })
}

/// Expands `arguments` and collects the full product in nested-loop order.
pub fn expand_points<S: AsRef<str>>(arguments: &[S]) -> Result<Vec<Point>, SweepError> {
    let axes = expand_arguments(arguments)?;
    let product = CartesianProduct::new(&axes)?;
    Ok(product.collect())
}

/// Lazy cartesian product over override axes.
///
/// Yields points with the first axis varying slowest and the last axis
/// fastest, like nested `for` loops written in axis order.
#[derive(Debug, Clone)]
pub struct CartesianProduct<'a> {
    axes: &'a [OverrideAxis],
    indices: Vec<usize>,
    remaining: usize,
}

impl<'a> CartesianProduct<'a> {
    pub fn new(axes: &'a [OverrideAxis]) -> Result<Self, SweepError> {
        Ok(Self {
            axes,
            indices: vec![0; axes.len()],
            remaining: point_count(axes)?,
        })
    }

    fn advance(&mut self) {
        for position in (0..self.indices.len()).rev() {
            self.indices[position] += 1;
            if self.indices[position] < self.axes[position].len() {
                return;
            }
            self.indices[position] = 0;
        }
    }
}

impl Iterator for CartesianProduct<'_> {
    type Item = Point;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let point = self
            .indices
            .iter()
            .zip(self.axes)
            .map(|(&index, axis)| axis[index].clone())
            .collect();
        self.remaining -= 1;
        if self.remaining > 0 {
            self.advance();
        }
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for CartesianProduct<'_> {}

impl FusedIterator for CartesianProduct<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(rows: &[&[&str]]) -> Vec<Point> {
        rows.iter()
            .map(|row| row.iter().map(|item| item.to_string()).collect())
            .collect()
    }

    #[test]
    fn parses_axis_in_value_order() {
        let axis = parse_override_axis("a=3,1,2").expect("axis should parse");
        assert_eq!(axis, vec!["a=3", "a=1", "a=2"]);
    }

    #[test]
    fn splits_on_first_separator_only() {
        let axis = parse_override_axis("db.url=x=y,z").expect("axis should parse");
        assert_eq!(axis, vec!["db.url=x=y", "db.url=z"]);
    }

    #[test]
    fn keeps_values_verbatim() {
        let axis = parse_override_axis("a= 1,,2 ").expect("axis should parse");
        assert_eq!(axis, vec!["a= 1", "a=", "a=2 "]);
    }

    #[test]
    fn rejects_missing_separator() {
        let error = parse_override_axis("a").expect_err("argument should fail");
        assert!(matches!(error, SweepError::MissingSeparator { argument } if argument == "a"));
    }

    #[test]
    fn rejects_empty_value_list() {
        let error = parse_override_axis("a=").expect_err("argument should fail");
        assert!(matches!(error, SweepError::EmptyValueList { .. }));
    }

    #[test]
    fn rejects_empty_key() {
        let error = parse_override_axis("=1,2").expect_err("argument should fail");
        assert!(matches!(error, SweepError::EmptyKey { .. }));
    }

    #[test]
    fn product_follows_nested_loop_order() {
        let product = expand_points(&["a=1,2", "b=10,20"]).expect("product should expand");
        assert_eq!(
            product,
            points(&[
                &["a=1", "b=10"],
                &["a=1", "b=20"],
                &["a=2", "b=10"],
                &["a=2", "b=20"],
            ])
        );
    }

    #[test]
    fn product_length_is_product_of_axis_lengths() {
        let arguments = ["a=1,2,3", "b=x", "c=p,q", "d=5,6,7,8"];
        let axes = expand_arguments(&arguments).expect("axes should parse");
        let product: Vec<Point> = CartesianProduct::new(&axes)
            .expect("product should fit")
            .collect();

        assert_eq!(point_count(&axes).expect("count should fit"), 24);
        assert_eq!(product.len(), 24);

        let mut unique = product.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), product.len());
    }

    #[test]
    fn no_arguments_yield_one_empty_point() {
        let product = expand_points::<&str>(&[]).expect("product should expand");
        assert_eq!(product, vec![Vec::<String>::new()]);
    }

    #[test]
    fn iterator_reports_exact_size() {
        let axes = expand_arguments(&["a=1,2,3", "b=1,2"]).expect("axes should parse");
        let mut product = CartesianProduct::new(&axes).expect("product should fit");
        assert_eq!(product.len(), 6);
        product.next();
        assert_eq!(product.len(), 5);
        assert_eq!(product.by_ref().count(), 5);
        assert!(product.next().is_none());
    }

    fn axis(len: usize) -> OverrideAxis {
        (0..len).map(|value| format!("k={value}")).collect()
    }

    #[test]
    fn product_at_the_limit_is_accepted() {
        let axes = vec![axis(1000), axis(1000)];
        assert_eq!(point_count(&axes).expect("count should fit"), MAX_TOTAL_POINTS);
    }

    #[test]
    fn product_past_the_limit_is_rejected() {
        let axes = vec![axis(1000), axis(1000), axis(2)];
        assert!(matches!(
            point_count(&axes),
            Err(SweepError::ProductTooLarge)
        ));
    }

    #[test]
    fn huge_product_fails_before_allocating() {
        let values: Vec<String> = (0..100).map(|value| value.to_string()).collect();
        let arguments: Vec<String> = (0..8)
            .map(|position| format!("k{position}={}", values.join(",")))
            .collect();

        let error = expand_points(&arguments).expect_err("expansion should fail");
        assert!(matches!(error, SweepError::ProductTooLarge));

        let overflowing = vec![axis(1024); 8];
        assert!(matches!(
            point_count(&overflowing),
            Err(SweepError::ProductTooLarge)
        ));
    }
}
