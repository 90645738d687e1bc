//! Aggregate rating stored on a product.
//!
//! The aggregate is derived data: it must always equal the mean and count
//! of the product's reviews. Every store recomputes it from the full review
//! set with [`RatingSummary::from_ratings`] rather than patching it
//! incrementally, so a missed or duplicated update heals on the next review.

use serde::{Deserialize, Serialize};

/// Mean rating and review count for one product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct RatingSummary {
    /// Arithmetic mean of all ratings, `0.0` when there are none.
    pub ratings_avg: f64,
    /// Number of reviews.
    pub ratings_count: i64,
}

impl RatingSummary {
    /// Aggregate a product's complete set of ratings.
    ///
    /// Ratings are not range-checked; whatever was stored is averaged.
    ///
    /// ```
    /// use emporium_core::RatingSummary;
    ///
    /// let summary = RatingSummary::from_ratings([4, 2]);
    /// assert_eq!(summary.ratings_count, 2);
    /// assert!((summary.ratings_avg - 3.0).abs() < f64::EPSILON);
    /// ```
    #[must_use]
    pub fn from_ratings<I>(ratings: I) -> Self
    where
        I: IntoIterator<Item = i32>,
    {
        let (sum, count) = ratings
            .into_iter()
            .fold((0_i64, 0_i64), |(sum, count), rating| {
                (sum + i64::from(rating), count + 1)
            });

        if count == 0 {
            return Self::default();
        }

        #[allow(clippy::cast_precision_loss)] // review counts and sums stay far below 2^52
        let ratings_avg = sum as f64 / count as f64;

        Self {
            ratings_avg,
            ratings_count: count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_reviews_is_zero() {
        let summary = RatingSummary::from_ratings(Vec::new());
        assert!(summary.ratings_avg.abs() < f64::EPSILON);
        assert_eq!(summary.ratings_count, 0);
    }

    #[test]
    fn test_single_review() {
        let summary = RatingSummary::from_ratings([4]);
        assert!((summary.ratings_avg - 4.0).abs() < f64::EPSILON);
        assert_eq!(summary.ratings_count, 1);
    }

    #[test]
    fn test_rolling_mean_after_each_review() {
        let ratings = [5, 3, 4, 1, 2, 5];
        for n in 1..=ratings.len() {
            let prefix = ratings.get(..n).unwrap_or_default();
            let summary = RatingSummary::from_ratings(prefix.iter().copied());
            let expected = f64::from(prefix.iter().sum::<i32>())
                / f64::from(u32::try_from(n).unwrap_or(u32::MAX));
            assert!((summary.ratings_avg - expected).abs() < 1e-9);
            assert_eq!(summary.ratings_count, i64::try_from(n).unwrap_or(-1));
        }
    }

    #[test]
    fn test_out_of_band_ratings_are_averaged_as_is() {
        let summary = RatingSummary::from_ratings([10, -2]);
        assert!((summary.ratings_avg - 4.0).abs() < f64::EPSILON);
    }
}
