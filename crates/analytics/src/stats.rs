//! Small statistics helpers over `Decimal` samples and date-indexed series.

use chrono::NaiveDate;
use rust_decimal::prelude::*;

/// A date-ordered series of values, one point per date.
pub type DateSeries = Vec<(NaiveDate, Decimal)>;

/// Median of the samples; the mean of the two middle values for even counts.
pub fn median(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / Decimal::TWO)
    } else {
        Some(sorted[mid])
    }
}

/// Median over `(value, count)` pairs, equal to [`median`] of the samples with
/// each value repeated `count` times. Zero counts are ignored.
pub fn weighted_median(samples: &[(Decimal, u64)]) -> Option<Decimal> {
    let mut sorted: Vec<(Decimal, u64)> = samples.iter().copied().filter(|(_, n)| *n > 0).collect();
    sorted.sort_unstable();
    let total: u128 = sorted.iter().map(|(_, n)| u128::from(*n)).sum();
    if total == 0 {
        return None;
    }
    let lower = nth_weighted(&sorted, (total - 1) / 2)?;
    let upper = nth_weighted(&sorted, total / 2)?;
    if total % 2 == 0 {
        Some((lower + upper) / Decimal::TWO)
    } else {
        Some(lower)
    }
}

/// The value at zero-based position `index` of the expanded, sorted samples.
fn nth_weighted(sorted: &[(Decimal, u64)], index: u128) -> Option<Decimal> {
    let mut seen: u128 = 0;
    sorted.iter().find_map(|(value, n)| {
        seen += u128::from(*n);
        (index < seen).then_some(*value)
    })
}

pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum: Decimal = values.iter().sum();
    Some(sum / Decimal::from(values.len()))
}

/// Sample standard deviation (n - 1 denominator). Undefined below two samples.
pub fn sample_std(values: &[Decimal]) -> Option<Decimal> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let variance = values
        .iter()
        .map(|v| (*v - mean) * (*v - mean))
        .sum::<Decimal>()
        / Decimal::from(values.len() - 1);
    variance.sqrt()
}

/// Moving average over the last `window` points. Early points average over
/// whatever is available, so the output has one value per input point.
pub fn rolling_mean(series: &[(NaiveDate, Decimal)], window: usize) -> DateSeries {
    let window = window.max(1);
    series
        .iter()
        .enumerate()
        .map(|(i, (date, _))| {
            let start = (i + 1).saturating_sub(window);
            let values: Vec<Decimal> = series[start..=i].iter().map(|(_, v)| *v).collect();
            // The slice always holds at least the current point.
            (*date, mean(&values).unwrap_or(Decimal::ZERO))
        })
        .collect()
}

/// Moving sample standard deviation with the same windowing as [`rolling_mean`].
pub fn rolling_std(series: &[(NaiveDate, Decimal)], window: usize) -> Vec<(NaiveDate, Option<Decimal>)> {
    let window = window.max(1);
    series
        .iter()
        .enumerate()
        .map(|(i, (date, _))| {
            let start = (i + 1).saturating_sub(window);
            let values: Vec<Decimal> = series[start..=i].iter().map(|(_, v)| *v).collect();
            (*date, sample_std(&values))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, d).unwrap()
    }

    #[test]
    fn median_odd_even_and_empty() {
        assert_eq!(median(&[dec!(3), dec!(1), dec!(2)]), Some(dec!(2)));
        assert_eq!(median(&[dec!(4), dec!(1), dec!(3), dec!(2)]), Some(dec!(2.5)));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn weighted_median_matches_expanded_samples() {
        assert_eq!(weighted_median(&[(dec!(400), 3), (dec!(100), 1)]), Some(dec!(400)));
        assert_eq!(weighted_median(&[(dec!(100), 2), (dec!(400), 2)]), Some(dec!(250)));
        assert_eq!(
            weighted_median(&[(dec!(3), 1), (dec!(1), 2), (dec!(2), 0)]),
            median(&[dec!(3), dec!(1), dec!(1)])
        );
        assert_eq!(weighted_median(&[(dec!(7), 0)]), None);
        assert_eq!(weighted_median(&[]), None);
    }

    #[test]
    fn weighted_median_handles_huge_counts() {
        let max = u64::from(u32::MAX);
        assert_eq!(weighted_median(&[(dec!(10), max), (dec!(20), max)]), Some(dec!(15)));
        assert_eq!(weighted_median(&[(dec!(10), max), (dec!(20), max + 1)]), Some(dec!(20)));
    }

    #[test]
    fn sample_std_needs_two_points() {
        assert_eq!(sample_std(&[dec!(5)]), None);
        let std = sample_std(&[dec!(2), dec!(4), dec!(4), dec!(4), dec!(5), dec!(5), dec!(7), dec!(9)]).unwrap();
        // Sample variance is 32 / 7.
        let expected = (dec!(32) / dec!(7)).sqrt().unwrap();
        assert!((std - expected).abs() < dec!(0.0000001));
    }

    #[test]
    fn rolling_mean_uses_shrinking_window_at_start() {
        let series = vec![(day(1), dec!(10)), (day(2), dec!(20)), (day(3), dec!(30)), (day(4), dec!(40))];
        let rolled = rolling_mean(&series, 3);
        let values: Vec<Decimal> = rolled.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![dec!(10), dec!(15), dec!(20), dec!(30)]);
        assert_eq!(rolled[3].0, day(4));
    }

    #[test]
    fn rolling_std_first_point_is_undefined() {
        let series = vec![(day(1), dec!(10)), (day(2), dec!(20))];
        let rolled = rolling_std(&series, 2);
        assert_eq!(rolled[0].1, None);
        assert!(rolled[1].1.is_some());
    }
}
