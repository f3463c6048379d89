use serde::Serialize;
use std::fmt;

/// A non-fatal condition met while computing a report.
///
/// Notices never abort a calculation: the affected metric falls back to a
/// documented default and the notice travels with the result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// The metric had no rows to work with and was reported as zero or skipped.
    EmptyInput { metric: String },
    /// No row satisfied the filter a median needed; the median defaulted to 0.
    UndefinedMedian { metric: String },
    /// The polynomial has at least as many coefficients as there are dates.
    OverfitWarning { degree: usize, points: usize },
    /// Sellers whose sales count falls between the sales-count tiers.
    UnbucketedSellers { sellers: usize, quantity: u64 },
}

impl Notice {
    pub fn empty_input(metric: &str) -> Self {
        Notice::EmptyInput {
            metric: metric.to_string(),
        }
    }

    pub fn undefined_median(metric: &str) -> Self {
        Notice::UndefinedMedian {
            metric: metric.to_string(),
        }
    }

    /// Emits the notice to the log at the appropriate level.
    pub fn log(&self) {
        match self {
            Notice::OverfitWarning { .. } | Notice::UnbucketedSellers { .. } => {
                tracing::warn!("{}", self)
            }
            Notice::EmptyInput { .. } | Notice::UndefinedMedian { .. } => tracing::debug!("{}", self),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::EmptyInput { metric } => write!(f, "No data for {metric}; defaulted to zero"),
            Notice::UndefinedMedian { metric } => {
                write!(f, "Median of {metric} is undefined; defaulted to zero")
            }
            Notice::OverfitWarning { degree, points } => write!(
                f,
                "Polynomial of degree {degree} over {points} dates may be overfit, try a lower order polynomial"
            ),
            Notice::UnbucketedSellers { sellers, quantity } => write!(
                f,
                "{sellers} seller(s) with {quantity} unit(s) fall between sales-count tiers"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn notices_serialize_with_a_kind_tag() {
        assert_eq!(
            serde_json::to_value(Notice::OverfitWarning { degree: 3, points: 2 }).unwrap(),
            json!({ "kind": "overfit_warning", "degree": 3, "points": 2 })
        );
        assert_eq!(
            serde_json::to_value(Notice::empty_input("sales summary")).unwrap(),
            json!({ "kind": "empty_input", "metric": "sales summary" })
        );
        assert_eq!(
            serde_json::to_value(Notice::UnbucketedSellers { sellers: 4, quantity: 9 }).unwrap(),
            json!({ "kind": "unbucketed_sellers", "sellers": 4, "quantity": 9 })
        );
    }
}
