//! # Salescope Analytics
//!
//! This crate turns sold-listing records into the numbers every chart is drawn from.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of files,
//!   networks or rendering. It depends only on `core-types` and the fee schedule
//!   from `configuration`.
//! - **Stateless Calculation:** The `MetricEngine` is a stateless calculator. It
//!   borrows records and returns new series, so callers' data is never modified.
//! - **Recover, then tell:** Missing data (empty input, undefined medians,
//!   overfit trends) falls back to a documented default and is reported as a
//!   `Notice`. Only configuration mistakes are errors.
//!
//! ## Public API
//!
//! - `MetricEngine`: per-date aggregates, break-even thresholds, profit splits and cumulative series.
//! - `trend`: least-squares polynomial and rolling trends with projection and R².
//! - `buckets`: feedback and sales-count tiers with Pareto cumulative shares.
//! - `AnalyticsError` / `Notice`: fatal and advisory outcomes.

// Declare the modules that constitute this crate.
pub mod buckets;
pub mod engine;
pub mod error;
pub mod notice;
pub mod report;
pub mod stats;
pub mod trend;

// Re-export the key components to create a clean, public-facing API.
pub use buckets::{FeedbackTier, ParetoBreakdown, SalesCountTier, TierRow};
pub use engine::MetricEngine;
pub use error::AnalyticsError;
pub use notice::Notice;
pub use report::{
    BreakEvenThresholds, CumulativePoint, CumulativeProfitSeries, DailyTotals, DateAggregate,
    ProfitSplit, SalesSummary,
};
pub use stats::DateSeries;
pub use trend::{Trend, TrendFit, TrendSpec};
