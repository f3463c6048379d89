//! Seller tiers for the Pareto charts.
//!
//! Tiers are reported in their natural order (lowest reputation or sales count
//! first), and the cumulative share follows that order rather than tier size.

use crate::notice::Notice;
use core_types::SaleRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// Seller reputation tiers, after the platform's feedback star colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum FeedbackTier {
    Zero,
    OneToNine,
    TenToFortyNine,
    FiftyToNinetyNine,
    HundredToFourNinetyNine,
    FiveHundredToNineNinetyNine,
    ThousandToFourThousand,
    FiveThousandToTenThousand,
    TenThousandPlus,
}

impl FeedbackTier {
    pub const ALL: [FeedbackTier; 9] = [
        FeedbackTier::Zero,
        FeedbackTier::OneToNine,
        FeedbackTier::TenToFortyNine,
        FeedbackTier::FiftyToNinetyNine,
        FeedbackTier::HundredToFourNinetyNine,
        FeedbackTier::FiveHundredToNineNinetyNine,
        FeedbackTier::ThousandToFourThousand,
        FeedbackTier::FiveThousandToTenThousand,
        FeedbackTier::TenThousandPlus,
    ];

    /// Every score lands in exactly one tier.
    pub fn classify(score: u64) -> Self {
        match score {
            0 => FeedbackTier::Zero,
            1..10 => FeedbackTier::OneToNine,
            10..50 => FeedbackTier::TenToFortyNine,
            50..100 => FeedbackTier::FiftyToNinetyNine,
            100..500 => FeedbackTier::HundredToFourNinetyNine,
            500..1000 => FeedbackTier::FiveHundredToNineNinetyNine,
            1000..5000 => FeedbackTier::ThousandToFourThousand,
            5000..10000 => FeedbackTier::FiveThousandToTenThousand,
            _ => FeedbackTier::TenThousandPlus,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FeedbackTier::Zero => "Zero FB",
            FeedbackTier::OneToNine => "1 - 9",
            FeedbackTier::TenToFortyNine => "10 - 49",
            FeedbackTier::FiftyToNinetyNine => "50 - 99",
            FeedbackTier::HundredToFourNinetyNine => "100 - 499",
            FeedbackTier::FiveHundredToNineNinetyNine => "500 - 999",
            FeedbackTier::ThousandToFourThousand => "1000 - 4999",
            FeedbackTier::FiveThousandToTenThousand => "5000 - 9999",
            FeedbackTier::TenThousandPlus => "10000+",
        }
    }
}

/// Tiers by how many units a seller sold across the whole record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum SalesCountTier {
    One,
    Two,
    Three,
    Four,
    Five,
    SixToTen,
    ElevenToTwenty,
    TwentyOneToFifty,
    FiftyPlus,
}

impl SalesCountTier {
    pub const ALL: [SalesCountTier; 9] = [
        SalesCountTier::One,
        SalesCountTier::Two,
        SalesCountTier::Three,
        SalesCountTier::Four,
        SalesCountTier::Five,
        SalesCountTier::SixToTen,
        SalesCountTier::ElevenToTwenty,
        SalesCountTier::TwentyOneToFifty,
        SalesCountTier::FiftyPlus,
    ];

    /// Sellers with exactly 10 or exactly 20 sales match no tier. The labels
    /// read as inclusive ranges but the boundaries have always been
    /// `[6,10)`, `[11,20)` and `[21,50)`; the gap is kept so historic charts
    /// stay comparable.
    pub fn classify(sales: u64) -> Option<Self> {
        match sales {
            1 => Some(SalesCountTier::One),
            2 => Some(SalesCountTier::Two),
            3 => Some(SalesCountTier::Three),
            4 => Some(SalesCountTier::Four),
            5 => Some(SalesCountTier::Five),
            6..10 => Some(SalesCountTier::SixToTen),
            11..20 => Some(SalesCountTier::ElevenToTwenty),
            21..50 => Some(SalesCountTier::TwentyOneToFifty),
            50.. => Some(SalesCountTier::FiftyPlus),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SalesCountTier::One => "1",
            SalesCountTier::Two => "2",
            SalesCountTier::Three => "3",
            SalesCountTier::Four => "4",
            SalesCountTier::Five => "5",
            SalesCountTier::SixToTen => "6 - 10",
            SalesCountTier::ElevenToTwenty => "11 - 20",
            SalesCountTier::TwentyOneToFifty => "21 - 50",
            SalesCountTier::FiftyPlus => "50 +",
        }
    }
}

/// One bar of a Pareto chart: units sold by non-store and store sellers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierRow {
    pub label: String,
    pub non_store: u64,
    pub store: u64,
    pub all: u64,
    /// Running share of `all` up to and including this tier.
    pub cumulative_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParetoBreakdown {
    pub rows: Vec<TierRow>,
    pub total: u64,
}

impl ParetoBreakdown {
    fn from_columns(labels: &[&str], non_store: &[u64], store: &[u64], all: &[u64]) -> Self {
        let total: u64 = all.iter().sum();
        let mut running = 0u64;
        let rows = labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                running += all[i];
                TierRow {
                    label: label.to_string(),
                    non_store: non_store[i],
                    store: store[i],
                    all: all[i],
                    cumulative_share: if total == 0 {
                        0.0
                    } else {
                        running as f64 / total as f64
                    },
                }
            })
            .collect();
        Self { rows, total }
    }

    pub fn cumulative_shares(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.cumulative_share).collect()
    }
}

/// Units sold per feedback tier. Rows without a seller or a feedback score are skipped.
pub fn feedback_breakdown(records: &[SaleRecord]) -> ParetoBreakdown {
    let eligible: Vec<&SaleRecord> = records
        .iter()
        .filter(|r| r.seller_name.is_some() && r.seller_feedback_score.is_some())
        .collect();

    let sum_for = |store: Option<bool>| -> Vec<u64> {
        let mut sums = [0u64; 9];
        for record in eligible
            .iter()
            .filter(|r| store.is_none_or(|s| r.is_store_seller == s))
        {
            let score = record.seller_feedback_score.unwrap_or_default();
            sums[FeedbackTier::classify(score) as usize] += u64::from(record.quantity);
        }
        sums.to_vec()
    };

    let labels: Vec<&str> = FeedbackTier::ALL.iter().map(|t| t.label()).collect();
    ParetoBreakdown::from_columns(&labels, &sum_for(Some(false)), &sum_for(Some(true)), &sum_for(None))
}

/// Units sold per sales-count tier, where each seller is placed by their total units.
///
/// Rows without a seller are skipped. Sellers in the gaps between tiers are
/// left out of the bars and reported through an `UnbucketedSellers` notice.
pub fn sales_count_breakdown(records: &[SaleRecord]) -> (ParetoBreakdown, Option<Notice>) {
    let eligible: Vec<&SaleRecord> = records.iter().filter(|r| r.seller_name.is_some()).collect();

    let sum_for = |store: Option<bool>| -> (Vec<u64>, usize, u64) {
        let mut per_seller: BTreeMap<&str, u64> = BTreeMap::new();
        for record in eligible
            .iter()
            .filter(|r| store.is_none_or(|s| r.is_store_seller == s))
        {
            let seller = record.seller_name.as_deref().unwrap_or_default();
            *per_seller.entry(seller).or_default() += u64::from(record.quantity);
        }

        let mut sums = [0u64; 9];
        let (mut gap_sellers, mut gap_quantity) = (0usize, 0u64);
        for sold in per_seller.into_values() {
            match SalesCountTier::classify(sold) {
                Some(tier) => sums[tier as usize] += sold,
                None => {
                    gap_sellers += 1;
                    gap_quantity += sold;
                }
            }
        }
        (sums.to_vec(), gap_sellers, gap_quantity)
    };

    let (non_store, _, _) = sum_for(Some(false));
    let (store, _, _) = sum_for(Some(true));
    let (all, gap_sellers, gap_quantity) = sum_for(None);

    let labels: Vec<&str> = SalesCountTier::ALL.iter().map(|t| t.label()).collect();
    let breakdown = ParetoBreakdown::from_columns(&labels, &non_store, &store, &all);

    let notice = (gap_sellers > 0).then(|| Notice::UnbucketedSellers {
        sellers: gap_sellers,
        quantity: gap_quantity,
    });
    (breakdown, notice)
}
