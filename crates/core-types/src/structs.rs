use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single sold listing, as handed over by the ingestion layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub sold_date: NaiveDate,
    /// Item price plus shipping, as paid by the buyer.
    pub total_price: Decimal,
    #[serde(default)]
    pub shipping: Decimal,
    pub quantity: u32,
    /// Whether the seller sells through a business (store) account.
    #[serde(default)]
    pub is_store_seller: bool,
    #[serde(default)]
    pub seller_name: Option<String>,
    #[serde(default)]
    pub seller_feedback_score: Option<u64>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub msrp_reference: Option<Decimal>,
    pub item_label: String,
}

impl SaleRecord {
    /// Checks the row-level invariants the analytics layer relies on.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.total_price < Decimal::ZERO {
            return Err(CoreError::InvalidInput(
                "total_price".to_string(),
                format!("must be >= 0, got {}", self.total_price),
            ));
        }
        if self.quantity < 1 {
            return Err(CoreError::InvalidInput(
                "quantity".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// All sold listings scraped for one item.
///
/// A `RecordSet` is never mutated once built; filtering returns a new set.
/// The item label and MSRP are taken from the first record, since every row
/// of a scraped item carries the same values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    records: Vec<SaleRecord>,
}

impl RecordSet {
    pub fn new(records: Vec<SaleRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[SaleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SaleRecord> {
        self.records.iter()
    }

    /// The item label of the set, or an empty string for an empty set.
    pub fn item_label(&self) -> &str {
        self.records
            .first()
            .map(|r| r.item_label.as_str())
            .unwrap_or_default()
    }

    /// The reference MSRP of the set, or zero when unknown.
    pub fn msrp(&self) -> Decimal {
        self.records
            .first()
            .and_then(|r| r.msrp_reference)
            .unwrap_or(Decimal::ZERO)
    }

    /// Returns the records sold within `[start, end]` (both inclusive).
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> RecordSet {
        self.records
            .iter()
            .filter(|r| r.sold_date >= start && r.sold_date <= end)
            .cloned()
            .collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.iter().map(|r| r.sold_date).min()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.iter().map(|r| r.sold_date).max()
    }

    /// Concatenates several sets into one, preserving their order.
    pub fn concat(sets: &[RecordSet]) -> RecordSet {
        sets.iter().flat_map(|s| s.records.iter().cloned()).collect()
    }
}

impl From<Vec<SaleRecord>> for RecordSet {
    fn from(records: Vec<SaleRecord>) -> Self {
        Self::new(records)
    }
}

impl FromIterator<SaleRecord> for RecordSet {
    fn from_iter<I: IntoIterator<Item = SaleRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a SaleRecord;
    type IntoIter = std::slice::Iter<'a, SaleRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
