use crate::error::ApiError;
use crate::responses::{ApiErrorResponse, RawKline};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate};
use configuration::PriceFeedSettings;
use rust_decimal::Decimal;
use std::str::FromStr;

pub mod error;
pub mod responses;

/// Binance caps a single klines request at this many candles.
const MAX_KLINES_PER_REQUEST: i64 = 1000;

/// The external source of daily closing prices used by the crypto comparison.
///
/// The report only depends on this trait, so tests can substitute a fixed series.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Fetches one closing price per day for `symbol`, for every day in
    /// `[start, end]` the source has data for, in ascending date order.
    async fn fetch_daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, Decimal)>, ApiError>;
}

/// A `PriceFeed` backed by the public Binance spot klines endpoint.
#[derive(Clone)]
pub struct BinanceClient {
    client: reqwest::Client,
    base_url: String,
}

impl BinanceClient {
    pub fn new(settings: &PriceFeedSettings) -> Result<Self, ApiError> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_page(
        &self,
        symbol: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<RawKline>, ApiError> {
        let url = format!("{}/api/v3/klines", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("interval", "1d"),
                ("startTime", &start_ms.to_string()),
                ("endTime", &end_ms.to_string()),
                ("limit", &MAX_KLINES_PER_REQUEST.to_string()),
            ])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str::<Vec<RawKline>>(&text)
                .map_err(|e| ApiError::Deserialization(e.to_string()))
        } else {
            let api_error: ApiErrorResponse = serde_json::from_str(&text).map_err(|e| {
                ApiError::Deserialization(format!(
                    "Failed to deserialize error response: {}. Original text: {}",
                    e, text
                ))
            })?;
            Err(ApiError::Exchange(api_error.code, api_error.msg))
        }
    }
}

#[async_trait]
impl PriceFeed for BinanceClient {
    async fn fetch_daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, Decimal)>, ApiError> {
        let end_ms = day_start_millis(end) + Duration::days(1).num_milliseconds() - 1;
        let mut cursor = day_start_millis(start);
        let mut closes = Vec::new();

        while cursor <= end_ms {
            let page = self.fetch_page(symbol, cursor, end_ms).await?;
            let Some(last) = page.last() else {
                break;
            };
            let next = last.0 + Duration::days(1).num_milliseconds();
            let full_page = page.len() as i64 >= MAX_KLINES_PER_REQUEST;
            closes.extend(closes_from_klines(page)?);
            if !full_page {
                break;
            }
            cursor = next;
        }

        if closes.is_empty() {
            return Err(ApiError::NoData {
                symbol: symbol.to_string(),
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        tracing::debug!(symbol, days = closes.len(), "Fetched daily closes.");
        Ok(closes)
    }
}

fn day_start_millis(date: NaiveDate) -> i64 {
    date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp_millis()
}

/// Converts raw klines into (open date, close) pairs.
pub fn closes_from_klines(raw: Vec<RawKline>) -> Result<Vec<(NaiveDate, Decimal)>, ApiError> {
    raw.into_iter()
        .map(|k| {
            let date = DateTime::from_timestamp_millis(k.0)
                .ok_or_else(|| ApiError::InvalidData(format!("Invalid open_time: {}", k.0)))?
                .date_naive();
            let close =
                Decimal::from_str(&k.4).map_err(|e| ApiError::Deserialization(e.to_string()))?;
            Ok((date, close))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kline_arrays_into_daily_closes() {
        let body = r#"[
            [1609459200000, "736.42", "749.00", "714.29", "728.91", "675715.1", 1609545599999, "0", 100, "0", "0", "0"],
            [1609545600000, "728.91", "787.69", "714.91", "774.56", "1352351.8", 1609631999999, "0", 100, "0", "0", "0"]
        ]"#;
        let raw: Vec<RawKline> = serde_json::from_str(body).unwrap();
        let closes = closes_from_klines(raw).unwrap();
        assert_eq!(closes.len(), 2);
        assert_eq!(closes[0].0, NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
        assert_eq!(closes[0].1, Decimal::from_str("728.91").unwrap());
        assert_eq!(closes[1].0, NaiveDate::from_ymd_opt(2021, 1, 2).unwrap());
    }

    #[test]
    fn rejects_unparseable_close() {
        let raw = vec![RawKline(
            1609459200000,
            "1".into(),
            "1".into(),
            "1".into(),
            "not-a-number".into(),
            "1".into(),
            0,
            "0".into(),
            0,
            "0".into(),
            "0".into(),
            "0".into(),
        )];
        assert!(matches!(closes_from_klines(raw), Err(ApiError::Deserialization(_))));
    }

    #[test]
    fn day_bounds_are_utc_midnight() {
        let date = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        assert_eq!(day_start_millis(date), 1609459200000);
    }

    #[tokio::test]
    async fn unreachable_host_is_a_request_error() {
        let settings = PriceFeedSettings {
            base_url: "http://127.0.0.1:9".to_string(),
            symbol: "ETHUSDT".to_string(),
        };
        let client = BinanceClient::new(&settings).unwrap();
        let date = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let result = client.fetch_daily_closes("ETHUSDT", date, date).await;
        assert!(matches!(result, Err(ApiError::Request(_))));
    }
}
