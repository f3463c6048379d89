use serde::Deserialize;

/// One kline as returned by `GET /api/v3/klines`: a positional JSON array.
///
/// Fields: open time, open, high, low, close, volume, close time, quote volume,
/// trade count, taker base volume, taker quote volume, unused.
#[derive(Debug, Clone, Deserialize)]
pub struct RawKline(
    pub i64,
    pub String,
    pub String,
    pub String,
    pub String,
    pub String,
    pub i64,
    pub String,
    pub i64,
    pub String,
    pub String,
    pub String,
);

/// Represents an error response from the Binance API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub code: i64,
    pub msg: String,
}
