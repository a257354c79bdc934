//! Exchange domain types
//!
//! Enumerated numeric domains used in signed messages and query strings.
//! Wire codes are fixed by the exchange.

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// A listed product. Only its `id` is ever signed (as `productId`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Product {
    pub symbol: String,
    pub id: u32,
}

impl Product {
    pub fn new(symbol: impl Into<String>, id: u32) -> Self {
        Self {
            symbol: symbol.into(),
            id,
        }
    }
}

/// Order type with its `uint8` wire code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Limit,
    LimitMaker,
    Market,
    StopLoss,
    StopLossLimit,
    TakeProfit,
    TakeProfitLimit,
}

impl OrderType {
    pub fn code(&self) -> u8 {
        match self {
            OrderType::Limit => 0,
            OrderType::LimitMaker => 1,
            OrderType::Market => 2,
            OrderType::StopLoss => 3,
            OrderType::StopLossLimit => 4,
            OrderType::TakeProfit => 5,
            OrderType::TakeProfitLimit => 6,
        }
    }
}

impl TryFrom<u8> for OrderType {
    type Error = ClientError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(OrderType::Limit),
            1 => Ok(OrderType::LimitMaker),
            2 => Ok(OrderType::Market),
            3 => Ok(OrderType::StopLoss),
            4 => Ok(OrderType::StopLossLimit),
            5 => Ok(OrderType::TakeProfit),
            6 => Ok(OrderType::TakeProfitLimit),
            other => Err(ClientError::OutOfRange {
                field: "orderType".into(),
                solidity_type: "OrderType".into(),
                value: other.to_string(),
            }),
        }
    }
}

/// Time in force with its `uint8` wire code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    Gtc,
    Fok,
    Ioc,
}

impl TimeInForce {
    pub fn code(&self) -> u8 {
        match self {
            TimeInForce::Gtc => 0,
            TimeInForce::Fok => 1,
            TimeInForce::Ioc => 2,
        }
    }
}

impl TryFrom<u8> for TimeInForce {
    type Error = ClientError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TimeInForce::Gtc),
            1 => Ok(TimeInForce::Fok),
            2 => Ok(TimeInForce::Ioc),
            other => Err(ClientError::OutOfRange {
                field: "timeInForce".into(),
                solidity_type: "TimeInForce".into(),
                value: other.to_string(),
            }),
        }
    }
}

/// Kline interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "2h")]
    TwoHours,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "8h")]
    EightHours,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "3d")]
    ThreeDays,
    #[serde(rename = "1w")]
    OneWeek,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::OneHour => "1h",
            Interval::TwoHours => "2h",
            Interval::FourHours => "4h",
            Interval::EightHours => "8h",
            Interval::OneDay => "1d",
            Interval::ThreeDays => "3d",
            Interval::OneWeek => "1w",
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order book depth limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderBookLimit {
    #[default]
    Five,
    Ten,
    Twenty,
}

impl OrderBookLimit {
    pub fn value(&self) -> u32 {
        match self {
            OrderBookLimit::Five => 5,
            OrderBookLimit::Ten => 10,
            OrderBookLimit::Twenty => 20,
        }
    }
}
