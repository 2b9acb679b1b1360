//! Wire types for the two upstream sources.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer};

use crate::config::DECIMAL_SCALE;

/// One entry of the country directory, as served upstream.
///
/// Every field is optional on the wire; the reconciler decides what is
/// required. `population` accepts integers and integral floats, anything
/// else is read as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawCountry {
    pub name: Option<String>,
    pub capital: Option<String>,
    pub region: Option<String>,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub population: Option<i64>,
    pub flag: Option<String>,
    #[serde(default)]
    pub currencies: Option<Vec<RawCurrency>>,
}

/// A currency listed on a country entry. Only `code` is used.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawCurrency {
    pub code: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
}

fn lenient_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        _ => None,
    }))
}

/// Body of the exchange rate endpoint. Only `rates` is read.
#[derive(Debug, Deserialize)]
pub(crate) struct RatesResponse {
    pub rates: Option<HashMap<String, serde_json::Value>>,
}

/// Currency code to rate mapping for a single refresh.
///
/// Only strictly positive rates are kept, since they are used as a divisor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    rates: HashMap<String, Decimal>,
}

impl RateTable {
    pub fn get(&self, code: &str) -> Option<Decimal> {
        self.rates.get(code).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rates.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Builds a table from raw JSON values, returning the codes that were dropped.
    ///
    /// Rates are rounded to the stored scale first, so a rate that rounds to
    /// zero is dropped too.
    pub(crate) fn from_wire(raw: HashMap<String, serde_json::Value>) -> (Self, Vec<String>) {
        let mut rates = HashMap::with_capacity(raw.len());
        let mut dropped = Vec::new();
        for (code, value) in raw {
            let rounded = json_to_decimal(&value).map(|rate| {
                rate.round_dp_with_strategy(DECIMAL_SCALE, RoundingStrategy::MidpointAwayFromZero)
            });
            match rounded {
                Some(rate) if rate > Decimal::ZERO => {
                    rates.insert(code, rate);
                }
                _ => dropped.push(code),
            }
        }
        dropped.sort();
        (Self { rates }, dropped)
    }
}

impl FromIterator<(String, Decimal)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (String, Decimal)>>(iter: I) -> Self {
        Self {
            rates: iter
                .into_iter()
                .filter(|(_, rate)| *rate > Decimal::ZERO)
                .collect(),
        }
    }
}

/// Parses a JSON number (or numeric string) without going through `f64`.
fn json_to_decimal(value: &serde_json::Value) -> Option<Decimal> {
    let text = match value {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}
