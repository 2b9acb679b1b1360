//! Turns raw upstream entries into storable country drafts.
//!
//! Reconciliation has no I/O. The only non-determinism is the GDP multiplier,
//! which is supplied by the caller through `MultiplierSource`.

mod multiplier;

use std::collections::HashMap;
use std::fmt;

use log::warn;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::DECIMAL_SCALE;
use crate::fetch::{RateTable, RawCountry};

pub use multiplier::{FixedMultiplier, MultiplierSource, RandomMultiplier};

/// A reconciled country, ready to be upserted.
///
/// `currency_code`, `exchange_rate` and `estimated_gdp` are always set
/// together according to one of three shapes:
/// - rate known: all three present
/// - code unknown to the rate table: code only
/// - no currency: code and rate null, GDP zero
#[derive(Debug, Clone, PartialEq)]
pub struct CountryDraft {
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: i64,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<Decimal>,
    pub estimated_gdp: Option<Decimal>,
    pub flag_url: Option<String>,
}

/// Why a raw entry was left out of the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingName,
    MissingPopulation,
    GdpOverflow,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SkipReason::MissingName => "missing name",
            SkipReason::MissingPopulation => "missing population",
            SkipReason::GdpOverflow => "estimated GDP out of range",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reconciled {
    Record(CountryDraft),
    Skipped(SkipReason),
}

/// Result of reconciling a whole fetch.
#[derive(Debug, Default)]
pub struct ReconciledBatch {
    pub drafts: Vec<CountryDraft>,
    pub skipped: usize,
}

/// Reconciles one raw entry against the rate table.
///
/// The multiplier is sampled only when a GDP is actually computed.
pub fn reconcile(
    raw: &RawCountry,
    rates: &RateTable,
    multiplier: &mut dyn MultiplierSource,
) -> Reconciled {
    let Some(name) = non_blank(raw.name.as_deref()) else {
        return Reconciled::Skipped(SkipReason::MissingName);
    };
    let Some(population) = raw.population.filter(|p| *p >= 0) else {
        return Reconciled::Skipped(SkipReason::MissingPopulation);
    };

    let first_code = raw
        .currencies
        .as_deref()
        .and_then(|currencies| currencies.first())
        .and_then(|currency| non_blank(currency.code.as_deref()));

    let (currency_code, exchange_rate, estimated_gdp) = match first_code {
        Some(code) => match rates.get(&code) {
            Some(rate) => match estimate_gdp(population, multiplier.sample(), rate) {
                Some(gdp) => (Some(code), Some(rate), Some(gdp)),
                None => return Reconciled::Skipped(SkipReason::GdpOverflow),
            },
            None => (Some(code), None, None),
        },
        None => (None, None, Some(Decimal::ZERO)),
    };

    Reconciled::Record(CountryDraft {
        name,
        capital: non_blank(raw.capital.as_deref()),
        region: non_blank(raw.region.as_deref()),
        population,
        currency_code,
        exchange_rate,
        estimated_gdp,
        flag_url: non_blank(raw.flag.as_deref()),
    })
}

/// Reconciles every entry in fetch order.
///
/// When a name occurs more than once the later entry replaces the earlier one
/// in place, which is what sequential upserts would leave behind.
pub fn reconcile_batch(
    raws: &[RawCountry],
    rates: &RateTable,
    multiplier: &mut dyn MultiplierSource,
) -> ReconciledBatch {
    let mut batch = ReconciledBatch::default();
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(raws.len());

    for raw in raws {
        match reconcile(raw, rates, multiplier) {
            Reconciled::Record(draft) => match positions.get(&draft.name) {
                Some(&index) => batch.drafts[index] = draft,
                None => {
                    positions.insert(draft.name.clone(), batch.drafts.len());
                    batch.drafts.push(draft);
                }
            },
            Reconciled::Skipped(reason) => {
                batch.skipped += 1;
                warn!(
                    "Skipping country {:?}: {reason}",
                    raw.name.as_deref().unwrap_or("<unnamed>")
                );
            }
        }
    }

    batch
}

/// `population * multiplier / rate`, rounded up to the stored scale so the
/// stored value never drops below `population * 1000 / rate`.
fn estimate_gdp(population: i64, multiplier: Decimal, rate: Decimal) -> Option<Decimal> {
    Decimal::from(population)
        .checked_mul(multiplier)?
        .checked_div(rate)
        .map(|gdp| {
            gdp.round_dp_with_strategy(DECIMAL_SCALE, RoundingStrategy::ToPositiveInfinity)
        })
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}
