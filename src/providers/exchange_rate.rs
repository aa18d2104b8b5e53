//! FX rates from a USD-based rate table.

use super::util::fetch_json;
use crate::core::error::{QuoteError, Result};
use crate::core::quote::{ChangeBasis, SpotProvider, SpotQuote};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::instrument;

const SOURCE: &str = "exchange-rate";

pub const USD_KRW: &str = "USD/KRW";
pub const JPY_KRW: &str = "JPY/KRW";

#[derive(Deserialize, Debug)]
struct RateTable {
    rates: HashMap<String, f64>,
}

impl RateTable {
    fn rate(&self, currency: &str) -> Result<f64> {
        self.rates
            .get(currency)
            .copied()
            .ok_or_else(|| QuoteError::upstream(SOURCE, format!("No rate found for {currency}")))
    }
}

/// Quotes `USD/KRW` directly and `JPY/KRW` as a cross rate through USD.
///
/// The source has no history, so the 24h change is derived from the
/// generated series.
pub struct ExchangeRateProvider {
    base_url: String,
}

impl ExchangeRateProvider {
    pub fn new(base_url: &str) -> Self {
        ExchangeRateProvider {
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl SpotProvider for ExchangeRateProvider {
    fn name(&self) -> &'static str {
        SOURCE
    }

    #[instrument(name = "ExchangeRateFetch", skip(self), fields(pair = %pair))]
    async fn fetch_spot(&self, pair: &str) -> Result<SpotQuote> {
        if pair != USD_KRW && pair != JPY_KRW {
            return Err(QuoteError::UnsupportedAsset(format!(
                "currency pair {pair}"
            )));
        }

        let url = format!("{}/v6/latest/USD", self.base_url);
        let table: RateTable = fetch_json(SOURCE, &url).await?;

        let krw = table.rate("KRW")?;
        let price = if pair == USD_KRW {
            krw
        } else {
            let jpy = table.rate("JPY")?;
            if jpy == 0.0 {
                return Err(QuoteError::upstream(SOURCE, "JPY rate is zero"));
            }
            krw / jpy
        };

        Ok(SpotQuote {
            price,
            change: ChangeBasis::FromHistory,
        })
    }
}
