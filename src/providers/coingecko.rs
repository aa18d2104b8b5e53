//! Gold and crypto spot prices from the CoinGecko simple-price API.

use super::util::fetch_json;
use crate::core::error::{QuoteError, Result};
use crate::core::quote::{ChangeBasis, SpotProvider, SpotQuote};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::instrument;

const SOURCE: &str = "coingecko";

/// Token tracking one troy ounce of gold.
pub const GOLD_TOKEN_ID: &str = "pax-gold";
pub const GRAMS_PER_TROY_OUNCE: f64 = 31.1035;
/// Gold is quoted per don (3.75 g).
pub const GOLD_UNIT_GRAMS: f64 = 3.75;

/// Supported crypto symbols and their CoinGecko ids.
pub const CRYPTO_IDS: [(&str, &str); 3] =
    [("BTC", "bitcoin"), ("ETH", "ethereum"), ("XRP", "ripple")];

/// `{ "<id>": { "<ccy>": price, "<ccy>_24h_change": change } }`
#[derive(Deserialize, Debug)]
#[serde(transparent)]
struct SimplePriceResponse(HashMap<String, HashMap<String, Option<f64>>>);

#[derive(Debug, Clone)]
struct SimplePriceClient {
    base_url: String,
    vs_currency: String,
}

impl SimplePriceClient {
    fn new(base_url: &str, vs_currency: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            vs_currency: vs_currency.to_lowercase(),
        }
    }

    /// Price of `id` and its 24h change; a missing change counts as `0`.
    async fn price(&self, id: &str) -> Result<(f64, f64)> {
        let url = format!(
            "{}/api/v3/simple/price?ids={}&vs_currencies={}&include_24hr_change=true",
            self.base_url, id, self.vs_currency
        );
        let SimplePriceResponse(mut data) = fetch_json(SOURCE, &url).await?;

        let fields = data
            .remove(id)
            .ok_or_else(|| QuoteError::upstream(SOURCE, format!("No price data found for {id}")))?;
        let price = fields
            .get(&self.vs_currency)
            .copied()
            .flatten()
            .ok_or_else(|| {
                QuoteError::upstream(
                    SOURCE,
                    format!("No {} price found for {id}", self.vs_currency),
                )
            })?;
        let change = fields
            .get(&format!("{}_24h_change", self.vs_currency))
            .copied()
            .flatten()
            .unwrap_or(0.0);

        Ok((price, change))
    }
}

/// Converts a per-troy-ounce price to the per-3.75 g unit.
pub fn ounce_to_gold_unit(price_per_ounce: f64) -> f64 {
    price_per_ounce * (GOLD_UNIT_GRAMS / GRAMS_PER_TROY_OUNCE)
}

pub fn crypto_id(symbol: &str) -> Option<&'static str> {
    let symbol = symbol.to_uppercase();
    CRYPTO_IDS
        .iter()
        .find(|(known, _)| *known == symbol)
        .map(|(_, id)| *id)
}

pub struct GoldProvider {
    client: SimplePriceClient,
}

impl GoldProvider {
    pub fn new(base_url: &str, vs_currency: &str) -> Self {
        Self {
            client: SimplePriceClient::new(base_url, vs_currency),
        }
    }
}

#[async_trait]
impl SpotProvider for GoldProvider {
    fn name(&self) -> &'static str {
        "gold"
    }

    /// The asset argument is ignored; there is only one gold series.
    #[instrument(name = "GoldFetch", skip(self, _asset))]
    async fn fetch_spot(&self, _asset: &str) -> Result<SpotQuote> {
        let (per_ounce, change) = self.client.price(GOLD_TOKEN_ID).await?;

        Ok(SpotQuote {
            price: ounce_to_gold_unit(per_ounce),
            change: ChangeBasis::Reported(change),
        })
    }
}

pub struct CryptoProvider {
    client: SimplePriceClient,
}

impl CryptoProvider {
    pub fn new(base_url: &str, vs_currency: &str) -> Self {
        Self {
            client: SimplePriceClient::new(base_url, vs_currency),
        }
    }
}

#[async_trait]
impl SpotProvider for CryptoProvider {
    fn name(&self) -> &'static str {
        "crypto"
    }

    #[instrument(name = "CryptoFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_spot(&self, symbol: &str) -> Result<SpotQuote> {
        let id = crypto_id(symbol).ok_or_else(|| {
            QuoteError::UnsupportedAsset(format!("cryptocurrency {symbol}"))
        })?;
        let (price, change) = self.client.price(id).await?;

        Ok(SpotQuote {
            price,
            change: ChangeBasis::Reported(change),
        })
    }
}
