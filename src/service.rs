//! Request-facing entry point: cache lookup, then fetch and synthesis on a
//! miss.

use crate::core::cache::record_key;
use crate::core::config::AppConfig;
use crate::core::period::key_segment;
use crate::core::error::Result;
use crate::core::quote::{SpotProvider, fetch_record};
use crate::core::series::{HistoricalRecord, SeriesGenerator};
use crate::providers::exchange_rate::{JPY_KRW, USD_KRW};
use crate::providers::{CryptoProvider, ExchangeRateProvider, GoldProvider, YahooIndexProvider};
use crate::store::MemoryCache;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Per-category periods for [`QuoteService::all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardPeriods {
    pub exchange: String,
    pub gold: String,
    pub crypto: String,
    pub index: String,
}

impl DashboardPeriods {
    /// The same period for every category.
    pub fn uniform(period: &str) -> Self {
        Self {
            exchange: period.to_string(),
            gold: period.to_string(),
            crypto: period.to_string(),
            index: period.to_string(),
        }
    }
}

impl Default for DashboardPeriods {
    fn default() -> Self {
        Self::uniform("1day")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRates {
    pub usd_krw: HistoricalRecord,
    pub jpy_krw: HistoricalRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoQuotes {
    pub btc: HistoricalRecord,
    pub eth: HistoricalRecord,
    pub xrp: HistoricalRecord,
}

/// All seven dashboard series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub exchange_rates: ExchangeRates,
    pub gold: HistoricalRecord,
    pub crypto: CryptoQuotes,
    pub sp500: HistoricalRecord,
}

pub struct QuoteService {
    cache: MemoryCache<String, HistoricalRecord>,
    generator: SeriesGenerator,
    exchange: Arc<dyn SpotProvider>,
    gold: Arc<dyn SpotProvider>,
    crypto: Arc<dyn SpotProvider>,
    index: Arc<dyn SpotProvider>,
    index_symbol: String,
}

impl QuoteService {
    pub fn from_config(config: &AppConfig) -> Self {
        let providers = &config.providers;
        QuoteServiceBuilder::new()
            .cache(MemoryCache::with_ttl(config.cache.ttl()))
            .exchange(Arc::new(ExchangeRateProvider::new(
                &providers.exchange_rate.base_url,
            )))
            .gold(Arc::new(GoldProvider::new(
                &providers.coingecko.base_url,
                &config.quote_currency,
            )))
            .crypto(Arc::new(CryptoProvider::new(
                &providers.coingecko.base_url,
                &config.quote_currency,
            )))
            .index(Arc::new(YahooIndexProvider::new(&providers.yahoo.base_url)))
            .index_symbol(&config.index_symbol)
            .build()
    }

    pub fn builder() -> QuoteServiceBuilder {
        QuoteServiceBuilder::new()
    }

    pub async fn exchange_rate(&self, pair: &str, period: &str) -> Result<HistoricalRecord> {
        self.lookup(&self.exchange, "exchange", Some(pair), pair, period)
            .await
    }

    pub async fn gold(&self, period: &str) -> Result<HistoricalRecord> {
        self.lookup(&self.gold, "gold", None, "", period).await
    }

    pub async fn crypto(&self, symbol: &str, period: &str) -> Result<HistoricalRecord> {
        let symbol = symbol.to_uppercase();
        self.lookup(&self.crypto, "crypto", Some(&symbol), &symbol, period)
            .await
    }

    /// Never fails: the index source falls back to a zeroed record.
    pub async fn index(&self, period: &str) -> Result<HistoricalRecord> {
        self.lookup(&self.index, "sp500", None, &self.index_symbol, period)
            .await
    }

    /// Fetches every series concurrently. The first failure fails the whole
    /// dashboard.
    pub async fn all(&self, periods: &DashboardPeriods) -> Result<Dashboard> {
        let (usd_krw, jpy_krw, gold, btc, eth, xrp, sp500) = futures::try_join!(
            self.exchange_rate(USD_KRW, &periods.exchange),
            self.exchange_rate(JPY_KRW, &periods.exchange),
            self.gold(&periods.gold),
            self.crypto("BTC", &periods.crypto),
            self.crypto("ETH", &periods.crypto),
            self.crypto("XRP", &periods.crypto),
            self.index(&periods.index),
        )?;

        Ok(Dashboard {
            exchange_rates: ExchangeRates { usd_krw, jpy_krw },
            gold,
            crypto: CryptoQuotes { btc, eth, xrp },
            sp500,
        })
    }

    async fn lookup(
        &self,
        provider: &Arc<dyn SpotProvider>,
        category: &str,
        key_asset: Option<&str>,
        asset: &str,
        period: &str,
    ) -> Result<HistoricalRecord> {
        let key = record_key(category, key_asset, key_segment(period));
        self.cache
            .get_or_fetch(key, || {
                fetch_record(provider.as_ref(), asset, period, &self.generator)
            })
            .await
    }
}

/// Assembles a [`QuoteService`]; unset parts default to the public sources
/// with their standard base URLs.
#[derive(Default)]
pub struct QuoteServiceBuilder {
    cache: Option<MemoryCache<String, HistoricalRecord>>,
    generator: Option<SeriesGenerator>,
    exchange: Option<Arc<dyn SpotProvider>>,
    gold: Option<Arc<dyn SpotProvider>>,
    crypto: Option<Arc<dyn SpotProvider>>,
    index: Option<Arc<dyn SpotProvider>>,
    index_symbol: Option<String>,
}

impl QuoteServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(mut self, cache: MemoryCache<String, HistoricalRecord>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn generator(mut self, generator: SeriesGenerator) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn exchange(mut self, provider: Arc<dyn SpotProvider>) -> Self {
        self.exchange = Some(provider);
        self
    }

    pub fn gold(mut self, provider: Arc<dyn SpotProvider>) -> Self {
        self.gold = Some(provider);
        self
    }

    pub fn crypto(mut self, provider: Arc<dyn SpotProvider>) -> Self {
        self.crypto = Some(provider);
        self
    }

    pub fn index(mut self, provider: Arc<dyn SpotProvider>) -> Self {
        self.index = Some(provider);
        self
    }

    pub fn index_symbol(mut self, symbol: &str) -> Self {
        self.index_symbol = Some(symbol.to_string());
        self
    }

    pub fn build(self) -> QuoteService {
        let defaults = AppConfig::default();
        let providers = &defaults.providers;

        QuoteService {
            cache: self.cache.unwrap_or_default(),
            generator: self.generator.unwrap_or_default(),
            exchange: self.exchange.unwrap_or_else(|| {
                Arc::new(ExchangeRateProvider::new(&providers.exchange_rate.base_url))
            }),
            gold: self.gold.unwrap_or_else(|| {
                Arc::new(GoldProvider::new(
                    &providers.coingecko.base_url,
                    &defaults.quote_currency,
                ))
            }),
            crypto: self.crypto.unwrap_or_else(|| {
                Arc::new(CryptoProvider::new(
                    &providers.coingecko.base_url,
                    &defaults.quote_currency,
                ))
            }),
            index: self
                .index
                .unwrap_or_else(|| Arc::new(YahooIndexProvider::new(&providers.yahoo.base_url))),
            index_symbol: self
                .index_symbol
                .unwrap_or_else(|| defaults.index_symbol.clone()),
        }
    }
}
