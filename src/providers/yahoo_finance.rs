use super::util::{fetch_json, percent_encode_symbol};
use crate::core::error::{QuoteError, Result};
use crate::core::quote::{ChangeBasis, FailurePolicy, SpotProvider, SpotQuote};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

const SOURCE: &str = "yahoo";

/// Latest close and day-over-day change of an equity index.
///
/// This is the one source whose failures are absorbed: a dashboard showing
/// a zeroed index card beats one that fails as a whole.
pub struct YahooIndexProvider {
    base_url: String,
}

impl YahooIndexProvider {
    pub fn new(base_url: &str) -> Self {
        YahooIndexProvider {
            base_url: base_url.to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Option<Vec<ChartItem>>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    meta: ChartMeta,
}

#[derive(Deserialize, Debug)]
struct ChartMeta {
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: f64,
    #[serde(alias = "chartPreviousClose")]
    previous_close: Option<f64>,
}

#[async_trait]
impl SpotProvider for YahooIndexProvider {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::ZeroFallback
    }

    #[instrument(name = "YahooIndexFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_spot(&self, symbol: &str) -> Result<SpotQuote> {
        let url = format!(
            "{}/v8/finance/chart/{}?interval=1d&range=1d",
            self.base_url,
            percent_encode_symbol(symbol)
        );

        let data: YahooChartResponse = fetch_json(SOURCE, &url).await?;
        let item = data
            .chart
            .result
            .and_then(|items| items.into_iter().next())
            .ok_or_else(|| {
                QuoteError::upstream(SOURCE, format!("No price data found for symbol: {symbol}"))
            })?;

        let current = item.meta.regular_market_price;
        let previous_close = item
            .meta
            .previous_close
            .filter(|close| *close != 0.0)
            .ok_or_else(|| {
                QuoteError::upstream(SOURCE, format!("No previous close for symbol: {symbol}"))
            })?;
        let change = (current - previous_close) / previous_close * 100.0;
        debug!(current, previous_close, change, "Parsed index quote");

        Ok(SpotQuote {
            price: current,
            change: ChangeBasis::Reported(change),
        })
    }
}
