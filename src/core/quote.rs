//! Spot quote abstractions shared by every asset class.

use crate::core::change::change_percent;
use crate::core::error::Result;
use crate::core::series::{HistoricalRecord, SeriesGenerator};
use async_trait::async_trait;
use tracing::{debug, warn};

/// Where a record's 24h change comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChangeBasis {
    /// The source published a 24h change (percent).
    Reported(f64),
    /// No authoritative figure; derive it from the generated series.
    FromHistory,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotQuote {
    pub price: f64,
    pub change: ChangeBasis,
}

/// What a fetch does when its source fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Return the error to the caller.
    Propagate,
    /// Log it and serve [`HistoricalRecord::zeroed`] instead.
    ZeroFallback,
}

#[async_trait]
pub trait SpotProvider: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Propagate
    }

    /// Current price of `asset` (a pair, a symbol, or ignored for
    /// single-asset sources).
    async fn fetch_spot(&self, asset: &str) -> Result<SpotQuote>;
}

/// Turns a spot quote into the full record for `period`.
pub fn assemble_record(
    spot: SpotQuote,
    period: &str,
    generator: &SeriesGenerator,
) -> HistoricalRecord {
    let history = generator.generate(spot.price, period);
    let change_24h = match spot.change {
        ChangeBasis::Reported(change) => change,
        ChangeBasis::FromHistory => change_percent(&history),
    };

    HistoricalRecord {
        current: spot.price,
        change_24h,
        history,
    }
}

/// Fetches a spot quote and assembles its record, applying the provider's
/// failure policy.
pub async fn fetch_record(
    provider: &dyn SpotProvider,
    asset: &str,
    period: &str,
    generator: &SeriesGenerator,
) -> Result<HistoricalRecord> {
    match provider.fetch_spot(asset).await {
        Ok(spot) => {
            debug!(
                provider = provider.name(),
                asset, period, price = spot.price, "Fetched spot quote"
            );
            Ok(assemble_record(spot, period, generator))
        }
        Err(e) => match provider.failure_policy() {
            FailurePolicy::Propagate => Err(e),
            FailurePolicy::ZeroFallback => {
                warn!(provider = provider.name(), asset, error = %e, "Serving zeroed fallback record");
                Ok(HistoricalRecord::zeroed())
            }
        },
    }
}
