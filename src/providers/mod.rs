pub mod coingecko;
pub mod exchange_rate;
pub mod util;
pub mod yahoo_finance;

pub use coingecko::{CryptoProvider, GoldProvider};
pub use exchange_rate::ExchangeRateProvider;
pub use yahoo_finance::YahooIndexProvider;
