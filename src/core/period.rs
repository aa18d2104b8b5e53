//! Chart periods and the sampling window each one selects.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1day")]
    OneDay,
    #[serde(rename = "1week")]
    OneWeek,
    #[serde(rename = "1month")]
    OneMonth,
    #[serde(rename = "6month")]
    SixMonths,
    #[serde(rename = "1year")]
    OneYear,
}

/// How many points a series holds, how far apart they are, and where the
/// trend starts relative to the current price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub points: usize,
    pub interval: Duration,
    pub start_factor: f64,
}

/// Used for any token that is not a known period: the `1day` shape with a
/// 5% trend.
pub const FALLBACK_WINDOW: Window = Window {
    points: 24,
    interval: Duration::hours(1),
    start_factor: 0.95,
};

impl Period {
    pub const ALL: [Period; 5] = [
        Period::OneDay,
        Period::OneWeek,
        Period::OneMonth,
        Period::SixMonths,
        Period::OneYear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneDay => "1day",
            Period::OneWeek => "1week",
            Period::OneMonth => "1month",
            Period::SixMonths => "6month",
            Period::OneYear => "1year",
        }
    }

    pub fn window(&self) -> Window {
        match self {
            Period::OneDay => Window {
                points: 24,
                interval: Duration::hours(1),
                start_factor: 0.98,
            },
            Period::OneWeek => Window {
                points: 28,
                interval: Duration::hours(6),
                start_factor: 0.95,
            },
            Period::OneMonth => Window {
                points: 30,
                interval: Duration::days(1),
                start_factor: 0.90,
            },
            Period::SixMonths => Window {
                points: 180,
                interval: Duration::days(1),
                start_factor: 0.85,
            },
            Period::OneYear => Window {
                points: 365,
                interval: Duration::days(1),
                start_factor: 0.80,
            },
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1day" => Ok(Period::OneDay),
            "1week" => Ok(Period::OneWeek),
            "1month" => Ok(Period::OneMonth),
            "6month" => Ok(Period::SixMonths),
            "1year" => Ok(Period::OneYear),
            _ => Err(anyhow::anyhow!("Invalid period: {}", s)),
        }
    }
}

impl Window {
    /// Resolves a raw period token. Unknown tokens get [`FALLBACK_WINDOW`]
    /// rather than an error, since callers pass query strings straight through.
    pub fn for_token(token: &str) -> Window {
        token
            .parse::<Period>()
            .map_or(FALLBACK_WINDOW, |period| period.window())
    }
}

/// Cache key segment for a period token. Unknown tokens all resolve to the
/// fallback window, so they share the `fallback` segment.
pub fn key_segment(token: &str) -> &'static str {
    token
        .parse::<Period>()
        .map_or("fallback", |period| period.as_str())
}
