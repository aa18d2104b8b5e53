use super::ui;
use crate::core::config::AppConfig;
use crate::core::error::Result as QuoteResult;
use crate::core::period::Period;
use crate::core::series::{HistoricalRecord, PricePoint};
use crate::providers::exchange_rate::{JPY_KRW, USD_KRW};
use crate::service::QuoteService;
use anyhow::Result;
use chrono::{Local, TimeZone};
use comfy_table::{Cell, Table};
use futures::future::join_all;
use std::fmt::Display;

const SPARKLINE_WIDTH: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Series {
    UsdKrw,
    JpyKrw,
    Gold,
    Crypto(&'static str),
    Index,
}

static DASHBOARD: [Series; 7] = [
    Series::UsdKrw,
    Series::JpyKrw,
    Series::Gold,
    Series::Crypto("BTC"),
    Series::Crypto("ETH"),
    Series::Crypto("XRP"),
    Series::Index,
];

impl Series {
    fn label(&self) -> String {
        match self {
            Series::UsdKrw => USD_KRW.to_string(),
            Series::JpyKrw => "JPY/KRW (100 yen)".to_string(),
            Series::Gold => "Gold (3.75 g)".to_string(),
            Series::Crypto(symbol) => (*symbol).to_string(),
            Series::Index => "S&P 500".to_string(),
        }
    }

    /// Yen are quoted per 100, matching how the rate is usually read.
    fn scale(&self) -> f64 {
        match self {
            Series::JpyKrw => 100.0,
            _ => 1.0,
        }
    }

    fn decimals(&self) -> usize {
        match self {
            Series::Gold | Series::Crypto("BTC") | Series::Crypto("ETH") => 0,
            _ => 2,
        }
    }

    async fn fetch(&self, service: &QuoteService, period: &str) -> QuoteResult<HistoricalRecord> {
        match self {
            Series::UsdKrw => service.exchange_rate(USD_KRW, period).await,
            Series::JpyKrw => service.exchange_rate(JPY_KRW, period).await,
            Series::Gold => service.gold(period).await,
            Series::Crypto(symbol) => service.crypto(symbol, period).await,
            Series::Index => service.index(period).await,
        }
    }
}

/// Fetches every dashboard series for `period` and prints them as a table.
/// A failed series is shown as unavailable instead of aborting the rest.
pub async fn run(config: &AppConfig, period: Period) -> Result<()> {
    let service = QuoteService::from_config(config);
    let token = period.as_str();

    let pb = ui::new_progress_bar(DASHBOARD.len() as u64);
    pb.set_message("Fetching quotes");
    let fetches = DASHBOARD.iter().map(|series| {
        let pb_clone = pb.clone();
        let service = &service;
        async move {
            let result = series.fetch(service, token).await;
            pb_clone.inc(1);
            (*series, result)
        }
    });
    let results = join_all(fetches).await;
    pb.finish_and_clear();

    println!(
        "\n{} {}",
        ui::style_text("Market Dashboard", ui::StyleType::Title),
        ui::style_text(&format!("({period})"), ui::StyleType::Subtle)
    );
    println!("{}", build_table(&results, period, &Local));
    Ok(())
}

fn build_table<Tz>(
    results: &[(Series, QuoteResult<HistoricalRecord>)],
    period: Period,
    tz: &Tz,
) -> Table
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Asset"),
        ui::header_cell("Price"),
        ui::header_cell("Change"),
        ui::header_cell("Range"),
        ui::header_cell("Chart"),
    ]);

    for (series, result) in results {
        let mut row = vec![Cell::new(series.label())];
        match result {
            Ok(record) => {
                let scale = series.scale();
                row.push(ui::value_cell(format_amount(
                    record.current * scale,
                    series.decimals(),
                )));
                row.push(ui::change_cell(record.change_24h));
                if record.history.is_empty() {
                    row.push(ui::subtle_cell("-"));
                    row.push(ui::subtle_cell("no chart data"));
                } else {
                    row.push(Cell::new(
                        range_label(&record.history, period, tz).unwrap_or_default(),
                    ));
                    let values: Vec<f64> =
                        record.history.iter().map(|p| p.value * scale).collect();
                    row.push(Cell::new(ui::sparkline(&values, SPARKLINE_WIDTH)));
                }
            }
            Err(e) => {
                row.push(Cell::new(ui::style_text("unavailable", ui::StyleType::Error)));
                row.push(ui::subtle_cell("-"));
                row.push(ui::subtle_cell("-"));
                row.push(ui::subtle_cell(&e.to_string()));
            }
        }
        table.add_row(row);
    }

    table
}

/// First and last timestamps of a series: clock time for a one-day chart,
/// month and day otherwise.
fn range_label<Tz>(history: &[PricePoint], period: Period, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let format = match period {
        Period::OneDay => "%H:%M",
        _ => "%m-%d",
    };
    let start = tz.timestamp_millis_opt(history.first()?.timestamp).single()?;
    let end = tz.timestamp_millis_opt(history.last()?.timestamp).single()?;
    Some(format!("{} ~ {}", start.format(format), end.format(format)))
}

/// Fixed decimals with thousands separators.
fn format_amount(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    match frac_part {
        Some(frac_part) => format!("{sign}{grouped}.{frac_part}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::QuoteError;
    use chrono::Utc;

    fn point(timestamp: i64, value: f64) -> PricePoint {
        PricePoint { timestamp, value }
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1380.5, 2), "1,380.50");
        assert_eq!(format_amount(95_000_000.0, 0), "95,000,000");
        assert_eq!(format_amount(850.0, 2), "850.00");
        assert_eq!(format_amount(-1234.567, 1), "-1,234.6");
        assert_eq!(format_amount(0.0, 2), "0.00");
    }

    #[test]
    fn test_range_label_by_period() {
        // 2024-03-01T00:00:00Z and 2024-03-02T23:00:00Z
        let history = [point(1_709_251_200_000, 1.0), point(1_709_420_400_000, 2.0)];

        assert_eq!(
            range_label(&history, Period::OneDay, &Utc).unwrap(),
            "00:00 ~ 23:00"
        );
        assert_eq!(
            range_label(&history, Period::OneMonth, &Utc).unwrap(),
            "03-01 ~ 03-02"
        );
        assert_eq!(range_label(&[], Period::OneDay, &Utc), None);
    }

    #[test]
    fn test_table_rows() {
        let jpy = HistoricalRecord {
            current: 9.2,
            change_24h: -0.5,
            history: vec![point(1_709_251_200_000, 9.1), point(1_709_254_800_000, 9.2)],
        };
        let results = vec![
            (Series::JpyKrw, Ok(jpy)),
            (Series::Index, Ok(HistoricalRecord::zeroed())),
            (
                Series::Crypto("BTC"),
                Err(QuoteError::upstream("crypto", "HTTP error: 503")),
            ),
        ];

        let rendered = build_table(&results, Period::OneDay, &Utc).to_string();

        assert!(rendered.contains("JPY/KRW (100 yen)"));
        assert!(rendered.contains("920.00"));
        assert!(rendered.contains("▼ 0.50%"));
        assert!(rendered.contains("00:00 ~ 01:00"));
        assert!(rendered.contains("no chart data"));
        assert!(rendered.contains("unavailable"));
    }
}
