//! Cell formatting for the market header and quotes table.

use crate::market::{Column, Quote};

/// Shown for values the feed did not provide.
pub const MISSING: &str = "-";

pub fn format_price(value: f64) -> String {
    format!("{value:.2}")
}

pub fn format_change(value: f64) -> String {
    format!("{value:+.2}")
}

pub fn format_percent(value: f64) -> String {
    format!("{value:+.2}%")
}

/// Share counts: 12.4K, 3.1M, 1.2B.
pub fn format_volume(value: f64) -> String {
    compact(value, &[(1e9, "B"), (1e6, "M"), (1e3, "K")])
}

/// Market capitalisation: 2.9T, 612.4B, 88.0M.
pub fn format_market_cap(value: f64) -> String {
    if value <= 0.0 {
        return MISSING.into();
    }
    compact(value, &[(1e12, "T"), (1e9, "B"), (1e6, "M")])
}

fn compact(value: f64, units: &[(f64, &str)]) -> String {
    for &(scale, suffix) in units {
        if value >= scale {
            return format!("{:.1}{suffix}", value / scale);
        }
    }
    format!("{value:.0}")
}

/// Text for one quotes-table cell.
pub fn format_cell(quote: &Quote, column: Column) -> String {
    match column {
        Column::Ticker => quote.ticker.clone(),
        Column::Change => format_change(quote.change),
        Column::ChangePercent => format_percent(quote.change_percent),
        Column::Volume => format_volume(quote.volume),
        Column::AvgVolume => format_volume(quote.avg_volume),
        Column::MarketCap => format_market_cap(quote.market_cap),
        Column::PeRatio if quote.pe_ratio == 0.0 => MISSING.into(),
        other => quote.value(other).map_or_else(|| MISSING.into(), format_price),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_price_two_places() {
        assert_eq!(format_price(187.456), "187.46");
        assert_eq!(format_price(0.0), "0.00");
    }

    #[test]
    fn format_change_signed() {
        assert_eq!(format_change(1.5), "+1.50");
        assert_eq!(format_change(-0.25), "-0.25");
        assert_eq!(format_percent(2.346), "+2.35%");
    }

    #[test]
    fn format_volume_units() {
        assert_eq!(format_volume(950.0), "950");
        assert_eq!(format_volume(12_400.0), "12.4K");
        assert_eq!(format_volume(3_100_000.0), "3.1M");
        assert_eq!(format_volume(1_200_000_000.0), "1.2B");
    }

    #[test]
    fn format_market_cap_units() {
        assert_eq!(format_market_cap(2.9e12), "2.9T");
        assert_eq!(format_market_cap(612.4e9), "612.4B");
        assert_eq!(format_market_cap(0.0), "-");
    }

    #[test]
    fn format_cell_by_column() {
        let q = Quote {
            ticker: "AAPL".into(),
            last: 187.5,
            change: -1.25,
            volume: 52_300_000.0,
            ..Quote::default()
        };
        assert_eq!(format_cell(&q, Column::Ticker), "AAPL");
        assert_eq!(format_cell(&q, Column::Last), "187.50");
        assert_eq!(format_cell(&q, Column::Change), "-1.25");
        assert_eq!(format_cell(&q, Column::Volume), "52.3M");
        assert_eq!(format_cell(&q, Column::PeRatio), "-");
    }
}
