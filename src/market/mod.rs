//! Market data model: stock quotes, index snapshot, sortable columns.
//!
//! Everything here is plain data. Fetching lives in [`feed`], filter
//! expressions in [`filter`], and the filter/sort/group pass that turns raw
//! quotes into display order in [`arrange`].

pub mod arrange;
pub mod feed;
pub mod filter;

/// One row of the quotes table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Quote {
    pub ticker: String,
    pub last: f64,
    pub change: f64,
    pub change_percent: f64,
    pub open: f64,
    pub low: f64,
    pub high: f64,
    pub low_52: f64,
    pub high_52: f64,
    pub volume: f64,
    pub avg_volume: f64,
    pub pe_ratio: f64,
    pub market_cap: f64,
}

impl Quote {
    /// True for advancing (or flat) issues.
    pub fn advancing(&self) -> bool {
        self.change >= 0.0
    }

    /// Numeric value shown in `column`. `None` for the ticker column.
    pub fn value(&self, column: Column) -> Option<f64> {
        let v = match column {
            Column::Ticker => return None,
            Column::Last => self.last,
            Column::Change => self.change,
            Column::ChangePercent => self.change_percent,
            Column::Open => self.open,
            Column::Low => self.low,
            Column::High => self.high,
            Column::Low52 => self.low_52,
            Column::High52 => self.high_52,
            Column::Volume => self.volume,
            Column::AvgVolume => self.avg_volume,
            Column::PeRatio => self.pe_ratio,
            Column::MarketCap => self.market_cap,
        };
        Some(v)
    }
}

/// Quotes table columns, in display order. Any of them can be the sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Column {
    #[default]
    Ticker,
    Last,
    Change,
    ChangePercent,
    Open,
    Low,
    High,
    Low52,
    High52,
    Volume,
    AvgVolume,
    PeRatio,
    MarketCap,
}

impl Column {
    pub const ALL: [Column; 13] = [
        Column::Ticker,
        Column::Last,
        Column::Change,
        Column::ChangePercent,
        Column::Open,
        Column::Low,
        Column::High,
        Column::Low52,
        Column::High52,
        Column::Volume,
        Column::AvgVolume,
        Column::PeRatio,
        Column::MarketCap,
    ];

    /// Position in [`Column::ALL`]; this is what the profile stores.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`Column::index`]. Out-of-range indices fall back to Ticker.
    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_default()
    }

    pub fn header(self) -> &'static str {
        match self {
            Column::Ticker => "Ticker",
            Column::Last => "Last",
            Column::Change => "Change",
            Column::ChangePercent => "Change%",
            Column::Open => "Open",
            Column::Low => "Low",
            Column::High => "High",
            Column::Low52 => "52w Low",
            Column::High52 => "52w High",
            Column::Volume => "Volume",
            Column::AvgVolume => "AvgVolume",
            Column::PeRatio => "P/E",
            Column::MarketCap => "MktCap",
        }
    }

    /// Display width in terminal cells.
    pub fn width(self) -> u16 {
        match self {
            Column::Ticker => 8,
            Column::Volume | Column::AvgVolume => 10,
            Column::MarketCap => 9,
            Column::PeRatio => 7,
            _ => 9,
        }
    }

    /// Column to the left, clamped at the first one.
    pub fn left(self) -> Self {
        Self::from_index(self.index().saturating_sub(1))
    }

    /// Column to the right, clamped at the last one.
    pub fn right(self) -> Self {
        Self::from_index((self.index() + 1).min(Self::ALL.len() - 1))
    }
}

/// One market index, currency, or commodity line item.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexQuote {
    pub label: &'static str,
    pub symbol: &'static str,
    pub last: f64,
    pub change: f64,
    pub change_percent: f64,
}

/// Index symbols shown in the market header, grouped by display row.
pub const MARKET_ROWS: [&[(&str, &str)]; 3] = [
    &[("Dow", "^DJI"), ("S&P 500", "^GSPC"), ("NASDAQ", "^IXIC")],
    &[
        ("Tokyo", "^N225"),
        ("HK", "^HSI"),
        ("London", "^FTSE"),
        ("10-Year Yield", "^TNX"),
    ],
    &[
        ("Euro", "EURUSD=X"),
        ("Yen", "JPY=X"),
        ("Oil", "CL=F"),
        ("Gold", "GC=F"),
    ],
];

/// All market symbols, flattened in display order.
pub fn market_symbols() -> impl Iterator<Item = (&'static str, &'static str)> {
    MARKET_ROWS.iter().flat_map(|row| row.iter().copied())
}

/// Latest market header data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MarketSnapshot {
    /// Whether the regular US session is open.
    pub open: bool,
    pub indices: Vec<IndexQuote>,
}

impl MarketSnapshot {
    pub fn get(&self, symbol: &str) -> Option<&IndexQuote> {
        self.indices.iter().find(|q| q.symbol == symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_index_round_trips() {
        for column in Column::ALL {
            assert_eq!(Column::from_index(column.index()), column);
        }
        assert_eq!(Column::from_index(99), Column::Ticker);
    }

    #[test]
    fn column_navigation_clamps() {
        assert_eq!(Column::Ticker.left(), Column::Ticker);
        assert_eq!(Column::Ticker.right(), Column::Last);
        assert_eq!(Column::MarketCap.right(), Column::MarketCap);
        assert_eq!(Column::MarketCap.left(), Column::PeRatio);
    }

    #[test]
    fn flat_quote_counts_as_advancing() {
        let q = Quote::default();
        assert!(q.advancing());
        let q = Quote { change: -0.01, ..Quote::default() };
        assert!(!q.advancing());
    }

    #[test]
    fn market_symbols_flatten_in_order() {
        let symbols: Vec<_> = market_symbols().map(|(_, s)| s).collect();
        assert_eq!(symbols.len(), 11);
        assert_eq!(symbols[0], "^DJI");
        assert_eq!(symbols[10], "GC=F");
    }
}
