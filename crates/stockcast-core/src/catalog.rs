//! Static stock catalog used for listings, search fallback and base prices.

use crate::{Market, StockSummary, Symbol};

/// Price used for generated series when a symbol is not in the catalog.
pub const DEFAULT_BASE_PRICE: f64 = 100.0;
/// Maximum number of search results returned by any search path.
pub const SEARCH_LIMIT: usize = 5;

struct CatalogEntry {
    symbol: &'static str,
    name: &'static str,
    price: f64,
    change: f64,
    change_percent: f64,
}

const US_POPULAR: &[CatalogEntry] = &[
    CatalogEntry { symbol: "AAPL", name: "Apple Inc.", price: 175.25, change: 2.35, change_percent: 1.36 },
    CatalogEntry { symbol: "MSFT", name: "Microsoft Corporation", price: 325.80, change: 1.15, change_percent: 0.35 },
    CatalogEntry { symbol: "GOOGL", name: "Alphabet Inc.", price: 135.60, change: -0.75, change_percent: -0.55 },
    CatalogEntry { symbol: "AMZN", name: "Amazon.com Inc.", price: 142.20, change: 3.45, change_percent: 2.48 },
    CatalogEntry { symbol: "TSLA", name: "Tesla, Inc.", price: 230.15, change: -5.30, change_percent: -2.25 },
    CatalogEntry { symbol: "META", name: "Meta Platforms, Inc.", price: 298.65, change: 4.20, change_percent: 1.43 },
    CatalogEntry { symbol: "NVDA", name: "NVIDIA Corporation", price: 720.35, change: 15.60, change_percent: 2.21 },
    CatalogEntry { symbol: "JPM", name: "JPMorgan Chase & Co.", price: 158.75, change: 0.95, change_percent: 0.60 },
];

const INDIA_POPULAR: &[CatalogEntry] = &[
    CatalogEntry { symbol: "RELIANCE.BSE", name: "Reliance Industries", price: 2456.75, change: 32.50, change_percent: 1.34 },
    CatalogEntry { symbol: "TCS.BSE", name: "Tata Consultancy Services", price: 3578.20, change: -45.30, change_percent: -1.25 },
    CatalogEntry { symbol: "HDFCBANK.BSE", name: "HDFC Bank", price: 1675.40, change: 23.75, change_percent: 1.44 },
    CatalogEntry { symbol: "INFY.BSE", name: "Infosys", price: 1520.85, change: 18.30, change_percent: 1.22 },
    CatalogEntry { symbol: "HINDUNILVR.BSE", name: "Hindustan Unilever", price: 2480.60, change: -12.35, change_percent: -0.50 },
    CatalogEntry { symbol: "TATAMOTORS.BSE", name: "Tata Motors", price: 765.25, change: 21.40, change_percent: 2.88 },
];

const US_SUPPORTED: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "AMZN", "META", "TSLA", "NVDA", "JPM", "JNJ", "V", "PG", "UNH",
    "HD", "BAC", "XOM", "DIS", "NFLX", "ADBE", "CSCO", "CRM",
];

const INDIA_SUPPORTED: &[&str] = &[
    "RELIANCE.BSE", "TCS.BSE", "HDFCBANK.BSE", "INFY.BSE", "HINDUNILVR.BSE", "ICICIBANK.BSE",
    "BHARTIARTL.BSE", "KOTAKBANK.BSE", "ITC.BSE", "SBIN.BSE", "BAJFINANCE.BSE", "AXISBANK.BSE",
    "LT.BSE", "ASIANPAINT.BSE", "MARUTI.BSE", "TATAMOTORS.BSE", "SUNPHARMA.BSE", "WIPRO.BSE",
    "HCLTECH.BSE", "ULTRACEMCO.BSE", "ADANIENT.BSE", "TATASTEEL.BSE",
];

fn summaries(entries: &[CatalogEntry], market: Market) -> Vec<StockSummary> {
    entries
        .iter()
        .filter_map(|entry| {
            let symbol = Symbol::parse(entry.symbol).ok()?;
            Some(StockSummary {
                symbol,
                name: entry.name.to_owned(),
                price: entry.price,
                change: entry.change,
                change_percent: entry.change_percent,
                currency: market.currency().to_owned(),
                market,
            })
        })
        .collect()
}

pub fn popular_us() -> Vec<StockSummary> {
    summaries(US_POPULAR, Market::Us)
}

pub fn popular_india() -> Vec<StockSummary> {
    summaries(INDIA_POPULAR, Market::India)
}

pub fn popular(market: Market) -> Vec<StockSummary> {
    match market {
        Market::Us => popular_us(),
        Market::India => popular_india(),
    }
}

/// Case-insensitive substring search over symbol and name in both markets.
pub fn search_catalog(query: &str, limit: usize) -> Vec<StockSummary> {
    let needle = query.trim().to_lowercase();
    popular_us()
        .into_iter()
        .chain(popular_india())
        .filter(|stock| {
            stock.symbol.as_str().to_lowercase().contains(&needle)
                || stock.name.to_lowercase().contains(&needle)
        })
        .take(limit)
        .collect()
}

/// Whether the dashboard offers this ticker in either market.
pub fn is_supported_symbol(symbol: &Symbol) -> bool {
    US_SUPPORTED
        .iter()
        .chain(INDIA_SUPPORTED)
        .any(|candidate| *candidate == symbol.as_str())
}

/// Catalog price used to seed a generated series.
pub fn base_price_for(symbol: &Symbol) -> f64 {
    let entries = match symbol.market() {
        Market::Us => US_POPULAR,
        Market::India => INDIA_POPULAR,
    };
    entries
        .iter()
        .find(|entry| entry.symbol == symbol.as_str())
        .map_or(DEFAULT_BASE_PRICE, |entry| entry.price)
}

/// Queries that should be routed to the Indian-market search first.
pub fn is_indian_query(query: &str) -> bool {
    let upper = query.to_ascii_uppercase();
    upper.contains("BSE") || upper.contains("INDIA")
}
