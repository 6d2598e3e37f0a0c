//! Symbol-to-asset-class classification for the sechura market-data engine.
//!
//! Maps ticker symbols to an [`AssetClass`] using lookup tables and shape
//! rules. Classification drives the resampling alignment policy, so the
//! check order matters: forex pairs are recognized before crypto to keep
//! six-letter currency pairs like `EURUSD` from being misread as alt pairs,
//! and bare 1-5 letter tickers fall through to US equity only when no other
//! table claims them.
//!
//! # Example
//!
//! ```
//! use sechura_classify::AssetClassifier;
//! use sechura_types::AssetClass;
//!
//! let classifier = AssetClassifier::new();
//! assert_eq!(classifier.classify("AAPL"), AssetClass::UsEquity);
//! assert_eq!(classifier.classify("BTC-USD"), AssetClass::Crypto);
//! assert_eq!(classifier.classify("EURUSD"), AssetClass::Forex);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::collections::{HashMap, HashSet};

use sechura_types::AssetClass;

/// Base symbols of well-known cryptocurrencies.
const CRYPTO_SYMBOLS: &[&str] = &[
    "BTC", "ETH", "ADA", "DOT", "SOL", "AVAX", "MATIC", "LINK", "UNI", "AAVE", "SUSHI", "CRV",
    "YFI", "COMP", "MKR", "SNX", "1INCH", "DOGE", "SHIB", "LTC", "BCH", "XRP", "XLM", "TRX",
    "EOS", "VET", "ALGO", "ATOM", "NEAR", "FTM", "LUNA", "UST", "USDC", "USDT", "DAI", "BUSD",
    "FRAX", "TUSD",
];

/// ISO currency codes accepted on either side of a forex pair.
const FOREX_CURRENCIES: &[&str] = &[
    "USD", "EUR", "GBP", "JPY", "CHF", "CAD", "AUD", "NZD", "SEK", "NOK", "DKK", "PLN", "CZK",
    "HUF", "TRY", "ZAR", "MXN", "BRL", "CNY", "HKD", "SGD", "KRW", "INR", "THB", "MYR", "IDR",
    "PHP",
];

/// Futures roots of commonly traded commodities.
const COMMODITY_SYMBOLS: &[&str] = &[
    "GC", "SI", "CL", "NG", "HG", "PL", "PA", "ZC", "ZS", "ZW", "KC", "CC", "CT", "SB", "OJ",
    "LB", "HE", "LE", "GF", "ZL",
];

/// Quote currencies that mark a pair as crypto when the base is unknown.
const CRYPTO_QUOTES: &[&str] = &["USD", "USDT", "USDC", "BTC", "ETH"];

/// Classifies ticker symbols into asset classes.
#[derive(Debug, Clone)]
pub struct AssetClassifier {
    crypto: HashSet<&'static str>,
    forex: HashSet<&'static str>,
    commodities: HashSet<&'static str>,
    overrides: HashMap<String, AssetClass>,
}

impl AssetClassifier {
    /// Creates a classifier with the built-in lookup tables.
    #[must_use]
    pub fn new() -> Self {
        Self {
            crypto: CRYPTO_SYMBOLS.iter().copied().collect(),
            forex: FOREX_CURRENCIES.iter().copied().collect(),
            commodities: COMMODITY_SYMBOLS.iter().copied().collect(),
            overrides: HashMap::new(),
        }
    }

    /// Registers a manual symbol-to-class override, taking precedence over
    /// every built-in rule.
    pub fn add_override(&mut self, symbol: &str, class: AssetClass) {
        self.overrides
            .insert(symbol.trim().to_uppercase(), class);
    }

    /// Classifies a single symbol.
    ///
    /// Unknown or empty symbols classify as [`AssetClass::Unknown`].
    #[must_use]
    pub fn classify(&self, symbol: &str) -> AssetClass {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return AssetClass::Unknown;
        }
        if let Some(class) = self.overrides.get(&symbol) {
            return *class;
        }

        // Forex first: EURUSD would otherwise match the crypto pair shapes.
        if self.is_forex(&symbol) {
            return AssetClass::Forex;
        }
        if self.is_crypto(&symbol) {
            return AssetClass::Crypto;
        }
        if self.is_commodity(&symbol) {
            return AssetClass::Commodity;
        }
        if self.is_us_equity(&symbol) {
            return AssetClass::UsEquity;
        }
        AssetClass::Unknown
    }

    /// Classifies many symbols at once.
    #[must_use]
    pub fn classify_many(&self, symbols: &[String]) -> HashMap<String, AssetClass> {
        symbols
            .iter()
            .map(|s| (s.clone(), self.classify(s)))
            .collect()
    }

    fn is_forex(&self, symbol: &str) -> bool {
        if let Some((base, quote)) = split_pair(symbol) {
            return self.forex.contains(base) && self.forex.contains(quote);
        }
        if symbol.len() == 6 && is_alpha(symbol) {
            let (base, quote) = symbol.split_at(3);
            return self.forex.contains(base) && self.forex.contains(quote);
        }
        false
    }

    fn is_crypto(&self, symbol: &str) -> bool {
        if let Some((base, quote)) = split_pair(symbol) {
            return self.crypto.contains(base) || CRYPTO_QUOTES.contains(&quote);
        }
        if self.crypto.contains(strip_quote_suffix(symbol)) {
            return true;
        }
        // Unseparated pairs like BTCUSD / SOLUSDT.
        for quote in CRYPTO_QUOTES {
            if let Some(base) = symbol.strip_suffix(quote) {
                if (2..=5).contains(&base.len()) && self.crypto.contains(base) {
                    return true;
                }
            }
        }
        false
    }

    fn is_commodity(&self, symbol: &str) -> bool {
        self.commodities.contains(strip_quote_suffix(symbol))
    }

    fn is_us_equity(&self, symbol: &str) -> bool {
        (1..=5).contains(&symbol.len())
            && is_alpha(symbol)
            && !self.crypto.contains(symbol)
            && !self.commodities.contains(symbol)
            && !self.forex.contains(symbol)
    }
}

impl Default for AssetClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits a `BASE-QUOTE` or `BASE/QUOTE` pair into its halves.
fn split_pair(symbol: &str) -> Option<(&str, &str)> {
    let sep = symbol.find(['-', '/'])?;
    let (base, quote) = symbol.split_at(sep);
    let quote = &quote[1..];
    if base.is_empty() || quote.is_empty() {
        return None;
    }
    Some((base, quote))
}

/// Strips a trailing quote currency from an unseparated symbol, leaving the
/// base for table lookups.
fn strip_quote_suffix(symbol: &str) -> &str {
    for suffix in CRYPTO_QUOTES {
        if let Some(base) = symbol.strip_suffix(suffix) {
            if !base.is_empty() {
                return base;
            }
        }
    }
    symbol
}

fn is_alpha(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_uppercase())
}
