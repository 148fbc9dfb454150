//! Instrument catalog adapter.
//!
//! Forex and commodity symbols are a fixed list; crypto symbols come from
//! a pluggable source (Binance in production). A fetch failure degrades to
//! an empty crypto list so the static catalog stays available offline.

use crate::domain::error::JournalError;
use crate::ports::pairs_port::{PairKind, PairList, PairsPort};
use serde::Deserialize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const FOREX_PAIRS: [&str; 10] = [
    "EURUSD", "GBPUSD", "USDJPY", "USDCHF", "AUDUSD", "NZDUSD", "USDCAD", "EURJPY", "GBPJPY",
    "CHFJPY",
];

pub const COMMODITY_PAIRS: [&str; 4] = ["XAUUSD", "XAGUSD", "WTIUSD", "BRENTUSD"];

/// Single-value cache with a fixed time-to-live.
pub struct TtlCache<T> {
    ttl: Duration,
    slot: Mutex<Option<(Instant, T)>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub fn get(&self) -> Option<T> {
        let slot = self.slot.lock().ok()?;
        match slot.as_ref() {
            Some((stored_at, value)) if stored_at.elapsed() < self.ttl => Some(value.clone()),
            _ => None,
        }
    }

    pub fn set(&self, value: T) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some((Instant::now(), value));
        }
    }
}

/// Source of tradeable crypto symbols.
pub trait CryptoSymbolSource {
    fn fetch_symbols(&self) -> Result<Vec<String>, JournalError>;
}

#[derive(Deserialize)]
struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

#[derive(Deserialize)]
struct SymbolInfo {
    symbol: String,
}

/// Binance `exchangeInfo` source; keeps every USDT-quoted symbol.
pub struct BinanceSymbolSource {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl BinanceSymbolSource {
    pub fn new() -> Result<Self, JournalError> {
        Self::with_base_url("https://api.binance.com")
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, JournalError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| JournalError::PairsFetch {
                reason: e.to_string(),
            })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

impl CryptoSymbolSource for BinanceSymbolSource {
    fn fetch_symbols(&self) -> Result<Vec<String>, JournalError> {
        let url = format!("{}/api/v3/exchangeInfo", self.base_url);
        let info: ExchangeInfo = self
            .client
            .get(&url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json())
            .map_err(|e| JournalError::PairsFetch {
                reason: e.to_string(),
            })?;

        Ok(info
            .symbols
            .into_iter()
            .map(|s| s.symbol)
            .filter(|s| s.ends_with("USDT"))
            .collect())
    }
}

/// The full catalog with a TTL cache in front of the crypto source.
pub struct PairsCatalog {
    source: Box<dyn CryptoSymbolSource + Send + Sync>,
    crypto_cache: TtlCache<Vec<String>>,
}

impl PairsCatalog {
    pub fn new(source: Box<dyn CryptoSymbolSource + Send + Sync>, cache_ttl: Duration) -> Self {
        Self {
            source,
            crypto_cache: TtlCache::new(cache_ttl),
        }
    }

    fn crypto_symbols(&self) -> Vec<String> {
        if let Some(cached) = self.crypto_cache.get() {
            return cached;
        }
        match self.source.fetch_symbols() {
            Ok(symbols) => {
                self.crypto_cache.set(symbols.clone());
                symbols
            }
            // The static catalog must stay available when the source is
            // down; failures are not cached so the next request retries.
            Err(e) => {
                tracing::warn!("crypto symbol fetch failed: {e}");
                Vec::new()
            }
        }
    }

    fn detect_kind(pair: &str) -> PairKind {
        if FOREX_PAIRS.contains(&pair) {
            PairKind::Forex
        } else if COMMODITY_PAIRS.contains(&pair) {
            PairKind::Commodity
        } else {
            PairKind::Crypto
        }
    }
}

impl PairsPort for PairsCatalog {
    fn list_pairs(
        &self,
        kind: Option<PairKind>,
        search: Option<&str>,
    ) -> Result<PairList, JournalError> {
        let mut pairs: Vec<String> = Vec::new();
        if kind.is_none() || kind == Some(PairKind::Forex) {
            pairs.extend(FOREX_PAIRS.iter().map(|s| s.to_string()));
        }
        if kind.is_none() || kind == Some(PairKind::Commodity) {
            pairs.extend(COMMODITY_PAIRS.iter().map(|s| s.to_string()));
        }
        if kind.is_none() || kind == Some(PairKind::Crypto) {
            pairs.extend(self.crypto_symbols());
        }

        if let Some(needle) = search.map(str::trim).filter(|s| !s.is_empty()) {
            let needle = needle.to_uppercase();
            pairs.retain(|p| p.to_uppercase().contains(&needle));
        }

        pairs.sort();
        pairs.dedup();

        let detected = pairs.first().map(|p| Self::detect_kind(p));
        Ok(PairList {
            kind: detected,
            pairs,
        })
    }
}
