//! Universe configuration — GICS-classified constituent lists.
//!
//! The universe is stored as a TOML file of constituents, each with a sector
//! and sub-industry. It is an explicit value handed to each run; nothing is
//! fetched or cached at load time.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("read universe file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("parse universe TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize universe: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("duplicate symbol in universe: {0}")]
    DuplicateSymbol(String),
}

/// One listed security.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constituent {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub sub_industry: String,
}

impl Constituent {
    pub fn pair(&self) -> SectorPair {
        SectorPair::new(&self.sector, &self.sub_industry)
    }
}

/// A (sector, sub-industry) pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SectorPair {
    pub sector: String,
    pub sub_industry: String,
}

impl SectorPair {
    pub fn new(sector: impl Into<String>, sub_industry: impl Into<String>) -> Self {
        Self {
            sector: sector.into(),
            sub_industry: sub_industry.into(),
        }
    }

    /// Parse `"Sector/Sub-Industry"`.
    pub fn parse(s: &str) -> Option<Self> {
        let (sector, sub) = s.split_once('/')?;
        let (sector, sub) = (sector.trim(), sub.trim());
        if sector.is_empty() || sub.is_empty() {
            return None;
        }
        Some(Self::new(sector, sub))
    }
}

impl fmt::Display for SectorPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.sector, self.sub_industry)
    }
}

/// Which constituents a run covers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum Selection {
    #[default]
    All,
    /// Whole sectors.
    Sectors(Vec<String>),
    /// Specific sector/sub-industry pairs.
    Pairs(Vec<SectorPair>),
}

impl Selection {
    /// Short description for chart titles.
    pub fn describe(&self) -> String {
        match self {
            Self::All => "All Sectors".to_string(),
            Self::Sectors(s) => s.join(", "),
            Self::Pairs(p) => p
                .iter()
                .map(|p| p.sub_industry.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// The complete universe configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub constituents: Vec<Constituent>,
}

impl Universe {
    pub fn new(constituents: Vec<Constituent>) -> Result<Self, UniverseError> {
        let mut seen = BTreeSet::new();
        for c in &constituents {
            if !seen.insert(c.symbol.as_str()) {
                return Err(UniverseError::DuplicateSymbol(c.symbol.clone()));
            }
        }
        Ok(Self { constituents })
    }

    pub fn from_file(path: &Path) -> Result<Self, UniverseError> {
        let content = std::fs::read_to_string(path).map_err(|source| UniverseError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, UniverseError> {
        let parsed: Universe = toml::from_str(content)?;
        Self::new(parsed.constituents)
    }

    pub fn to_toml(&self) -> Result<String, UniverseError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn len(&self) -> usize {
        self.constituents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constituents.is_empty()
    }

    pub fn get(&self, symbol: &str) -> Option<&Constituent> {
        self.constituents.iter().find(|c| c.symbol == symbol)
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.constituents.iter().map(|c| c.symbol.as_str()).collect()
    }

    /// Unique sectors, sorted.
    pub fn sectors(&self) -> Vec<&str> {
        self.constituents
            .iter()
            .map(|c| c.sector.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Unique sub-industries, sorted.
    pub fn sub_industries(&self) -> Vec<&str> {
        self.constituents
            .iter()
            .map(|c| c.sub_industry.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Unique (sector, sub-industry) pairs, sorted.
    pub fn pairs(&self) -> Vec<SectorPair> {
        self.constituents
            .iter()
            .map(Constituent::pair)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Pairs whose sector or sub-industry equals `label` exactly.
    pub fn search_by_label(&self, label: &str) -> Vec<SectorPair> {
        self.pairs()
            .into_iter()
            .filter(|p| p.sector == label || p.sub_industry == label)
            .collect()
    }

    /// Constituents listed under exactly this pair, in universe order.
    pub fn search_by_pair(&self, pair: &SectorPair) -> Vec<&Constituent> {
        self.constituents
            .iter()
            .filter(|c| c.sector == pair.sector && c.sub_industry == pair.sub_industry)
            .collect()
    }

    /// Constituents covered by a selection, in universe order.
    pub fn select(&self, selection: &Selection) -> Vec<&Constituent> {
        match selection {
            Selection::All => self.constituents.iter().collect(),
            Selection::Sectors(sectors) => self
                .constituents
                .iter()
                .filter(|c| sectors.iter().any(|s| *s == c.sector))
                .collect(),
            Selection::Pairs(pairs) => self
                .constituents
                .iter()
                .filter(|c| {
                    pairs
                        .iter()
                        .any(|p| p.sector == c.sector && p.sub_industry == c.sub_industry)
                })
                .collect(),
        }
    }

    /// A representative slice of the S&P 500 across all eleven GICS sectors.
    pub fn default_sp500() -> Self {
        const ROWS: &[(&str, &str, &str, &str)] = &[
            ("GOOGL", "Alphabet Inc. (Class A)", "Communication Services", "Interactive Media & Services"),
            ("META", "Meta Platforms", "Communication Services", "Interactive Media & Services"),
            ("NFLX", "Netflix", "Communication Services", "Movies & Entertainment"),
            ("DIS", "Walt Disney", "Communication Services", "Movies & Entertainment"),
            ("VZ", "Verizon", "Communication Services", "Integrated Telecommunication Services"),
            ("T", "AT&T", "Communication Services", "Integrated Telecommunication Services"),
            ("AMZN", "Amazon", "Consumer Discretionary", "Broadline Retail"),
            ("HD", "Home Depot", "Consumer Discretionary", "Home Improvement Retail"),
            ("LOW", "Lowe's", "Consumer Discretionary", "Home Improvement Retail"),
            ("MCD", "McDonald's", "Consumer Discretionary", "Restaurants"),
            ("SBUX", "Starbucks", "Consumer Discretionary", "Restaurants"),
            ("NKE", "Nike, Inc.", "Consumer Discretionary", "Apparel, Accessories & Luxury Goods"),
            ("PG", "Procter & Gamble", "Consumer Staples", "Personal Care Products"),
            ("KO", "Coca-Cola Company (The)", "Consumer Staples", "Soft Drinks & Non-alcoholic Beverages"),
            ("PEP", "PepsiCo", "Consumer Staples", "Soft Drinks & Non-alcoholic Beverages"),
            ("WMT", "Walmart", "Consumer Staples", "Consumer Staples Merchandise Retail"),
            ("COST", "Costco", "Consumer Staples", "Consumer Staples Merchandise Retail"),
            ("XOM", "ExxonMobil", "Energy", "Integrated Oil & Gas"),
            ("CVX", "Chevron Corporation", "Energy", "Integrated Oil & Gas"),
            ("COP", "ConocoPhillips", "Energy", "Oil & Gas Exploration & Production"),
            ("EOG", "EOG Resources", "Energy", "Oil & Gas Exploration & Production"),
            ("JPM", "JPMorgan Chase", "Financials", "Diversified Banks"),
            ("BAC", "Bank of America", "Financials", "Diversified Banks"),
            ("WFC", "Wells Fargo", "Financials", "Diversified Banks"),
            ("GS", "Goldman Sachs", "Financials", "Investment Banking & Brokerage"),
            ("MS", "Morgan Stanley", "Financials", "Investment Banking & Brokerage"),
            ("V", "Visa Inc.", "Financials", "Transaction & Payment Processing Services"),
            ("MA", "Mastercard", "Financials", "Transaction & Payment Processing Services"),
            ("UNH", "UnitedHealth Group", "Health Care", "Managed Health Care"),
            ("ELV", "Elevance Health", "Health Care", "Managed Health Care"),
            ("JNJ", "Johnson & Johnson", "Health Care", "Pharmaceuticals"),
            ("PFE", "Pfizer", "Health Care", "Pharmaceuticals"),
            ("LLY", "Lilly (Eli)", "Health Care", "Pharmaceuticals"),
            ("TMO", "Thermo Fisher Scientific", "Health Care", "Life Sciences Tools & Services"),
            ("CAT", "Caterpillar Inc.", "Industrials", "Construction Machinery & Heavy Transportation Equipment"),
            ("DE", "Deere & Company", "Industrials", "Agricultural & Farm Machinery"),
            ("UNP", "Union Pacific Corporation", "Industrials", "Rail Transportation"),
            ("CSX", "CSX Corporation", "Industrials", "Rail Transportation"),
            ("HON", "Honeywell", "Industrials", "Industrial Conglomerates"),
            ("AAPL", "Apple Inc.", "Information Technology", "Technology Hardware, Storage & Peripherals"),
            ("MSFT", "Microsoft", "Information Technology", "Systems Software"),
            ("ORCL", "Oracle Corporation", "Information Technology", "Systems Software"),
            ("NVDA", "Nvidia", "Information Technology", "Semiconductors"),
            ("AVGO", "Broadcom", "Information Technology", "Semiconductors"),
            ("AMD", "Advanced Micro Devices", "Information Technology", "Semiconductors"),
            ("CRM", "Salesforce", "Information Technology", "Application Software"),
            ("ADBE", "Adobe Inc.", "Information Technology", "Application Software"),
            ("LIN", "Linde plc", "Materials", "Industrial Gases"),
            ("APD", "Air Products", "Materials", "Industrial Gases"),
            ("SHW", "Sherwin-Williams", "Materials", "Specialty Chemicals"),
            ("NEM", "Newmont", "Materials", "Gold"),
            ("PLD", "Prologis", "Real Estate", "Industrial REITs"),
            ("AMT", "American Tower", "Real Estate", "Telecom Tower REITs"),
            ("CCI", "Crown Castle", "Real Estate", "Telecom Tower REITs"),
            ("SPG", "Simon Property Group", "Real Estate", "Retail REITs"),
            ("NEE", "NextEra Energy", "Utilities", "Multi-Utilities"),
            ("DUK", "Duke Energy", "Utilities", "Electric Utilities"),
            ("SO", "Southern Company", "Utilities", "Electric Utilities"),
            ("AEP", "American Electric Power", "Utilities", "Electric Utilities"),
        ];

        Self {
            constituents: ROWS
                .iter()
                .map(|&(symbol, name, sector, sub_industry)| Constituent {
                    symbol: symbol.into(),
                    name: name.into(),
                    sector: sector.into(),
                    sub_industry: sub_industry.into(),
                })
                .collect(),
        }
    }
}
