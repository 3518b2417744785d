//! Symbol classification — maps a symbol to a group label.
//!
//! Any `Fn(&str) -> Option<String>` is a classifier, so tests and callers can
//! pass closures. [`UniverseClassifier`] labels by GICS sector or sub-industry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::universe::Universe;

pub trait Classifier {
    /// Group label for `symbol`, or `None` if it is not classified.
    fn classify(&self, symbol: &str) -> Option<String>;
}

impl<F> Classifier for F
where
    F: Fn(&str) -> Option<String>,
{
    fn classify(&self, symbol: &str) -> Option<String> {
        self(symbol)
    }
}

/// Which GICS level a [`UniverseClassifier`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifyBy {
    Sector,
    #[default]
    SubIndustry,
}

impl fmt::Display for ClassifyBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sector => write!(f, "sector"),
            Self::SubIndustry => write!(f, "sub_industry"),
        }
    }
}

impl FromStr for ClassifyBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "sector" => Ok(Self::Sector),
            "sub_industry" | "subindustry" | "sub_sector" => Ok(Self::SubIndustry),
            other => Err(format!("unknown classification level: {other}")),
        }
    }
}

pub struct UniverseClassifier<'a> {
    universe: &'a Universe,
    by: ClassifyBy,
}

impl<'a> UniverseClassifier<'a> {
    pub fn new(universe: &'a Universe, by: ClassifyBy) -> Self {
        Self { universe, by }
    }
}

impl Classifier for UniverseClassifier<'_> {
    fn classify(&self, symbol: &str) -> Option<String> {
        let c = self.universe.get(symbol)?;
        Some(match self.by {
            ClassifyBy::Sector => c.sector.clone(),
            ClassifyBy::SubIndustry => c.sub_industry.clone(),
        })
    }
}
