//! Search modes offered on the command line

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How the search text is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    /// Literal text; every word must appear in the file
    #[value(name = "text")]
    #[default]
    Text,

    /// Calls of `<import path>.<Resource>` in Go code, following import aliases
    #[value(name = "gopackage")]
    GoPackage,
}

impl std::fmt::Display for SearchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::GoPackage => write!(f, "gopackage"),
        }
    }
}

impl std::str::FromStr for SearchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "gopackage" => Ok(Self::GoPackage),
            _ => Err(format!(
                "Invalid search type: '{s}'. Valid options are: text, gopackage"
            )),
        }
    }
}
