use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

/// Precious metal priced by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    Gold,
    Silver,
}

impl Instrument {
    /// Every instrument, in resolution order for batch operations.
    pub const ALL: [Instrument; 2] = [Instrument::Gold, Instrument::Silver];

    /// ISO 4217 metal code used by upstream providers.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Gold => "XAU",
            Self::Silver => "XAG",
        }
    }

    /// Lowercase name, used for file names and response bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gold => "gold",
            Self::Silver => "silver",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Instrument {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gold" | "xau" => Ok(Self::Gold),
            "silver" | "xag" => Ok(Self::Silver),
            other => Err(MarketDataError::UnsupportedInstrument(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_and_symbols() {
        assert_eq!("gold".parse::<Instrument>().unwrap(), Instrument::Gold);
        assert_eq!("XAU".parse::<Instrument>().unwrap(), Instrument::Gold);
        assert_eq!(" Silver ".parse::<Instrument>().unwrap(), Instrument::Silver);
        assert_eq!("xag".parse::<Instrument>().unwrap(), Instrument::Silver);
    }

    #[test]
    fn test_parse_rejects_other_metals() {
        let err = "platinum".parse::<Instrument>().unwrap_err();
        assert_eq!(format!("{}", err), "Unsupported instrument: platinum");
    }

    #[test]
    fn test_symbols() {
        assert_eq!(Instrument::Gold.symbol(), "XAU");
        assert_eq!(Instrument::Silver.symbol(), "XAG");
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Instrument::Silver).unwrap();
        assert_eq!(json, "\"silver\"");
        let parsed: Instrument = serde_json::from_str("\"gold\"").unwrap();
        assert_eq!(parsed, Instrument::Gold);
    }
}
