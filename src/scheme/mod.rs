use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchemeError;

mod classes;

pub use classes::SchemeClassMap;

/// The user's explicit choice. `System` means no override is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    #[default]
    System,
    Light,
    Dark,
}

/// A concrete scheme as reported by the host or surfaced to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    Light,
    Dark,
}

impl Scheme {
    pub const ALL: [Scheme; 3] = [Scheme::Light, Scheme::Dark, Scheme::System];

    /// Next value in the toggle order `Light -> Dark -> System -> Light`.
    pub const fn next(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::System,
            Self::System => Self::Light,
        }
    }

    /// The explicit override, or `None` for `System`.
    pub const fn appearance(self) -> Option<Appearance> {
        match self {
            Self::Light => Some(Appearance::Light),
            Self::Dark => Some(Appearance::Dark),
            Self::System => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }
}

impl Appearance {
    pub const fn from_dark_preferred(dark: bool) -> Self {
        if dark {
            Self::Dark
        } else {
            Self::Light
        }
    }

    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl From<Appearance> for Scheme {
    fn from(appearance: Appearance) -> Self {
        match appearance {
            Appearance::Light => Self::Light,
            Appearance::Dark => Self::Dark,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Appearance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = SchemeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            other => Err(SchemeError::Usage(format!(
                "unknown scheme '{other}'; expected light, dark or system"
            ))),
        }
    }
}

impl FromStr for Appearance {
    type Err = SchemeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.parse::<Scheme>()?.appearance() {
            Some(appearance) => Ok(appearance),
            None => Err(SchemeError::Usage(
                "ambient scheme must be light or dark".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_cycles_light_dark_system() {
        assert_eq!(Scheme::Light.next(), Scheme::Dark);
        assert_eq!(Scheme::Dark.next(), Scheme::System);
        assert_eq!(Scheme::System.next(), Scheme::Light);
    }

    #[test]
    fn next_is_a_period_three_permutation_without_fixed_points() {
        for scheme in Scheme::ALL {
            assert_ne!(scheme.next(), scheme);
            assert_ne!(scheme.next().next(), scheme);
            assert_eq!(scheme.next().next().next(), scheme);
        }
    }

    #[test]
    fn system_has_no_appearance() {
        assert_eq!(Scheme::System.appearance(), None);
        assert_eq!(Scheme::Dark.appearance(), Some(Appearance::Dark));
        assert_eq!(Scheme::from(Appearance::Light), Scheme::Light);
    }

    #[test]
    fn parses_case_insensitive_names() {
        assert_eq!(" Dark ".parse::<Scheme>().unwrap(), Scheme::Dark);
        assert_eq!("SYSTEM".parse::<Scheme>().unwrap(), Scheme::System);
        assert!("sepia".parse::<Scheme>().is_err());
        assert!("system".parse::<Appearance>().is_err());
        assert_eq!("light".parse::<Appearance>().unwrap(), Appearance::Light);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Scheme::System).unwrap(), "\"system\"");
        let parsed: Appearance = serde_json::from_str("\"dark\"").unwrap();
        assert_eq!(parsed, Appearance::Dark);
    }
}
