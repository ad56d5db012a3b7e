use super::{Appearance, Scheme};

pub const DEFAULT_LIGHT_CLASS: &str = "light-scheme";
pub const DEFAULT_DARK_CLASS: &str = "dark-scheme";

/// Bidirectional mapping between concrete schemes and class identifiers.
///
/// The same identifiers are written to the preference store and toggled on
/// the class list, so an absent identifier always means [`Scheme::System`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeClassMap {
    light: String,
    dark: String,
}

impl SchemeClassMap {
    /// Returns `None` when either identifier is blank or both are equal.
    pub fn new(light: impl Into<String>, dark: impl Into<String>) -> Option<Self> {
        let light = light.into();
        let dark = dark.into();
        if light.trim().is_empty() || dark.trim().is_empty() || light == dark {
            return None;
        }
        Some(Self { light, dark })
    }

    pub fn light(&self) -> &str {
        &self.light
    }

    pub fn dark(&self) -> &str {
        &self.dark
    }

    pub fn class_for(&self, scheme: Scheme) -> Option<&str> {
        scheme.appearance().map(|appearance| self.class_for_appearance(appearance))
    }

    pub fn class_for_appearance(&self, appearance: Appearance) -> &str {
        match appearance {
            Appearance::Light => &self.light,
            Appearance::Dark => &self.dark,
        }
    }

    /// Unknown or missing identifiers map to [`Scheme::System`].
    pub fn scheme_for(&self, class: Option<&str>) -> Scheme {
        match class {
            Some(class) if class == self.light => Scheme::Light,
            Some(class) if class == self.dark => Scheme::Dark,
            _ => Scheme::System,
        }
    }

    pub fn contains(&self, class: &str) -> bool {
        class == self.light || class == self.dark
    }

    pub fn classes(&self) -> [&str; 2] {
        [&self.light, &self.dark]
    }
}

impl Default for SchemeClassMap {
    fn default() -> Self {
        Self {
            light: DEFAULT_LIGHT_CLASS.to_string(),
            dark: DEFAULT_DARK_CLASS.to_string(),
        }
    }
}
