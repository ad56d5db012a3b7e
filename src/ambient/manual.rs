use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{AmbientCallback, AmbientSource, ListenerId};
use crate::error::{SchemeError, SchemeResult};
use crate::scheme::Appearance;

const GTK_THEME_ENV: &str = "GTK_THEME";

#[derive(Default)]
struct ManualState {
    dark: Cell<bool>,
    unsupported: Option<String>,
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(ListenerId, AmbientCallback)>>,
}

/// Ambient source whose value is pushed by the host application.
///
/// Clones share the same value and listeners, so a host keeps one handle to
/// drive changes while the engine holds another.
#[derive(Clone, Default)]
pub struct ManualSignal {
    state: Rc<ManualState>,
}

impl ManualSignal {
    pub fn new(dark: bool) -> Self {
        Self {
            state: Rc::new(ManualState {
                dark: Cell::new(dark),
                ..ManualState::default()
            }),
        }
    }

    pub fn with_appearance(appearance: Appearance) -> Self {
        Self::new(appearance.is_dark())
    }

    /// A source whose query always fails, for hosts without a theme signal.
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self {
            state: Rc::new(ManualState {
                unsupported: Some(reason.into()),
                ..ManualState::default()
            }),
        }
    }

    /// Derives the ambient value from a GTK theme name such as `Adwaita:dark`.
    pub fn from_theme_name(theme_name: &str) -> SchemeResult<Self> {
        appearance_from_theme_name(theme_name)
            .map(Self::with_appearance)
            .ok_or_else(|| {
                SchemeError::platform_unsupported(format!(
                    "theme name '{theme_name}' does not indicate light or dark"
                ))
            })
    }

    pub fn from_env() -> SchemeResult<Self> {
        let theme_name = std::env::var(GTK_THEME_ENV).map_err(|_| {
            SchemeError::platform_unsupported(format!("{GTK_THEME_ENV} is not set"))
        })?;
        Self::from_theme_name(&theme_name)
    }

    /// Updates the value and notifies every listener, even when unchanged.
    pub fn set_dark_preferred(&self, dark: bool) {
        self.state.dark.set(dark);
        let listeners: Vec<AmbientCallback> = self
            .state
            .listeners
            .borrow()
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in listeners {
            callback(dark);
        }
    }

    pub fn set_appearance(&self, appearance: Appearance) {
        self.set_dark_preferred(appearance.is_dark());
    }

    pub fn listener_count(&self) -> usize {
        self.state.listeners.borrow().len()
    }
}

impl AmbientSource for ManualSignal {
    fn is_dark_preferred(&self) -> SchemeResult<bool> {
        match &self.state.unsupported {
            Some(reason) => Err(SchemeError::platform_unsupported(reason.clone())),
            None => Ok(self.state.dark.get()),
        }
    }

    fn on_change(&self, callback: AmbientCallback) -> ListenerId {
        let id = ListenerId(self.state.next_id.get());
        self.state.next_id.set(id.0 + 1);
        self.state.listeners.borrow_mut().push((id, callback));
        id
    }

    fn off_change(&self, listener: ListenerId) {
        self.state
            .listeners
            .borrow_mut()
            .retain(|(id, _)| *id != listener);
    }
}

pub(crate) fn appearance_from_theme_name(theme_name: &str) -> Option<Appearance> {
    let normalized = theme_name.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return None;
    }
    if normalized.contains("dark") {
        return Some(Appearance::Dark);
    }
    if normalized.contains("light") {
        return Some(Appearance::Light);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_name_heuristic_detects_dark_and_light() {
        assert_eq!(
            appearance_from_theme_name("Adwaita:dark"),
            Some(Appearance::Dark)
        );
        assert_eq!(
            appearance_from_theme_name(" Breeze-Light "),
            Some(Appearance::Light)
        );
        assert_eq!(appearance_from_theme_name("Adwaita"), None);
        assert_eq!(appearance_from_theme_name(""), None);
    }

    #[test]
    fn from_theme_name_rejects_inconclusive_names() {
        assert!(matches!(
            ManualSignal::from_theme_name("HighContrast"),
            Err(SchemeError::PlatformUnsupported { .. })
        ));
        let signal = ManualSignal::from_theme_name("Yaru-dark").unwrap();
        assert!(signal.is_dark_preferred().unwrap());
    }

    #[test]
    fn clones_share_value_and_listeners() {
        let signal = ManualSignal::new(false);
        let host = signal.clone();
        let seen = Rc::new(Cell::new(false));
        let sink = Rc::clone(&seen);
        let id = signal.on_change(Rc::new(move |dark| sink.set(dark)));

        host.set_dark_preferred(true);
        assert!(seen.get());
        assert!(signal.is_dark_preferred().unwrap());

        signal.off_change(id);
        assert_eq!(host.listener_count(), 0);
    }
}
