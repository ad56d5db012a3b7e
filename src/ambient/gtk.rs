use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use gtk4::glib;
use gtk4::prelude::*;

use super::manual::appearance_from_theme_name;
use super::{AmbientCallback, AmbientSource, ListenerId};
use crate::error::{SchemeError, SchemeResult};

const INTERFACE_COLOR_SCHEME: &str = "gtk-interface-color-scheme";
const WATCHED_PROPERTIES: [&str; 3] = [
    INTERFACE_COLOR_SCHEME,
    "gtk-theme-name",
    "gtk-application-prefer-dark-theme",
];

/// Ambient source backed by the default display's `gtk4::Settings`.
pub struct GtkSettingsSignal {
    settings: gtk4::Settings,
    next_id: Cell<u64>,
    handlers: RefCell<HashMap<ListenerId, glib::SignalHandlerId>>,
}

impl GtkSettingsSignal {
    /// Requires GTK to be initialized with a default display.
    pub fn new() -> SchemeResult<Self> {
        let settings = gtk4::Settings::default().ok_or_else(|| {
            SchemeError::platform_unsupported("no default GTK display settings")
        })?;
        Ok(Self::with_settings(settings))
    }

    pub fn with_settings(settings: gtk4::Settings) -> Self {
        Self {
            settings,
            next_id: Cell::new(0),
            handlers: RefCell::new(HashMap::new()),
        }
    }
}

impl AmbientSource for GtkSettingsSignal {
    fn is_dark_preferred(&self) -> SchemeResult<bool> {
        Ok(settings_prefer_dark(&self.settings))
    }

    fn on_change(&self, callback: AmbientCallback) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let handler = self
            .settings
            .connect_notify_local(None, move |settings, pspec| {
                let name = pspec.name();
                if WATCHED_PROPERTIES.iter().any(|watched| *watched == name) {
                    callback(settings_prefer_dark(settings));
                }
            });
        self.handlers.borrow_mut().insert(id, handler);
        id
    }

    fn off_change(&self, listener: ListenerId) {
        let handler = self.handlers.borrow_mut().remove(&listener);
        if let Some(handler) = handler {
            self.settings.disconnect(handler);
        }
    }
}

fn settings_prefer_dark(settings: &gtk4::Settings) -> bool {
    if settings
        .list_properties()
        .iter()
        .any(|prop| prop.name() == INTERFACE_COLOR_SCHEME)
    {
        let color_scheme = settings.property_value(INTERFACE_COLOR_SCHEME);
        if let Ok(raw_scheme) = color_scheme.get::<i32>() {
            match raw_scheme {
                // GTK_INTERFACE_COLOR_SCHEME_FORCE_DARK
                2 => return true,
                // GTK_INTERFACE_COLOR_SCHEME_FORCE_LIGHT
                3 => return false,
                _ => {}
            }
        }
    }

    if let Some(theme_name) = settings.gtk_theme_name() {
        if let Some(appearance) = appearance_from_theme_name(theme_name.as_str()) {
            return appearance.is_dark();
        }
    }

    #[allow(deprecated)]
    let prefer_dark = settings.is_gtk_application_prefer_dark_theme();
    prefer_dark
}
