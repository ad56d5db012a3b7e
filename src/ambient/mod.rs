//! Host ambient light/dark signal.
//!
//! An [`AmbientSource`] is the host's raw boolean "prefers dark" predicate
//! plus change notifications. [`AmbientObserver`] turns a source into a
//! deduplicated stream of [`Appearance`] values.

use std::cell::Cell;
use std::rc::Rc;

use crate::error::SchemeResult;
use crate::scheme::Appearance;

#[cfg(feature = "gtk")]
mod gtk;
mod manual;

#[cfg(feature = "gtk")]
pub use gtk::GtkSettingsSignal;
pub use manual::ManualSignal;

pub type AmbientCallback = Rc<dyn Fn(bool)>;

/// Handle returned by [`AmbientSource::on_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

pub trait AmbientSource {
    /// Fails with `PlatformUnsupported` when the host signal cannot be queried.
    fn is_dark_preferred(&self) -> SchemeResult<bool>;
    fn on_change(&self, callback: AmbientCallback) -> ListenerId;
    fn off_change(&self, listener: ListenerId);
}

pub(crate) fn query_appearance(source: &dyn AmbientSource) -> SchemeResult<Appearance> {
    source.is_dark_preferred().map(Appearance::from_dark_preferred)
}

/// Active subscription to an [`AmbientSource`].
///
/// Deactivation consumes the observer; dropping it also detaches the host
/// listener.
pub struct AmbientObserver {
    source: Rc<dyn AmbientSource>,
    listener: Option<ListenerId>,
    active: Rc<Cell<bool>>,
}

impl AmbientObserver {
    /// Emits the current ambient scheme into `sink` synchronously, then every
    /// distinct value reported by the host.
    pub fn activate<F>(source: Rc<dyn AmbientSource>, sink: F) -> SchemeResult<Self>
    where
        F: Fn(Appearance) + 'static,
    {
        let initial = query_appearance(source.as_ref())?;
        let last = Rc::new(Cell::new(initial));
        let active = Rc::new(Cell::new(true));
        let sink = Rc::new(sink);

        sink(initial);

        let listener = {
            let last = Rc::clone(&last);
            let active = Rc::clone(&active);
            let sink = Rc::clone(&sink);
            source.on_change(Rc::new(move |dark| {
                if !active.get() {
                    return;
                }
                let appearance = Appearance::from_dark_preferred(dark);
                if last.replace(appearance) == appearance {
                    return;
                }
                tracing::debug!(%appearance, "ambient scheme changed");
                sink(appearance);
            }))
        };

        Ok(Self {
            source,
            listener: Some(listener),
            active,
        })
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn deactivate(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        self.active.set(false);
        if let Some(listener) = self.listener.take() {
            self.source.off_change(listener);
        }
    }
}

impl Drop for AmbientObserver {
    fn drop(&mut self) {
        self.detach();
    }
}
