use super::model::{tie_break, Resolution, SchemePair};
use crate::scheme::{Appearance, Scheme};

/// Holds the combined `(ambient, user)` state and the visible scheme.
#[derive(Debug)]
pub struct SchemeStateMachine {
    pair: SchemePair,
    resolved: Appearance,
}

impl SchemeStateMachine {
    pub fn new(ambient: Appearance, user: Scheme) -> Self {
        let pair = SchemePair::new(ambient, user);
        Self {
            pair,
            resolved: pair.visible(),
        }
    }

    pub fn pair(&self) -> SchemePair {
        self.pair
    }

    /// The last surfaced scheme, or the initial visible one.
    pub fn resolved(&self) -> Appearance {
        self.resolved
    }

    pub fn set_ambient(&mut self, ambient: Appearance) -> Option<Appearance> {
        self.advance(SchemePair::new(ambient, self.pair.user))
    }

    pub fn set_user(&mut self, user: Scheme) -> Option<Appearance> {
        self.advance(SchemePair::new(self.pair.ambient, user))
    }

    /// Moves to `next` and returns the scheme to surface, if any. An
    /// unchanged pair is not evaluated.
    pub fn advance(&mut self, next: SchemePair) -> Option<Appearance> {
        if next == self.pair {
            return None;
        }

        let prev = std::mem::replace(&mut self.pair, next);
        let resolution = tie_break(prev, next);
        tracing::debug!(?prev, ?next, ?resolution, "reconciled scheme pair");

        if let Resolution::Override(scheme) | Resolution::Ambient(scheme) = resolution {
            self.resolved = scheme;
        }
        resolution.scheme()
    }
}

impl std::fmt::Display for SchemeStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ambient={} user={} resolved={}",
            self.pair.ambient, self.pair.user, self.resolved
        )
    }
}
