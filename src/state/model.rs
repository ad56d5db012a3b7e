use crate::scheme::{Appearance, Scheme};

/// The latest ambient and user values, combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemePair {
    pub ambient: Appearance,
    pub user: Scheme,
}

impl SchemePair {
    pub const fn new(ambient: Appearance, user: Scheme) -> Self {
        Self { ambient, user }
    }

    /// What the UI shows for this pair in isolation.
    pub const fn visible(self) -> Appearance {
        match self.user.appearance() {
            Some(appearance) => appearance,
            None => self.ambient,
        }
    }
}

/// Outcome of comparing two consecutive pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// A new explicit override takes effect.
    Override(Appearance),
    /// The ambient value takes effect.
    Ambient(Appearance),
    /// No visible transition.
    Suppressed,
}

impl Resolution {
    pub const fn scheme(self) -> Option<Appearance> {
        match self {
            Self::Override(appearance) | Self::Ambient(appearance) => Some(appearance),
            Self::Suppressed => None,
        }
    }
}

/// Decides what to surface when the combined state moves from `prev` to
/// `next`.
///
/// Rules, in order:
/// 1. the override changed and either replaced another override, or appeared
///    where there was none and differs from the new ambient value: emit it;
/// 2. the ambient value changed with no override on either side, or the
///    override was cleared and differs from the new ambient value: emit the
///    ambient value;
/// 3. otherwise suppress.
pub fn tie_break(prev: SchemePair, next: SchemePair) -> Resolution {
    let prev_user = prev.user.appearance();
    let next_user = next.user.appearance();
    let user_changed = prev_user != next_user;

    match (prev_user, next_user) {
        (Some(_), Some(user)) if user_changed => return Resolution::Override(user),
        (None, Some(user)) if next.ambient != user => return Resolution::Override(user),
        _ => {}
    }

    let ambient_changed = prev.ambient != next.ambient;
    match (prev_user, next_user) {
        (None, None) if ambient_changed => Resolution::Ambient(next.ambient),
        (Some(user), None) if user != next.ambient => Resolution::Ambient(next.ambient),
        _ => Resolution::Suppressed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::Appearance::{Dark as D, Light as L};

    const USERS: [Scheme; 3] = [Scheme::Light, Scheme::Dark, Scheme::System];
    const AMBIENTS: [Appearance; 2] = [L, D];

    fn pair(ambient: Appearance, user: Scheme) -> SchemePair {
        SchemePair::new(ambient, user)
    }

    fn all_pairs() -> Vec<SchemePair> {
        AMBIENTS
            .iter()
            .flat_map(|&ambient| USERS.iter().map(move |&user| pair(ambient, user)))
            .collect()
    }

    #[test]
    fn override_replacing_override_wins() {
        assert_eq!(
            tie_break(pair(L, Scheme::Light), pair(L, Scheme::Dark)),
            Resolution::Override(D)
        );
        assert_eq!(
            tie_break(pair(D, Scheme::Dark), pair(D, Scheme::Light)),
            Resolution::Override(L)
        );
    }

    #[test]
    fn new_override_differing_from_ambient_wins() {
        assert_eq!(
            tie_break(pair(L, Scheme::System), pair(L, Scheme::Dark)),
            Resolution::Override(D)
        );
        assert_eq!(
            tie_break(pair(D, Scheme::System), pair(D, Scheme::Light)),
            Resolution::Override(L)
        );
    }

    #[test]
    fn new_override_matching_ambient_is_suppressed() {
        assert_eq!(
            tie_break(pair(L, Scheme::System), pair(L, Scheme::Light)),
            Resolution::Suppressed
        );
        assert_eq!(
            tie_break(pair(D, Scheme::System), pair(D, Scheme::Dark)),
            Resolution::Suppressed
        );
    }

    #[test]
    fn ambient_change_without_override_is_surfaced() {
        assert_eq!(
            tie_break(pair(L, Scheme::System), pair(D, Scheme::System)),
            Resolution::Ambient(D)
        );
        assert_eq!(
            tie_break(pair(D, Scheme::System), pair(L, Scheme::System)),
            Resolution::Ambient(L)
        );
    }

    #[test]
    fn ambient_change_under_override_is_suppressed() {
        for user in [Scheme::Light, Scheme::Dark] {
            assert_eq!(tie_break(pair(L, user), pair(D, user)), Resolution::Suppressed);
            assert_eq!(tie_break(pair(D, user), pair(L, user)), Resolution::Suppressed);
        }
    }

    #[test]
    fn cleared_override_falls_back_to_differing_ambient() {
        assert_eq!(
            tie_break(pair(L, Scheme::Dark), pair(L, Scheme::System)),
            Resolution::Ambient(L)
        );
        assert_eq!(
            tie_break(pair(D, Scheme::Light), pair(D, Scheme::System)),
            Resolution::Ambient(D)
        );
    }

    #[test]
    fn cleared_override_matching_ambient_is_suppressed() {
        assert_eq!(
            tie_break(pair(L, Scheme::Light), pair(L, Scheme::System)),
            Resolution::Suppressed
        );
        assert_eq!(
            tie_break(pair(D, Scheme::Dark), pair(D, Scheme::System)),
            Resolution::Suppressed
        );
    }

    #[test]
    fn simultaneous_change_compares_override_with_new_ambient() {
        // Ambient flips to the value of the new override in the same step.
        assert_eq!(
            tie_break(pair(L, Scheme::System), pair(D, Scheme::Dark)),
            Resolution::Suppressed
        );
        assert_eq!(
            tie_break(pair(D, Scheme::System), pair(L, Scheme::Dark)),
            Resolution::Override(D)
        );
        // Cleared while ambient moves away from the old override.
        assert_eq!(
            tie_break(pair(D, Scheme::Dark), pair(L, Scheme::System)),
            Resolution::Ambient(L)
        );
    }

    #[test]
    fn identical_pairs_never_emit() {
        for state in all_pairs() {
            assert_eq!(tie_break(state, state), Resolution::Suppressed);
        }
    }

    #[test]
    fn single_step_transitions_keep_visible_scheme_consistent() {
        // For every change of exactly one component, an emission carries the
        // new visible scheme and suppression means the visible scheme held.
        for prev in all_pairs() {
            for next in all_pairs() {
                let one_component =
                    (prev.ambient == next.ambient) != (prev.user == next.user);
                if !one_component {
                    continue;
                }
                match tie_break(prev, next).scheme() {
                    Some(emitted) => {
                        assert_eq!(emitted, next.visible(), "{prev:?} -> {next:?}");
                        assert_ne!(prev.visible(), next.visible(), "{prev:?} -> {next:?}");
                    }
                    None => {
                        assert_eq!(prev.visible(), next.visible(), "{prev:?} -> {next:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn resolution_scheme_drops_suppression() {
        assert_eq!(Resolution::Override(D).scheme(), Some(D));
        assert_eq!(Resolution::Ambient(L).scheme(), Some(L));
        assert_eq!(Resolution::Suppressed.scheme(), None);
    }
}
