use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

/// A mutable set of style-class tokens on the root UI element.
pub trait ClassList {
    fn remove(&self, tokens: &[&str]);
    fn add(&self, token: &str);
    fn contains(&self, token: &str) -> bool;
}

/// In-process class list. Clones share the same tokens.
#[derive(Debug, Clone, Default)]
pub struct MemoryClassList {
    tokens: Rc<RefCell<BTreeSet<String>>>,
}

impl MemoryClassList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Self {
        let list = Self::new();
        list.tokens
            .borrow_mut()
            .extend(tokens.into_iter().map(str::to_string));
        list
    }

    pub fn tokens(&self) -> Vec<String> {
        self.tokens.borrow().iter().cloned().collect()
    }
}

impl ClassList for MemoryClassList {
    fn remove(&self, tokens: &[&str]) {
        let mut current = self.tokens.borrow_mut();
        for token in tokens {
            current.remove(*token);
        }
    }

    fn add(&self, token: &str) {
        self.tokens.borrow_mut().insert(token.to_string());
    }

    fn contains(&self, token: &str) -> bool {
        self.tokens.borrow().contains(token)
    }
}

#[cfg(feature = "gtk")]
mod widget {
    use gtk4::prelude::*;

    use super::ClassList;

    /// CSS classes of a GTK widget, typically the application window.
    #[derive(Debug, Clone)]
    pub struct WidgetClassList<W: IsA<gtk4::Widget>> {
        widget: W,
    }

    impl<W: IsA<gtk4::Widget>> WidgetClassList<W> {
        pub fn new(widget: W) -> Self {
            Self { widget }
        }

        pub fn widget(&self) -> &W {
            &self.widget
        }
    }

    impl<W: IsA<gtk4::Widget>> ClassList for WidgetClassList<W> {
        fn remove(&self, tokens: &[&str]) {
            for token in tokens {
                self.widget.remove_css_class(token);
            }
        }

        fn add(&self, token: &str) {
            self.widget.add_css_class(token);
        }

        fn contains(&self, token: &str) -> bool {
            self.widget.has_css_class(token)
        }
    }
}

#[cfg(feature = "gtk")]
pub use widget::WidgetClassList;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_drops_every_listed_token() {
        let list = MemoryClassList::with_tokens(["app-root", "light-scheme", "dark-scheme"]);
        list.remove(&["light-scheme", "dark-scheme", "missing"]);
        assert_eq!(list.tokens(), vec!["app-root".to_string()]);
    }

    #[test]
    fn clones_share_tokens() {
        let list = MemoryClassList::new();
        let host = list.clone();
        list.add("dark-scheme");
        assert!(host.contains("dark-scheme"));
        list.add("dark-scheme");
        assert_eq!(host.tokens().len(), 1);
    }
}
