//! Media query matching
//!
//! Mirrors `window.matchMedia`: a matcher hands out query lists that
//! report the current match and announce changes.

use std::rc::Rc;

use super::event_target::ListenerId;

/// Called with the new `matches` value whenever it flips
pub type ChangeListener = Rc<dyn Fn(bool)>;

/// A live media query
pub trait MediaQueryList {
    /// The query text this list evaluates
    fn media(&self) -> String;

    /// Whether the query currently matches
    fn matches(&self) -> bool;

    /// Register a change listener
    fn add_change_listener(&self, listener: ChangeListener) -> ListenerId;

    /// Remove a change listener; unknown ids return `false`
    fn remove_change_listener(&self, id: ListenerId) -> bool;
}

/// Trait for media query evaluation
pub trait MediaMatcher {
    /// Evaluate `query`
    ///
    /// # Returns
    ///
    /// `None` when the query cannot be evaluated in this context.
    fn match_media(&self, query: &str) -> Option<Rc<dyn MediaQueryList>>;
}
