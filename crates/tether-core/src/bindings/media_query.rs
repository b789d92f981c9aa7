//! Media query matching
//!
//! Reads `matches` synchronously on construction, then follows the
//! query's change notifications while active. Without a media matcher
//! (or for a query the matcher cannot evaluate) the value is `false`.

use std::rc::Rc;

use crate::Result;
use crate::lifecycle::Lifecycle;
use crate::platform::Platform;
use crate::state::StateCell;
use crate::subscription::{Subscription, SubscriptionGuard};
use crate::traits::{ChangeListener, MediaMatcher};

/// Live result of one media query
pub struct MediaQuery {
    matcher: Option<Rc<dyn MediaMatcher>>,
    query: String,
    matches: Rc<StateCell<bool>>,
    guard: SubscriptionGuard<String>,
}

impl MediaQuery {
    pub fn new(platform: &Platform, query: impl Into<String>) -> Self {
        let matcher = platform.media();
        let query = query.into();
        let initial = read(matcher.as_deref(), &query);
        Self {
            matcher,
            query,
            matches: Rc::new(StateCell::new(initial)),
            guard: SubscriptionGuard::new("media-query"),
        }
    }

    pub fn matches(&self) -> bool {
        self.matches.get()
    }

    pub fn version(&self) -> u64 {
        self.matches.version()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Evaluate a different query; an active binding re-subscribes
    pub fn set_query(&mut self, query: impl Into<String>) -> Result<()> {
        let query = query.into();
        if query == self.query {
            return Ok(());
        }
        self.query = query;
        self.matches
            .set_if_changed(read(self.matcher.as_deref(), &self.query));
        if self.guard.is_active() {
            self.subscribe()
        } else {
            Ok(())
        }
    }

    fn subscribe(&mut self) -> Result<()> {
        let Some(matcher) = self.matcher.clone() else {
            tracing::debug!(query = %self.query, "no media matcher; query reports false");
            return Ok(());
        };
        let matches = Rc::downgrade(&self.matches);

        self.guard.sync(self.query.clone(), move |query, _| {
            let Some(list) = matcher.match_media(query) else {
                tracing::debug!(query = %query, "media query cannot be evaluated");
                return Ok(Subscription::noop("media-query"));
            };
            // The query may have flipped between construction and activation
            if let Some(matches) = matches.upgrade() {
                matches.set_if_changed(list.matches());
            }
            let listener: ChangeListener = Rc::new(move |now: bool| {
                if let Some(matches) = matches.upgrade() {
                    matches.set_if_changed(now);
                }
            });
            let id = list.add_change_listener(listener);
            Ok(Subscription::new("media-query", move || {
                list.remove_change_listener(id);
            }))
        })?;
        Ok(())
    }
}

fn read(matcher: Option<&dyn MediaMatcher>, query: &str) -> bool {
    matcher
        .and_then(|matcher| matcher.match_media(query))
        .is_some_and(|list| list.matches())
}

impl Lifecycle for MediaQuery {
    fn activate(&mut self) -> Result<()> {
        self.subscribe()
    }

    fn deactivate(&mut self) {
        self.guard.deactivate();
    }
}
