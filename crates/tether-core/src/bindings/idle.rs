// # Idle Binding
//
// Reports whether the user has been inactive for a threshold.
//
// ## Transitions
//
// - active, no activity for the threshold -> idle, `on_idle` fires
// - idle, any activity signal -> active, `on_active` fires, countdown rearms
// - active, any activity signal -> countdown rearms, nothing fires
//
// Transitions are edge-triggered: staying idle never fires `on_idle`
// again. Activity signals are the configured window events (pointer
// press and move, touch start and move, key press, wheel by default).

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::Result;
use crate::lifecycle::Lifecycle;
use crate::platform::Platform;
use crate::state::StateCell;
use crate::subscription::{Subscription, SubscriptionGuard};
use crate::timer::Timeout;
use crate::traits::{Event, EventKind, EventTarget, Listener};

type Callback = Rc<dyn Fn()>;

/// Idle binding options
///
/// Unset fields fall back to the platform configuration (threshold) or
/// to no-ops (callbacks).
#[derive(Clone, Default)]
pub struct IdleOptions {
    idle_time: Option<Duration>,
    on_idle: Option<Callback>,
    on_active: Option<Callback>,
}

impl IdleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inactivity threshold
    pub fn idle_time(mut self, idle_time: Duration) -> Self {
        self.idle_time = Some(idle_time);
        self
    }

    /// Called once on every transition into idle
    pub fn on_idle(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_idle = Some(Rc::new(callback));
        self
    }

    /// Called once on every transition out of idle
    pub fn on_active(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_active = Some(Rc::new(callback));
        self
    }
}

impl fmt::Debug for IdleOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdleOptions")
            .field("idle_time", &self.idle_time)
            .field("on_idle", &self.on_idle.is_some())
            .field("on_active", &self.on_active.is_some())
            .finish()
    }
}

struct IdleInner {
    idle: StateCell<bool>,
    timer: Timeout,
    threshold: Cell<Duration>,
    on_idle: RefCell<Option<Callback>>,
    on_active: RefCell<Option<Callback>>,
}

impl IdleInner {
    fn arm(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        self.timer.schedule(self.threshold.get(), move || {
            if let Some(inner) = weak.upgrade() {
                inner.expire();
            }
        });
    }

    fn expire(&self) {
        if !self.idle.set_if_changed(true) {
            return;
        }
        tracing::debug!(threshold_ms = self.threshold.get().as_millis() as u64, "user is idle");
        // Clone out so the callback may replace options without a borrow conflict
        let callback = self.on_idle.borrow().clone();
        if let Some(callback) = callback {
            callback();
        }
    }

    fn activity(self: &Rc<Self>) {
        if self.idle.set_if_changed(false) {
            tracing::debug!("user is active again");
            let callback = self.on_active.borrow().clone();
            if let Some(callback) = callback {
                callback();
            }
        }
        self.arm();
    }
}

/// Inactivity detection over window activity events
pub struct Idle {
    inner: Rc<IdleInner>,
    window: Option<Rc<dyn EventTarget>>,
    events: Vec<EventKind>,
    guard: SubscriptionGuard<Duration>,
}

impl Idle {
    pub fn new(platform: &Platform, options: IdleOptions) -> Self {
        let config = &platform.config().idle;
        Self {
            inner: Rc::new(IdleInner {
                idle: StateCell::new(false),
                timer: Timeout::new("idle", platform.scheduler()),
                threshold: Cell::new(options.idle_time.unwrap_or_else(|| config.idle_time())),
                on_idle: RefCell::new(options.on_idle),
                on_active: RefCell::new(options.on_active),
            }),
            window: platform.window(),
            events: config.events.clone(),
            guard: SubscriptionGuard::new("idle"),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.inner.idle.get()
    }

    pub fn version(&self) -> u64 {
        self.inner.idle.version()
    }

    pub fn threshold(&self) -> Duration {
        self.inner.threshold.get()
    }

    /// Replace the options
    ///
    /// Callbacks take effect immediately. A new threshold restarts the
    /// countdown of an active binding.
    pub fn set_options(&mut self, options: IdleOptions) -> Result<()> {
        *self.inner.on_idle.borrow_mut() = options.on_idle;
        *self.inner.on_active.borrow_mut() = options.on_active;
        if let Some(idle_time) = options.idle_time {
            self.inner.threshold.set(idle_time);
        }
        if self.guard.is_active() {
            self.start()
        } else {
            Ok(())
        }
    }

    fn start(&mut self) -> Result<()> {
        let Some(window) = self.window.clone() else {
            tracing::debug!("no window; idle detection disabled");
            return Ok(());
        };
        let inner = self.inner.clone();
        let events = self.events.clone();

        // Re-attaching keeps the current idle value; only activity leaves idle
        self.guard.sync(inner.threshold.get(), move |_, _| {
            inner.arm();

            let activity: Weak<IdleInner> = Rc::downgrade(&inner);
            let listener: Listener = Rc::new(move |_: &Event| {
                if let Some(inner) = activity.upgrade() {
                    inner.activity();
                }
            });
            let listeners = Subscription::listen_all(window, &events, listener);

            let timer = Rc::downgrade(&inner);
            let countdown = Subscription::new("idle-timer", move || {
                if let Some(inner) = timer.upgrade() {
                    inner.timer.cancel();
                }
            });
            Ok(Subscription::merge(vec![countdown, listeners]))
        })?;
        Ok(())
    }
}

impl Lifecycle for Idle {
    fn activate(&mut self) -> Result<()> {
        self.start()
    }

    fn deactivate(&mut self) {
        self.guard.deactivate();
    }
}
