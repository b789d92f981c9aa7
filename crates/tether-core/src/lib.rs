// # tether-core
//
// Lifecycle-managed bindings to external, observable state.
//
// ## Architecture Overview
//
// A binding attaches to something outside the component tree (an event
// target, a storage area, a media query, an observer, the network) on
// activation and detaches on deactivation:
// - **traits**: the platform seams bindings observe
// - **platform**: the bundle of seams handed to bindings, plus an
//   in-memory implementation of every seam
// - **subscription**: attach/detach pairing with epoch tokens
// - **node_ref**: shared node slots
// - **timer**: single cancellable timeouts
// - **state**: observable exposed state
// - **lifecycle**: the activation contract and the `Mount` driver
// - **bindings**: one binding per external resource
//
// ## Design Principles
//
// 1. **Detach before attach**: a binding never holds two live
//    registrations for the same resource
// 2. **Latest activation wins**: async completions from a superseded
//    cycle never touch state
// 3. **Degrade, don't fail**: a missing platform seam yields the
//    documented fallback state
// 4. **Single-threaded**: shared state is `Rc`/`RefCell`; callbacks hold
//    `Weak` references to binding internals

pub mod bindings;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod node_ref;
pub mod platform;
pub mod state;
pub mod storage;
pub mod subscription;
pub mod timer;
pub mod traits;

// Re-export core types for convenience
pub use config::TetherConfig;
pub use error::{Error, FetchError, Result};
pub use lifecycle::{Lifecycle, Mount};
pub use node_ref::{NodeCallback, NodeRef, RefComposer};
pub use platform::Platform;
pub use state::StateCell;
pub use subscription::{Epoch, Subscription, SubscriptionGuard};
pub use timer::Timeout;
