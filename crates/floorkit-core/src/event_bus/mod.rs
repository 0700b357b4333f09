//! # Plan event bus
//!
//! The host publishes a [`PlanEvent`] for each model change; views subscribe
//! to record what their caches must recompute before the next frame.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use floorkit_core::event_bus::{EventFilter, PlanEvent, PlanEventBus};
//!
//! let bus = PlanEventBus::new();
//! let subscription = bus.subscribe_scoped(EventFilter::All, |event| {
//!     tracing::debug!("{}", event.description());
//! });
//! bus.publish(PlanEvent::Selection).ok();
//! drop(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
