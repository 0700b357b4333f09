//! # floorkit core
//!
//! Model snapshot types, geometry primitives, length units, change events
//! and errors shared by the floorkit crates.

pub mod color;
pub mod error;
pub mod event_bus;
pub mod geometry;
pub mod model;
pub mod units;

pub use color::Color;
pub use error::{Error, ExportError, GeometryError, IconError, Result};
pub use event_bus::{
    EventBusConfig, EventCategory, EventFilter, PlanEvent, PlanEventBus, PreferenceChange,
    Subscription, SubscriptionId,
};
pub use geometry::{Point, Rect};
pub use model::{ItemId, ItemKind, ItemRef, PlanModel};
pub use units::LengthUnit;
