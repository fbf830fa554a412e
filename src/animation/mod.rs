//! Animation layer: logical moves, delayed moves, batches, drag sessions.
//!
//! ## Key Types
//!
//! - `AnimationLayer`: the engine; owns containers and drives every animation
//! - `Tween`: time-bounded interpolation of position and size
//! - `DelayedMoveQueue`: countdown-gated moves, used by dealing
//! - `BatchState`: the single in-flight batch and its paint-order markers
//! - `CardDragger`: the single active drag session
//! - `LayerEvent`: polled notifications replacing completion callbacks

pub mod batch;
pub mod config;
pub mod delayed;
pub mod drag;
pub mod events;
pub mod layer;
pub mod tween;

pub use batch::{AnimationState, BatchState, RenderEntry};
pub use config::AnimationConfig;
pub use delayed::{DelayedCardMove, DelayedMoveQueue};
pub use drag::{CardDragger, DropOutcome};
pub use events::LayerEvent;
pub use layer::{AnimationLayer, DealOptions};
pub use tween::{recycled_duration, Easing, Tween};
