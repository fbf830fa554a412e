//! # card-stage
//!
//! Card animation and container choreography for card-game tables.
//!
//! ## Design Principles
//!
//! 1. **Logic First**: A card move changes slot lists immediately. Only the
//!    visual reconciliation waits for the next frame tick.
//!
//! 2. **Coalesced Batches**: Every move issued before a batch starts merges
//!    into one animation. Redirecting a card mid-flight keeps its speed.
//!
//! 3. **Explicit Ownership**: Actors always live in a container's slot list.
//!    Their [`Placement`](actors::Placement) says who draws them, instead of
//!    moving nodes around a scene graph.
//!
//! ## Modules
//!
//! - `core`: Geometry, cards and decks, identifiers
//! - `actors`: Visual card entities
//! - `containers`: Slot lists, layouts, play protocol, registry
//! - `animation`: The engine: moves, delays, batches, z-order, dragging
//! - `error`: Precondition violations

pub mod core;
pub mod actors;
pub mod containers;
pub mod animation;
pub mod error;

// Re-export commonly used types
pub use crate::core::{ActorId, Card, ContainerId, Deck, MoveTicket, Rank, Rect, Suit, Vec2};

pub use crate::actors::{CardActor, Placement};

pub use crate::containers::{
    Align, CardContainer, CardLayout, CardPlay, CardVisibility,
    ContainerRegistry, HandLayout, MoveRequest, PlayListener,
    Radius, SlotPosition, StackLayout, TrickLayout,
};

pub use crate::animation::{
    AnimationConfig, AnimationLayer, AnimationState, CardDragger,
    DealOptions, DropOutcome, Easing, LayerEvent, RenderEntry, Tween,
};

pub use crate::error::{LayerError, Result};
