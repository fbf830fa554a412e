//! Card containers and their layouts.
//!
//! A container is an ordered list of slots, each holding an optional
//! [`CardActor`](crate::actors::CardActor). Empty slots are placeholders:
//! a trick starts as four empty slots, and a card removed with
//! `replace_src` leaves one behind.
//!
//! ## Key Types
//!
//! - `CardContainer`: slot list, bounds, visibility policy, layout
//! - `CardLayout`: pure position strategy (`HandLayout`, `StackLayout`, `TrickLayout`)
//! - `PlayListener`: game-rule hook accepting dropped cards
//! - `ContainerRegistry`: live containers, actor locations, logical moves

pub mod container;
pub mod layout;
pub mod play;
pub mod registry;

pub use container::{CardContainer, CardVisibility, DEFAULT_CARD_SIZE};
pub use layout::{Align, CardLayout, HandLayout, Radius, StackLayout, TrickLayout};
pub use play::{CardPlay, PlayListener};
pub use registry::{ContainerRegistry, MoveRequest, SlotPosition};
