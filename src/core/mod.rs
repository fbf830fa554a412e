//! Core value types: geometry, cards and identifiers.
//!
//! Nothing in here knows about animation. These are the plain values the
//! actors, containers and the layer pass around.

pub mod geometry;
pub mod card;
pub mod ids;

pub use geometry::{Rect, Vec2, EPSILON};
pub use card::{Card, Deck, Rank, Suit};
pub use ids::{ActorId, ContainerId, MoveTicket};
