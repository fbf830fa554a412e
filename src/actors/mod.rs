//! Card actors.
//!
//! A [`CardActor`] is the visual entity bound to one [`Card`](crate::core::Card).
//! Instead of reparenting nodes in a scene graph, each actor carries a
//! [`Placement`] tag saying who draws it right now and in which coordinate
//! space its position is expressed.

mod actor;

pub use actor::{CardActor, Placement};
