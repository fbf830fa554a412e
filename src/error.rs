//! Error types for the animation layer.
//!
//! Every variant is a precondition violation: a programmer error in the
//! calling game code. Benign races such as starting a drag while an
//! animation is running are not errors; those calls return `None` instead.

use thiserror::Error;

use crate::core::{ActorId, ContainerId};
use crate::containers::SlotPosition;

/// Errors raised by logical card moves and configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayerError {
    /// Source and destination of a move are the same container.
    #[error("cannot move a card within {0}; source and destination must differ")]
    SameContainer(ContainerId),

    /// The container is not registered with the layer.
    #[error("unknown container: {0}")]
    UnknownContainer(ContainerId),

    /// The actor is not held by any registered container.
    #[error("unknown actor: {0}")]
    UnknownActor(ActorId),

    /// Insert or remove attempted on a fixed-capacity container.
    #[error("{0} has fixed capacity; cards can only be replaced")]
    FixedCapacity(ContainerId),

    /// Replace-insert targeted a slot that already holds a card.
    #[error("slot {index} of {container} is occupied")]
    SlotOccupied {
        container: ContainerId,
        index: usize,
    },

    /// The source slot holds no card.
    #[error("slot {index} of {container} is empty")]
    EmptySlot {
        container: ContainerId,
        index: usize,
    },

    /// Index outside the container's slot list.
    #[error("slot {index} is out of range for {container} (len {len})")]
    SlotOutOfRange {
        container: ContainerId,
        index: usize,
        len: usize,
    },

    /// Position cannot be resolved against the container's current slots.
    #[error("{position:?} does not resolve to a slot of {container}")]
    InvalidSlotPosition {
        container: ContainerId,
        position: SlotPosition,
    },

    /// Animation configuration failed to parse or validate.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias for layer operations.
pub type Result<T> = std::result::Result<T, LayerError>;
