//! Notifications produced by the animation layer.
//!
//! Instead of completion callbacks, the layer records events that the game
//! polls with [`AnimationLayer::drain_events`](super::AnimationLayer::drain_events).
//! Events are recorded in the order things happened.

use crate::core::{ActorId, ContainerId, MoveTicket};
use crate::error::LayerError;

/// Something the layer did.
#[derive(Clone, Debug, PartialEq)]
pub enum LayerEvent {
    /// A scheduled move was applied to the logical model.
    MoveApplied { ticket: MoveTicket, actor: ActorId },

    /// A scheduled move failed its preconditions when it came due, or was
    /// dropped because a container it touched was deregistered.
    MoveRejected { ticket: MoveTicket, error: LayerError },

    /// An animation batch began; `actors` is the number of tweens created.
    BatchStarted { actors: usize },

    /// Every actor reached its container.
    BatchFinished,

    /// Dragged cards were handed to a container's play listener.
    CardsPlayed {
        src: ContainerId,
        dst: ContainerId,
        actors: Vec<ActorId>,
    },
}

impl LayerEvent {
    /// Ticket of a move event.
    #[must_use]
    pub fn ticket(&self) -> Option<MoveTicket> {
        match self {
            LayerEvent::MoveApplied { ticket, .. } | LayerEvent::MoveRejected { ticket, .. } => {
                Some(*ticket)
            }
            _ => None,
        }
    }
}
