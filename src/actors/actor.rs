//! Card actors: the visual entity bound to one card.

use serde::{Deserialize, Serialize};

use crate::animation::Tween;
use crate::core::{ActorId, Card, ContainerId, Rect, Vec2};

/// Who currently holds an actor visually.
///
/// Logical ownership always belongs to the container whose slot list holds
/// the actor. Visual ownership can lag behind while the engine animates the
/// actor between containers, and the coordinate space of `position` follows
/// visual ownership.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    /// Drawn by its container; `position` is container-local.
    #[default]
    Resting,
    /// Held by the engine between containers; `position` is stage space.
    InFlight { src: ContainerId, dst: ContainerId },
    /// Held by a drag session; `position` is stage space.
    Dragged { src: ContainerId },
}

/// A visual card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardActor {
    id: ActorId,
    card: Card,

    /// Face up when true, showing the back otherwise.
    pub shown: bool,

    pub highlighted: bool,

    /// Disabled actors cannot be dragged.
    pub enabled: bool,

    /// Whether the actor is drawn at all. Piles hide covered cards.
    pub visible: bool,

    pub(crate) size: Vec2,
    pub(crate) position: Vec2,
    pub(crate) placement: Placement,
    pub(crate) tween: Option<Tween>,
}

impl CardActor {
    /// Create a resting, face-up actor at the local origin.
    #[must_use]
    pub fn new(id: ActorId, card: Card, size: Vec2) -> Self {
        Self {
            id,
            card,
            shown: true,
            highlighted: false,
            enabled: true,
            visible: true,
            size,
            position: Vec2::ZERO,
            placement: Placement::Resting,
            tween: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> ActorId {
        self.id
    }

    #[must_use]
    pub fn card(&self) -> Card {
        self.card
    }

    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Position in the space given by [`placement`](Self::placement).
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[must_use]
    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// The tween currently driving this actor, if any.
    #[must_use]
    pub fn tween(&self) -> Option<&Tween> {
        self.tween.as_ref()
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        matches!(self.placement, Placement::InFlight { .. })
    }

    #[must_use]
    pub fn is_dragged(&self) -> bool {
        matches!(self.placement, Placement::Dragged { .. })
    }

    /// Container the actor is travelling from, during an animation or drag.
    #[must_use]
    pub fn src(&self) -> Option<ContainerId> {
        match self.placement {
            Placement::Resting => None,
            Placement::InFlight { src, .. } | Placement::Dragged { src } => Some(src),
        }
    }

    /// Container the actor is travelling to, during an animation.
    #[must_use]
    pub fn dst(&self) -> Option<ContainerId> {
        match self.placement {
            Placement::InFlight { dst, .. } => Some(dst),
            _ => None,
        }
    }

    /// Bounds in the actor's current coordinate space.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }

    /// Hit test in the actor's current coordinate space.
    #[must_use]
    pub fn hit(&self, point: Vec2) -> bool {
        self.visible && self.bounds().contains(point)
    }

    /// Whether the actor sits at `position` with `size`.
    pub(crate) fn is_at(&self, position: Vec2, size: Vec2) -> bool {
        self.position.approx_eq(position) && self.size.approx_eq(size)
    }

    /// Settle into a container at a local position.
    pub(crate) fn rest_at(&mut self, position: Vec2, size: Vec2) {
        self.placement = Placement::Resting;
        self.position = position;
        self.size = size;
        self.tween = None;
    }
}
