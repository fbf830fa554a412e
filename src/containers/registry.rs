//! Registry of live containers and the logical move.
//!
//! The registry tracks:
//! - Registered containers by id, in paint order
//! - Which container holds each actor (kept in sync with every slot change)
//! - Logical card moves between containers

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::actors::{CardActor, Placement};
use crate::core::{ActorId, ContainerId, Rect, Vec2};
use crate::error::{LayerError, Result};

use super::container::CardContainer;

/// Slot specifier, resolved against the live slot list when a move applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotPosition {
    /// Source: last occupied slot. Insert: append. Replace: last empty slot.
    Top,
    /// Source: first occupied slot. Insert: index 0. Replace: first empty slot.
    Bottom,
    /// Explicit slot index.
    Index(usize),
    /// First empty slot. Not valid as a source.
    FirstEmpty,
}

/// A logical card move between two containers.
///
/// ```
/// use card_stage::containers::{MoveRequest, SlotPosition};
/// use card_stage::core::ContainerId;
///
/// let deal = MoveRequest::new(ContainerId::new(0), ContainerId::new(1))
///     .from_slot(SlotPosition::Top)
///     .to_slot(SlotPosition::FirstEmpty)
///     .replacing_dst();
/// assert!(deal.replace_dst);
/// assert!(!deal.replace_src);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub src: ContainerId,
    pub dst: ContainerId,
    pub from: SlotPosition,
    pub to: SlotPosition,
    /// Leave an empty slot behind instead of shrinking the source.
    pub replace_src: bool,
    /// Fill an empty destination slot instead of inserting.
    pub replace_dst: bool,
}

impl MoveRequest {
    /// Move the top card of `src` onto the top of `dst`.
    #[must_use]
    pub fn new(src: ContainerId, dst: ContainerId) -> Self {
        Self {
            src,
            dst,
            from: SlotPosition::Top,
            to: SlotPosition::Top,
            replace_src: false,
            replace_dst: false,
        }
    }

    /// Move between explicit slot indices.
    #[must_use]
    pub fn indices(
        src: ContainerId,
        dst: ContainerId,
        src_index: usize,
        dst_index: usize,
        replace_src: bool,
        replace_dst: bool,
    ) -> Self {
        Self {
            src,
            dst,
            from: SlotPosition::Index(src_index),
            to: SlotPosition::Index(dst_index),
            replace_src,
            replace_dst,
        }
    }

    #[must_use]
    pub fn from_slot(mut self, position: SlotPosition) -> Self {
        self.from = position;
        self
    }

    #[must_use]
    pub fn to_slot(mut self, position: SlotPosition) -> Self {
        self.to = position;
        self
    }

    #[must_use]
    pub fn replacing_src(mut self) -> Self {
        self.replace_src = true;
        self
    }

    #[must_use]
    pub fn replacing_dst(mut self) -> Self {
        self.replace_dst = true;
        self
    }
}

/// Registered containers and actor locations.
#[derive(Debug, Default)]
pub struct ContainerRegistry {
    containers: FxHashMap<ContainerId, CardContainer>,

    /// Paint order, back to front. Registration order.
    paint_order: Vec<ContainerId>,

    /// actor -> container holding it in its slot list
    locations: FxHashMap<ActorId, ContainerId>,

    next_id: u32,
}

impl ContainerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a container; it is painted above every earlier one.
    pub fn insert(&mut self, container: CardContainer) -> ContainerId {
        let id = ContainerId::new(self.next_id);
        self.next_id += 1;

        for actor in container.actors() {
            self.locations.insert(actor.id(), id);
        }
        self.containers.insert(id, container);
        self.paint_order.push(id);
        id
    }

    /// Remove a container and forget its actors.
    pub fn remove(&mut self, id: ContainerId) -> Option<CardContainer> {
        let container = self.containers.remove(&id)?;
        self.paint_order.retain(|&c| c != id);
        for actor in container.actors() {
            self.locations.remove(&actor.id());
        }
        Some(container)
    }

    #[must_use]
    pub fn get(&self, id: ContainerId) -> Option<&CardContainer> {
        self.containers.get(&id)
    }

    pub fn get_mut(&mut self, id: ContainerId) -> Option<&mut CardContainer> {
        self.containers.get_mut(&id)
    }

    #[must_use]
    pub fn contains(&self, id: ContainerId) -> bool {
        self.containers.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// Container ids, back to front.
    #[must_use]
    pub fn paint_order(&self) -> &[ContainerId] {
        &self.paint_order
    }

    /// Containers, back to front.
    pub fn iter(&self) -> impl Iterator<Item = (ContainerId, &CardContainer)> + '_ {
        self.paint_order
            .iter()
            .filter_map(|id| self.containers.get(id).map(|c| (*id, c)))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (ContainerId, &mut CardContainer)> + '_ {
        self.containers.iter_mut().map(|(id, c)| (*id, c))
    }

    /// Container holding `actor` in its slot list.
    #[must_use]
    pub fn location(&self, actor: ActorId) -> Option<ContainerId> {
        self.locations.get(&actor).copied()
    }

    #[must_use]
    pub fn actor(&self, id: ActorId) -> Option<&CardActor> {
        self.get(self.location(id)?)?.actor(id)
    }

    pub(crate) fn actor_mut(&mut self, id: ActorId) -> Option<&mut CardActor> {
        let container = self.location(id)?;
        self.containers.get_mut(&container)?.actor_mut(id)
    }

    pub(crate) fn index_actor(&mut self, actor: ActorId, container: ContainerId) {
        self.locations.insert(actor, container);
    }

    pub(crate) fn forget_actor(&mut self, actor: ActorId) {
        self.locations.remove(&actor);
    }

    /// Total actors across all containers.
    #[must_use]
    pub fn total_actors(&self) -> usize {
        self.locations.len()
    }

    /// Stage-space position of an actor, whoever draws it.
    #[must_use]
    pub fn stage_position(&self, id: ActorId) -> Option<Vec2> {
        let container = self.get(self.location(id)?)?;
        let actor = container.actor(id)?;
        Some(match actor.placement() {
            Placement::Resting => container.to_stage(actor.position()),
            Placement::InFlight { .. } | Placement::Dragged { .. } => actor.position(),
        })
    }

    /// Stage bounds of an actor.
    #[must_use]
    pub fn stage_bounds(&self, id: ActorId) -> Option<Rect> {
        let size = self.actor(id)?.size();
        Some(Rect::from_origin_size(self.stage_position(id)?, size))
    }

    /// Preconditions that do not depend on slot contents.
    pub fn check_request(&self, request: &MoveRequest) -> Result<()> {
        if request.src == request.dst {
            return Err(LayerError::SameContainer(request.src));
        }
        let src = self
            .get(request.src)
            .ok_or(LayerError::UnknownContainer(request.src))?;
        let dst = self
            .get(request.dst)
            .ok_or(LayerError::UnknownContainer(request.dst))?;

        if src.is_fixed_capacity() && !request.replace_src {
            return Err(LayerError::FixedCapacity(request.src));
        }
        if dst.is_fixed_capacity() && !request.replace_dst {
            return Err(LayerError::FixedCapacity(request.dst));
        }
        Ok(())
    }

    /// Apply a logical move. Slot lists change immediately; nothing animates.
    ///
    /// Every precondition is checked before the first mutation, so a failed
    /// move leaves the registry untouched.
    pub fn move_card(&mut self, request: &MoveRequest) -> Result<ActorId> {
        self.check_request(request)?;

        let (from, to) = match (self.get(request.src), self.get(request.dst)) {
            (Some(src), Some(dst)) => (
                resolve_source(request.src, src, request.from)?,
                resolve_target(request.dst, dst, request.to, request.replace_dst)?,
            ),
            _ => return Err(LayerError::UnknownContainer(request.src)),
        };

        let src = self
            .containers
            .get_mut(&request.src)
            .ok_or(LayerError::UnknownContainer(request.src))?;
        src.snapshot();
        let taken = if request.replace_src {
            src.slots[from].take()
        } else {
            src.slots.remove(from)
        };
        let mut actor = taken.ok_or(LayerError::EmptySlot {
            container: request.src,
            index: from,
        })?;

        let (origin, position) = match actor.placement {
            Placement::Resting => (request.src, src.to_stage(actor.position)),
            Placement::InFlight { src, .. } | Placement::Dragged { src } => (src, actor.position),
        };
        actor.position = position;
        actor.placement = Placement::InFlight {
            src: origin,
            dst: request.dst,
        };

        let id = actor.id();
        let dst = self
            .containers
            .get_mut(&request.dst)
            .ok_or(LayerError::UnknownContainer(request.dst))?;
        dst.snapshot();
        dst.apply_visibility(&mut actor);
        if request.replace_dst {
            dst.slots[to] = Some(actor);
        } else {
            dst.slots.insert(to, Some(actor));
        }
        self.locations.insert(id, request.dst);

        tracing::trace!(
            "{} moved {}[{}] -> {}[{}]",
            id,
            request.src,
            from,
            request.dst,
            to
        );
        Ok(id)
    }
}

fn resolve_source(id: ContainerId, container: &CardContainer, position: SlotPosition) -> Result<usize> {
    let invalid = LayerError::InvalidSlotPosition {
        container: id,
        position,
    };
    let slots = container.slots();
    let index = match position {
        SlotPosition::Index(i) => i,
        SlotPosition::Top => slots.iter().rposition(Option::is_some).ok_or(invalid)?,
        SlotPosition::Bottom => slots.iter().position(Option::is_some).ok_or(invalid)?,
        SlotPosition::FirstEmpty => return Err(invalid),
    };

    match slots.get(index) {
        None => Err(LayerError::SlotOutOfRange {
            container: id,
            index,
            len: slots.len(),
        }),
        Some(None) => Err(LayerError::EmptySlot {
            container: id,
            index,
        }),
        Some(Some(_)) => Ok(index),
    }
}

fn resolve_target(
    id: ContainerId,
    container: &CardContainer,
    position: SlotPosition,
    replace: bool,
) -> Result<usize> {
    let invalid = LayerError::InvalidSlotPosition {
        container: id,
        position,
    };
    let slots = container.slots();
    let first_empty = slots.iter().position(Option::is_none);

    if replace {
        let index = match position {
            SlotPosition::Index(i) => i,
            SlotPosition::Top => slots.iter().rposition(Option::is_none).ok_or(invalid)?,
            SlotPosition::Bottom | SlotPosition::FirstEmpty => first_empty.ok_or(invalid)?,
        };
        return match slots.get(index) {
            None => Err(LayerError::SlotOutOfRange {
                container: id,
                index,
                len: slots.len(),
            }),
            Some(Some(_)) => Err(LayerError::SlotOccupied {
                container: id,
                index,
            }),
            Some(None) => Ok(index),
        };
    }

    let index = match position {
        SlotPosition::Index(i) => i,
        SlotPosition::Top => slots.len(),
        SlotPosition::Bottom => 0,
        SlotPosition::FirstEmpty => first_empty.ok_or(invalid)?,
    };
    if index > slots.len() {
        return Err(LayerError::SlotOutOfRange {
            container: id,
            index,
            len: slots.len(),
        });
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::{HandLayout, TrickLayout, DEFAULT_CARD_SIZE};
    use crate::core::{Card, Rank, Suit};

    fn setup() -> (ContainerRegistry, ContainerId, ContainerId, ContainerId) {
        let mut registry = ContainerRegistry::new();
        let mut a = CardContainer::hand("a", Rect::new(0.0, 0.0, 400.0, 100.0), HandLayout::new());
        for i in 0..3 {
            a.slots.push(Some(CardActor::new(
                ActorId::new(i),
                Card::new(Rank::ALL[i as usize], Suit::Hearts),
                DEFAULT_CARD_SIZE,
            )));
        }
        let a = registry.insert(a);
        let b = registry.insert(CardContainer::hand(
            "b",
            Rect::new(0.0, 200.0, 400.0, 100.0),
            HandLayout::new(),
        ));
        let t = registry.insert(CardContainer::trick(
            "trick",
            Rect::new(500.0, 0.0, 300.0, 300.0),
            2,
            TrickLayout::new(),
        ));
        (registry, a, b, t)
    }

    fn ids(registry: &ContainerRegistry, c: ContainerId) -> Vec<Option<u32>> {
        registry
            .get(c)
            .unwrap()
            .actor_ids()
            .into_iter()
            .map(|id| id.map(ActorId::raw))
            .collect()
    }

    #[test]
    fn test_insert_indexes_actors() {
        let (registry, a, b, _) = setup();
        assert_eq!(registry.location(ActorId::new(1)), Some(a));
        assert_eq!(registry.total_actors(), 3);
        assert_eq!(registry.paint_order()[..2], [a, b]);
    }

    #[test]
    fn test_move_card_insert() {
        let (mut registry, a, b, _) = setup();

        let id = registry.move_card(&MoveRequest::indices(a, b, 0, 0, false, false)).unwrap();

        assert_eq!(id, ActorId::new(0));
        assert_eq!(ids(&registry, a), vec![Some(1), Some(2)]);
        assert_eq!(ids(&registry, b), vec![Some(0)]);
        assert_eq!(registry.location(id), Some(b));

        let actor = registry.actor(id).unwrap();
        assert_eq!(actor.placement(), Placement::InFlight { src: a, dst: b });
    }

    #[test]
    fn test_move_card_snapshots_both() {
        let (mut registry, a, b, _) = setup();
        registry.move_card(&MoveRequest::indices(a, b, 1, 0, false, false)).unwrap();
        registry.move_card(&MoveRequest::indices(a, b, 0, 1, false, false)).unwrap();

        let old_a: Vec<_> = registry.get(a).unwrap().old_actors().unwrap().to_vec();
        assert_eq!(old_a.len(), 3);
        assert_eq!(registry.get(b).unwrap().old_actors().map(<[_]>::len), Some(0));
        assert_eq!(ids(&registry, b), vec![Some(1), Some(0)]);
    }

    #[test]
    fn test_move_card_replace_src_leaves_placeholder() {
        let (mut registry, a, b, _) = setup();
        registry.move_card(&MoveRequest::indices(a, b, 1, 0, true, false)).unwrap();
        assert_eq!(ids(&registry, a), vec![Some(0), None, Some(2)]);
    }

    #[test]
    fn test_same_container_rejected() {
        let (mut registry, a, _, _) = setup();
        let err = registry.move_card(&MoveRequest::indices(a, a, 0, 1, false, false));
        assert_eq!(err, Err(LayerError::SameContainer(a)));
    }

    #[test]
    fn test_fixed_capacity_requires_replace() {
        let (mut registry, a, _, t) = setup();

        let err = registry.move_card(&MoveRequest::indices(a, t, 0, 0, false, false));
        assert_eq!(err, Err(LayerError::FixedCapacity(t)));

        registry.move_card(&MoveRequest::indices(a, t, 0, 1, false, true)).unwrap();
        assert_eq!(ids(&registry, t), vec![None, Some(0)]);

        let err = registry.move_card(&MoveRequest::indices(t, a, 1, 0, false, false));
        assert_eq!(err, Err(LayerError::FixedCapacity(t)));
    }

    #[test]
    fn test_occupied_replace_rejected_without_mutation() {
        let (mut registry, a, _, t) = setup();
        registry.move_card(&MoveRequest::indices(a, t, 0, 0, false, true)).unwrap();

        let before = ids(&registry, a);
        let err = registry.move_card(&MoveRequest::indices(a, t, 0, 0, false, true));

        assert_eq!(err, Err(LayerError::SlotOccupied { container: t, index: 0 }));
        assert_eq!(ids(&registry, a), before);
    }

    #[test]
    fn test_source_errors() {
        let (mut registry, a, b, _) = setup();

        let err = registry.move_card(&MoveRequest::indices(a, b, 9, 0, false, false));
        assert!(matches!(err, Err(LayerError::SlotOutOfRange { index: 9, .. })));

        let err = registry.move_card(&MoveRequest::new(b, a));
        assert!(matches!(err, Err(LayerError::InvalidSlotPosition { .. })));

        let err = registry.move_card(&MoveRequest::new(a, b).from_slot(SlotPosition::FirstEmpty));
        assert!(matches!(err, Err(LayerError::InvalidSlotPosition { .. })));
    }

    #[test]
    fn test_slot_positions_resolve() {
        let (mut registry, a, b, t) = setup();

        registry.move_card(&MoveRequest::new(a, b)).unwrap();
        assert_eq!(ids(&registry, b), vec![Some(2)]);

        registry
            .move_card(&MoveRequest::new(a, b).from_slot(SlotPosition::Bottom).to_slot(SlotPosition::Bottom))
            .unwrap();
        assert_eq!(ids(&registry, b), vec![Some(0), Some(2)]);

        registry
            .move_card(&MoveRequest::new(b, t).to_slot(SlotPosition::FirstEmpty).replacing_dst())
            .unwrap();
        registry
            .move_card(&MoveRequest::new(b, t).to_slot(SlotPosition::FirstEmpty).replacing_dst())
            .unwrap();
        assert_eq!(ids(&registry, t), vec![Some(2), Some(0)]);

        let err = registry.move_card(&MoveRequest::new(a, t).to_slot(SlotPosition::FirstEmpty).replacing_dst());
        assert!(matches!(err, Err(LayerError::InvalidSlotPosition { .. })));
    }

    #[test]
    fn test_remove_forgets_actors() {
        let (mut registry, a, _, _) = setup();
        let removed = registry.remove(a).unwrap();

        assert_eq!(removed.card_count(), 3);
        assert_eq!(registry.location(ActorId::new(0)), None);
        assert!(!registry.paint_order().contains(&a));
    }

    #[test]
    fn test_stage_position_follows_placement() {
        let (mut registry, a, b, _) = setup();
        registry.get_mut(a).unwrap().set_stage_bounds(Rect::new(10.0, 20.0, 400.0, 100.0));

        let before = registry.stage_position(ActorId::new(0)).unwrap();
        assert_eq!(before, Vec2::new(10.0, 20.0));

        registry.move_card(&MoveRequest::indices(a, b, 0, 0, false, false)).unwrap();
        assert_eq!(registry.stage_position(ActorId::new(0)), Some(before));
    }
}
