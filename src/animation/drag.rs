//! Drag session: one group of cards following the pointer.
//!
//! Dragged actors leave their container visually (`Placement::Dragged`) but
//! stay in its slot list, so a drag never changes the logical model by
//! itself. Only a play listener committing the drop, or an in-place
//! rearrangement of the source, does.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::actors::Placement;
use crate::containers::{CardContainer, CardPlay, ContainerRegistry};
use crate::core::{ActorId, ContainerId, Vec2};

use super::config::AnimationConfig;
use super::tween::Tween;

/// How a drag session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropOutcome {
    /// The cards were handed to `dst`'s play listener.
    Played { dst: ContainerId },
    /// Released over the source after reordering it; the new order stays.
    Rearranged,
    /// Released elsewhere; the cards animate back to their slots.
    Returned,
}

/// The engine's single active drag selection.
#[derive(Clone, Debug)]
pub struct CardDragger {
    src: ContainerId,

    /// Dragged actors in source slot order.
    actors: SmallVec<[ActorId; 4]>,

    /// Actor stage position minus the pointer at grab time.
    offsets: SmallVec<[Vec2; 4]>,

    /// Source slot list when the drag started.
    original_order: Vec<Option<ActorId>>,

    target: Option<ContainerId>,
    pointer: Vec2,
    resize: Option<Tween>,
    rearranged: bool,
}

impl CardDragger {
    /// Lift `actors` out of their container.
    ///
    /// Returns `None` when the list is empty, an actor is unknown, disabled
    /// or not at rest, the actors live in different containers, or the
    /// container is disabled.
    pub(crate) fn start(registry: &mut ContainerRegistry, actors: &[ActorId], pointer: Vec2) -> Option<Self> {
        let first = *actors.first()?;
        let src = registry.location(first)?;
        let container = registry.get(src)?;
        if !container.is_enabled() {
            return None;
        }

        let mut indexed: SmallVec<[(usize, ActorId); 4]> = SmallVec::new();
        for &id in actors {
            if registry.location(id) != Some(src) || indexed.iter().any(|(_, a)| *a == id) {
                return None;
            }
            let index = container.index_of(id)?;
            let actor = container.actor_at(index)?;
            if !actor.enabled || actor.placement() != Placement::Resting {
                return None;
            }
            indexed.push((index, id));
        }
        indexed.sort_unstable_by_key(|(index, _)| *index);

        let original_order = container.actor_ids();
        let container = registry.get_mut(src)?;
        let mut ids: SmallVec<[ActorId; 4]> = SmallVec::new();
        let mut offsets: SmallVec<[Vec2; 4]> = SmallVec::new();
        for (_, id) in indexed {
            let origin = container.stage_bounds().origin;
            if let Some(actor) = container.actor_mut(id) {
                let stage = actor.position + origin;
                actor.position = stage;
                actor.placement = Placement::Dragged { src };
                actor.visible = true;
                offsets.push(stage - pointer);
                ids.push(id);
            }
        }
        if container.layout().shows_single_card() {
            container.reveal_top_except(&ids);
        }

        Some(Self {
            src,
            actors: ids,
            offsets,
            original_order,
            target: None,
            pointer,
            resize: None,
            rearranged: false,
        })
    }

    #[must_use]
    pub fn src(&self) -> ContainerId {
        self.src
    }

    #[must_use]
    pub fn actors(&self) -> &[ActorId] {
        &self.actors
    }

    /// Container that would receive the cards if released now.
    #[must_use]
    pub fn target(&self) -> Option<ContainerId> {
        self.target
    }

    #[must_use]
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    /// Whether the source currently differs from its pre-drag order.
    #[must_use]
    pub fn is_rearranged(&self) -> bool {
        self.rearranged
    }

    /// Source slot list when the drag started.
    #[must_use]
    pub fn original_order(&self) -> &[Option<ActorId>] {
        &self.original_order
    }

    /// Follow the pointer, refresh the drop target and rearrange the source.
    ///
    /// Returns true when the source's slot order changed and needs a batch.
    pub(crate) fn touch_dragged(
        &mut self,
        registry: &mut ContainerRegistry,
        pointer: Vec2,
        config: &AnimationConfig,
    ) -> bool {
        self.pointer = pointer;
        for (&id, &offset) in self.actors.iter().zip(&self.offsets) {
            if let Some(actor) = registry.actor_mut(id).filter(|a| a.is_dragged()) {
                actor.position = pointer + offset;
            }
        }

        let target = self.find_target(registry, pointer);
        if target != self.target {
            let to = registry.get(target.unwrap_or(self.src)).map(CardContainer::card_size);
            let from = self.actors.first().and_then(|&id| registry.actor(id)).map(|a| a.size());
            if let (Some(from), Some(to)) = (from, to) {
                self.resize = Some(Tween::resize(from, to, config.drag_resize_duration, config.easing));
            }
            tracing::trace!("drag target {:?} -> {:?}", self.target, target);
            self.target = target;
        }

        let Some(src) = registry.get_mut(self.src) else {
            return false;
        };
        let before = src.actor_ids();
        let index = if target.is_none() && src.stage_bounds().contains(pointer) {
            src.insertion_index(pointer)
        } else {
            None
        };
        let changed = match index {
            Some(index) => src.rearrange(&self.actors, index),
            // Leaving the source span restores the pre-drag order.
            None if before != self.original_order => src.reorder(&self.original_order),
            None => false,
        };
        if changed {
            src.snapshot_with(before);
            self.rearranged = src.actor_ids() != self.original_order;
        }
        changed
    }

    /// Topmost other container that is enabled, under the pointer and
    /// accepts the dragged cards.
    #[must_use]
    pub fn find_target(&self, registry: &ContainerRegistry, pointer: Vec2) -> Option<ContainerId> {
        registry.paint_order().iter().rev().copied().find(|&cid| {
            if cid == self.src {
                return false;
            }
            let Some(container) = registry.get(cid) else {
                return false;
            };
            if !container.is_enabled() || !container.stage_bounds().contains(pointer) {
                return false;
            }
            container
                .play_listener()
                .is_some_and(|listener| listener.can_cards_be_played(&self.play_for(registry, cid, pointer)))
        })
    }

    /// The play proposed by dropping onto `dst` at `pointer`.
    #[must_use]
    pub fn play_for(&self, registry: &ContainerRegistry, dst: ContainerId, pointer: Vec2) -> CardPlay {
        let position = registry.get(dst).map_or(pointer, |c| c.to_local(pointer));
        CardPlay {
            actors: self.actors.to_vec(),
            cards: self
                .actors
                .iter()
                .filter_map(|&id| registry.actor(id).map(|a| a.card()))
                .collect(),
            src: self.src,
            dst,
            position,
        }
    }

    /// Step the drop-target resize.
    pub(crate) fn advance(&mut self, registry: &mut ContainerRegistry, dt: f32) {
        let Some(resize) = self.resize.as_mut() else {
            return;
        };
        let finished = resize.advance(dt);
        let size = resize.size();
        for &id in &self.actors {
            if let Some(actor) = registry.actor_mut(id).filter(|a| a.is_dragged()) {
                actor.size = size;
            }
        }
        if finished {
            self.resize = None;
        }
    }

    /// Hand the actors back to the engine, travelling home to the source.
    ///
    /// The source is marked dirty so the next batch animates them; a play
    /// listener may still move them elsewhere before that batch starts.
    pub(crate) fn release(&mut self, registry: &mut ContainerRegistry) {
        for &id in &self.actors {
            if let Some(actor) = registry.actor_mut(id).filter(|a| a.is_dragged()) {
                actor.placement = Placement::InFlight {
                    src: self.src,
                    dst: self.src,
                };
                actor.tween = None;
            }
        }
        self.resize = None;
        if let Some(src) = registry.get_mut(self.src) {
            src.snapshot_with(self.original_order.clone());
        }
    }

    /// Follow changes made to the source while the drag is live.
    ///
    /// Actors that left the source drop out of the selection and the
    /// pre-drag order is rebased onto the current membership. Returns false
    /// when nothing is left to drag.
    pub(crate) fn rebase(&mut self, registry: &ContainerRegistry) -> bool {
        let Some(src) = registry.get(self.src) else {
            return false;
        };

        let mut actors: SmallVec<[ActorId; 4]> = SmallVec::new();
        let mut offsets: SmallVec<[Vec2; 4]> = SmallVec::new();
        for (&id, &offset) in self.actors.iter().zip(&self.offsets) {
            if src.actor(id).is_some_and(|a| a.is_dragged()) {
                actors.push(id);
                offsets.push(offset);
            }
        }
        self.actors = actors;
        self.offsets = offsets;

        let live = src.actor_ids();
        self.original_order = if self.rearranged {
            merge_order(&self.original_order, &live)
        } else {
            live.clone()
        };
        self.rearranged = live != self.original_order;
        !self.actors.is_empty()
    }

    /// Put the source back in its pre-drag order.
    pub(crate) fn restore_order(&mut self, registry: &mut ContainerRegistry) {
        if let Some(src) = registry.get_mut(self.src) {
            let before = src.actor_ids();
            if src.reorder(&self.original_order) {
                src.snapshot_with(before);
            }
        }
        self.rearranged = false;
    }
}

/// `order` restricted to the actors in `live`, with `live`'s newcomers
/// appended. Empty slots are kept up to the number `live` has, so the
/// result is always a permutation of `live`.
fn merge_order(order: &[Option<ActorId>], live: &[Option<ActorId>]) -> Vec<Option<ActorId>> {
    let present: FxHashSet<ActorId> = live.iter().flatten().copied().collect();
    let mut spare = live.iter().filter(|slot| slot.is_none()).count();
    let mut merged = Vec::with_capacity(live.len());

    for slot in order {
        match slot {
            Some(id) if present.contains(id) => merged.push(Some(*id)),
            // A departed actor or an old empty slot: keep the gap if one exists.
            _ if spare > 0 => {
                merged.push(None);
                spare -= 1;
            }
            _ => {}
        }
    }

    let known: FxHashSet<ActorId> = merged.iter().flatten().copied().collect();
    merged.extend(live.iter().flatten().filter(|id| !known.contains(id)).map(|&id| Some(id)));
    merged.extend(std::iter::repeat(None).take(spare));
    merged
}
