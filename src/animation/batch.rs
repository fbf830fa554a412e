//! Animation batches and paint order.
//!
//! A batch reconciles the visuals of every dirty container with its logical
//! slot list. Moves issued before the batch starts coalesce into it; moves
//! issued while it runs request a restart, which re-targets actors from
//! wherever they currently are.
//!
//! ## Paint order
//!
//! Each animated actor carries a *marker*: the container whose paint group
//! currently draws it. A travelling actor starts in its source's group and
//! is spliced into its destination's group as soon as its center enters the
//! destination bounds, so it never pops behind or above unrelated cards.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::actors::Placement;
use crate::containers::ContainerRegistry;
use crate::core::{ActorId, Card, ContainerId, Vec2};

use super::config::AnimationConfig;
use super::tween::{recycled_duration, Tween};

/// Lifecycle of the layer's single batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationState {
    /// Nothing requested or running.
    #[default]
    Idle,
    /// A batch was requested and starts on the next tick.
    Pending,
    /// Tweens are advancing.
    Running,
}

/// One drawable actor, in paint order.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderEntry {
    /// Paint group drawing the actor.
    pub container: ContainerId,
    pub actor: ActorId,
    pub card: Card,
    /// Lower corner in stage space.
    pub position: Vec2,
    pub size: Vec2,
    pub shown: bool,
    pub highlighted: bool,
}

/// Batch bookkeeping owned by the layer.
#[derive(Clone, Debug, Default)]
pub struct BatchState {
    pub(crate) pending: bool,
    pub(crate) running: bool,
    pub(crate) time_left: f32,
    /// actor -> paint group, for actors animated by the current batch
    pub(crate) markers: FxHashMap<ActorId, ContainerId>,
}

impl BatchState {
    #[must_use]
    pub fn state(&self) -> AnimationState {
        if self.running {
            AnimationState::Running
        } else if self.pending {
            AnimationState::Pending
        } else {
            AnimationState::Idle
        }
    }

    /// Longest remaining tween of the running batch.
    #[must_use]
    pub fn time_left(&self) -> f32 {
        self.time_left.max(0.0)
    }

    /// Paint group of an animated actor.
    #[must_use]
    pub fn marker(&self, actor: ActorId) -> Option<ContainerId> {
        self.markers.get(&actor).copied()
    }

    /// Compute start and end of every actor in a dirty container and give
    /// each a tween. Returns the number of tweens created.
    pub(crate) fn start(&mut self, registry: &mut ContainerRegistry, config: &AnimationConfig) -> usize {
        self.pending = false;
        self.running = true;

        let fresh = config.clamped_move_duration();
        let mut markers = FxHashMap::default();
        let mut time_left: f32 = 0.0;
        let mut animated = 0;

        let dirty: Vec<ContainerId> = registry
            .iter()
            .filter(|(_, c)| c.is_dirty())
            .map(|(id, _)| id)
            .collect();

        for cid in dirty {
            let Some(container) = registry.get_mut(cid) else {
                continue;
            };
            let targets = container.target_positions();
            let origin = container.stage_bounds().origin;
            let end_size = container.card_size();
            if container.layout().shows_single_card() {
                container.reveal_top_except(&[]);
            }

            for (slot, target) in container.slots.iter_mut().zip(targets) {
                let Some(actor) = slot else {
                    continue;
                };
                let (src, start) = match actor.placement {
                    Placement::Dragged { .. } => continue,
                    Placement::Resting => {
                        if actor.is_at(target, end_size) {
                            continue;
                        }
                        (cid, actor.position + origin)
                    }
                    Placement::InFlight { src, .. } => (src, actor.position),
                };
                let end = target + origin;

                let duration = match actor.tween.as_ref() {
                    Some(old) if !old.is_finished() => recycled_duration(
                        start,
                        old,
                        end,
                        fresh,
                        config.min_duration,
                        config.max_duration,
                    ),
                    _ => fresh,
                };

                actor.position = start;
                actor.placement = Placement::InFlight { src, dst: cid };
                actor.visible = true;
                actor.tween = Some(Tween::new(start, end, actor.size, end_size, duration, config.easing));

                let marker = self.markers.get(&actor.id()).copied().unwrap_or(src);
                markers.insert(actor.id(), marker);

                time_left = time_left.max(duration);
                animated += 1;
            }
        }

        self.markers = markers;
        self.time_left = time_left;
        animated
    }

    /// Advance every tween by `dt`. Returns true once the batch is done.
    pub(crate) fn advance(&mut self, registry: &mut ContainerRegistry, dt: f32) -> bool {
        for (cid, container) in registry.iter_mut() {
            let bounds = container.stage_bounds();
            for actor in container.slots.iter_mut().flatten() {
                if !matches!(actor.placement, Placement::InFlight { .. }) {
                    continue;
                }
                let Some(tween) = actor.tween.as_mut() else {
                    continue;
                };
                tween.advance(dt);
                actor.position = tween.position();
                actor.size = tween.size();

                // Actors live in their destination's slot list, so `cid` is the destination.
                if bounds.contains(actor.center()) && self.markers.get(&actor.id()) != Some(&cid) {
                    tracing::trace!("{} spliced into paint group of {}", actor.id(), cid);
                    self.markers.insert(actor.id(), cid);
                }
            }
        }

        self.time_left -= dt;
        self.time_left <= 0.0
    }

    /// Settle every animated actor in its container and clear snapshots.
    pub(crate) fn finish(&mut self, registry: &mut ContainerRegistry) {
        for (_, container) in registry.iter_mut() {
            if container.is_dirty() {
                container.settle();
            }
        }

        self.pending = false;
        self.running = false;
        self.time_left = 0.0;
        self.markers.clear();
    }

    /// Every visible actor, back to front.
    ///
    /// Containers paint in registration order. Within a container's group,
    /// its own actors are ordered by slot; actors that have not yet left the
    /// group for another container paint above those, in their old slot
    /// order. Dragged actors paint above everything.
    #[must_use]
    pub fn render_order(&self, registry: &ContainerRegistry) -> Vec<RenderEntry> {
        let mut groups: FxHashMap<ContainerId, Vec<((u8, usize), RenderEntry)>> = FxHashMap::default();
        let mut dragged = Vec::new();

        for (cid, container) in registry.iter() {
            for (index, slot) in container.slots().iter().enumerate() {
                let Some(actor) = slot else {
                    continue;
                };
                if !actor.visible {
                    continue;
                }

                let mut entry = RenderEntry {
                    container: cid,
                    actor: actor.id(),
                    card: actor.card(),
                    position: actor.position(),
                    size: actor.size(),
                    shown: actor.shown,
                    highlighted: actor.highlighted,
                };

                match actor.placement() {
                    Placement::Resting => {
                        entry.position = container.to_stage(actor.position());
                        groups.entry(cid).or_default().push(((0, index), entry));
                    }
                    Placement::InFlight { .. } => {
                        let group = self
                            .marker(actor.id())
                            .filter(|g| registry.contains(*g))
                            .unwrap_or(cid);
                        // Departing actors keep the order they had in the group they leave.
                        let key = if group == cid {
                            (0, index)
                        } else {
                            let departed = registry
                                .get(group)
                                .and_then(|g| g.old_actors())
                                .and_then(|old| old.iter().position(|a| *a == Some(actor.id())));
                            (1, departed.unwrap_or(index))
                        };
                        entry.container = group;
                        groups.entry(group).or_default().push((key, entry));
                    }
                    Placement::Dragged { .. } => dragged.push(entry),
                }
            }
        }

        let mut order = Vec::new();
        for cid in registry.paint_order() {
            if let Some(mut group) = groups.remove(cid) {
                group.sort_by_key(|(key, _)| *key);
                order.extend(group.into_iter().map(|(_, entry)| entry));
            }
        }
        order.extend(dragged);
        order
    }
}
