//! The animation layer: owner of every registered container.
//!
//! Game code talks to the layer in two vocabularies:
//!
//! - **Logical**: `move_card`, `move_card_delayed`, `deal`, `add_card`,
//!   `update_cards`. Slot lists change synchronously, so code running right
//!   after a move sees the new model.
//! - **Visual**: `update`, `tick`, `complete_animation`. A batch reconciles
//!   every container touched since the last batch, so several moves issued
//!   before the next tick merge into one animation.
//!
//! ## Example
//!
//! ```
//! use card_stage::animation::{AnimationLayer, AnimationState};
//! use card_stage::containers::{CardContainer, HandLayout};
//! use card_stage::core::{Card, Rank, Rect, Suit};
//!
//! let mut layer = AnimationLayer::default();
//! let a = layer.register(CardContainer::hand("a", Rect::new(0.0, 0.0, 400.0, 100.0), HandLayout::new()));
//! let b = layer.register(CardContainer::hand("b", Rect::new(0.0, 200.0, 400.0, 100.0), HandLayout::new()));
//! layer.add_cards(a, [Card::new(Rank::Two, Suit::Hearts), Card::new(Rank::Three, Suit::Hearts)]).unwrap();
//!
//! layer.move_card(a, b, 0, 0, false, false).unwrap();
//! layer.update();
//! while layer.is_animating() {
//!     layer.tick(1.0 / 60.0);
//! }
//!
//! assert_eq!(layer.container(b).unwrap().cards(), vec![Some(Card::new(Rank::Two, Suit::Hearts))]);
//! assert_eq!(layer.state(), AnimationState::Idle);
//! ```

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::actors::CardActor;
use crate::containers::{CardContainer, ContainerRegistry, MoveRequest, SlotPosition};
use crate::core::{ActorId, Card, ContainerId, MoveTicket, Vec2};
use crate::error::{LayerError, Result};

use super::batch::{AnimationState, BatchState, RenderEntry};
use super::config::AnimationConfig;
use super::delayed::{DelayedCardMove, DelayedMoveQueue};
use super::drag::{CardDragger, DropOutcome};
use super::events::LayerEvent;

/// Parameters of a [`deal`](AnimationLayer::deal).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DealOptions {
    pub from: SlotPosition,
    pub to: SlotPosition,
    pub replace_src: bool,
    pub replace_dst: bool,
    /// Seconds between cards; the configured deal interval when `None`.
    pub interval: Option<f32>,
}

impl Default for DealOptions {
    fn default() -> Self {
        Self {
            from: SlotPosition::Top,
            to: SlotPosition::Top,
            replace_src: false,
            replace_dst: false,
            interval: None,
        }
    }
}

impl DealOptions {
    #[must_use]
    pub fn to_slot(mut self, position: SlotPosition) -> Self {
        self.to = position;
        self
    }

    #[must_use]
    pub fn replacing_dst(mut self) -> Self {
        self.replace_dst = true;
        self
    }

    #[must_use]
    pub fn with_interval(mut self, seconds: f32) -> Self {
        self.interval = Some(seconds);
        self
    }
}

/// Card animation engine.
#[derive(Debug, Default)]
pub struct AnimationLayer {
    config: AnimationConfig,
    registry: ContainerRegistry,
    delayed: DelayedMoveQueue,
    batch: BatchState,
    dragger: Option<CardDragger>,
    events: Vec<LayerEvent>,
    next_actor: u32,
}

impl AnimationLayer {
    #[must_use]
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register a container. Later containers paint above earlier ones.
    pub fn register(&mut self, container: CardContainer) -> ContainerId {
        let name = container.name().to_string();
        let id = self.registry.insert(container);
        tracing::debug!("registered {} ({})", id, name);
        id
    }

    pub fn register_all(&mut self, containers: impl IntoIterator<Item = CardContainer>) -> Vec<ContainerId> {
        containers.into_iter().map(|c| self.register(c)).collect()
    }

    /// Remove a container and hand it back, settled at rest.
    ///
    /// A drag from the container is cancelled and queued moves touching it
    /// are dropped, each reported as [`LayerEvent::MoveRejected`].
    pub fn deregister(&mut self, id: ContainerId) -> Option<CardContainer> {
        if !self.registry.contains(id) {
            return None;
        }
        if self.dragger.as_ref().is_some_and(|d| d.src() == id) {
            self.cancel_drag();
        }
        for dropped in self.delayed.remove_touching(id) {
            tracing::warn!("dropping {} queued against {}", dropped.ticket, id);
            self.events.push(LayerEvent::MoveRejected {
                ticket: dropped.ticket,
                error: LayerError::UnknownContainer(id),
            });
        }

        let mut container = self.registry.remove(id)?;
        container.settle();
        tracing::debug!("deregistered {} ({})", id, container.name());
        Some(container)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub fn container(&self, id: ContainerId) -> Option<&CardContainer> {
        self.registry.get(id)
    }

    /// Mutable access for bounds, enablement and listeners. Slot lists only
    /// change through the layer.
    pub fn container_mut(&mut self, id: ContainerId) -> Option<&mut CardContainer> {
        self.registry.get_mut(id)
    }

    /// Containers, back to front.
    pub fn containers(&self) -> impl Iterator<Item = (ContainerId, &CardContainer)> + '_ {
        self.registry.iter()
    }

    #[must_use]
    pub fn registry(&self) -> &ContainerRegistry {
        &self.registry
    }

    #[must_use]
    pub fn actor(&self, id: ActorId) -> Option<&CardActor> {
        self.registry.actor(id)
    }

    /// Container holding `actor` in its slot list.
    #[must_use]
    pub fn location(&self, actor: ActorId) -> Option<ContainerId> {
        self.registry.location(actor)
    }

    #[must_use]
    pub fn stage_position(&self, actor: ActorId) -> Option<Vec2> {
        self.registry.stage_position(actor)
    }

    /// Topmost container whose bounds contain `point`.
    #[must_use]
    pub fn find_container_at(&self, point: Vec2) -> Option<ContainerId> {
        self.registry
            .paint_order()
            .iter()
            .rev()
            .copied()
            .find(|&id| self.registry.get(id).is_some_and(|c| c.stage_bounds().contains(point)))
    }

    // ========================================================================
    // Card population
    // ========================================================================

    /// Create an actor for `card` at rest in `container`.
    ///
    /// Appends to growable containers and fills the first empty slot of
    /// fixed-capacity ones. Other actors shift on the next batch.
    pub fn add_card(&mut self, container: ContainerId, card: Card) -> Result<ActorId> {
        let id = ActorId::new(self.next_actor);
        let target = self
            .registry
            .get_mut(container)
            .ok_or(LayerError::UnknownContainer(container))?;

        let index = if target.is_fixed_capacity() {
            target
                .slots()
                .iter()
                .position(Option::is_none)
                .ok_or(LayerError::FixedCapacity(container))?
        } else {
            target.len()
        };

        let mut actor = CardActor::new(id, card, target.card_size());
        target.apply_visibility(&mut actor);
        target.snapshot();
        if index == target.len() {
            target.slots.push(Some(actor));
        } else {
            target.slots[index] = Some(actor);
        }
        let position = target.target_positions()[index];
        let size = target.card_size();
        if let Some(actor) = target.slots[index].as_mut() {
            actor.rest_at(position, size);
        }

        self.next_actor += 1;
        self.registry.index_actor(id, container);
        self.sync_drag(&[container]);
        tracing::trace!("{} ({}) added to {}", id, card, container);
        Ok(id)
    }

    pub fn add_cards(&mut self, container: ContainerId, cards: impl IntoIterator<Item = Card>) -> Result<Vec<ActorId>> {
        cards.into_iter().map(|card| self.add_card(container, card)).collect()
    }

    /// Replace a container's contents with `cards`, slot for slot.
    ///
    /// Actors whose card is still present are reused and animate to their new
    /// slot on the next batch; new cards appear in place; actors whose card
    /// is gone are dropped. Fixed-capacity containers must keep their length.
    pub fn update_cards(&mut self, container: ContainerId, cards: &[Option<Card>]) -> Result<()> {
        let target = self
            .registry
            .get(container)
            .ok_or(LayerError::UnknownContainer(container))?;
        if target.is_fixed_capacity() && cards.len() != target.len() {
            return Err(LayerError::FixedCapacity(container));
        }
        if self.dragger.as_ref().is_some_and(|d| d.src() == container) {
            self.cancel_drag();
        }

        let target = self
            .registry
            .get_mut(container)
            .ok_or(LayerError::UnknownContainer(container))?;
        target.snapshot();
        let size = target.card_size();
        let mut pool: Vec<CardActor> = target.slots.drain(..).flatten().collect();
        let mut created = Vec::new();

        for &card in cards {
            let slot = card.map(|card| match pool.iter().position(|a| a.card() == card) {
                Some(i) => pool.remove(i),
                None => {
                    let id = ActorId::new(self.next_actor);
                    self.next_actor += 1;
                    created.push(id);
                    let mut actor = CardActor::new(id, card, size);
                    target.apply_visibility(&mut actor);
                    actor
                }
            });
            target.slots.push(slot);
        }

        let targets = target.target_positions();
        for (slot, position) in target.slots.iter_mut().zip(targets) {
            if let Some(actor) = slot.as_mut().filter(|a| created.contains(&a.id())) {
                actor.rest_at(position, size);
            }
        }

        for actor in &pool {
            self.registry.forget_actor(actor.id());
        }
        for &id in &created {
            self.registry.index_actor(id, container);
        }
        tracing::debug!(
            "{} updated: {} new, {} dropped",
            container,
            created.len(),
            pool.len()
        );
        Ok(())
    }

    /// Raise or lower an actor. Takes effect on the next batch.
    pub fn set_highlighted(&mut self, actor: ActorId, highlighted: bool) -> Result<()> {
        let container = self.registry.location(actor).ok_or(LayerError::UnknownActor(actor))?;
        let holder = self
            .registry
            .get_mut(container)
            .ok_or(LayerError::UnknownContainer(container))?;
        let before = holder.actor_ids();
        let target = holder.actor_mut(actor).ok_or(LayerError::UnknownActor(actor))?;
        if target.highlighted != highlighted {
            target.highlighted = highlighted;
            holder.snapshot_with(before);
        }
        Ok(())
    }

    /// Allow or forbid dragging an actor.
    pub fn set_enabled(&mut self, actor: ActorId, enabled: bool) -> Result<()> {
        self.registry
            .actor_mut(actor)
            .ok_or(LayerError::UnknownActor(actor))?
            .enabled = enabled;
        Ok(())
    }

    /// Permute a container's slots with a seeded RNG and animate the result.
    pub fn shuffle(&mut self, container: ContainerId, seed: u64) -> Result<()> {
        if !self.registry.contains(container) {
            return Err(LayerError::UnknownContainer(container));
        }
        if self.dragger.as_ref().is_some_and(|d| d.src() == container) {
            self.cancel_drag();
        }
        let target = self
            .registry
            .get_mut(container)
            .ok_or(LayerError::UnknownContainer(container))?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        target.snapshot();
        target.slots.shuffle(&mut rng);
        tracing::debug!("{} shuffled with seed {}", container, seed);
        self.update();
        Ok(())
    }

    // ========================================================================
    // Logical moves
    // ========================================================================

    /// Move the card at `src_index` of `src` to `dst_index` of `dst`.
    ///
    /// With `replace_src` the source keeps an empty slot; with `replace_dst`
    /// the card fills an empty destination slot instead of being inserted.
    /// Never starts an animation; call [`update`](Self::update).
    pub fn move_card(
        &mut self,
        src: ContainerId,
        dst: ContainerId,
        src_index: usize,
        dst_index: usize,
        replace_src: bool,
        replace_dst: bool,
    ) -> Result<ActorId> {
        self.move_card_with(MoveRequest::indices(
            src,
            dst,
            src_index,
            dst_index,
            replace_src,
            replace_dst,
        ))
    }

    pub fn move_card_with(&mut self, request: MoveRequest) -> Result<ActorId> {
        self.apply_move(&request)
    }

    /// Apply `request` after `delay` seconds of ticks.
    ///
    /// A non-positive delay applies the move now. Completion is reported as
    /// [`LayerEvent::MoveApplied`] carrying the returned ticket. With
    /// `update_after`, a batch is requested once the move applies.
    pub fn move_card_delayed(&mut self, request: MoveRequest, delay: f32, update_after: bool) -> Result<MoveTicket> {
        self.registry.check_request(&request)?;

        if delay > 0.0 {
            return Ok(self.delayed.push(request, delay, update_after));
        }

        let ticket = self.delayed.issue_ticket();
        let actor = self.apply_move(&request)?;
        self.events.push(LayerEvent::MoveApplied { ticket, actor });
        if update_after {
            self.update();
        }
        Ok(ticket)
    }

    /// Schedule `count` moves from `src` to `dst`, one every deal interval.
    ///
    /// The first card leaves on the next tick. Each applied move requests a
    /// batch, which staggers the animation while every transfer stays atomic.
    pub fn deal(
        &mut self,
        src: ContainerId,
        dst: ContainerId,
        count: usize,
        options: DealOptions,
    ) -> Result<Vec<MoveTicket>> {
        let request = MoveRequest {
            src,
            dst,
            from: options.from,
            to: options.to,
            replace_src: options.replace_src,
            replace_dst: options.replace_dst,
        };
        self.registry.check_request(&request)?;

        let interval = options.interval.unwrap_or(self.config.deal_interval);
        let tickets: Vec<MoveTicket> = (0..count)
            .map(|i| self.delayed.push(request, i as f32 * interval, true))
            .collect();
        tracing::debug!("dealing {} cards {} -> {}", count, src, dst);
        Ok(tickets)
    }

    /// Number of moves still waiting for their delay.
    #[must_use]
    pub fn pending_moves(&self) -> usize {
        self.delayed.len()
    }

    /// Moves still waiting, in scheduling order.
    pub fn delayed_moves(&self) -> impl Iterator<Item = &DelayedCardMove> + '_ {
        self.delayed.iter()
    }

    fn apply_move(&mut self, request: &MoveRequest) -> Result<ActorId> {
        let actor = self.registry.move_card(request)?;
        self.sync_drag(&[request.src, request.dst]);
        Ok(actor)
    }

    /// Keep a live drag consistent after `touched` containers changed.
    fn sync_drag(&mut self, touched: &[ContainerId]) {
        let Some(dragger) = self.dragger.as_mut() else {
            return;
        };
        if !touched.contains(&dragger.src()) || dragger.rebase(&self.registry) {
            return;
        }
        tracing::debug!("drag from {} lost its cards", dragger.src());
        self.cancel_drag();
    }

    fn dispatch(&mut self, moves: Vec<DelayedCardMove>) {
        for delayed in moves {
            match self.apply_move(&delayed.request) {
                Ok(actor) => {
                    self.events.push(LayerEvent::MoveApplied {
                        ticket: delayed.ticket,
                        actor,
                    });
                    if delayed.update_after {
                        self.update();
                    }
                }
                Err(error) => {
                    tracing::error!("{} rejected: {}", delayed.ticket, error);
                    self.events.push(LayerEvent::MoveRejected {
                        ticket: delayed.ticket,
                        error,
                    });
                }
            }
        }
    }

    // ========================================================================
    // Batches
    // ========================================================================

    /// Request a batch. It starts on the next tick, picking up every move
    /// made until then. While a batch runs, this requests a restart.
    pub fn update(&mut self) {
        self.batch.pending = true;
    }

    /// Advance the layer by `dt` seconds.
    ///
    /// Due delayed moves apply first, then a requested batch starts, then the
    /// drag resize and the running batch advance.
    pub fn tick(&mut self, dt: f32) {
        let due = self.delayed.advance(dt);
        self.dispatch(due);

        if self.batch.pending {
            self.start_batch();
        }
        if let Some(dragger) = self.dragger.as_mut() {
            dragger.advance(&mut self.registry, dt);
        }
        if self.batch.running && self.batch.advance(&mut self.registry, dt) {
            self.finish_batch();
        }
    }

    /// Jump every animation to its end.
    ///
    /// With `dispatch_delayed`, queued moves apply first, in the order they
    /// would have come due, and the batch is recomputed once more so none is
    /// lost. Does nothing when idle with nothing to dispatch.
    pub fn complete_animation(&mut self, dispatch_delayed: bool) {
        if dispatch_delayed && !self.delayed.is_empty() {
            let all = self.delayed.drain_all();
            self.dispatch(all);
            self.update();
        }
        if self.batch.state() == AnimationState::Idle {
            return;
        }
        if self.batch.pending {
            self.start_batch();
        }
        self.finish_batch();
    }

    fn start_batch(&mut self) {
        let actors = self.batch.start(&mut self.registry, &self.config);
        tracing::debug!(
            "batch started: {} actors, {:.3}s",
            actors,
            self.batch.time_left()
        );
        self.events.push(LayerEvent::BatchStarted { actors });
    }

    fn finish_batch(&mut self) {
        self.batch.finish(&mut self.registry);
        tracing::debug!("batch finished");
        self.events.push(LayerEvent::BatchFinished);
    }

    #[must_use]
    pub fn state(&self) -> AnimationState {
        self.batch.state()
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.state() != AnimationState::Idle
    }

    /// Longest remaining tween of the running batch.
    #[must_use]
    pub fn animation_time_left(&self) -> f32 {
        self.batch.time_left()
    }

    /// Every visible actor, back to front, in stage space.
    #[must_use]
    pub fn render_order(&self) -> Vec<RenderEntry> {
        self.batch.render_order(&self.registry)
    }

    /// Take every event recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<LayerEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // Dragging
    // ========================================================================

    /// Start dragging `actors`, grabbed at `pointer`.
    ///
    /// Returns `None` if a drag or an animation is active, or the actors
    /// cannot be dragged together.
    pub fn drag_cards(&mut self, actors: &[ActorId], pointer: Vec2) -> Option<&CardDragger> {
        if self.dragger.is_some() || self.is_animating() {
            return None;
        }
        let dragger = CardDragger::start(&mut self.registry, actors, pointer)?;
        tracing::debug!("drag started: {} cards from {}", dragger.actors().len(), dragger.src());
        self.dragger = Some(dragger);
        self.dragger.as_ref()
    }

    #[must_use]
    pub fn dragger(&self) -> Option<&CardDragger> {
        self.dragger.as_ref()
    }

    /// Move the drag to `pointer`. Returns false when no drag is active.
    pub fn touch_dragged(&mut self, pointer: Vec2) -> bool {
        let Some(dragger) = self.dragger.as_mut() else {
            return false;
        };
        if dragger.touch_dragged(&mut self.registry, pointer, &self.config) {
            self.update();
        }
        true
    }

    /// Release the drag at `pointer`.
    ///
    /// Over an accepting container the cards are handed to its play
    /// listener, which issues the logical moves. Otherwise they return home,
    /// keeping any rearrangement of the source.
    pub fn touch_up(&mut self, pointer: Vec2) -> Option<DropOutcome> {
        let mut dragger = self.dragger.take()?;
        dragger.touch_dragged(&mut self.registry, pointer, &self.config);
        dragger.release(&mut self.registry);

        let outcome = match dragger.target() {
            Some(dst) => {
                self.commit_play(&dragger, dst, pointer);
                DropOutcome::Played { dst }
            }
            None if dragger.is_rearranged() => DropOutcome::Rearranged,
            None => DropOutcome::Returned,
        };
        tracing::debug!("drag from {} ended: {:?}", dragger.src(), outcome);
        self.update();
        Some(outcome)
    }

    /// Abort the drag, restoring the source order. Returns false when no
    /// drag is active.
    pub fn cancel_drag(&mut self) -> bool {
        let Some(mut dragger) = self.dragger.take() else {
            return false;
        };
        dragger.restore_order(&mut self.registry);
        dragger.release(&mut self.registry);
        tracing::debug!("drag from {} cancelled", dragger.src());
        self.update();
        true
    }

    fn commit_play(&mut self, dragger: &CardDragger, dst: ContainerId, pointer: Vec2) {
        let play = dragger.play_for(&self.registry, dst, pointer);
        let Some(mut listener) = self
            .registry
            .get_mut(dst)
            .and_then(CardContainer::take_play_listener)
        else {
            return;
        };

        listener.on_cards_played(self, &play);

        if let Some(container) = self.registry.get_mut(dst) {
            if !container.has_play_listener() {
                container.set_play_listener(Some(listener));
            }
        }
        tracing::debug!("{} cards played {} -> {}", play.actors.len(), play.src, dst);
        self.events.push(LayerEvent::CardsPlayed {
            src: play.src,
            dst,
            actors: play.actors,
        });
    }
}
