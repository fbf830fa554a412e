//! Card containers: ordered slot lists with a layout strategy.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::actors::CardActor;
use crate::core::{ActorId, Card, Rect, Vec2};

use super::layout::{CardLayout, HandLayout, StackLayout, TrickLayout};
use super::play::PlayListener;

/// Default card size for new containers.
pub const DEFAULT_CARD_SIZE: Vec2 = Vec2::new(60.0, 90.0);

/// Face-up policy applied to actors entering a container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardVisibility {
    /// Every card face up.
    Shown,
    /// Every card face down.
    Hidden,
    /// Actors keep their own `shown` flag.
    #[default]
    Mixed,
}

/// An ordered list of slots, each holding an optional card actor.
///
/// Containers hold logical state and know where their actors belong; they
/// never animate. Slot lists change only through the
/// [`AnimationLayer`](crate::animation::AnimationLayer), which snapshots the
/// pre-move slot list into `old_actors` the first time a container is
/// touched within a batch.
pub struct CardContainer {
    name: String,
    bounds: Rect,
    pub(crate) slots: Vec<Option<CardActor>>,
    card_size: Vec2,
    visibility: CardVisibility,
    enabled: bool,
    layout: Box<dyn CardLayout>,
    play_listener: Option<Box<dyn PlayListener>>,
    pub(crate) old_actors: Option<Vec<Option<ActorId>>>,
}

impl CardContainer {
    /// Create an empty container with a custom layout.
    pub fn new(name: impl Into<String>, bounds: Rect, layout: impl CardLayout + 'static) -> Self {
        Self {
            name: name.into(),
            bounds,
            slots: Vec::new(),
            card_size: DEFAULT_CARD_SIZE,
            visibility: CardVisibility::default(),
            enabled: true,
            layout: Box::new(layout),
            play_listener: None,
            old_actors: None,
        }
    }

    /// A face-up fanned hand.
    pub fn hand(name: impl Into<String>, bounds: Rect, layout: HandLayout) -> Self {
        Self::new(name, bounds, layout).with_visibility(CardVisibility::Shown)
    }

    /// A pile; only the top card is drawn at rest.
    pub fn stack(name: impl Into<String>, bounds: Rect) -> Self {
        Self::new(name, bounds, StackLayout::new())
    }

    /// A fixed-capacity trick, created with `capacity` empty slots.
    pub fn trick(name: impl Into<String>, bounds: Rect, capacity: usize, layout: TrickLayout) -> Self {
        let mut container = Self::new(name, bounds, layout).with_visibility(CardVisibility::Shown);
        container.slots = (0..capacity).map(|_| None).collect();
        container
    }

    #[must_use]
    pub fn with_card_size(mut self, size: Vec2) -> Self {
        self.card_size = size;
        self
    }

    #[must_use]
    pub fn with_visibility(mut self, visibility: CardVisibility) -> Self {
        self.visibility = visibility;
        self
    }

    #[must_use]
    pub fn with_play_listener(mut self, listener: impl PlayListener + 'static) -> Self {
        self.play_listener = Some(Box::new(listener));
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bounds in stage space.
    #[must_use]
    pub fn stage_bounds(&self) -> Rect {
        self.bounds
    }

    /// Move or resize the container. Takes effect at the next batch.
    pub fn set_stage_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    /// Display size for actors resting here.
    #[must_use]
    pub fn card_size(&self) -> Vec2 {
        self.card_size
    }

    #[must_use]
    pub fn visibility(&self) -> CardVisibility {
        self.visibility
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    #[must_use]
    pub fn layout(&self) -> &dyn CardLayout {
        self.layout.as_ref()
    }

    #[must_use]
    pub fn is_fixed_capacity(&self) -> bool {
        self.layout.is_fixed_capacity()
    }

    #[must_use]
    pub fn has_play_listener(&self) -> bool {
        self.play_listener.is_some()
    }

    pub fn set_play_listener(&mut self, listener: Option<Box<dyn PlayListener>>) {
        self.play_listener = listener;
    }

    pub(crate) fn play_listener(&self) -> Option<&dyn PlayListener> {
        self.play_listener.as_deref()
    }

    pub(crate) fn take_play_listener(&mut self) -> Option<Box<dyn PlayListener>> {
        self.play_listener.take()
    }

    /// Number of slots, empty ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn slots(&self) -> &[Option<CardActor>] {
        &self.slots
    }

    #[must_use]
    pub fn actor_at(&self, index: usize) -> Option<&CardActor> {
        self.slots.get(index)?.as_ref()
    }

    #[must_use]
    pub fn actor(&self, id: ActorId) -> Option<&CardActor> {
        self.actors().find(|a| a.id() == id)
    }

    pub(crate) fn actor_mut(&mut self, id: ActorId) -> Option<&mut CardActor> {
        self.slots.iter_mut().flatten().find(|a| a.id() == id)
    }

    #[must_use]
    pub fn index_of(&self, id: ActorId) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.as_ref().is_some_and(|a| a.id() == id))
    }

    /// Actors in slot order, skipping empty slots.
    pub fn actors(&self) -> impl Iterator<Item = &CardActor> + '_ {
        self.slots.iter().flatten()
    }

    /// Slot contents as ids.
    #[must_use]
    pub fn actor_ids(&self) -> Vec<Option<ActorId>> {
        self.slots.iter().map(|s| s.as_ref().map(CardActor::id)).collect()
    }

    /// Slot contents as cards.
    #[must_use]
    pub fn cards(&self) -> Vec<Option<Card>> {
        self.slots.iter().map(|s| s.as_ref().map(CardActor::card)).collect()
    }

    /// Number of non-empty slots.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.actors().count()
    }

    /// Slot list as it was before the first move of the current batch.
    #[must_use]
    pub fn old_actors(&self) -> Option<&[Option<ActorId>]> {
        self.old_actors.as_deref()
    }

    /// Whether the container changed since its last finished batch.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.old_actors.is_some()
    }

    /// Record the pre-move slot list unless one is already recorded.
    pub(crate) fn snapshot(&mut self) {
        if self.old_actors.is_none() {
            self.old_actors = Some(self.actor_ids());
        }
    }

    /// Record `before` as the pre-move slot list unless one is already recorded.
    pub(crate) fn snapshot_with(&mut self, before: Vec<Option<ActorId>>) {
        if self.old_actors.is_none() {
            self.old_actors = Some(before);
        }
    }

    #[must_use]
    pub fn to_stage(&self, local: Vec2) -> Vec2 {
        local + self.bounds.origin
    }

    #[must_use]
    pub fn to_local(&self, stage: Vec2) -> Vec2 {
        stage - self.bounds.origin
    }

    /// Local target position of every slot, highlight offsets applied.
    #[must_use]
    pub fn target_positions(&self) -> Vec<Vec2> {
        let offset = self.layout.highlight_offset();
        self.layout
            .slot_positions(self.slots.len(), self.bounds.size, self.card_size)
            .into_iter()
            .zip(&self.slots)
            .map(|(p, slot)| match slot {
                Some(actor) if actor.highlighted => p + offset,
                _ => p,
            })
            .collect()
    }

    /// Insertion index for a dragged group at a stage-space point.
    #[must_use]
    pub fn insertion_index(&self, stage_point: Vec2) -> Option<usize> {
        self.layout.insertion_index(
            self.to_local(stage_point),
            self.slots.len(),
            self.bounds.size,
            self.card_size,
        )
    }

    /// Apply the face-up policy to an actor entering this container.
    pub(crate) fn apply_visibility(&self, actor: &mut CardActor) {
        match self.visibility {
            CardVisibility::Shown => actor.shown = true,
            CardVisibility::Hidden => actor.shown = false,
            CardVisibility::Mixed => {}
        }
    }

    /// Make the topmost actor not in `except` visible. Used by piles while
    /// their top card is being dragged.
    pub(crate) fn reveal_top_except(&mut self, except: &[ActorId]) {
        if let Some(actor) = self
            .slots
            .iter_mut()
            .rev()
            .flatten()
            .find(|a| !except.contains(&a.id()))
        {
            actor.visible = true;
        }
    }

    pub(crate) fn run_animation_end(&mut self) {
        self.layout.on_animation_end(&mut self.slots);
    }

    /// Rest every actor not being dragged at its target, drop the snapshot
    /// and run the layout's end-of-animation hook.
    pub(crate) fn settle(&mut self) {
        let targets = self.target_positions();
        for (slot, target) in self.slots.iter_mut().zip(targets) {
            if let Some(actor) = slot.as_mut().filter(|a| !a.is_dragged()) {
                actor.rest_at(target, self.card_size);
            }
        }
        self.old_actors = None;
        self.run_animation_end();
    }

    /// Move the smallest slice of slots containing every actor of `group`
    /// so that the group starts at index `to`.
    ///
    /// The group keeps its relative order, as do the other slots inside the
    /// slice. Returns false (and changes nothing) when the group already
    /// starts at `to` contiguously or an actor is not held here.
    pub(crate) fn rearrange(&mut self, group: &[ActorId], to: usize) -> bool {
        let mut indices = Vec::with_capacity(group.len());
        for &id in group {
            match self.index_of(id) {
                Some(i) => indices.push(i),
                None => return false,
            }
        }
        if indices.is_empty() {
            return false;
        }
        indices.sort_unstable();

        let k = indices.len();
        let to = to.min(self.slots.len() - k);
        if indices.iter().enumerate().all(|(n, &i)| i == to + n) {
            return false;
        }

        let lo = indices[0].min(to);
        let hi = (indices[k - 1] + 1).max(to + k);
        let window: Vec<Option<CardActor>> = self.slots.drain(lo..hi).collect();

        let (moved, mut others): (Vec<_>, Vec<_>) = window
            .into_iter()
            .partition(|s| s.as_ref().is_some_and(|a| group.contains(&a.id())));

        let tail = others.split_off(to - lo);
        others.extend(moved);
        others.extend(tail);
        self.slots.splice(lo..lo, others);
        true
    }

    /// Permute slots to match `order`. Returns true if anything moved.
    ///
    /// Actors missing from `order` are appended so none is lost.
    pub(crate) fn reorder(&mut self, order: &[Option<ActorId>]) -> bool {
        if self.actor_ids() == order {
            return false;
        }

        let mut pool: FxHashMap<ActorId, CardActor> = FxHashMap::default();
        for actor in self.slots.drain(..).flatten() {
            pool.insert(actor.id(), actor);
        }

        self.slots = order
            .iter()
            .map(|id| id.and_then(|id| pool.remove(&id)))
            .collect();

        let mut leftovers: Vec<CardActor> = pool.into_values().collect();
        leftovers.sort_by_key(CardActor::id);
        self.slots.extend(leftovers.into_iter().map(Some));
        true
    }
}

impl std::fmt::Debug for CardContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardContainer")
            .field("name", &self.name)
            .field("bounds", &self.bounds)
            .field("slots", &self.actor_ids())
            .field("card_size", &self.card_size)
            .field("visibility", &self.visibility)
            .field("enabled", &self.enabled)
            .field("layout", &self.layout)
            .field("play_listener", &self.play_listener.is_some())
            .field("old_actors", &self.old_actors)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Rank, Suit};

    fn hand_with(n: u32) -> CardContainer {
        let mut hand = CardContainer::hand("hand", Rect::new(0.0, 0.0, 600.0, 100.0), HandLayout::new());
        for i in 0..n {
            hand.slots.push(Some(CardActor::new(
                ActorId::new(i),
                Card::new(Rank::ALL[i as usize], Suit::Hearts),
                DEFAULT_CARD_SIZE,
            )));
        }
        hand
    }

    fn ids(container: &CardContainer) -> Vec<u32> {
        container.actors().map(|a| a.id().raw()).collect()
    }

    #[test]
    fn test_trick_prefilled_with_empty_slots() {
        let trick = CardContainer::trick("trick", Rect::new(0.0, 0.0, 300.0, 300.0), 4, TrickLayout::new());
        assert_eq!(trick.len(), 4);
        assert_eq!(trick.card_count(), 0);
        assert!(trick.is_fixed_capacity());
    }

    #[test]
    fn test_snapshot_is_lazy() {
        let mut hand = hand_with(3);
        assert!(!hand.is_dirty());

        hand.snapshot();
        let first = hand.old_actors().map(<[_]>::to_vec);
        hand.slots.pop();
        hand.snapshot();

        assert_eq!(hand.old_actors().map(<[_]>::to_vec), first);
        assert_eq!(hand.old_actors().map(<[_]>::len), Some(3));
    }

    #[test]
    fn test_coordinate_conversion() {
        let hand = CardContainer::hand("hand", Rect::new(100.0, 50.0, 600.0, 100.0), HandLayout::new());
        let local = Vec2::new(10.0, 20.0);

        assert_eq!(hand.to_stage(local), Vec2::new(110.0, 70.0));
        assert_eq!(hand.to_local(hand.to_stage(local)), local);
    }

    #[test]
    fn test_highlight_offsets_target() {
        let mut hand = hand_with(2);
        let plain = hand.target_positions();
        hand.slots[1].as_mut().unwrap().highlighted = true;
        let raised = hand.target_positions();

        assert_eq!(plain[0], raised[0]);
        assert_eq!(raised[1], plain[1] + HandLayout::new().highlight_offset);
    }

    #[test]
    fn test_rearrange_single_forward() {
        let mut hand = hand_with(5);
        assert!(hand.rearrange(&[ActorId::new(1)], 3));
        assert_eq!(ids(&hand), vec![0, 2, 3, 1, 4]);
    }

    #[test]
    fn test_rearrange_single_backward() {
        let mut hand = hand_with(5);
        assert!(hand.rearrange(&[ActorId::new(4)], 1));
        assert_eq!(ids(&hand), vec![0, 4, 1, 2, 3]);
    }

    #[test]
    fn test_rearrange_same_index_is_noop() {
        let mut hand = hand_with(5);
        assert!(!hand.rearrange(&[ActorId::new(2)], 2));
        assert_eq!(ids(&hand), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_rearrange_gathers_group() {
        let mut hand = hand_with(6);
        // Group {1, 4} moved to start at 2: slice [1..5] reordered.
        assert!(hand.rearrange(&[ActorId::new(1), ActorId::new(4)], 2));
        assert_eq!(ids(&hand), vec![0, 2, 1, 4, 3, 5]);
    }

    #[test]
    fn test_rearrange_clamps_to_end() {
        let mut hand = hand_with(4);
        assert!(hand.rearrange(&[ActorId::new(0), ActorId::new(1)], 10));
        assert_eq!(ids(&hand), vec![2, 3, 0, 1]);
    }

    #[test]
    fn test_rearrange_unknown_actor() {
        let mut hand = hand_with(3);
        assert!(!hand.rearrange(&[ActorId::new(99)], 0));
    }

    #[test]
    fn test_reorder_restores() {
        let mut hand = hand_with(4);
        let original = hand.actor_ids();

        hand.rearrange(&[ActorId::new(0)], 3);
        assert!(hand.reorder(&original));
        assert_eq!(hand.actor_ids(), original);
        assert!(!hand.reorder(&original));
    }

    #[test]
    fn test_visibility_policy() {
        let hidden = CardContainer::stack("deck", Rect::new(0.0, 0.0, 100.0, 100.0))
            .with_visibility(CardVisibility::Hidden);
        let mut actor = CardActor::new(ActorId::new(1), Card::new(Rank::Ace, Suit::Spades), DEFAULT_CARD_SIZE);

        hidden.apply_visibility(&mut actor);
        assert!(!actor.shown);

        let mixed = CardContainer::stack("pile", Rect::new(0.0, 0.0, 100.0, 100.0));
        mixed.apply_visibility(&mut actor);
        assert!(!actor.shown);
    }

    #[test]
    fn test_stack_animation_end_hides_covered() {
        let mut stack = CardContainer::stack("pile", Rect::new(0.0, 0.0, 100.0, 100.0));
        for i in 0..3 {
            stack.slots.push(Some(CardActor::new(
                ActorId::new(i),
                Card::new(Rank::Two, Suit::Clubs),
                DEFAULT_CARD_SIZE,
            )));
        }
        stack.run_animation_end();

        let visible: Vec<bool> = stack.actors().map(|a| a.visible).collect();
        assert_eq!(visible, vec![false, false, true]);

        stack.reveal_top_except(&[ActorId::new(2)]);
        assert!(stack.actor(ActorId::new(1)).unwrap().visible);
    }
}
