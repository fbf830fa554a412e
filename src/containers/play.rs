//! Play protocol for drag-and-drop transfers between containers.

use crate::animation::AnimationLayer;
use crate::core::{ActorId, Card, ContainerId, Vec2};

/// A proposed or committed drop of dragged cards onto a container.
#[derive(Clone, Debug, PartialEq)]
pub struct CardPlay {
    /// Dragged actors, in source slot order.
    pub actors: Vec<ActorId>,
    /// Cards of `actors`, same order.
    pub cards: Vec<Card>,
    pub src: ContainerId,
    /// Container being dropped on.
    pub dst: ContainerId,
    /// Pointer position, local to `dst`.
    pub position: Vec2,
}

/// Game-rule hook deciding whether a container accepts dragged cards.
///
/// The layer only consumes this contract. `can_cards_be_played` is asked on
/// every pointer move while a drag hovers the container; `on_cards_played`
/// runs once on release and is expected to issue the logical moves through
/// the layer it receives.
///
/// ```
/// use card_stage::animation::AnimationLayer;
/// use card_stage::containers::{CardPlay, PlayListener};
///
/// struct AcceptSingles;
///
/// impl PlayListener for AcceptSingles {
///     fn can_cards_be_played(&self, play: &CardPlay) -> bool {
///         play.actors.len() == 1
///     }
///
///     fn on_cards_played(&mut self, layer: &mut AnimationLayer, play: &CardPlay) {
///         let Some(index) = layer
///             .container(play.src)
///             .and_then(|c| c.index_of(play.actors[0]))
///         else {
///             return;
///         };
///         let end = layer.container(play.dst).map_or(0, |c| c.len());
///         if layer.move_card(play.src, play.dst, index, end, false, false).is_ok() {
///             layer.update();
///         }
///     }
/// }
/// ```
pub trait PlayListener {
    /// Whether the cards in `play` may be dropped here.
    fn can_cards_be_played(&self, play: &CardPlay) -> bool;

    /// Commit a drop previously accepted by `can_cards_be_played`.
    fn on_cards_played(&mut self, layer: &mut AnimationLayer, play: &CardPlay);
}
