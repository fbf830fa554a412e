//! Queue of card moves gated by a countdown.
//!
//! Moves due in the same tick apply in order of expiry; moves expiring
//! together keep their scheduling order. A move scheduled with a longer
//! delay may therefore complete after one scheduled later with a shorter
//! delay, which is what staggers a deal.

use crate::containers::MoveRequest;
use crate::core::{ContainerId, MoveTicket};

/// A scheduled logical move.
#[derive(Clone, Debug, PartialEq)]
pub struct DelayedCardMove {
    pub ticket: MoveTicket,
    pub request: MoveRequest,
    /// Seconds until the move applies. Zero or less means due.
    pub delay_left: f32,
    /// Request a new animation batch once applied.
    pub update_after: bool,
}

/// FIFO of delayed moves.
#[derive(Clone, Debug, Default)]
pub struct DelayedMoveQueue {
    moves: Vec<DelayedCardMove>,
    next_ticket: u64,
}

impl DelayedMoveQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a ticket without queueing anything.
    pub fn issue_ticket(&mut self) -> MoveTicket {
        let ticket = MoveTicket(self.next_ticket);
        self.next_ticket += 1;
        ticket
    }

    /// Queue a move due after `delay` seconds.
    pub fn push(&mut self, request: MoveRequest, delay: f32, update_after: bool) -> MoveTicket {
        let ticket = self.issue_ticket();
        self.moves.push(DelayedCardMove {
            ticket,
            request,
            delay_left: delay,
            update_after,
        });
        ticket
    }

    /// Count down by `dt` and remove every move now due, earliest expiry first.
    pub fn advance(&mut self, dt: f32) -> Vec<DelayedCardMove> {
        for m in &mut self.moves {
            m.delay_left -= dt;
        }

        let (mut due, waiting): (Vec<_>, Vec<_>) =
            self.moves.drain(..).partition(|m| m.delay_left <= 0.0);
        self.moves = waiting;

        due.sort_by(|a, b| a.delay_left.total_cmp(&b.delay_left));
        due
    }

    /// Remove every move regardless of its countdown, in the order they
    /// would have come due.
    pub fn drain_all(&mut self) -> Vec<DelayedCardMove> {
        let mut all = std::mem::take(&mut self.moves);
        all.sort_by(|a, b| a.delay_left.total_cmp(&b.delay_left));
        all
    }

    /// Remove every move whose source or destination is `container`.
    pub fn remove_touching(&mut self, container: ContainerId) -> Vec<DelayedCardMove> {
        let (removed, kept): (Vec<_>, Vec<_>) = self
            .moves
            .drain(..)
            .partition(|m| m.request.src == container || m.request.dst == container);
        self.moves = kept;
        removed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DelayedCardMove> + '_ {
        self.moves.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> MoveRequest {
        MoveRequest::new(ContainerId::new(0), ContainerId::new(1))
    }

    #[test]
    fn test_tickets_increase() {
        let mut queue = DelayedMoveQueue::new();
        let a = queue.push(request(), 0.5, false);
        let b = queue.issue_ticket();
        let c = queue.push(request(), 0.1, false);

        assert!(a < b && b < c);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_advance_releases_due_moves() {
        let mut queue = DelayedMoveQueue::new();
        queue.push(request(), 0.1, false);
        queue.push(request(), 0.3, false);

        assert!(queue.advance(0.05).is_empty());
        let due = queue.advance(0.1);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].ticket, MoveTicket(0));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_earliest_expiry_first() {
        let mut queue = DelayedMoveQueue::new();
        let late = queue.push(request(), 0.2, false);
        let early = queue.push(request(), 0.1, false);

        let due = queue.advance(1.0);
        let order: Vec<_> = due.iter().map(|m| m.ticket).collect();
        assert_eq!(order, vec![early, late]);
    }

    #[test]
    fn test_fifo_on_ties() {
        let mut queue = DelayedMoveQueue::new();
        let first = queue.push(request(), 0.2, false);
        let second = queue.push(request(), 0.2, false);
        let third = queue.push(request(), 0.2, false);

        let order: Vec<_> = queue.advance(0.5).iter().map(|m| m.ticket).collect();
        assert_eq!(order, vec![first, second, third]);
    }

    #[test]
    fn test_drain_all_in_due_order() {
        let mut queue = DelayedMoveQueue::new();
        let c = queue.push(request(), 0.3, true);
        let a = queue.push(request(), 0.0, true);
        let b = queue.push(request(), 0.1, true);

        let order: Vec<_> = queue.drain_all().iter().map(|m| m.ticket).collect();
        assert_eq!(order, vec![a, b, c]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_remove_touching() {
        let mut queue = DelayedMoveQueue::new();
        queue.push(request(), 0.1, false);
        queue.push(MoveRequest::new(ContainerId::new(2), ContainerId::new(3)), 0.1, false);

        let removed = queue.remove_touching(ContainerId::new(1));
        assert_eq!(removed.len(), 1);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.iter().next().unwrap().request.src, ContainerId::new(2));
    }
}
