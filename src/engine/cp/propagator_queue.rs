use std::collections::VecDeque;

use crate::containers::HashSet;
use crate::engine::cp::watch_list::Handler;
use crate::engine::propagation::PropagatorId;
use crate::engine::variables::DomainId;

/// A pending invocation of a propagator handler, queued because one of its subscriptions fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct WakeUp {
    pub(crate) propagator_id: PropagatorId,
    pub(crate) handler: Handler,
    pub(crate) domain_id: DomainId,
}

/// FIFO queue of propagator wake-ups.
///
/// A wake-up that is already enqueued is not enqueued a second time until it has been popped.
#[derive(Default, Debug)]
pub(crate) struct PropagatorQueue {
    queue: VecDeque<WakeUp>,
    enqueued: HashSet<WakeUp>,
}

impl PropagatorQueue {
    pub(crate) fn enqueue(&mut self, wake_up: WakeUp) {
        if self.enqueued.insert(wake_up) {
            self.queue.push_back(wake_up);
        }
    }

    pub(crate) fn pop(&mut self) -> Option<WakeUp> {
        let wake_up = self.queue.pop_front()?;
        let _ = self.enqueued.remove(&wake_up);
        Some(wake_up)
    }

    pub(crate) fn clear(&mut self) {
        self.queue.clear();
        self.enqueued.clear();
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wake_up(propagator: u32, domain: u32) -> WakeUp {
        WakeUp {
            propagator_id: PropagatorId(propagator),
            handler: Handler::Propagate,
            domain_id: DomainId::new(domain),
        }
    }

    #[test]
    fn wake_ups_are_popped_in_fifo_order() {
        let mut queue = PropagatorQueue::default();

        queue.enqueue(wake_up(0, 0));
        queue.enqueue(wake_up(1, 0));
        queue.enqueue(wake_up(2, 1));

        assert_eq!(queue.pop(), Some(wake_up(0, 0)));
        assert_eq!(queue.pop(), Some(wake_up(1, 0)));
        assert_eq!(queue.pop(), Some(wake_up(2, 1)));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn an_enqueued_wake_up_is_not_duplicated() {
        let mut queue = PropagatorQueue::default();

        queue.enqueue(wake_up(0, 0));
        queue.enqueue(wake_up(0, 0));

        assert_eq!(queue.pop(), Some(wake_up(0, 0)));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn popping_allows_the_wake_up_to_be_enqueued_again() {
        let mut queue = PropagatorQueue::default();

        queue.enqueue(wake_up(0, 0));
        let _ = queue.pop();
        queue.enqueue(wake_up(0, 0));

        assert_eq!(queue.pop(), Some(wake_up(0, 0)));
    }
}
