use enumset::EnumSet;

use crate::containers::KeyedVec;
use crate::engine::cp::DomainEvent;
use crate::engine::variables::DomainId;

/// While a propagator runs, the domain changes it performs are captured as events in the event
/// sink. When the propagator finishes, the event sink is drained to notify all the propagators
/// that subscribe to those events.
///
/// The event sink will ensure duplicate events are ignored.
#[derive(Default, Clone, Debug)]
pub(crate) struct EventSink {
    present: KeyedVec<DomainId, EnumSet<DomainEvent>>,
    events: Vec<(DomainEvent, DomainId)>,
}

impl EventSink {
    pub(crate) fn grow(&mut self) {
        let _ = self.present.push(EnumSet::new());
    }

    pub(crate) fn event_occurred(&mut self, event: DomainEvent, domain: DomainId) {
        let elem = &mut self.present[domain];

        if elem.contains(event) {
            // The event was already triggered.
            return;
        }

        let _ = elem.insert(event);
        self.events.push((event, domain));
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = (DomainEvent, DomainId)> + '_ {
        self.events.drain(..).inspect(|&(event, domain)| {
            let _ = self.present[domain].remove(event);
        })
    }

    pub(crate) fn clear(&mut self) {
        for (event, domain) in self.events.drain(..) {
            let _ = self.present[domain].remove(event);
        }
    }
}
