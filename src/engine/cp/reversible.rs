use crate::basic_types::trail::Trail;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;

/// A handle to an `i64` cell whose value is restored on backtracking.
///
/// Propagators use reversible cells to cache state, such as support witnesses, that must stay in
/// sync with the search tree.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct ReversibleInt {
    id: u32,
}

impl StorageKey for ReversibleInt {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        ReversibleInt { id: index as u32 }
    }
}

#[derive(Debug, Clone, Copy)]
struct ReversibleChange {
    old_value: i64,
    reference: ReversibleInt,
}

/// The backing store of all [`ReversibleInt`] cells, with a trail to undo writes made since a
/// checkpoint.
#[derive(Default, Debug, Clone)]
pub(crate) struct ReversibleValues {
    trail: Trail<ReversibleChange>,
    values: KeyedVec<ReversibleInt, i64>,
}

impl ReversibleValues {
    pub(crate) fn grow(&mut self, initial_value: i64) -> ReversibleInt {
        self.values.push(initial_value)
    }

    pub(crate) fn new_checkpoint(&mut self) {
        self.trail.new_checkpoint()
    }

    pub(crate) fn get_checkpoint(&self) -> usize {
        self.trail.get_checkpoint()
    }

    pub(crate) fn read(&self, cell: ReversibleInt) -> i64 {
        self.values[cell]
    }

    pub(crate) fn synchronise(&mut self, new_checkpoint: usize) {
        self.trail
            .synchronise(new_checkpoint)
            .for_each(|change| self.values[change.reference] = change.old_value)
    }

    pub(crate) fn assign(&mut self, cell: ReversibleInt, value: i64) {
        let old_value = self.values[cell];
        if old_value == value {
            return;
        }
        let entry = ReversibleChange {
            old_value,
            reference: cell,
        };
        self.trail.push(entry);
        self.values[cell] = value;
    }
}
