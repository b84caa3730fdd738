//! Subtable storage shared by the ultra and ECC VM op tables
//!
//! The aggregate table is a deque of per-circuit subtables. A new subtable is
//! placed at the front (prepend) or the back (append); "current" and "previous"
//! are views over the same storage.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Where the next subtable goes relative to the existing table
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MergeSettings {
    #[default]
    Prepend,
    Append,
}

#[derive(Clone, Debug)]
pub struct EccOpsTable<Op> {
    subtables: VecDeque<Vec<Op>>,
    current_index: Option<usize>,
    settings: MergeSettings,
}

impl<Op> Default for EccOpsTable<Op> {
    fn default() -> Self {
        Self {
            subtables: VecDeque::new(),
            current_index: None,
            settings: MergeSettings::default(),
        }
    }
}

impl<Op> EccOpsTable<Op> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_new_subtable(&mut self, settings: MergeSettings) {
        match settings {
            MergeSettings::Prepend => {
                self.subtables.push_front(Vec::new());
                self.current_index = Some(0);
            }
            MergeSettings::Append => {
                self.subtables.push_back(Vec::new());
                self.current_index = Some(self.subtables.len() - 1);
            }
        }
        self.settings = settings;
    }

    /// Push into the current subtable, opening a prepended one if none exists yet
    pub fn push(&mut self, op: Op) {
        let index = match self.current_index {
            Some(index) => index,
            None => {
                self.create_new_subtable(MergeSettings::Prepend);
                0
            }
        };
        self.subtables[index].push(op);
    }

    pub fn settings(&self) -> MergeSettings {
        self.settings
    }

    pub fn num_subtables(&self) -> usize {
        self.subtables.len()
    }

    /// Total number of ops across all subtables
    pub fn size(&self) -> usize {
        self.subtables.iter().map(Vec::len).sum()
    }

    pub fn current_subtable(&self) -> &[Op] {
        match self.current_index {
            Some(index) => &self.subtables[index],
            None => &[],
        }
    }

    pub fn current_subtable_size(&self) -> usize {
        self.current_subtable().len()
    }

    pub fn previous_size(&self) -> usize {
        self.size() - self.current_subtable_size()
    }

    /// All ops in table order
    pub fn iter(&self) -> impl Iterator<Item = &Op> + '_ {
        self.subtables.iter().flatten()
    }

    /// All ops except those of the current subtable, in table order
    pub fn iter_previous(&self) -> impl Iterator<Item = &Op> + '_ {
        let current = self.current_index;
        self.subtables
            .iter()
            .enumerate()
            .filter(move |(index, _)| Some(*index) != current)
            .flat_map(|(_, subtable)| subtable.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(table: &EccOpsTable<u32>) -> Vec<u32> {
        table.iter().copied().collect()
    }

    #[test]
    fn test_prepend_places_subtable_first() {
        let mut table = EccOpsTable::new();
        table.create_new_subtable(MergeSettings::Prepend);
        table.push(1);
        table.push(2);
        table.create_new_subtable(MergeSettings::Prepend);
        table.push(3);

        assert_eq!(collect(&table), vec![3, 1, 2]);
        assert_eq!(table.current_subtable(), &[3]);
        assert_eq!(table.iter_previous().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(table.previous_size(), 2);
    }

    #[test]
    fn test_append_places_subtable_last() {
        let mut table = EccOpsTable::new();
        table.create_new_subtable(MergeSettings::Prepend);
        table.push(1);
        table.create_new_subtable(MergeSettings::Append);
        table.push(2);
        table.push(3);
        table.create_new_subtable(MergeSettings::Prepend);
        table.push(0);

        assert_eq!(collect(&table), vec![0, 1, 2, 3]);
        assert_eq!(table.current_subtable_size(), 1);
        assert_eq!(table.iter_previous().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(table.num_subtables(), 3);
    }

    #[test]
    fn test_push_without_subtable() {
        let mut table = EccOpsTable::new();
        table.push(7u32);
        assert_eq!(table.size(), 1);
        assert_eq!(table.current_subtable(), &[7]);
        assert_eq!(table.previous_size(), 0);
    }
}
