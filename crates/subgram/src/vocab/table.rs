//! # Open-Addressing Slot Table
//!
//! An explicit array-backed table with linear probing, not a general
//! associative container: the deterministic probe order is part of the
//! dictionary's stable-id contract, and the same word must land on the same
//! slot for a given capacity.

/// Sentinel marking an unoccupied slot.
const EMPTY: u32 = u32::MAX;

/// Fixed-capacity open-addressing table mapping hashed words to entry ids.
#[derive(Debug, Clone)]
pub struct SlotTable {
    slots: Vec<u32>,
}

impl SlotTable {
    /// Create a table with `capacity` slots, all empty.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![EMPTY; capacity],
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Reset every slot to empty.
    pub fn clear(&mut self) {
        self.slots.fill(EMPTY);
    }

    /// Probe for `hash`, walking slots linearly from `hash % capacity` until
    /// hitting either an empty slot or an occupied slot whose entry id
    /// satisfies `matches`.
    ///
    /// ## Returns
    /// The slot index where the probe stopped.
    pub fn probe<F>(
        &self,
        hash: u32,
        matches: F,
    ) -> usize
    where
        F: Fn(usize) -> bool,
    {
        let capacity = self.slots.len();
        let mut slot = hash as usize % capacity;
        loop {
            match self.get(slot) {
                None => return slot,
                Some(id) if matches(id) => return slot,
                Some(_) => slot = (slot + 1) % capacity,
            }
        }
    }

    /// Entry id stored at `slot`, if the slot is occupied.
    pub fn get(
        &self,
        slot: usize,
    ) -> Option<usize> {
        let value = self.slots[slot];
        (value != EMPTY).then_some(value as usize)
    }

    /// Store `id` at `slot`.
    pub fn set(
        &mut self,
        slot: usize,
        id: usize,
    ) {
        debug_assert!((id as u32) < EMPTY);
        self.slots[slot] = id as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table() {
        let table = SlotTable::new(8);
        assert_eq!(table.capacity(), 8);
        for slot in 0..8 {
            assert_eq!(table.get(slot), None);
        }
    }

    #[test]
    fn test_probe_deterministic() {
        let mut table = SlotTable::new(8);

        // hash 3 -> slot 3.
        let slot = table.probe(3, |_| false);
        assert_eq!(slot, 3);
        table.set(slot, 0);

        // Same hash, entry 0 matches: resolves to the same slot.
        assert_eq!(table.probe(3, |id| id == 0), 3);

        // Same hash, no match: linear probe walks to the next free slot.
        let slot = table.probe(3, |_| false);
        assert_eq!(slot, 4);
        table.set(slot, 1);

        // Colliding hash 11 (11 % 8 == 3) walks over both occupied slots.
        assert_eq!(table.probe(11, |_| false), 5);
        assert_eq!(table.probe(11, |id| id == 1), 4);
    }

    #[test]
    fn test_probe_wraps() {
        let mut table = SlotTable::new(4);
        table.set(3, 9);
        assert_eq!(table.probe(7, |_| false), 0);
    }

    #[test]
    fn test_clear() {
        let mut table = SlotTable::new(4);
        table.set(1, 5);
        table.clear();
        assert_eq!(table.get(1), None);
    }
}
