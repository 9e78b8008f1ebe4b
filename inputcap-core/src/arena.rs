use std::collections::BTreeMap;
use std::sync::Arc;

use crate::snapshot::InputSnapshot;

/// Published snapshots keyed by cycle number.
///
/// Consumers look snapshots up by cycle; the scheduler retires old cycles so
/// only the most recent `capacity` stay reachable from here. A retired
/// snapshot is freed once the last task or consumer holding it lets go.
pub struct SnapshotArena {
    frames: BTreeMap<u64, Arc<InputSnapshot>>,
    capacity: usize,
}

impl SnapshotArena {
    /// `capacity` is clamped to 2 so (current, previous) always fit.
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: BTreeMap::new(),
            capacity: capacity.max(2),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Store a finalized snapshot, retiring the oldest cycles past capacity.
    /// Returns how many were retired.
    pub fn publish(&mut self, cycle: u64, snapshot: Arc<InputSnapshot>) -> usize {
        self.frames.insert(cycle, snapshot);
        let mut retired = 0;
        while self.frames.len() > self.capacity {
            self.frames.pop_first();
            retired += 1;
        }
        retired
    }

    pub fn get(&self, cycle: u64) -> Option<&Arc<InputSnapshot>> {
        self.frames.get(&cycle)
    }

    /// Most recently published cycle and its snapshot.
    pub fn latest(&self) -> Option<(u64, &Arc<InputSnapshot>)> {
        self.frames.last_key_value().map(|(c, s)| (*c, s))
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = (&u64, &Arc<InputSnapshot>)> {
        self.frames.iter()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(time: f64) -> Arc<InputSnapshot> {
        let mut s = InputSnapshot::new();
        s.time = time;
        Arc::new(s)
    }

    #[test]
    fn test_publish_and_get() {
        let mut arena = SnapshotArena::new(4);
        arena.publish(0, snap(0.0));
        arena.publish(1, snap(0.5));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(1).unwrap().time, 0.5);
        assert!(arena.get(7).is_none());
        assert_eq!(arena.latest().map(|(c, _)| c), Some(1));
    }

    #[test]
    fn test_capacity_retires_oldest() {
        let mut arena = SnapshotArena::new(2);
        assert_eq!(arena.publish(0, snap(0.0)), 0);
        assert_eq!(arena.publish(1, snap(1.0)), 0);
        assert_eq!(arena.publish(2, snap(2.0)), 1);
        let cycles: Vec<u64> = arena.iter().map(|(c, _)| *c).collect();
        assert_eq!(cycles, vec![1, 2]);
    }

    #[test]
    fn test_capacity_clamped_to_pair() {
        assert_eq!(SnapshotArena::new(0).capacity(), 2);
        assert_eq!(SnapshotArena::new(1).capacity(), 2);
        assert_eq!(SnapshotArena::new(8).capacity(), 8);
    }

    #[test]
    fn test_retired_snapshot_survives_outside_holders() {
        let mut arena = SnapshotArena::new(2);
        let held = snap(0.0);
        arena.publish(0, Arc::clone(&held));
        arena.publish(1, snap(1.0));
        arena.publish(2, snap(2.0));
        assert!(arena.get(0).is_none());
        assert_eq!(Arc::strong_count(&held), 1);
        assert_eq!(held.time, 0.0);
    }

    #[test]
    fn test_empty_arena() {
        let arena = SnapshotArena::new(2);
        assert!(arena.is_empty());
        assert!(arena.latest().is_none());
    }
}
