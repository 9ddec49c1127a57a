//! Fixed-capacity pool of render-target slots plus an arena for persistent
//! targets.
//!
//! The pool does not talk to GL. It only decides which slot to use and keeps
//! slot state consistent; the display creates and deletes the framebuffers.

use slotmap::SlotMap;
use tracing::{debug, error, warn};

use crate::slot::{FboRef, PersistentKey, RenderTargetSlot, SlotState};

#[derive(Debug)]
pub struct FboPool {
    slots: Vec<RenderTargetSlot>,
    persistent: SlotMap<PersistentKey, RenderTargetSlot>,
}

impl FboPool {
    /// A pool of `capacity` unused slots. A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            warn!("FBO pool capacity 0 requested, using 1");
            1
        } else {
            capacity
        };

        Self {
            slots: vec![RenderTargetSlot::default(); capacity],
            persistent: SlotMap::with_key(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// The fixed slot array.
    pub fn slots(&self) -> &[RenderTargetSlot] {
        &self.slots
    }

    /// Persistent targets, which live outside the slot array.
    pub fn persistent(&self) -> impl Iterator<Item = (PersistentKey, &RenderTargetSlot)> {
        self.persistent.iter()
    }

    pub fn persistent_len(&self) -> usize {
        self.persistent.len()
    }

    pub fn get(&self, fbo_ref: FboRef) -> Option<&RenderTargetSlot> {
        match fbo_ref {
            FboRef::Pooled(index) => self.slots.get(index),
            FboRef::Persistent(key) => self.persistent.get(key),
        }
    }

    pub(crate) fn get_mut(&mut self, fbo_ref: FboRef) -> Option<&mut RenderTargetSlot> {
        match fbo_ref {
            FboRef::Pooled(index) => self.slots.get_mut(index),
            FboRef::Persistent(key) => self.persistent.get_mut(key),
        }
    }

    /// Pick the slot for a new transient render target.
    ///
    /// Returns the first unused slot, otherwise the transient slot that was
    /// used least recently (the first one wins ties). Persistent slots are
    /// never candidates. `None` means no slot could be reclaimed.
    pub fn find_or_evict_slot(&self) -> Option<usize> {
        let mut oldest: Option<usize> = None;

        for (i, slot) in self.slots.iter().enumerate() {
            match slot.state {
                SlotState::Unused => return Some(i),
                SlotState::Transient => {
                    let older = oldest
                        .map(|o| slot.last_use_time < self.slots[o].last_use_time)
                        .unwrap_or(true);
                    if older {
                        oldest = Some(i);
                    }
                }
                SlotState::Persistent => {}
            }
        }

        if oldest.is_none() {
            error!(
                "No reusable FBO slot among {} pooled slots",
                self.slots.len()
            );
        }
        oldest
    }

    /// Move a transient slot out of the array into the persistent arena.
    ///
    /// The framebuffer name and owner are kept; the array slot becomes
    /// unused. If `fbo_ref` does not name a transient slot in the array, the
    /// pool and its caller disagree about the slot's state: the error is
    /// logged and `fbo_ref` is returned unchanged.
    pub fn promote_to_persistent(&mut self, fbo_ref: FboRef) -> FboRef {
        let index = match fbo_ref {
            FboRef::Pooled(index) => index,
            FboRef::Persistent(key) => {
                error!(?key, "FBO is already persistent");
                return fbo_ref;
            }
        };

        let Some(slot) = self.slots.get_mut(index) else {
            error!("Could not find FBO slot {index} in pool");
            return fbo_ref;
        };
        if slot.state != SlotState::Transient {
            error!(
                "Could not find FBO {} in pool (slot {index} is {:?})",
                slot.fbo, slot.state
            );
            return fbo_ref;
        }

        let mut record = *slot;
        record.state = SlotState::Persistent;
        slot.reset();

        debug!("Persistent FBO: {}", record.fbo);
        FboRef::Persistent(self.persistent.insert(record))
    }

    /// Store a slot created persistent from the start.
    pub(crate) fn insert_persistent(&mut self, record: RenderTargetSlot) -> FboRef {
        debug_assert_eq!(record.state, SlotState::Persistent);
        FboRef::Persistent(self.persistent.insert(record))
    }

    /// Forget a render target: reset an array slot, or drop a persistent
    /// record. Returns what the slot held.
    pub(crate) fn release(&mut self, fbo_ref: FboRef) -> Option<RenderTargetSlot> {
        match fbo_ref {
            FboRef::Pooled(index) => {
                let slot = self.slots.get_mut(index)?;
                let old = *slot;
                slot.reset();
                Some(old)
            }
            FboRef::Persistent(key) => self.persistent.remove(key),
        }
    }

    /// Every non-zero framebuffer name held by the pool.
    pub fn framebuffers(&self) -> impl Iterator<Item = gl::types::GLuint> + '_ {
        self.slots
            .iter()
            .chain(self.persistent.values())
            .map(|s| s.fbo)
            .filter(|&fbo| fbo != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::BitmapId;
    use slotmap::KeyData;
    use std::time::Duration;

    fn owner(n: u64) -> Option<BitmapId> {
        Some(BitmapId::from(KeyData::from_ffi(n | (1 << 32))))
    }

    fn transient(pool: &mut FboPool, index: usize, fbo: u32, t: u64) {
        pool.slots[index] = RenderTargetSlot {
            state: SlotState::Transient,
            fbo,
            owner: owner(index as u64),
            last_use_time: Duration::from_millis(t),
        };
    }

    #[test]
    fn new_pool_is_all_unused() {
        let pool = FboPool::new(4);
        assert_eq!(pool.capacity(), 4);
        assert!(pool
            .slots()
            .iter()
            .all(|s| s.state() == SlotState::Unused && s.owner().is_none() && s.fbo() == 0));
        assert_eq!(FboPool::new(0).capacity(), 1);
    }

    #[test]
    fn unused_slot_wins_over_eviction() {
        let mut pool = FboPool::new(3);
        transient(&mut pool, 0, 1, 10);
        transient(&mut pool, 2, 3, 0);
        assert_eq!(pool.find_or_evict_slot(), Some(1));
    }

    #[test]
    fn evicts_least_recently_used() {
        let mut pool = FboPool::new(3);
        transient(&mut pool, 0, 1, 30);
        transient(&mut pool, 1, 2, 10);
        transient(&mut pool, 2, 3, 20);
        assert_eq!(pool.find_or_evict_slot(), Some(1));
    }

    #[test]
    fn ties_go_to_the_first_slot() {
        let mut pool = FboPool::new(3);
        transient(&mut pool, 0, 1, 20);
        transient(&mut pool, 1, 2, 5);
        transient(&mut pool, 2, 3, 5);
        assert_eq!(pool.find_or_evict_slot(), Some(1));
    }

    #[test]
    fn persistent_slots_are_never_candidates() {
        let mut pool = FboPool::new(2);
        transient(&mut pool, 0, 1, 50);
        pool.slots[1] = RenderTargetSlot {
            state: SlotState::Persistent,
            fbo: 2,
            owner: owner(9),
            last_use_time: Duration::ZERO,
        };
        assert_eq!(pool.find_or_evict_slot(), Some(0));

        pool.slots[0].state = SlotState::Persistent;
        assert_eq!(pool.find_or_evict_slot(), None);
    }

    #[test]
    fn promotion_keeps_handle_and_frees_slot() {
        let mut pool = FboPool::new(2);
        transient(&mut pool, 1, 42, 7);

        let promoted = pool.promote_to_persistent(FboRef::Pooled(1));
        assert!(promoted.is_persistent());

        let record = pool.get(promoted).copied().unwrap();
        assert_eq!(record.fbo(), 42);
        assert_eq!(record.state(), SlotState::Persistent);
        assert_eq!(record.owner(), owner(1));
        assert_eq!(record.last_use_time(), Duration::from_millis(7));

        assert_eq!(pool.slots()[1], RenderTargetSlot::default());
        assert_eq!(pool.find_or_evict_slot(), Some(0));
        assert_eq!(pool.framebuffers().collect::<Vec<_>>(), vec![42]);
    }

    #[test]
    fn promotion_of_unknown_slot_is_a_logged_no_op() {
        let mut pool = FboPool::new(2);
        transient(&mut pool, 0, 5, 1);

        assert_eq!(pool.promote_to_persistent(FboRef::Pooled(9)), FboRef::Pooled(9));
        // Slot 1 is unused, not transient.
        assert_eq!(pool.promote_to_persistent(FboRef::Pooled(1)), FboRef::Pooled(1));
        assert_eq!(pool.persistent_len(), 0);
        assert_eq!(pool.slots()[0].state(), SlotState::Transient);
    }

    #[test]
    fn release_resets_or_removes() {
        let mut pool = FboPool::new(1);
        transient(&mut pool, 0, 5, 1);
        let promoted = pool.promote_to_persistent(FboRef::Pooled(0));
        transient(&mut pool, 0, 6, 2);

        assert_eq!(pool.release(promoted).map(|s| s.fbo()), Some(5));
        assert_eq!(pool.release(promoted), None);
        assert_eq!(pool.release(FboRef::Pooled(0)).map(|s| s.fbo()), Some(6));
        assert_eq!(pool.framebuffers().count(), 0);
    }
}
