//! Segmented memory: a dense vector of optional segments indexed by
//! id, plus a LIFO pool of released ids.

use crate::error::{ProgramFault, ResourceError};
use log::trace;

/// Owns every mapped segment and recycles released ids.
///
/// Segment 0 is always present (it holds the executing program) and is
/// the implicit target of instruction fetch; every other id is either
/// absent, or present with the size it was last `map`-ped at.
#[derive(Debug)]
pub struct SegmentStore {
    segments: Vec<Option<Vec<u32>>>,
    free: Vec<u32>,
}

impl SegmentStore {
    /// Build the store from a program image already assembled into
    /// big-endian words; the image becomes segment 0.
    pub fn new_from_program(program: Vec<u32>) -> SegmentStore {
        SegmentStore { segments: vec![Some(program)], free: Vec::new() }
    }

    /// Length of segment 0, used by the dispatch loop to detect
    /// `PcOverrun`.
    pub fn program_len(&self) -> u32 {
        self.segments[0].as_ref().unwrap().len() as u32
    }

    /// Allocate a zero-initialized segment of `size` words and return
    /// its id. Reuses a released id before extending the high-water
    /// mark.
    pub fn map(&mut self, size: u32) -> Result<u32, ResourceError> {
        let segment = vec![0_u32; size as usize];
        if let Some(id) = self.free.pop() {
            self.segments[id as usize] = Some(segment);
            trace!("mapped segment {id} (size {size}, recycled)");
            return Ok(id);
        }
        if self.segments.len() as u64 >= u32::MAX as u64 {
            return Err(ResourceError::SegmentLimitExceeded);
        }
        let id = self.segments.len() as u32;
        self.segments.push(Some(segment));
        trace!("mapped segment {id} (size {size})");
        Ok(id)
    }

    /// Release the segment at `id`. `id` must be non-zero and present.
    pub fn unmap(&mut self, id: u32) -> Result<(), ProgramFault> {
        if id == 0 {
            return Err(ProgramFault::UnmapSegmentZero { pc: 0 });
        }
        let slot = self
            .segments
            .get_mut(id as usize)
            .and_then(|s| s.take())
            .ok_or(ProgramFault::InvalidSegment { pc: 0, id })?;
        drop(slot);
        self.free.push(id);
        trace!("unmapped segment {id}");
        Ok(())
    }

    fn segment(&self, id: u32) -> Result<&Vec<u32>, ProgramFault> {
        self.segments
            .get(id as usize)
            .and_then(|s| s.as_ref())
            .ok_or(ProgramFault::InvalidSegment { pc: 0, id })
    }

    /// Read the word at `(id, offset)`.
    pub fn load(&self, id: u32, offset: u32) -> Result<u32, ProgramFault> {
        let segment = self.segment(id)?;
        segment.get(offset as usize).copied().ok_or(ProgramFault::OutOfBounds {
            pc: 0,
            id,
            offset,
            len: segment.len() as u32,
        })
    }

    /// Write `word` at `(id, offset)`.
    pub fn store(&mut self, id: u32, offset: u32, word: u32) -> Result<(), ProgramFault> {
        let len = self.segment(id)?.len() as u32;
        if offset >= len {
            return Err(ProgramFault::OutOfBounds { pc: 0, id, offset, len });
        }
        self.segments[id as usize].as_mut().unwrap()[offset as usize] = word;
        Ok(())
    }

    /// Fetch the instruction word at segment 0 offset `pc`.
    pub fn fetch(&self, pc: u32) -> Result<u32, ProgramFault> {
        self.load(0, pc)
    }

    /// Replace segment 0's storage with a duplicate of segment `id`.
    /// A no-op when `id == 0`, per spec (and a strongly recommended
    /// fast path: most hot loops `LOADP` back into their own segment).
    pub fn clone_to_zero(&mut self, id: u32) -> Result<(), ProgramFault> {
        if id == 0 {
            return Ok(());
        }
        let duplicate = self.segment(id)?.clone();
        trace!("cloned segment {id} into segment 0 ({} words)", duplicate.len());
        self.segments[0] = Some(duplicate);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_store_load_round_trip() {
        let mut store = SegmentStore::new_from_program(vec![0]);
        let id = store.map(10).unwrap();
        for i in 0..10 {
            store.store(id, i, i * 2).unwrap();
        }
        for i in 0..10 {
            assert_eq!(store.load(id, i).unwrap(), i * 2);
        }
    }

    #[test]
    fn unmap_then_map_recycles_the_id_before_extending() {
        let mut store = SegmentStore::new_from_program(vec![0]);
        let a = store.map(1).unwrap();
        let b = store.map(1).unwrap();
        store.unmap(a).unwrap();
        let c = store.map(1).unwrap();
        assert_eq!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn unmapping_id_zero_is_rejected() {
        let mut store = SegmentStore::new_from_program(vec![0]);
        assert!(matches!(
            store.unmap(0),
            Err(ProgramFault::UnmapSegmentZero { .. })
        ));
    }

    #[test]
    fn unmapping_twice_fails_the_second_time() {
        let mut store = SegmentStore::new_from_program(vec![0]);
        let id = store.map(1).unwrap();
        store.unmap(id).unwrap();
        assert!(matches!(
            store.unmap(id),
            Err(ProgramFault::InvalidSegment { .. })
        ));
    }

    #[test]
    fn out_of_bounds_load_fails() {
        let store = {
            let mut s = SegmentStore::new_from_program(vec![0]);
            s.map(4).unwrap();
            s
        };
        assert!(matches!(
            store.load(1, 4),
            Err(ProgramFault::OutOfBounds { .. })
        ));
    }

    #[test]
    fn clone_to_zero_is_a_genuine_copy() {
        let mut store = SegmentStore::new_from_program(vec![0, 0]);
        let id = store.map(2).unwrap();
        store.store(id, 0, 42).unwrap();

        store.clone_to_zero(id).unwrap();
        assert_eq!(store.load(0, 0).unwrap(), 42);

        // Writes to segment 0 must not leak back into segment `id`.
        store.store(0, 0, 99).unwrap();
        assert_eq!(store.load(id, 0).unwrap(), 42);
    }

    #[test]
    fn clone_to_zero_of_zero_is_a_no_op() {
        let mut store = SegmentStore::new_from_program(vec![7, 8, 9]);
        store.clone_to_zero(0).unwrap();
        assert_eq!(store.load(0, 0).unwrap(), 7);
    }

    #[test]
    fn double_clone_is_idempotent_when_source_is_unchanged() {
        let mut store = SegmentStore::new_from_program(vec![0]);
        let id = store.map(3).unwrap();
        store.store(id, 1, 5).unwrap();

        store.clone_to_zero(id).unwrap();
        let after_first: Vec<u32> = (0..3).map(|i| store.load(0, i).unwrap()).collect();
        store.clone_to_zero(id).unwrap();
        let after_second: Vec<u32> = (0..3).map(|i| store.load(0, i).unwrap()).collect();
        assert_eq!(after_first, after_second);
    }
}
