//! The segmented address space.
//!
//! Segments live in an arena of slots indexed by their identifier. Slot 0
//! always holds the running program. Unmapping a slot drops its words and
//! puts the id on a free list; the next allocation reuses the *lowest* free
//! id before the arena grows, so a known sequence of map/unmap calls always
//! yields the same identifiers.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::UmError;

#[derive(Debug, Clone, Default)]
struct Slot {
    words: Vec<u32>,
    mapped: bool,
}

#[derive(Debug, Clone)]
pub struct SegmentTable {
    slots: Vec<Slot>,
    // min-heap of unmapped ids, holds exactly the slots with `mapped == false`
    free: BinaryHeap<Reverse<u32>>,
}

impl SegmentTable {
    /// Creates a table whose segment 0 holds `program`.
    pub fn new(program: Vec<u32>) -> Self {
        Self {
            slots: vec![Slot {
                words: program,
                mapped: true,
            }],
            free: BinaryHeap::new(),
        }
    }

    /// Maps a new zero-filled segment of `size` words and returns its id.
    pub fn allocate(&mut self, size: u32) -> u32 {
        let words = vec![0; size as usize];

        if let Some(Reverse(id)) = self.free.pop() {
            let slot = &mut self.slots[id as usize];
            debug_assert!(!slot.mapped, "free list held mapped segment {id}");
            slot.words = words;
            slot.mapped = true;
            tracing::trace!(id, size, "Reused segment slot");
            return id;
        }

        let id = self.slots.len() as u32;
        self.slots.push(Slot {
            words,
            mapped: true,
        });
        tracing::trace!(id, size, "Appended segment slot");
        id
    }

    /// Unmaps segment `id` and releases its words.
    ///
    /// Segment 0, free slots and unknown ids are rejected with
    /// [`UmError::InvalidSegment`].
    pub fn free(&mut self, id: u32) -> Result<(), UmError> {
        if id == 0 {
            return Err(UmError::InvalidSegment(id));
        }
        let slot = self
            .slots
            .get_mut(id as usize)
            .filter(|slot| slot.mapped)
            .ok_or(UmError::InvalidSegment(id))?;

        slot.mapped = false;
        slot.words = Vec::new();
        self.free.push(Reverse(id));
        tracing::trace!(id, "Unmapped segment");
        Ok(())
    }

    pub fn read(&self, id: u32, offset: u32) -> Result<u32, UmError> {
        self.segment(id)
            .and_then(|words| words.get(offset as usize))
            .copied()
            .ok_or(UmError::SegmentFault {
                segment: id,
                offset,
            })
    }

    pub fn write(&mut self, id: u32, offset: u32, word: u32) -> Result<(), UmError> {
        let cell = self
            .slots
            .get_mut(id as usize)
            .filter(|slot| slot.mapped)
            .and_then(|slot| slot.words.get_mut(offset as usize))
            .ok_or(UmError::SegmentFault {
                segment: id,
                offset,
            })?;
        *cell = word;
        Ok(())
    }

    /// Replaces segment 0 with a copy of segment `id`.
    ///
    /// Segment `id` stays mapped and independent of the new program: later
    /// writes to it do not reach segment 0. `id == 0` is a no-op.
    pub fn replace_segment_zero(&mut self, id: u32) -> Result<(), UmError> {
        if id == 0 {
            return Ok(());
        }
        if !self.is_mapped(id) {
            return Err(UmError::SegmentFault {
                segment: id,
                offset: 0,
            });
        }

        let (program, rest) = self.slots.split_at_mut(1);
        program[0].words.clone_from(&rest[id as usize - 1].words);
        tracing::debug!(
            source = id,
            len = program[0].words.len(),
            "Replaced segment 0"
        );
        Ok(())
    }

    /// The words of a mapped segment.
    pub fn segment(&self, id: u32) -> Option<&[u32]> {
        self.slots
            .get(id as usize)
            .filter(|slot| slot.mapped)
            .map(|slot| slot.words.as_slice())
    }

    pub fn is_mapped(&self, id: u32) -> bool {
        self.segment(id).is_some()
    }

    pub fn segment_len(&self, id: u32) -> Option<usize> {
        self.segment(id).map(<[u32]>::len)
    }

    /// Number of currently mapped segments, segment 0 included.
    pub fn mapped_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_zero_holds_program() {
        let table = SegmentTable::new(vec![1, 2, 3]);
        assert_eq!(table.segment(0), Some(&[1, 2, 3][..]));
        assert_eq!(table.mapped_count(), 1);
    }

    #[test]
    fn test_allocate_appends_zeroed_segments() {
        let mut table = SegmentTable::new(vec![]);
        assert_eq!(table.allocate(4), 1);
        assert_eq!(table.allocate(2), 2);
        assert_eq!(table.segment(1), Some(&[0, 0, 0, 0][..]));
        assert_eq!(table.segment_len(2), Some(2));
        assert_eq!(table.mapped_count(), 3);
    }

    #[test]
    fn test_zero_sized_segment() {
        let mut table = SegmentTable::new(vec![]);
        let id = table.allocate(0);
        assert_eq!(table.segment_len(id), Some(0));
        assert_eq!(
            table.read(id, 0),
            Err(UmError::SegmentFault {
                segment: id,
                offset: 0
            })
        );
    }

    #[test]
    fn test_reuses_lowest_free_id() {
        let mut table = SegmentTable::new(vec![]);
        for _ in 0..4 {
            table.allocate(1);
        }
        table.free(3).unwrap();
        table.free(1).unwrap();
        table.free(2).unwrap();

        assert_eq!(table.allocate(1), 1);
        assert_eq!(table.allocate(1), 2);
        assert_eq!(table.allocate(1), 3);
        assert_eq!(table.allocate(1), 5);
    }

    #[test]
    fn test_reused_segment_is_zeroed() {
        let mut table = SegmentTable::new(vec![]);
        let id = table.allocate(3);
        table.write(id, 1, 99).unwrap();
        table.free(id).unwrap();

        let again = table.allocate(3);
        assert_eq!(again, id);
        assert_eq!(table.segment(again), Some(&[0, 0, 0][..]));
    }

    #[test]
    fn test_read_write_bounds() {
        let mut table = SegmentTable::new(vec![]);
        let id = table.allocate(2);
        table.write(id, 1, 7).unwrap();
        assert_eq!(table.read(id, 1), Ok(7));
        assert_eq!(
            table.write(id, 2, 7),
            Err(UmError::SegmentFault {
                segment: id,
                offset: 2
            })
        );
        assert_eq!(
            table.read(9, 0),
            Err(UmError::SegmentFault {
                segment: 9,
                offset: 0
            })
        );
    }

    #[test]
    fn test_access_to_unmapped_segment_faults() {
        let mut table = SegmentTable::new(vec![]);
        let id = table.allocate(2);
        table.free(id).unwrap();
        assert!(matches!(
            table.read(id, 0),
            Err(UmError::SegmentFault { .. })
        ));
        assert!(matches!(
            table.write(id, 0, 1),
            Err(UmError::SegmentFault { .. })
        ));
    }

    #[test]
    fn test_free_rejects_invalid_targets() {
        let mut table = SegmentTable::new(vec![]);
        let id = table.allocate(1);

        assert_eq!(table.free(0), Err(UmError::InvalidSegment(0)));
        assert_eq!(table.free(42), Err(UmError::InvalidSegment(42)));

        table.free(id).unwrap();
        assert_eq!(table.free(id), Err(UmError::InvalidSegment(id)));
        assert_eq!(table.mapped_count(), 1);
    }

    #[test]
    fn test_replace_segment_zero_copies() {
        let mut table = SegmentTable::new(vec![0xAAAA]);
        let id = table.allocate(2);
        table.write(id, 0, 0x7000_0000).unwrap();

        table.replace_segment_zero(id).unwrap();
        assert_eq!(table.segment(0), Some(&[0x7000_0000, 0][..]));

        // the source is still its own segment
        table.write(id, 0, 5).unwrap();
        assert_eq!(table.read(0, 0), Ok(0x7000_0000));
        assert_eq!(table.read(id, 0), Ok(5));
    }

    #[test]
    fn test_replace_segment_zero_with_itself_is_noop() {
        let mut table = SegmentTable::new(vec![1, 2]);
        table.replace_segment_zero(0).unwrap();
        assert_eq!(table.segment(0), Some(&[1, 2][..]));
    }

    #[test]
    fn test_replace_segment_zero_from_unmapped_faults() {
        let mut table = SegmentTable::new(vec![1]);
        let id = table.allocate(1);
        table.free(id).unwrap();
        assert!(table.replace_segment_zero(id).is_err());
        assert!(table.replace_segment_zero(77).is_err());
        assert_eq!(table.segment(0), Some(&[1][..]));
    }
}
