use crate::store::TrackStore;
use log::debug;
use std::ops::RangeInclusive;

/// Temporary identity used while swapping; never produced by the tracker
pub const SWAP_SENTINEL_ID: u64 = u64::MAX;

impl TrackStore {
    /// Inclusive frame range clamped to the stored frames
    ///
    fn frame_range(&self, from: usize, to: Option<usize>) -> Option<RangeInclusive<usize>> {
        if from >= self.boxes.len() {
            return None;
        }
        let to = to.unwrap_or(usize::MAX).min(self.boxes.len() - 1);
        if from > to {
            return None;
        }
        Some(from..=to)
    }

    fn replace_id(&mut self, range: RangeInclusive<usize>, from_id: u64, to_id: u64) -> usize {
        let mut replaced = 0;
        for frame in &mut self.boxes[range] {
            for record in frame.iter_mut().filter(|r| r.id == from_id) {
                record.id = to_id;
                replaced += 1;
            }
        }
        replaced
    }

    /// Exchanges identities `a` and `b` in frames `from..=to` (up to the last frame when `to`
    /// is `None`).
    ///
    /// The exchange goes through [`SWAP_SENTINEL_ID`] in three passes so that a record already
    /// renamed to `a` is not renamed again.
    ///
    /// # Returns
    /// The number of records that changed identity
    ///
    pub fn swap_ids(&mut self, a: u64, b: u64, from: usize, to: Option<usize>) -> usize {
        if a == b {
            return 0;
        }
        let range = match self.frame_range(from, to) {
            Some(range) => range,
            None => return 0,
        };

        let renamed_a = self.replace_id(range.clone(), a, SWAP_SENTINEL_ID);
        let renamed_b = self.replace_id(range.clone(), b, a);
        self.replace_id(range.clone(), SWAP_SENTINEL_ID, b);

        debug!(
            "Swapped ids {} and {} in frames {:?}: {} records",
            a,
            b,
            range,
            renamed_a + renamed_b
        );
        renamed_a + renamed_b
    }

    /// Deletes every record of identity `id` in frames `from..=to` (up to the last frame when
    /// `to` is `None`). Remaining identities are not renumbered.
    ///
    /// # Returns
    /// The number of removed records
    ///
    pub fn remove_ids(&mut self, id: u64, from: usize, to: Option<usize>) -> usize {
        let range = match self.frame_range(from, to) {
            Some(range) => range,
            None => return 0,
        };

        let mut removed = 0;
        for frame in &mut self.boxes[range.clone()] {
            let before = frame.len();
            frame.retain(|r| r.id != id);
            removed += before - frame.len();
        }

        debug!("Removed id {} in frames {:?}: {} records", id, range, removed);
        removed
    }

    /// Prepends `count` empty frames, realigning the store with a video whose opening frames
    /// were not tracked
    ///
    pub fn pad_front(&mut self, count: usize) {
        let mut padded = vec![Vec::new(); count];
        padded.append(&mut self.boxes);
        self.boxes = padded;
    }

    /// Keeps the first `frames` frames
    ///
    pub fn truncate(&mut self, frames: usize) {
        self.boxes.truncate(frames);
    }
}
