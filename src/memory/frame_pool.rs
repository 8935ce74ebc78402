/// Index of a physical frame inside the pool.
pub type FrameIndex = usize;

/// One physical frame. Identity is its position in the pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct Frame {
    pub occupied: bool,
}

/// Fixed set of physical frames with first-fit allocation.
///
/// The pool only tracks occupancy. Choosing a victim when nothing is free is
/// the memory manager's job.
#[derive(Debug)]
pub struct FramePool {
    frames: Vec<Frame>,
}

impl FramePool {
    /// Create a pool of `num_frames` free frames.
    pub fn new(num_frames: usize) -> Self {
        FramePool {
            frames: vec![Frame::default(); num_frames],
        }
    }

    /// Mark the first free frame occupied and return its index.
    pub fn allocate_free(&mut self) -> Option<FrameIndex> {
        let idx = self.frames.iter().position(|f| !f.occupied)?;
        self.frames[idx].occupied = true;
        Some(idx)
    }

    /// Mark a specific frame occupied. Returns false if it already was, or
    /// if the index is out of range.
    pub fn claim(&mut self, frame: FrameIndex) -> bool {
        match self.frames.get_mut(frame) {
            Some(f) if !f.occupied => {
                f.occupied = true;
                true
            }
            _ => false,
        }
    }

    /// Mark a frame free again. Out-of-range indexes are ignored.
    pub fn release(&mut self, frame: FrameIndex) {
        if let Some(f) = self.frames.get_mut(frame) {
            f.occupied = false;
        }
    }

    pub fn is_occupied(&self, frame: FrameIndex) -> bool {
        self.frames.get(frame).is_some_and(|f| f.occupied)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn occupied_count(&self) -> usize {
        self.frames.iter().filter(|f| f.occupied).count()
    }

    /// Indexes of all occupied frames, ascending.
    pub fn occupied_frames(&self) -> Vec<FrameIndex> {
        self.frames
            .iter()
            .enumerate()
            .filter(|(_, f)| f.occupied)
            .map(|(i, _)| i)
            .collect()
    }
}
