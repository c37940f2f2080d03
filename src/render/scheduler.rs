/// Redraw coalescing
///
/// Slider ticks and pointer moves can arrive far faster than the display
/// refreshes. Changes only raise a pending flag; the window frame callback
/// takes the flag and performs at most one redraw per frame.

#[derive(Debug, Clone, Copy, Default)]
pub struct RedrawScheduler {
    pending: bool,
    redraws: u64,
}

impl RedrawScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Something changed; redraw on the next frame
    pub fn request(&mut self) {
        self.pending = true;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Called once per display frame. Returns `true` if a redraw is due,
    /// clearing the pending flag.
    pub fn take_frame(&mut self) -> bool {
        if !self.pending {
            return false;
        }
        self.pending = false;
        self.redraws += 1;
        true
    }

    /// Drop a pending redraw without drawing
    pub fn cancel(&mut self) {
        self.pending = false;
    }

    /// Number of redraws performed so far
    pub fn redraw_count(&self) -> u64 {
        self.redraws
    }
}
