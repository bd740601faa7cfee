// Frame state module
// Owns the decoded frames, the display cursor and the load generation

use crate::image_loader::{Frame, LoadError};
use log::debug;
use std::fmt;

/// Called with the new state after every change
pub type Listener = Box<dyn FnMut(&FrameView<'_>)>;

/// Handle returned by [`FrameState::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Identifies one load attempt; only the latest one may fill the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

/// Result of a load attempt, tagged with the generation that requested it
#[derive(Debug)]
pub struct LoadOutcome {
    pub generation: Generation,
    pub result: Result<Vec<Frame>, LoadError>,
}

/// Read-only view of the frames and the cursor
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    frames: &'a [Frame],
    cursor: usize,
}

impl<'a> FrameView<'a> {
    pub fn new(frames: &'a [Frame], cursor: usize) -> Self {
        Self { frames, cursor }
    }

    /// The frame under the cursor, or `None` while nothing is loaded
    pub fn current(&self) -> Option<&'a Frame> {
        self.frames.get(self.cursor)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn total_frames(&self) -> usize {
        self.frames.len()
    }
}

/// The frame store and cursor.
///
/// The store is either empty or holds every frame of one source; frames are
/// only ever replaced as a whole by [`FrameState::install`].
#[derive(Default)]
pub struct FrameState {
    frames: Vec<Frame>,
    cursor: usize,
    generation: u64,
    next_subscription: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl FrameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> FrameView<'_> {
        FrameView::new(&self.frames, self.cursor)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn total_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn generation(&self) -> Generation {
        Generation(self.generation)
    }

    /// Register a change listener
    pub fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener; returns false if it was already gone
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Step to the next frame, wrapping around. No-op on an empty store.
    pub fn advance(&mut self) {
        if self.frames.is_empty() {
            return;
        }

        self.cursor = (self.cursor + 1) % self.frames.len();
        self.notify();
    }

    /// Empty the store, rewind the cursor and start a new generation.
    ///
    /// Outcomes of any earlier generation will be discarded by `install`.
    pub fn reset(&mut self) -> Generation {
        self.frames.clear();
        self.cursor = 0;
        self.generation += 1;
        debug!("Frame state reset, generation {}", self.generation);
        self.notify();
        self.generation()
    }

    /// Replace the store with `frames` if `generation` is still current.
    ///
    /// Returns false, leaving the state untouched, for stale generations.
    pub fn install(&mut self, generation: Generation, frames: Vec<Frame>) -> bool {
        if generation != self.generation() {
            debug!(
                "Discarding {} frames from stale generation {} (current {})",
                frames.len(),
                generation.0,
                self.generation
            );
            return false;
        }

        self.frames = frames;
        self.cursor = 0;
        self.notify();
        true
    }

    fn notify(&mut self) {
        let view = FrameView::new(&self.frames, self.cursor);
        for (_, listener) in self.listeners.iter_mut() {
            listener(&view);
        }
    }
}

impl fmt::Debug for FrameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameState")
            .field("frames", &self.frames.len())
            .field("cursor", &self.cursor)
            .field("generation", &self.generation)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
