use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    #[default]
    Idle,
    Recording,
}

impl RecordingState {
    pub fn is_recording(&self) -> bool {
        matches!(self, RecordingState::Recording)
    }
}

/// Encoder output for the recording in progress, in arrival order.
#[derive(Debug)]
pub struct ChunkBuffer<B> {
    chunks: Vec<B>,
}

impl<B> ChunkBuffer<B> {
    pub fn new() -> Self {
        Self { chunks: Vec::new() }
    }

    pub fn push(&mut self, chunk: B) {
        self.chunks.push(chunk);
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
    }

    /// Takes every buffered chunk, leaving the buffer empty for the next recording.
    pub fn take(&mut self) -> Vec<B> {
        std::mem::take(&mut self.chunks)
    }
}

impl<B> Default for ChunkBuffer<B> {
    fn default() -> Self {
        Self::new()
    }
}

/// Buffer shared between the app state and the encoder's data callback.
pub type SharedChunks<B> = Rc<RefCell<ChunkBuffer<B>>>;

pub fn shared_chunks<B>() -> SharedChunks<B> {
    Rc::new(RefCell::new(ChunkBuffer::new()))
}
