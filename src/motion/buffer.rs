//! Bounded single-producer/single-consumer segment queue.
//!
//! The planner appends at the tail from the foreground context while the
//! step engine consumes from the head inside the timer interrupt. The queue
//! is `heapless::spsc`, which publishes each side's progress with a single
//! release store of the index, so the interrupt can never observe a
//! partially written segment and neither side ever blocks.
//!
//! Head mutation is realized as ownership transfer: the consumer moves the
//! head segment out with [`SegmentConsumer::take`] and the engine steps its
//! own exclusive copy. No segment is ever reachable from both contexts.

use heapless::spsc::{Consumer, Producer, Queue};

use crate::error::{Error, MotionError, Result};

use super::segment::Segment;

/// Backing store for the segment queue.
///
/// A queue of depth `DEPTH` holds `DEPTH - 1` segments (one slot
/// distinguishes full from empty). Place this in a static (or otherwise
/// pinned location) and [`split`](Self::split) it into the two endpoints.
pub struct SegmentQueue<const AXES: usize, const DEPTH: usize> {
    inner: Queue<Segment<AXES>, DEPTH>,
}

impl<const AXES: usize, const DEPTH: usize> SegmentQueue<AXES, DEPTH> {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            inner: Queue::new(),
        }
    }

    /// Split into the producer (foreground) and consumer (interrupt)
    /// endpoints.
    pub fn split(&mut self) -> (SegmentProducer<'_, AXES, DEPTH>, SegmentConsumer<'_, AXES, DEPTH>) {
        let (producer, consumer) = self.inner.split();
        (
            SegmentProducer { inner: producer },
            SegmentConsumer { inner: consumer },
        )
    }
}

impl<const AXES: usize, const DEPTH: usize> Default for SegmentQueue<AXES, DEPTH> {
    fn default() -> Self {
        Self::new()
    }
}

/// Foreground endpoint: appends segments at the tail.
pub struct SegmentProducer<'a, const AXES: usize, const DEPTH: usize> {
    inner: Producer<'a, Segment<AXES>, DEPTH>,
}

impl<const AXES: usize, const DEPTH: usize> SegmentProducer<'_, AXES, DEPTH> {
    /// Append a segment.
    ///
    /// # Errors
    ///
    /// Returns [`MotionError::BufferFull`] when the queue is at capacity and
    /// leaves the queue unchanged; the caller retries later (backpressure).
    pub fn enqueue(&mut self, segment: Segment<AXES>) -> Result<()> {
        self.inner
            .enqueue(segment)
            .map_err(|_| Error::Motion(MotionError::BufferFull))
    }

    /// Whether a slot is free right now.
    #[inline]
    pub fn ready(&self) -> bool {
        self.inner.ready()
    }

    /// Number of queued segments.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the queue is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }

    /// Usable capacity in segments.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }
}

/// Interrupt endpoint: consumes segments from the head.
pub struct SegmentConsumer<'a, const AXES: usize, const DEPTH: usize> {
    inner: Consumer<'a, Segment<AXES>, DEPTH>,
}

impl<const AXES: usize, const DEPTH: usize> SegmentConsumer<'_, AXES, DEPTH> {
    /// Take the head segment, transferring ownership to the caller.
    ///
    /// Returns `None` when the queue is empty (machine idle).
    #[inline]
    pub fn take(&mut self) -> Option<Segment<AXES>> {
        self.inner.dequeue()
    }

    /// Peek the head segment without consuming it.
    #[inline]
    pub fn peek(&self) -> Option<&Segment<AXES>> {
        self.inner.peek()
    }

    /// Number of queued segments.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the queue is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }

    /// Discard all queued segments. Only call with the tick interrupt
    /// stopped (see the abort sequence).
    pub fn drain(&mut self) {
        while self.inner.dequeue().is_some() {}
    }
}
