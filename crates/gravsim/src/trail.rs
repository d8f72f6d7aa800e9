//! Rolling history of recent particle positions.
//!
//! Consumers that draw trails need positions from several past steps, but
//! the state overwrites its buffers in place every step. A `PositionTrail`
//! copies each frame it is given into a fixed-capacity ring buffer.

use std::collections::VecDeque;

use crate::state::Vector;

/// Fixed-capacity ring buffer of position frames, oldest first
///
/// # Examples
///
/// ```
/// use gravsim::trail::PositionTrail;
/// use nalgebra::Vector2;
///
/// let mut trail = PositionTrail::<2>::new(2);
/// trail.record(&[Vector2::new(0.0, 0.0)]);
/// trail.record(&[Vector2::new(1.0, 0.0)]);
/// trail.record(&[Vector2::new(2.0, 0.0)]);
///
/// assert_eq!(trail.len(), 2);
/// assert_eq!(trail.latest().unwrap()[0].x, 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct PositionTrail<const D: usize> {
    capacity: usize,
    frames: VecDeque<Vec<Vector<D>>>,
}

impl<const D: usize> PositionTrail<D> {
    /// Creates an empty trail keeping at most `capacity` frames (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            frames: VecDeque::with_capacity(capacity),
        }
    }

    /// Copy a frame in, evicting the oldest one when full
    pub fn record(&mut self, positions: &[Vector<D>]) {
        if self.frames.len() == self.capacity {
            // reuse the evicted allocation
            if let Some(mut frame) = self.frames.pop_front() {
                frame.clear();
                frame.extend_from_slice(positions);
                self.frames.push_back(frame);
                return;
            }
        }
        self.frames.push_back(positions.to_vec());
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Frames in chronological order
    pub fn frames(&self) -> impl Iterator<Item = &[Vector<D>]> {
        self.frames.iter().map(Vec::as_slice)
    }

    pub fn latest(&self) -> Option<&[Vector<D>]> {
        self.frames.back().map(Vec::as_slice)
    }

    /// Every recorded position of every frame, oldest frame first
    pub fn points(&self) -> impl Iterator<Item = &Vector<D>> {
        self.frames.iter().flatten()
    }
}
