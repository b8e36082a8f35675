//! Bounded frame buffer with gap interpolation
//!
//! The buffer is the only owner of captured frames between decisions. It is
//! an explicit ring: capacity is fixed once per session from the model mode,
//! and `push`/`clear` are the only mutators. Interpolation never mutates the
//! captured order — it produces a gap-free copy for inference.

use std::collections::VecDeque;

use crate::session::error::SessionError;
use crate::types::LandmarkFrame;

/// Ordered, capacity-bounded buffer of landmark frames with FIFO eviction.
#[derive(Debug)]
pub struct SequenceBuffer {
    frames: VecDeque<LandmarkFrame>,
    capacity: usize,
}

impl SequenceBuffer {
    /// Create a buffer sized for the current mode's decision window.
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a frame, evicting the oldest when the buffer is at capacity.
    pub fn push(&mut self, frame: LandmarkFrame) {
        if self.frames.len() >= self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.frames.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all buffered frames.
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Resize for a new mode and drop any frames captured under the old one.
    pub fn reset_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.frames.clear();
    }

    /// Snapshot the buffered frames in capture order.
    pub fn window(&self) -> Vec<LandmarkFrame> {
        self.frames.iter().cloned().collect()
    }

    /// A gap-free copy of the buffer, ready for inference.
    ///
    /// See [`interpolate_gaps`] for the algorithm.
    pub fn interpolated(&self) -> Result<Vec<LandmarkFrame>, SessionError> {
        interpolate_gaps(&self.window())
    }
}

/// Fill missing frames from their nearest detected neighbors.
///
/// For each frame with `present == false`: the nearest present frame
/// backward (`p`) and forward (`n`) are located. With both, each coordinate
/// is linearly interpolated at `t = (i - p) / (n - p)`; with only one side,
/// that side's values are held. A window with no detections at all is
/// undecidable — the models cannot handle signal-free holes and feeding
/// them zeros silently degrades accuracy.
pub fn interpolate_gaps(window: &[LandmarkFrame]) -> Result<Vec<LandmarkFrame>, SessionError> {
    if !window.iter().any(|f| f.present) {
        return Err(SessionError::UndecidableSequence);
    }

    let mut filled = window.to_vec();
    for i in 0..filled.len() {
        if filled[i].present {
            continue;
        }

        let prev = window[..i].iter().rposition(|f| f.present);
        let next = window[i + 1..]
            .iter()
            .position(|f| f.present)
            .map(|offset| i + 1 + offset);

        filled[i] = match (prev, next) {
            (Some(p), Some(n)) => {
                let t = (i - p) as f32 / (n - p) as f32;
                let coords = window[p]
                    .coords
                    .iter()
                    .zip(&window[n].coords)
                    .map(|(&a, &b)| a + (b - a) * t)
                    .collect();
                LandmarkFrame::detected(coords)
            }
            (Some(p), None) => LandmarkFrame::detected(window[p].coords.clone()),
            (None, Some(n)) => LandmarkFrame::detected(window[n].coords.clone()),
            // Unreachable: at least one present frame exists.
            (None, None) => return Err(SessionError::UndecidableSequence),
        };
    }

    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(value: f32) -> LandmarkFrame {
        LandmarkFrame::detected(vec![value; 4])
    }

    #[test]
    fn test_push_and_len() {
        let mut buffer = SequenceBuffer::new(3);
        assert!(buffer.is_empty());
        buffer.push(frame(1.0));
        buffer.push(frame(2.0));
        assert_eq!(buffer.len(), 2);
        assert!(!buffer.is_full());
    }

    #[test]
    fn test_fifo_eviction_at_capacity() {
        let mut buffer = SequenceBuffer::new(3);
        for v in [1.0, 2.0, 3.0, 4.0] {
            buffer.push(frame(v));
        }
        assert_eq!(buffer.len(), 3);
        let window = buffer.window();
        assert_eq!(window[0].coords[0], 2.0);
        assert_eq!(window[2].coords[0], 4.0);
    }

    #[test]
    fn test_clear_empties_buffer() {
        let mut buffer = SequenceBuffer::new(2);
        buffer.push(frame(1.0));
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 2);
    }

    #[test]
    fn test_reset_capacity_drops_frames() {
        let mut buffer = SequenceBuffer::new(2);
        buffer.push(frame(1.0));
        buffer.reset_capacity(10);
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 10);
    }

    #[test]
    fn test_interpolate_between_neighbors() {
        let window = vec![
            frame(0.0),
            LandmarkFrame::missing(4),
            LandmarkFrame::missing(4),
            frame(3.0),
        ];
        let filled = interpolate_gaps(&window).unwrap();
        assert!(filled.iter().all(|f| f.present));
        assert!((filled[1].coords[0] - 1.0).abs() < 1e-6);
        assert!((filled[2].coords[0] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_interpolated_values_stay_between_neighbors() {
        let window = vec![
            frame(0.2),
            LandmarkFrame::missing(4),
            frame(0.8),
        ];
        let filled = interpolate_gaps(&window).unwrap();
        for c in &filled[1].coords {
            assert!(*c >= 0.2 && *c <= 0.8);
        }
    }

    #[test]
    fn test_hold_fill_at_boundaries() {
        let window = vec![
            LandmarkFrame::missing(4),
            frame(5.0),
            LandmarkFrame::missing(4),
        ];
        let filled = interpolate_gaps(&window).unwrap();
        assert_eq!(filled[0].coords, filled[1].coords);
        assert_eq!(filled[2].coords, filled[1].coords);
    }

    #[test]
    fn test_all_missing_is_undecidable() {
        let window = vec![LandmarkFrame::missing(4), LandmarkFrame::missing(4)];
        assert_eq!(
            interpolate_gaps(&window),
            Err(SessionError::UndecidableSequence)
        );
    }

    #[test]
    fn test_interpolation_does_not_mutate_buffer() {
        let mut buffer = SequenceBuffer::new(3);
        buffer.push(frame(1.0));
        buffer.push(LandmarkFrame::missing(4));
        buffer.push(frame(2.0));
        let _ = buffer.interpolated().unwrap();
        // The captured order still carries the original missing frame.
        assert!(!buffer.window()[1].present);
    }
}
