// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll targets and animated scroll motion (drag, momentum, smooth scroll).

use easel_surface::{Duration, HostTime};

/// Where to place an element when scrolling it into view.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScrollAlign {
    /// Element top at the frame top.
    Start,
    /// Element centered in the frame.
    Center,
    /// Element bottom at the frame bottom.
    End,
    /// Smallest scroll that makes the element fully visible; none if it already is.
    #[default]
    Nearest,
}

/// Offset that brings `[start, end)` into a frame of `frame_height` currently at `offset`.
///
/// The result is not clamped.
pub fn align_offset(start: f64, end: f64, frame_height: f64, offset: f64, align: ScrollAlign) -> f64 {
    match align {
        ScrollAlign::Start => start,
        ScrollAlign::Center => start + (end - start) / 2.0 - frame_height / 2.0,
        ScrollAlign::End => end - frame_height,
        ScrollAlign::Nearest => {
            if start < offset {
                start
            } else if end > offset + frame_height {
                // Taller than the frame: keep its top visible.
                (end - frame_height).min(start)
            } else {
                offset
            }
        }
    }
}

/// Ease-out cubic over `t` in `[0, 1]`.
pub fn ease_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// In-flight motion of one region.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum Motion {
    #[default]
    Idle,
    /// Pointer or touch is down.
    Dragging {
        last_y: f64,
        last_time: HostTime,
        /// Units per millisecond, positive scrolls down.
        velocity: f64,
    },
    /// Released drag decaying under friction.
    Momentum { velocity: f64, last_time: HostTime },
    /// Eased scroll toward a target.
    Smooth {
        from: f64,
        to: f64,
        start: HostTime,
        duration: Duration,
    },
}

impl Motion {
    pub(crate) fn is_animating(&self) -> bool {
        matches!(self, Self::Momentum { .. } | Self::Smooth { .. })
    }
}

/// Displacement and remaining velocity after `elapsed` ms of exponential decay.
///
/// Velocity decays by `friction` every `frame` ms; integrating gives the
/// distance travelled, so stepping with uneven host frames lands in the same
/// place as stepping every frame.
pub(crate) fn decay(velocity: f64, elapsed: f64, friction: f64, frame: f64) -> (f64, f64) {
    if elapsed <= 0.0 || frame <= 0.0 {
        return (0.0, velocity);
    }
    let friction = friction.clamp(0.0, 0.999_999);
    if friction <= 0.0 {
        return (0.0, 0.0);
    }
    let factor = friction.powf(elapsed / frame);
    let rate = -friction.ln() / frame;
    let distance = velocity * (1.0 - factor) / rate;
    (distance, velocity * factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_is_minimal() {
        // Frame shows [100, 300).
        assert_eq!(align_offset(150.0, 200.0, 200.0, 100.0, ScrollAlign::Nearest), 100.0);
        assert_eq!(align_offset(50.0, 90.0, 200.0, 100.0, ScrollAlign::Nearest), 50.0);
        assert_eq!(align_offset(320.0, 360.0, 200.0, 100.0, ScrollAlign::Nearest), 160.0);
        assert_eq!(align_offset(320.0, 360.0, 200.0, 100.0, ScrollAlign::Start), 320.0);
        assert_eq!(align_offset(320.0, 360.0, 200.0, 100.0, ScrollAlign::End), 160.0);
        assert_eq!(align_offset(320.0, 360.0, 200.0, 100.0, ScrollAlign::Center), 240.0);
    }

    #[test]
    fn decay_is_frame_rate_independent() {
        let (d_once, v_once) = decay(2.0, 64.0, 0.95, 16.0);
        let mut d = 0.0;
        let mut v = 2.0;
        for _ in 0..4 {
            let (step, next) = decay(v, 16.0, 0.95, 16.0);
            d += step;
            v = next;
        }
        assert!((d - d_once).abs() < 1e-9, "{d} vs {d_once}");
        assert!((v - v_once).abs() < 1e-12);
        assert!((v_once - 2.0 * 0.95_f64.powi(4)).abs() < 1e-12);
    }

    #[test]
    fn ease_out_bounds() {
        assert_eq!(ease_out(0.0), 0.0);
        assert_eq!(ease_out(1.0), 1.0);
        assert!(ease_out(0.5) > 0.5, "ease-out front-loads progress");
    }
}
