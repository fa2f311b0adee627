// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Press-to-release pointer tracking.
//!
//! ## Usage
//!
//! 1) Call [`DragState::press`] with the device position and button.
//! 2) Feed every move to [`DragState::update`]; it returns the step since the
//!    last move.
//! 3) [`DragState::release`] ends the gesture and reports whether it was a
//!    drag or a click.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::Point;
//! use whitebox_canvas::{DragState, MouseButton, Release};
//!
//! let mut drag = DragState::new(2.0);
//! drag.press(Point::new(10.0, 20.0), MouseButton::Primary);
//! drag.update(Point::new(11.0, 20.0));
//!
//! // One pixel of jitter stays a click.
//! let release = drag.release(Point::new(11.0, 20.0));
//! assert!(matches!(release, Some(Release::Click { .. })));
//! ```

use kurbo::{Point, Rect, Vec2};

/// Pointer buttons the canvas reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Usually the left button.
    Primary,
    /// Usually the right button.
    Secondary,
    /// Wheel button.
    Middle,
}

/// How a press ended.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Release {
    /// The pointer stayed within the drag threshold.
    Click {
        /// Press position.
        at: Point,
        /// Button held.
        button: MouseButton,
    },
    /// The pointer travelled past the drag threshold.
    Drag {
        /// Press position.
        start: Point,
        /// Release position.
        end: Point,
        /// Button held.
        button: MouseButton,
    },
}

/// Tracks one pressed button across move events.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragState {
    threshold: f64,
    start: Option<(Point, MouseButton)>,
    last: Option<Point>,
    moved: bool,
}

impl Default for DragState {
    fn default() -> Self {
        Self::new(2.0)
    }
}

impl DragState {
    /// Creates a tracker; moves shorter than `threshold` device pixels from
    /// the press position do not turn a click into a drag.
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.max(0.0),
            start: None,
            last: None,
            moved: false,
        }
    }

    /// Starts tracking a press. A press while already tracking restarts.
    pub fn press(&mut self, pos: Point, button: MouseButton) {
        self.start = Some((pos, button));
        self.last = Some(pos);
        self.moved = false;
    }

    /// Records a move and returns the step since the previous one.
    ///
    /// Returns `None` when no button is pressed.
    pub fn update(&mut self, pos: Point) -> Option<Vec2> {
        let (start, _) = self.start?;
        let last = self.last.replace(pos).unwrap_or(start);
        if (pos - start).hypot() > self.threshold {
            self.moved = true;
        }
        Some(pos - last)
    }

    /// Rectangle spanned by the press position and the last move, while
    /// dragging.
    #[must_use]
    pub fn rect(&self) -> Option<Rect> {
        match (self.start, self.last) {
            (Some((start, _)), Some(last)) if self.moved => Some(Rect::from_points(start, last)),
            _ => None,
        }
    }

    /// Ends the gesture at `pos`.
    ///
    /// Returns `None` when nothing was pressed.
    pub fn release(&mut self, pos: Point) -> Option<Release> {
        let (start, button) = self.start.take()?;
        self.last = None;
        let moved = self.moved || (pos - start).hypot() > self.threshold;
        self.moved = false;
        Some(if moved {
            Release::Drag {
                start,
                end: pos,
                button,
            }
        } else {
            Release::Click { at: start, button }
        })
    }

    /// Drops the gesture without reporting it.
    pub fn cancel(&mut self) {
        self.start = None;
        self.last = None;
        self.moved = false;
    }

    /// Returns `true` while a button is held.
    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.start.is_some()
    }

    /// Returns `true` once the pointer left the threshold circle.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.start.is_some() && self.moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_idle() {
        let mut drag = DragState::default();
        assert!(!drag.is_pressed());
        assert_eq!(drag.update(Point::new(1.0, 1.0)), None);
        assert_eq!(drag.release(Point::new(1.0, 1.0)), None);
        assert_eq!(drag.rect(), None);
    }

    #[test]
    fn updates_report_incremental_steps() {
        let mut drag = DragState::new(0.0);
        drag.press(Point::ZERO, MouseButton::Primary);
        assert_eq!(drag.update(Point::new(5.0, 3.0)), Some(Vec2::new(5.0, 3.0)));
        assert_eq!(drag.update(Point::new(8.0, 7.0)), Some(Vec2::new(3.0, 4.0)));
        assert_eq!(drag.rect(), Some(Rect::new(0.0, 0.0, 8.0, 7.0)));
    }

    #[test]
    fn jitter_below_threshold_is_a_click() {
        let mut drag = DragState::new(3.0);
        drag.press(Point::new(50.0, 50.0), MouseButton::Secondary);
        drag.update(Point::new(52.0, 51.0));
        assert!(!drag.is_dragging());
        assert_eq!(drag.rect(), None);
        assert_eq!(
            drag.release(Point::new(51.0, 50.0)),
            Some(Release::Click {
                at: Point::new(50.0, 50.0),
                button: MouseButton::Secondary
            })
        );
        assert!(!drag.is_pressed());
    }

    #[test]
    fn leaving_the_threshold_makes_a_drag() {
        let mut drag = DragState::new(3.0);
        drag.press(Point::new(10.0, 10.0), MouseButton::Primary);
        drag.update(Point::new(30.0, 5.0));
        assert!(drag.is_dragging());
        assert_eq!(drag.rect(), Some(Rect::new(10.0, 5.0, 30.0, 10.0)));

        // Coming back near the start keeps it a drag.
        drag.update(Point::new(11.0, 10.0));
        assert_eq!(
            drag.release(Point::new(11.0, 10.0)),
            Some(Release::Drag {
                start: Point::new(10.0, 10.0),
                end: Point::new(11.0, 10.0),
                button: MouseButton::Primary
            })
        );
    }

    #[test]
    fn release_far_away_without_moves_is_a_drag() {
        let mut drag = DragState::new(2.0);
        drag.press(Point::ZERO, MouseButton::Primary);
        assert!(matches!(
            drag.release(Point::new(40.0, 0.0)),
            Some(Release::Drag { .. })
        ));
    }

    #[test]
    fn press_restarts_and_cancel_forgets() {
        let mut drag = DragState::new(0.0);
        drag.press(Point::ZERO, MouseButton::Primary);
        drag.update(Point::new(10.0, 10.0));
        drag.press(Point::new(50.0, 60.0), MouseButton::Middle);
        assert!(!drag.is_dragging());
        assert_eq!(drag.rect(), None);
        drag.cancel();
        assert!(!drag.is_pressed());
    }
}
