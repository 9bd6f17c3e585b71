use crate::graffiti::buffer::PixelBuffer;
use crate::graffiti::history::StrokeHistory;
use crate::graffiti::model::{BrushConfig, Color, Point};
use crate::graffiti::surface::RasterSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Z,
    Y,
    Delete,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyModifiers {
    pub ctrl: bool,
    pub shift: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadCommand {
    Undo,
    Redo,
    Clear,
}

/// The drawing widget: one surface, its history and the active brush.
///
/// Pointer events drive the surface directly; finished gestures are
/// reported to the history so that undo/redo can replay snapshots.
#[derive(Debug, Clone)]
pub struct GraffitiPad {
    surface: RasterSurface,
    history: StrokeHistory,
    brush: BrushConfig,
}

impl GraffitiPad {
    pub fn new(width: u32, height: u32, brush: BrushConfig) -> Self {
        Self::with_history_limit(width, height, brush, 0)
    }

    pub fn with_history_limit(
        width: u32,
        height: u32,
        brush: BrushConfig,
        max_history: usize,
    ) -> Self {
        let surface = RasterSurface::new(width, height);
        let history = StrokeHistory::with_limit(surface.snapshot(), max_history);
        Self {
            surface,
            history,
            brush,
        }
    }

    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    pub fn history(&self) -> &StrokeHistory {
        &self.history
    }

    pub fn brush(&self) -> &BrushConfig {
        &self.brush
    }

    pub fn brush_mut(&mut self) -> &mut BrushConfig {
        &mut self.brush
    }

    pub fn set_color(&mut self, color: Color) {
        self.brush.set_color(color);
    }

    pub fn set_width(&mut self, width_px: u32) -> u32 {
        self.brush.set_width(width_px)
    }

    pub fn set_shadow_blur(&mut self, shadow_blur_px: u32) {
        self.brush.set_shadow_blur(shadow_blur_px);
    }

    pub fn snapshot(&self) -> PixelBuffer {
        self.surface.snapshot()
    }

    pub fn pointer_down(&mut self, point: impl Into<Point>) {
        self.finish_stroke();
        self.history.on_stroke_will_begin();
        self.surface.begin_stroke(point.into());
    }

    pub fn pointer_move(&mut self, point: impl Into<Point>) {
        self.surface.extend_stroke(point.into(), &self.brush);
    }

    pub fn pointer_up(&mut self, point: impl Into<Point>) {
        if !self.surface.is_stroking() {
            return;
        }
        let point = point.into();
        let moved = self
            .surface
            .session()
            .is_some_and(|session| session.last_point() != point);
        if moved {
            self.surface.extend_stroke(point, &self.brush);
        }
        self.finish_stroke();
    }

    /// The pointer left the canvas; the gesture ends where it was last seen.
    pub fn pointer_leave(&mut self) {
        self.finish_stroke();
    }

    /// Commits the gesture still held down, if it painted anything.
    pub fn commit_pending_stroke(&mut self) {
        self.finish_stroke();
    }

    pub fn undo(&mut self) -> bool {
        self.finish_stroke();
        self.history.undo(&mut self.surface)
    }

    pub fn redo(&mut self) -> bool {
        self.finish_stroke();
        self.history.redo(&mut self.surface)
    }

    pub fn clear(&mut self) {
        self.surface.end_stroke();
        self.history.clear_all(&mut self.surface);
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn has_drawing(&self) -> bool {
        self.history.has_committed_strokes()
    }

    pub fn handle_key_event(&mut self, event: KeyEvent) -> Option<PadCommand> {
        match (event.key, event.modifiers) {
            (KeyCode::Z, KeyModifiers { ctrl: true, shift: false }) => {
                self.undo();
                Some(PadCommand::Undo)
            }
            (KeyCode::Z, KeyModifiers { ctrl: true, shift: true })
            | (KeyCode::Y, KeyModifiers { ctrl: true, .. }) => {
                self.redo();
                Some(PadCommand::Redo)
            }
            (KeyCode::Delete, _) => {
                self.clear();
                Some(PadCommand::Clear)
            }
            _ => None,
        }
    }

    fn finish_stroke(&mut self) {
        let Some(session) = self.surface.end_stroke() else {
            return;
        };
        if session.segments() == 0 {
            return;
        }
        self.history.on_stroke_committed(&self.surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad() -> GraffitiPad {
        GraffitiPad::new(64, 64, BrushConfig::default())
    }

    fn scribble(pad: &mut GraffitiPad, y: i32) {
        pad.pointer_down((2, y));
        pad.pointer_move((20, y));
        pad.pointer_up((40, y));
    }

    #[test]
    fn gesture_commits_single_entry() {
        let mut pad = pad();
        scribble(&mut pad, 10);
        assert_eq!(pad.history().len(), 2);
        assert_eq!(pad.history().cursor(), 1);
        assert!(!pad.surface().is_stroking());
        assert_eq!(pad.snapshot(), *pad.history().current());
    }

    #[test]
    fn click_without_movement_is_not_committed() {
        let mut pad = pad();
        pad.pointer_down((5, 5));
        pad.pointer_up((5, 5));
        assert_eq!(pad.history().len(), 1);
        assert!(!pad.has_drawing());
    }

    #[test]
    fn pointer_leave_commits_active_gesture() {
        let mut pad = pad();
        pad.pointer_down((2, 2));
        pad.pointer_move((30, 30));
        pad.pointer_leave();
        assert_eq!(pad.history().len(), 2);
        pad.pointer_move((40, 40));
        assert_eq!(pad.snapshot(), *pad.history().current());
    }

    #[test]
    fn pointer_up_without_down_is_ignored() {
        let mut pad = pad();
        pad.pointer_up((3, 3));
        assert_eq!(pad.history().len(), 1);
        assert!(pad.snapshot().is_blank());
    }

    #[test]
    fn undo_mid_stroke_commits_then_undoes() {
        let mut pad = pad();
        pad.pointer_down((2, 2));
        pad.pointer_move((30, 2));
        assert!(pad.undo());
        assert_eq!(pad.history().len(), 2);
        assert_eq!(pad.history().cursor(), 0);
        assert!(pad.snapshot().is_blank());
    }

    #[test]
    fn keyboard_shortcuts_dispatch_history_commands() {
        let mut pad = pad();
        scribble(&mut pad, 10);

        let ctrl = KeyModifiers {
            ctrl: true,
            shift: false,
        };
        let undo = pad.handle_key_event(KeyEvent {
            key: KeyCode::Z,
            modifiers: ctrl,
        });
        assert_eq!(undo, Some(PadCommand::Undo));
        assert_eq!(pad.history().cursor(), 0);

        let redo = pad.handle_key_event(KeyEvent {
            key: KeyCode::Z,
            modifiers: KeyModifiers {
                ctrl: true,
                shift: true,
            },
        });
        assert_eq!(redo, Some(PadCommand::Redo));
        assert_eq!(pad.history().cursor(), 1);

        let plain = pad.handle_key_event(KeyEvent {
            key: KeyCode::Z,
            modifiers: KeyModifiers::default(),
        });
        assert_eq!(plain, None);

        let clear = pad.handle_key_event(KeyEvent {
            key: KeyCode::Delete,
            modifiers: KeyModifiers::default(),
        });
        assert_eq!(clear, Some(PadCommand::Clear));
        assert_eq!(pad.history().len(), 1);
        assert!(pad.snapshot().is_blank());
    }

    #[test]
    fn brush_changes_apply_to_next_segment() {
        let mut pad = pad();
        pad.set_color(Color::rgba(0, 0, 255, 255));
        assert_eq!(pad.set_width(3), 2);
        scribble(&mut pad, 20);
        assert_eq!(
            pad.surface().pixel(10, 20),
            Some(Color::rgba(0, 0, 255, 255))
        );
    }

    #[test]
    fn huge_shadow_blur_strokes_without_overflow() {
        let mut pad = pad();
        pad.set_shadow_blur(u32::MAX);
        pad.pointer_down((1, 1));
        pad.pointer_up((5, 5));
        assert!(pad.has_drawing());
        assert!(pad.surface().pixel(63, 63).is_some_and(|c| c.a > 0));
    }

    #[test]
    fn far_away_pointer_is_clipped() {
        let mut pad = pad();
        pad.pointer_down((1, 1));
        pad.pointer_up((i32::MAX, 5));
        pad.pointer_down((i32::MIN, i32::MIN));
        pad.pointer_move((i32::MAX, i32::MIN));
        pad.pointer_leave();
        assert_eq!(pad.history().len(), 3);
    }

    #[test]
    fn commit_pending_stroke_keeps_held_gesture() {
        let mut pad = pad();
        pad.pointer_down((2, 2));
        pad.pointer_move((30, 2));
        assert!(!pad.has_drawing());

        pad.commit_pending_stroke();
        assert!(pad.has_drawing());
        assert!(!pad.surface().is_stroking());
        assert_eq!(pad.snapshot(), *pad.history().current());

        pad.commit_pending_stroke();
        assert_eq!(pad.history().len(), 2);
    }
}
