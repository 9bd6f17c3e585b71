use crate::graffiti::buffer::PixelBuffer;
use crate::graffiti::surface::RasterSurface;

/// Committed canvas state after zero or more strokes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    buffer: PixelBuffer,
}

impl HistoryEntry {
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }
}

/// Snapshot log with a cursor at the entry currently shown on the surface.
///
/// Invariant: `cursor < entries.len()` and, whenever no stroke is in
/// progress, the surface pixels equal `entries[cursor]`.
#[derive(Debug, Clone)]
pub struct StrokeHistory {
    entries: Vec<HistoryEntry>,
    cursor: usize,
    blank: PixelBuffer,
    base_is_blank: bool,
    max_entries: usize,
}

impl StrokeHistory {
    pub fn new(blank: PixelBuffer) -> Self {
        Self::with_limit(blank, 0)
    }

    /// `max_entries == 0` keeps every entry.
    pub fn with_limit(blank: PixelBuffer, max_entries: usize) -> Self {
        Self {
            entries: vec![HistoryEntry {
                buffer: blank.clone(),
            }],
            cursor: 0,
            blank,
            base_is_blank: true,
            max_entries: if max_entries == 0 {
                0
            } else {
                max_entries.max(2)
            },
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`: the base entry is never removed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn current(&self) -> &PixelBuffer {
        &self.entries[self.cursor].buffer
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// True once anything beyond the blank seed has been committed.
    pub fn has_committed_strokes(&self) -> bool {
        self.entries.len() > 1 || !self.base_is_blank
    }

    /// Hook for the start of a stroke. The entry at the cursor already holds
    /// the pre-stroke state, so nothing is recorded here.
    pub fn on_stroke_will_begin(&self) {
        tracing::trace!(cursor = self.cursor, "stroke beginning");
    }

    /// Records the surface after a finished stroke, dropping any redo branch.
    pub fn on_stroke_committed(&mut self, surface: &RasterSurface) {
        let buffer = surface.snapshot();
        self.entries.truncate(self.cursor + 1);
        self.entries.push(HistoryEntry { buffer });
        self.cursor = self.entries.len() - 1;

        if self.max_entries > 0 && self.entries.len() > self.max_entries {
            let overflow = self.entries.len() - self.max_entries;
            self.entries.drain(..overflow);
            self.cursor -= overflow;
            self.base_is_blank = false;
        }

        tracing::debug!(
            cursor = self.cursor,
            entries = self.entries.len(),
            "stroke committed"
        );
    }

    pub fn undo(&mut self, surface: &mut RasterSurface) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        surface.restore(&self.entries[self.cursor].buffer);
        tracing::debug!(cursor = self.cursor, "undo");
        true
    }

    pub fn redo(&mut self, surface: &mut RasterSurface) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        surface.restore(&self.entries[self.cursor].buffer);
        tracing::debug!(cursor = self.cursor, "redo");
        true
    }

    pub fn clear_all(&mut self, surface: &mut RasterSurface) {
        self.entries.clear();
        self.entries.push(HistoryEntry {
            buffer: self.blank.clone(),
        });
        self.cursor = 0;
        self.base_is_blank = true;
        surface.clear();
        tracing::debug!("history cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graffiti::model::{BrushConfig, Point};

    fn stroke(surface: &mut RasterSurface, history: &mut StrokeHistory, y: i32) {
        let brush = BrushConfig::default();
        history.on_stroke_will_begin();
        surface.begin_stroke(Point::new(1, y));
        surface.extend_stroke(Point::new(20, y), &brush);
        surface.end_stroke();
        history.on_stroke_committed(surface);
    }

    fn fixture() -> (RasterSurface, StrokeHistory) {
        let surface = RasterSurface::new(32, 32);
        let history = StrokeHistory::new(surface.snapshot());
        (surface, history)
    }

    #[test]
    fn new_history_holds_single_blank_entry() {
        let (_, history) = fixture();
        assert_eq!(history.len(), 1);
        assert_eq!(history.cursor(), 0);
        assert!(history.current().is_blank());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(!history.has_committed_strokes());
    }

    #[test]
    fn undo_floor_leaves_canvas_untouched() {
        let (mut surface, mut history) = fixture();
        let before = surface.snapshot();
        assert!(!history.undo(&mut surface));
        assert_eq!(history.cursor(), 0);
        assert_eq!(surface.snapshot(), before);
    }

    #[test]
    fn redo_ceiling_is_noop() {
        let (mut surface, mut history) = fixture();
        stroke(&mut surface, &mut history, 4);
        let before = surface.snapshot();
        assert!(!history.redo(&mut surface));
        assert_eq!(history.cursor(), 1);
        assert_eq!(surface.snapshot(), before);
    }

    #[test]
    fn new_commit_truncates_redo_branch() {
        let (mut surface, mut history) = fixture();
        stroke(&mut surface, &mut history, 4);
        stroke(&mut surface, &mut history, 10);
        stroke(&mut surface, &mut history, 16);
        assert!(history.undo(&mut surface));
        assert!(history.undo(&mut surface));
        let cursor_before = history.cursor();

        stroke(&mut surface, &mut history, 24);
        assert!(!history.can_redo());
        assert_eq!(history.len(), cursor_before + 2);
        assert_eq!(surface.snapshot(), *history.current());
    }

    #[test]
    fn clear_all_resets_to_blank_seed() {
        let (mut surface, mut history) = fixture();
        stroke(&mut surface, &mut history, 4);
        stroke(&mut surface, &mut history, 8);
        history.undo(&mut surface);
        history.clear_all(&mut surface);

        assert_eq!(history.len(), 1);
        assert_eq!(history.cursor(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(surface.snapshot().is_blank());
        assert!(history.current().is_blank());
    }

    #[test]
    fn undone_strokes_still_count_as_committed() {
        let (mut surface, mut history) = fixture();
        stroke(&mut surface, &mut history, 4);
        history.undo(&mut surface);
        assert_eq!(history.cursor(), 0);
        assert!(history.has_committed_strokes());
    }

    #[test]
    fn depth_limit_folds_oldest_entry_into_base() {
        let surface = RasterSurface::new(32, 32);
        let mut history = StrokeHistory::with_limit(surface.snapshot(), 3);
        let mut surface = surface;
        stroke(&mut surface, &mut history, 2);
        stroke(&mut surface, &mut history, 6);
        let after_second = surface.snapshot();
        stroke(&mut surface, &mut history, 10);

        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), 2);
        assert!(history.has_committed_strokes());
        assert!(!history.entries()[0].buffer().is_blank());

        history.undo(&mut surface);
        assert_eq!(surface.snapshot(), after_second);
        history.undo(&mut surface);
        assert!(!history.undo(&mut surface));
        assert!(!surface.snapshot().is_blank());
    }
}
