//! Virtual-windowing arithmetic.
//!
//! Pure functions of `(scroll_offset, total, config)` — no surface, no state.
//! The renderer decides *whether* to window (lists at or below the threshold
//! are materialised directly); this module only decides *which* slice is
//! visible and how tall the spacers around it must be so the scrollable
//! extent and scrollbar proportion stay truthful.

/// Fixed estimated row height and the materialisation threshold.
///
/// `max_visible_rows` doubles as the cut-off below which a list is rendered
/// in full and as the maximum number of rows materialised at once above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    pub row_height: u32,
    pub max_visible_rows: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            row_height: 35,
            max_visible_rows: 50,
        }
    }
}

/// The visible slice `[start, end)` plus the spacer heights around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    pub start: usize,
    pub end: usize,
    pub leading_px: u64,
    pub trailing_px: u64,
}

impl WindowBounds {
    /// Recompute the window from scratch for a scroll position. Stateless:
    /// no incremental diffing against what was previously drawn.
    pub fn compute(scroll_offset: f64, total: usize, cfg: &WindowConfig) -> Self {
        let row_height = u64::from(cfg.row_height);

        let raw = if scroll_offset <= 0.0 || row_height == 0 {
            0
        } else {
            (scroll_offset / row_height as f64).floor() as usize
        };
        // clamp into [0, total)
        let start = if total == 0 { 0 } else { raw.min(total - 1) };
        let end = (start + cfg.max_visible_rows).min(total);

        WindowBounds {
            start,
            end,
            leading_px: start as u64 * row_height,
            trailing_px: (total - end) as u64 * row_height,
        }
    }

    /// Bounds covering an entire list — the direct, unwindowed path.
    pub fn full(total: usize) -> Self {
        WindowBounds {
            start: 0,
            end: total,
            leading_px: 0,
            trailing_px: 0,
        }
    }

    /// Number of materialised rows.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
