//! Shared rendering helpers for reports.

use ws_core::TimelineSegment;

/// Width of the rendered 24-hour bar, in cells (one cell = 30 minutes).
pub const BAR_WIDTH: usize = 48;

/// Hour labels aligned to the bar: one every 12 cells.
pub const AXIS: &str = "00:00       06:00       12:00       18:00       24:00";

/// Formats seconds as `HH:MM:SS`, zero-padded. Negative input renders as
/// `00:00:00`.
#[must_use]
pub fn format_duration(total_seconds: i64) -> String {
    let total_seconds = total_seconds.max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Renders timeline segments onto a fixed-width cell bar.
///
/// Any segment that survived layout occupies at least one cell so short
/// intervals stay visible.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#[must_use]
pub fn render_bar(segments: &[&TimelineSegment]) -> String {
    let mut cells = vec!['░'; BAR_WIDTH];
    for segment in segments {
        let start = ((segment.offset_fraction * BAR_WIDTH as f64).floor() as usize)
            .min(BAR_WIDTH - 1);
        let end = (((segment.offset_fraction + segment.width_fraction) * BAR_WIDTH as f64).ceil()
            as usize)
            .clamp(start + 1, BAR_WIDTH);
        for cell in &mut cells[start..end] {
            *cell = '█';
        }
    }
    cells.into_iter().collect()
}
