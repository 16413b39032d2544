//! Terminal progress line

/// Width of the progress bar in cells
pub const PROGRESS_BAR_WIDTH: usize = 20;

/// Renders a bar of `width` cells filled to `percent`
///
/// # Example
///
/// ```
/// use telegraph_finder::output::render_progress_bar;
///
/// assert_eq!(render_progress_bar(50, 4), "██░░");
/// ```
pub fn render_progress_bar(percent: usize, width: usize) -> String {
    let filled = (width * percent / 100).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Formats one progress sample: `label [bar] completed/total (percent%)`
pub fn progress_line(label: &str, completed: usize, total: usize) -> String {
    let percent = if total == 0 {
        100
    } else {
        completed.min(total) * 100 / total
    };

    format!(
        "{} [{}] {}/{} ({}%)",
        label,
        render_progress_bar(percent, PROGRESS_BAR_WIDTH),
        completed,
        total,
        percent
    )
}
