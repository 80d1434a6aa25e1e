/// Pixel width of a column given as a percentage of the container's minimum
/// width.
pub fn column_width(container_min_width: f64, percentage: f64) -> f64 {
    (percentage * container_min_width) / 100.0
}

/// Scroll position of the grid body as reported by the scroll event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub client_height: f64,
    pub scroll_height: f64,
}

impl ScrollMetrics {
    pub fn reached_bottom(&self) -> bool {
        self.scroll_top.ceil() + self.client_height >= self.scroll_height
    }
}
