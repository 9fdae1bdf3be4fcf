use std::time::Duration;

/// Tunables of one sync run. `Default` holds the production values.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Only issues created within this window are requested.
    pub lookback: chrono::Duration,
    /// Remote page size. The remote API caps it at 100.
    pub page_size: u32,
    /// Pause between two consecutive page requests.
    pub inter_page_delay: Duration,
}

pub const MAX_PAGE_SIZE: u32 = 100;

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            lookback: chrono::Duration::days(180),
            page_size: MAX_PAGE_SIZE,
            inter_page_delay: Duration::from_millis(1000),
        }
    }
}

impl SyncConfig {
    pub fn with_lookback(mut self, lookback: chrono::Duration) -> Self {
        self.lookback = lookback;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn with_inter_page_delay(mut self, delay: Duration) -> Self {
        self.inter_page_delay = delay;
        self
    }
}
