#[derive(Debug, Clone)]
pub struct Config {
    /// Aggregate cost budget for the hot cache, in bytes of cached
    /// point-record data.
    pub cache_max_cost: usize,
    /// Capacity of the persistence relay queue, in tasks.
    pub relay_queue: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cache_max_cost: 64 * 1024 * 1024, // 64MB of decoded point records
            relay_queue: 1024,
        }
    }
}
