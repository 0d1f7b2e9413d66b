use std::time::Duration;

use serde::{Deserialize, Serialize};

/// K = the default maximum number of nodes in a k-bucket.
pub const DEFAULT_KSIZE: usize = 8;

/// Default age after which a bucket is considered due for a refresh.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// KBucket Configurations
pub struct Config {
    /// Maximum number of active nodes in a bucket.
    ///
    /// This controls the redundancy factor of the DHT, the higher
    /// the more nodes are kept per identifier range.
    ///
    /// Defaults to [DEFAULT_KSIZE]
    pub ksize: usize,
    /// Maximum number of candidates waiting in the replacement cache
    /// while the bucket is full. The oldest candidate is dropped on overflow.
    ///
    /// Defaults to [DEFAULT_KSIZE]
    pub replacement_cache_size: usize,
    /// How long a bucket may go without a change before an external
    /// scheduler should refresh it, see [crate::KBucket::needs_refresh].
    ///
    /// Defaults to [DEFAULT_REFRESH_INTERVAL]
    pub refresh_interval: Duration,
}

impl Config {
    /// Default configuration with a custom bucket size; the replacement cache
    /// is sized to match.
    pub fn with_ksize(ksize: usize) -> Self {
        Self {
            ksize,
            replacement_cache_size: ksize,
            ..Default::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ksize: DEFAULT_KSIZE,
            replacement_cache_size: DEFAULT_KSIZE,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();

        assert_eq!(config.ksize, 8);
        assert_eq!(config.replacement_cache_size, 8);
        assert_eq!(config.refresh_interval, Duration::from_secs(900));
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: Config = serde_bencode::from_bytes(b"d5:ksizei2ee").unwrap();

        assert_eq!(config.ksize, 2);
        assert_eq!(config.replacement_cache_size, DEFAULT_KSIZE);
        assert_eq!(config.refresh_interval, DEFAULT_REFRESH_INTERVAL);
    }
}
