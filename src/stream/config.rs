//! # Stream bridge configuration.

/// Settings for [`into_stream`](crate::into_stream).
///
/// ## Field semantics
/// - `prefetch`: items requested ahead of consumption (`0` = unbounded demand).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamConfig {
    /// Number of items requested ahead of consumption.
    ///
    /// - `0` = request unbounded demand once
    /// - `n > 0` = keep at most `n` items in flight
    pub prefetch: usize,
}

impl StreamConfig {
    /// Returns the initial request amount.
    #[inline]
    pub fn initial_request(&self) -> u64 {
        if self.prefetch == 0 {
            u64::MAX
        } else {
            self.prefetch as u64
        }
    }

    /// Returns the replenish batch size (`None` when demand is unbounded).
    #[inline]
    pub fn replenish_limit(&self) -> Option<u64> {
        if self.prefetch == 0 {
            None
        } else {
            Some((self.prefetch - self.prefetch / 4) as u64)
        }
    }
}

impl Default for StreamConfig {
    /// Default configuration:
    ///
    /// - `prefetch = 32`
    fn default() -> Self {
        Self { prefetch: 32 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits() {
        let cfg = StreamConfig { prefetch: 32 };
        assert_eq!(cfg.initial_request(), 32);
        assert_eq!(cfg.replenish_limit(), Some(24));

        let one = StreamConfig { prefetch: 1 };
        assert_eq!(one.replenish_limit(), Some(1));

        let unbounded = StreamConfig { prefetch: 0 };
        assert_eq!(unbounded.initial_request(), u64::MAX);
        assert_eq!(unbounded.replenish_limit(), None);
    }
}
