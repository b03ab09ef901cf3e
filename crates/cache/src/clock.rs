use std::fmt::Debug;
use time::UtcDateTime;

/// Source of "now" for expiry decisions.
pub trait Clock: Debug + Send + Sync {
    fn now(&self) -> UtcDateTime;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;
impl Clock for SystemClock {
    fn now(&self) -> UtcDateTime {
        UtcDateTime::now()
    }
}

#[cfg(any(test, feature = "mock"))]
pub use self::manual::ManualClock;

#[cfg(any(test, feature = "mock"))]
mod manual {
    use super::Clock;
    use std::sync::{Arc, Mutex, PoisonError};
    use time::{Duration, UtcDateTime};

    /// A clock that only moves when told to.
    ///
    /// Clones share the same time, so a test can keep one handle and give
    /// another to the store under test.
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        now: Arc<Mutex<UtcDateTime>>,
    }

    impl ManualClock {
        pub fn new(start: UtcDateTime) -> Self {
            Self {
                now: Arc::new(Mutex::new(start)),
            }
        }

        pub fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
            *now += by;
        }

        pub fn set(&self, at: UtcDateTime) {
            *self.now.lock().unwrap_or_else(PoisonError::into_inner) = at;
        }
    }

    impl Default for ManualClock {
        fn default() -> Self {
            Self::new(UtcDateTime::now())
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> UtcDateTime {
            *self.now.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_manual_clock_is_shared_between_clones() {
            let clock = ManualClock::default();
            let start = clock.now();
            let other = clock.clone();
            other.advance(Duration::minutes(5));
            assert_eq!(clock.now() - start, Duration::minutes(5));
            clock.set(start);
            assert_eq!(other.now(), start);
        }
    }
}
