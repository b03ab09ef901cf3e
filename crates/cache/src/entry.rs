use time::{Duration, UtcDateTime};

/// A cached payload together with its lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    pub key: String,
    pub payload: T,
    pub created_at: UtcDateTime,
    pub ttl: Duration,
}
impl<T> CacheEntry<T> {
    pub fn new(key: impl Into<String>, payload: T, created_at: UtcDateTime, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            payload,
            created_at,
            ttl,
        }
    }

    pub fn expires_at(&self) -> UtcDateTime {
        self.created_at + self.ttl
    }

    /// An entry is expired from the instant its full TTL has elapsed.
    pub fn is_expired(&self, now: UtcDateTime) -> bool {
        now - self.created_at >= self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Duration::ZERO, false)]
    #[case(Duration::seconds(59), false)]
    #[case(Duration::seconds(60), true)]
    #[case(Duration::seconds(61), true)]
    fn test_is_expired(#[case] elapsed: Duration, #[case] expected: bool) {
        let created_at = UtcDateTime::now();
        let entry = CacheEntry::new("key", (), created_at, Duration::seconds(60));
        assert_eq!(entry.is_expired(created_at + elapsed), expected);
        assert_eq!(entry.expires_at(), created_at + Duration::seconds(60));
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let created_at = UtcDateTime::now();
        let entry = CacheEntry::new("key", (), created_at, Duration::ZERO);
        assert!(entry.is_expired(created_at));
    }
}
