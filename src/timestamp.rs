//! ROS `time`/`duration` wire representation: a `(sec, nsec)` pair.

/// A point in time (or a duration) as the `(sec: i32, nsec: i32)` pair ROS
/// serializes on the wire. Stored internally as total nanoseconds so that
/// ordering and duration arithmetic are plain integer comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Build from the wire's `(sec, nsec)` pair.
    pub fn from_sec_nsec(sec: i32, nsec: i32) -> Self {
        Timestamp(sec as i64 * 1_000_000_000 + nsec as i64)
    }

    /// Build from total nanoseconds since the UNIX epoch.
    pub fn from_nanos(nanos: i64) -> Self {
        Timestamp(nanos)
    }

    /// Seconds component.
    pub fn sec(&self) -> i32 {
        (self.0.div_euclid(1_000_000_000)) as i32
    }

    /// Nanoseconds component, always in `[0, 1_000_000_000)`.
    pub fn nsec(&self) -> i32 {
        self.0.rem_euclid(1_000_000_000) as i32
    }

    /// Total nanoseconds since the UNIX epoch.
    pub fn as_nanos(&self) -> i64 {
        self.0
    }

    /// Duration in fractional seconds, as used for array-of-`duration`
    /// exposure.
    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / 1_000_000_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_sec_nsec() {
        let t = Timestamp::from_sec_nsec(1_600_000_000, 123_456_789);
        assert_eq!(t.sec(), 1_600_000_000);
        assert_eq!(t.nsec(), 123_456_789);
    }

    #[test]
    fn orders_by_time() {
        let a = Timestamp::from_sec_nsec(10, 0);
        let b = Timestamp::from_sec_nsec(10, 1);
        assert!(a < b);
    }
}
