//! Time + distance gates for socket emissions and route requests.
//!
//! Both throttles are plain values over a millisecond clock supplied by the
//! caller, so they can be driven directly in tests.

use limo_core::geo::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Mark {
    at_ms: u64,
    position: Coordinate,
}

impl Mark {
    fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.at_ms)
    }

    fn moved_m(&self, position: Coordinate) -> f64 {
        self.position.distance_m(position)
    }
}

/// Allows an emission when enough time passed OR the position moved far enough.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionThrottle {
    min_interval_ms: u64,
    min_distance_m: f64,
    last: Option<Mark>,
}

impl EmissionThrottle {
    pub fn new(min_interval_ms: u64, min_distance_m: f64) -> Self {
        Self {
            min_interval_ms,
            min_distance_m,
            last: None,
        }
    }

    /// The first emission is always allowed.
    pub fn should_emit(&self, now_ms: u64, position: Coordinate) -> bool {
        match self.last {
            None => true,
            Some(last) => {
                last.elapsed_ms(now_ms) >= self.min_interval_ms
                    || last.moved_m(position) >= self.min_distance_m
            }
        }
    }

    pub fn record(&mut self, now_ms: u64, position: Coordinate) {
        self.last = Some(Mark {
            at_ms: now_ms,
            position,
        });
    }

    /// Milliseconds since the last emission, `None` before the first.
    pub fn idle_ms(&self, now_ms: u64) -> Option<u64> {
        self.last.map(|last| last.elapsed_ms(now_ms))
    }

    pub fn last_position(&self) -> Option<Coordinate> {
        self.last.map(|last| last.position)
    }
}

/// Limits route requests to one per interval unless the driver moved far.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRefreshThrottle {
    min_interval_ms: u64,
    early_refresh_distance_m: f64,
    last: Option<Mark>,
}

impl RouteRefreshThrottle {
    pub fn new(min_interval_ms: u64, early_refresh_distance_m: f64) -> Self {
        Self {
            min_interval_ms,
            early_refresh_distance_m,
            last: None,
        }
    }

    pub fn is_due(&self, now_ms: u64, position: Coordinate) -> bool {
        match self.last {
            None => true,
            Some(last) => {
                last.elapsed_ms(now_ms) >= self.min_interval_ms
                    || last.moved_m(position) >= self.early_refresh_distance_m
            }
        }
    }

    pub fn record(&mut self, now_ms: u64, position: Coordinate) {
        self.last = Some(Mark {
            at_ms: now_ms,
            position,
        });
    }

    /// Make the next check due regardless of time and distance.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
