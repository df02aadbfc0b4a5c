//! World calendar: minute-of-day, 28-day years and chunk timestamps

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Minutes in one in-game day.
pub const MINUTES_PER_DAY: f32 = 1440.0;
/// Days in one in-game year (four 7-day seasons).
pub const DAYS_PER_YEAR: i32 = 28;
/// Minutes in one in-game year.
pub const MINUTES_PER_YEAR: f64 = 40320.0;

/// A point on the world calendar.
///
/// Stored verbatim inside tickable-block records, so the layout is fixed at
/// three 4-byte fields.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct ChunkTimeStamp {
    /// Year, `0..`; `-1` marks a record that has never been ticked.
    pub year: i32,
    /// Day of the year, `0..28`.
    pub day: i32,
    /// Minute of the day, `[0.0, 1440.0)`.
    pub time: f32,
}

impl Default for ChunkTimeStamp {
    fn default() -> Self {
        Self::UNSEEN
    }
}

impl ChunkTimeStamp {
    /// Sentinel for "never ticked".
    pub const UNSEEN: Self = Self { year: -1, day: 0, time: 0.0 };

    pub fn new(year: i32, day: i32, time: f32) -> Self {
        Self { year, day, time }
    }

    #[inline]
    pub fn is_unseen(&self) -> bool {
        self.year == -1
    }

    /// Minutes elapsed from `earlier` to `self` (negative if `earlier` is later).
    pub fn distance_since(&self, earlier: &ChunkTimeStamp) -> f64 {
        (self.year - earlier.year) as f64 * MINUTES_PER_YEAR
            + (self.day - earlier.day) as f64 * MINUTES_PER_DAY as f64
            + (self.time - earlier.time) as f64
    }

    /// Absolute minutes since year 0, day 0.
    pub fn to_minutes(&self) -> f64 {
        self.year as f64 * MINUTES_PER_YEAR
            + self.day as f64 * MINUTES_PER_DAY as f64
            + self.time as f64
    }
}

/// Season of a day of the year.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    /// Season for a day in `0..28`; days outside wrap into the year.
    pub fn of_day(day: i32) -> Self {
        match day.rem_euclid(DAYS_PER_YEAR) / 7 {
            0 => Season::Spring,
            1 => Season::Summer,
            2 => Season::Fall,
            _ => Season::Winter,
        }
    }
}

/// Advancing world clock driving block ticks and terrain timestamps.
#[derive(Clone, Debug)]
pub struct WorldClock {
    year: i32,
    day: i32,
    minute: f32,
}

impl Default for WorldClock {
    fn default() -> Self {
        Self::new(0, 0, 0.0)
    }
}

impl WorldClock {
    /// Start the clock at the given calendar position, normalising out-of-range values.
    pub fn new(year: i32, day: i32, minute: f32) -> Self {
        let mut clock = Self {
            year: year.max(0),
            day: day.rem_euclid(DAYS_PER_YEAR),
            minute: 0.0,
        };
        clock.advance(minute.max(0.0));
        clock
    }

    /// Advance by `minutes` of game time, rolling over days and years.
    pub fn advance(&mut self, minutes: f32) {
        if minutes <= 0.0 {
            return;
        }
        self.minute += minutes;

        while self.minute >= MINUTES_PER_DAY {
            self.minute -= MINUTES_PER_DAY;
            self.day += 1;
            if self.day >= DAYS_PER_YEAR {
                self.day = 0;
                self.year += 1;
            }
        }
    }

    #[inline]
    pub fn year(&self) -> i32 {
        self.year
    }

    #[inline]
    pub fn day(&self) -> i32 {
        self.day
    }

    #[inline]
    pub fn minute(&self) -> f32 {
        self.minute
    }

    #[inline]
    pub fn season(&self) -> Season {
        Season::of_day(self.day)
    }

    /// Current calendar position as a timestamp.
    pub fn now(&self) -> ChunkTimeStamp {
        ChunkTimeStamp::new(self.year, self.day, self.minute)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
