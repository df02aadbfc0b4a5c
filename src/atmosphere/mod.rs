//! World time and climate
//!
//! The calendar drives block ticks and stamps newly generated chunks; the
//! climate functions turn a generator's base temperature into the local,
//! time-of-day temperature the tick rules compare against.

pub mod time;
pub mod climate;

pub use time::{ChunkTimeStamp, Season, WorldClock};
pub use climate::{Climate, local_temperature, softrange, sunlight};
