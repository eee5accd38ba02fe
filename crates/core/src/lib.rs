#![forbid(unsafe_code)]

pub mod model;
pub mod projection;
pub mod time;

pub use time::Clock;
