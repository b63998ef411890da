#![forbid(unsafe_code)]

pub mod model;
pub mod partition;
pub mod time;
pub mod traversal;

pub use time::Clock;
