#![forbid(unsafe_code)]

pub mod arcade;
pub mod assessment;
pub mod content;
pub mod model;
pub mod progression;
pub mod time;

pub use time::Clock;
