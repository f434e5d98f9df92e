//! Spark Time Library
//!
//! Every registry and authority call reads "now" exactly once from a [`Clock`]
//! and compares stored timestamps against that single value.
//!
//! # Features
//! - Nanosecond precision
//! - Monotonic (non-decreasing) system time
//! - Settable manual clock for tests and scripted runs

pub mod clock;
pub mod manual;

pub use clock::{Clock, SharedClock, SystemClock};
pub use manual::ManualClock;
