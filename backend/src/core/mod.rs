//! Calendar primitives shared by the schedulers

pub mod calendar;

pub use calendar::{payment_date, Period};
