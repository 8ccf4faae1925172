pub mod time_utils;

pub use time_utils::{current_month, Month};
