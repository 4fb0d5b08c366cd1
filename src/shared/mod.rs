pub mod config;
pub mod time;

#[cfg(test)]
mod time_tests;
