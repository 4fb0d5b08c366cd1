pub mod instant;
pub mod timeline;

pub use instant::{Instant, InstantAction, InstantState};
pub use timeline::{TIMELINE_DIR, Timeline};

#[cfg(test)]
mod instant_test;
