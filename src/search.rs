//! Debounced track search.

mod controller;
mod debounce;

pub use controller::{SearchController, SearchEvent};
pub use debounce::Debouncer;

#[cfg(test)]
mod tests;
