//! Coin search driven by user input.

pub mod debouncer;

pub use debouncer::{DebounceState, SearchDebouncer, SearchSnapshot, DEFAULT_QUIET_PERIOD};
