//! Reversed keyboard-layout generation.
//!
//! This library converts platform keyboard-layout definitions (scancode →
//! character tables per modifier combination, including dead-key chains)
//! into character-first lookup structures: parsing layout XML sources,
//! reversing the tables, and emitting a deduplicated JavaScript module.

// Module declarations
pub mod emit;
pub mod models;
pub mod parser;
pub mod reverse;
