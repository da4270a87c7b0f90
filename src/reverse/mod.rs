//! Reversal of layout tables into character-first lookup structures,
//! with validation diagnostics.

pub mod actions;
pub mod engine;
pub mod report;

pub use engine::{reverse_layout, DeadKeyRef, DoubleDeadKeyRef, ReversedLayout, ScancodesByMask};
pub use report::{ValidationError, ValidationErrorKind, ValidationReport};
