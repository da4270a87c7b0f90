//! Layout-source parsing.
//!
//! This module turns a layout XML document into the [`crate::models::KeyLayout`]
//! model: attribute extraction, record routing, dead-key trees and the
//! NumLock/CapsLock merge rules.

pub mod layout;
pub mod xml_tree;

pub use layout::{parse_layout_file, parse_layout_str};
