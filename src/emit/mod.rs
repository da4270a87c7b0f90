//! Output generation: content-addressed interning and JS module emission.

pub mod interner;
pub mod js;

pub use interner::Interner;
pub use js::JsEmitter;
