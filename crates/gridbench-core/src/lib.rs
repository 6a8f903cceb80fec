//! Core infrastructure for the gridbench settings bench.
//!
//! This crate owns the settings-driven composition engine: control
//! descriptors and settings schemas, the settings store with its single
//! change hook, the instance key codec, the registry of dynamic rows, the
//! widget factory contract with an in-memory widget tree, and the page
//! context that ties them together. Rendering lives in `gridbench-ui`.

pub mod bus;
pub mod codec;
pub mod compose;
pub mod control;
pub mod event;
pub mod instance;
pub mod logging;
pub mod page;
pub mod schema;
pub mod store;
pub mod value;
pub mod widget;

#[cfg(test)]
mod testing;
