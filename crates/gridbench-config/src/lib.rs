//! Configuration types and loaders for gridbench.
//!
//! The bench reads one optional TOML file at startup. It can override the
//! demo grid's initial settings, pre-add boxes and tune the terminal shell.

pub mod bench;

pub use bench::{BenchConfig, InstancePreset, UiConfig, WidgetOverrides};
