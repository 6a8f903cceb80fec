//! TUI rendering layer for gridbench.
//!
//! Draws the bench screen: the settings form of the active card with its
//! generated options, a preview of the widget tree, and a strip of recent
//! log lines. Rendering uses [`ratatui`]; all state lives in
//! [`gridbench_core`].

pub mod form;
pub mod layout;
pub mod logs;
pub mod preview;
pub mod shell;
