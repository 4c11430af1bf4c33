//! Mouse Snake - a terminal Snake game steered with the mouse pointer
//!
//! This library provides:
//! - Core game logic and pointer steering (game module)
//! - Keyboard/mouse input and the shared pointer slot (input module)
//! - TUI rendering (render module)
//! - Best-score persistence (storage module)
//! - Session statistics (metrics module)
//! - The interactive game loop (modes module)

pub mod game;
pub mod input;
pub mod logging;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod storage;
