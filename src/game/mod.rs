//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! Steering input arrives as plain pointer coordinates; the board leaves as a
//! read-only [`Scene`].

pub mod action;
pub mod config;
pub mod engine;
pub mod state;
pub mod steering;

// Re-export commonly used types
pub use action::{Control, Direction};
pub use config::GameConfig;
pub use engine::{GameEngine, StepInfo, StepResult};
pub use state::{CollisionType, GameState, Overlay, Phase, Position, Scene, Snake};
pub use steering::{PointerPosition, infer_direction};
