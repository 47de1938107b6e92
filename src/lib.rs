//! Chilly Bird: a flappy-bird game drawn with half-blocks in the terminal.
//!
//! The game is a small scene machine (start → flying → game over → start)
//! whose scenes hand their entity groups to one another on every flip.

pub mod assets;
pub mod audio;
pub mod config;
pub mod entity;
pub mod error;
pub mod gfx;
pub mod host;
pub mod input;
pub mod machine;
pub mod run_loop;
pub mod scene;
pub mod skin;

pub use config::Config;
pub use error::GameError;
pub use machine::Game;
