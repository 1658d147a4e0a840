#![no_std]

//! Grid-transition core for a slide-and-merge (2048-style) and a swap-and-cascade
//! (match-3-style) puzzle.
//!
//! Both engines own a fixed-size [`Grid`] and apply one discrete action at a time. The
//! collaborator submits an action while settled, calls [`Engine::tick`] once per rendered
//! target until settled again and reads [`Engine::snapshot`] every frame.

extern crate alloc;

pub use cell::*;
pub use error::*;
pub use grid::*;
pub use phase::*;
pub use slide::*;
pub use swap::*;
pub use types::*;

mod cell;
mod error;
mod grid;
mod phase;
mod slide;
mod swap;
mod types;
