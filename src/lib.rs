//! Vibe Coder: generate single-page websites and website ideas with Gemini
//!
//! A session collects a description (optionally with an image), asks the
//! model for HTML/CSS/JavaScript fragments or idea records, and meters each
//! kind of generation with plan-based credits.

pub mod ai;
pub mod app;
pub mod credits;
pub mod error;
pub mod models;
pub mod preview;
pub mod prompts;
pub mod session;

pub use error::{Error, Result};
