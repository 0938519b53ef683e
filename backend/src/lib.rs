//! Showcase backend: a GraphQL API for browsing and curating 3D models.
//!
//! Users register and log in, superusers manage categories and works (model
//! and cover uploads), and every user keeps a list of favorite works. Works
//! and favorites are paged newest first by page number or id cursor.

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod graphql;
pub mod services;

pub use app::{AppState, build_app};
