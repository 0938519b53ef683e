//! Application services

pub mod auth;
pub mod catalog;
pub mod demo;
pub mod favorites;
pub mod storage;
pub mod validation;

pub use auth::{Actor, AuthConfig, AuthService, Credentials, LoginResult, Superuser};
pub use catalog::{CatalogService, FileSource, WorkCreatedEvent, WorkDraft};
pub use demo::DemoSeeder;
pub use favorites::FavoritesService;
pub use storage::{FileKind, UploadStorage};
