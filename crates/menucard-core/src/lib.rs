//! # Menucard Core
//!
//! Core types, configuration, and storage for Menucard.
//!
//! This crate provides:
//! - Configuration loading and validation (JSON5 format)
//! - sled-backed entity stores for cafés, categories, and menu items
//! - Input validation and sanitization

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod store;
pub mod types;
pub mod validation;

pub use config::{AuthConfig, Config, ConfigError};
pub use store::{CafeStore, CategoryStore, FoodStore, Store, StoreError};
pub use types::{Cafe, CafeId, CategoryId, Food, FoodCategory, FoodId, LocalizedText, Role};
pub use validation::{ValidationError, sanitize_text};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::store::Store;
    pub use crate::types::*;
    pub use crate::validation::sanitize_text;
}
