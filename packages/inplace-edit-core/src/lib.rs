//! Inline editing of list-view columns for admin resources.
//!
//! Provides the resource and column model, the in-place edit plugin
//! (configuration augmentation and post-discovery validation), the sealed
//! serving configuration, host collaborator traits with an in-memory
//! reference host, and the single-field update service.

pub mod admin;
pub mod config;
pub mod error;
pub mod host;
pub mod plugin;
pub mod resource;
pub mod update;

pub use admin::{AdminConfig, AdminConfigBuilder};
pub use plugin::{InPlaceEditPlugin, PluginOptions};
pub use update::{FieldUpdater, UpdateFieldRequest, UpdateFieldResponse};
