//! Project configuration for autosetup.
//!
//! This module handles all aspects of configuration:
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Deep merging in [`merger`]
//! - Validation in [`validator`]
//! - Variable interpolation in [`interpolation`]
//! - Environment file reading and writing in [`env_file`]
//!
//! # Example
//!
//! ```
//! use autosetup::config::load_merged_config;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let dir = temp.path().join(".autosetup");
//! fs::create_dir_all(&dir).unwrap();
//! fs::write(dir.join("config.yml"), "app_name: demo").unwrap();
//!
//! let config = load_merged_config(temp.path()).unwrap();
//! assert_eq!(config.app_name, Some("demo".to_string()));
//! ```
//!
//! # Configuration File Locations
//!
//! Configuration is optional. When present it is merged in this order:
//! 1. Project config (`.autosetup/config.yml`)
//! 2. Local overrides (`.autosetup/config.local.yml`)

pub mod env_file;
pub mod interpolation;
pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

pub use schema::{
    default_commands, CheckConfig, CommandSpec, DetectConfig, InputConfig, SetupConfig,
};

pub use loader::{
    find_project_root, load_config, load_config_file, load_config_value, load_merged_config,
    parse_config, ConfigPaths, CONFIG_DIR,
};

pub use merger::{deep_merge, merge_configs};

pub use validator::{validate, validate_config, ValidationError};

pub use interpolation::{
    extract_variables, has_interpolation, parse_interpolation, resolve_string,
    resolve_string_with_default, InterpolationContext, Segment,
};

pub use env_file::{EnvFileParser, EnvFileWriter};
