//! Layered configuration
//!
//! A [`Configurable`] struct is resolved from four sources, strongest first:
//!
//! | Source              | Example                                     |
//! |---------------------|---------------------------------------------|
//! | Command line        | `--max-retry-count=5`                       |
//! | Environment         | `INDEXER_MAX_RETRY_COUNT=5`                 |
//! | Configuration file  | `{"indexer": {"max-retry-count": 5}}`       |
//! | Struct default      | `Config { max_retry_count: 3, .. }`         |
//!
//! The configuration file itself is named by `--config` or
//! `<APP>_CONFIG_FILE`.

mod env;
mod error;
mod file;
mod naming;
mod overlay;
mod resolver;
mod schema;

pub use env::{EnvSource, ProcessEnv};
pub use error::{ConfigError, DecodeError, Result};
pub use file::{SectionBlock, decode_field, load_app_section};
pub use naming::{env_var_name, flag_name};
pub use overlay::{default_bool, default_int, default_string, default_string_list, overlay};
pub use resolver::{ConfigResolver, resolve_config};
pub use schema::{Configurable, FieldDescriptor, FieldKind, FieldValue, Schema};
