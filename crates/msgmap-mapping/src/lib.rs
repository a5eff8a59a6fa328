//! # msgmap-mapping
//!
//! Route configuration, path resolution, transform expressions and the
//! mapping runtime for msgmap.
//!
//! A route is described declaratively in YAML: which wire format arrives,
//! how the canonical XML document is rooted and namespaced, and an ordered
//! list of field mappings for each direction. The [`MappingEngine`] applies
//! those mappings to whole in-memory messages.

pub mod config;
pub mod datetime;
pub mod expression;
pub mod loader;
pub mod paths;
pub mod registry;
pub mod runtime;
pub mod transforms;

pub use config::{AuthConfig, FieldMapping, MappingConfig, Mappings, Mode, NamespaceConfig};
pub use expression::Expression;
pub use loader::RouteLoader;
pub use registry::RouteRegistry;
pub use runtime::MappingEngine;
pub use transforms::{Clock, Transformer};

use thiserror::Error;

/// Errors that can occur while loading routes or mapping messages
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to parse message for route '{route}': {source}")]
    Parse {
        route: String,
        #[source]
        source: msgmap_codec::Error,
    },

    #[error("Mapping error for route '{route}': {message}")]
    Mapping { route: String, message: String },

    #[error("Transform error: {0}")]
    Transform(String),

    #[error("Invalid route configuration: {0}")]
    Config(String),

    #[error("Route not found: {0}")]
    NotFound(String),

    #[error("Document error: {0}")]
    Document(#[from] msgmap_ir::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a parse error attributed to a route
    pub fn parse(route: impl Into<String>, source: msgmap_codec::Error) -> Self {
        Self::Parse {
            route: route.into(),
            source,
        }
    }

    /// Build a structural mapping error attributed to a route
    pub fn mapping(route: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Mapping {
            route: route.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
