//! Route configuration loader
//!
//! Routes live one per file as `<routes_dir>/<routeId>.yaml` (or `.yml`).

use crate::config::MappingConfig;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

const EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// Loads route configurations from a directory
#[derive(Debug, Clone)]
pub struct RouteLoader {
    routes_dir: PathBuf,
}

impl RouteLoader {
    /// Create a loader reading from `routes_dir`
    pub fn new(routes_dir: impl Into<PathBuf>) -> Self {
        Self {
            routes_dir: routes_dir.into(),
        }
    }

    /// Directory routes are read from
    #[must_use]
    pub fn routes_dir(&self) -> &Path {
        &self.routes_dir
    }

    /// Load and validate the route named `route_id`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an id that is not a plain file stem or a
    /// file that fails to parse or validate, and [`Error::NotFound`] when no
    /// file exists for the id.
    pub fn load(&self, route_id: &str) -> Result<MappingConfig> {
        let route_id = route_id.trim();
        if route_id.is_empty()
            || route_id.contains(['/', '\\'])
            || route_id == "."
            || route_id == ".."
        {
            return Err(Error::Config(format!("invalid route id '{route_id}'")));
        }

        for extension in EXTENSIONS {
            let path = self.routes_dir.join(format!("{route_id}.{extension}"));
            if path.is_file() {
                trace!("Found route file: {:?}", path);
                return self.read_route(&path, route_id);
            }
        }

        Err(Error::NotFound(format!(
            "route '{route_id}' (searched {:?} for .yaml/.yml)",
            self.routes_dir
        )))
    }

    /// Load a route from an explicit file; the id comes from the file stem
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read and
    /// [`Error::Config`] when it fails to parse or validate.
    pub fn load_from_file(&self, path: &Path) -> Result<MappingConfig> {
        let route_id = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| Error::Config(format!("cannot derive a route id from {path:?}")))?;
        self.read_route(path, route_id)
    }

    /// Load every route in the directory, sorted by route id
    ///
    /// # Errors
    ///
    /// Fails on the first unreadable directory entry or invalid route file.
    pub fn load_all(&self) -> Result<Vec<MappingConfig>> {
        let mut routes = Vec::new();
        for entry in std::fs::read_dir(&self.routes_dir)? {
            let path = entry?.path();
            let is_route = path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| EXTENSIONS.contains(&e));
            if is_route {
                routes.push(self.load_from_file(&path)?);
            }
        }
        routes.sort_by(|a, b| a.route_id.cmp(&b.route_id));
        info!(count = routes.len(), dir = ?self.routes_dir, "loaded routes");
        Ok(routes)
    }

    fn read_route(&self, path: &Path, route_id: &str) -> Result<MappingConfig> {
        let content = std::fs::read_to_string(path)?;
        let mut config = MappingConfig::from_yaml(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;

        if config.route_id.trim().is_empty() {
            config.route_id = route_id.to_string();
        } else if config.route_id != route_id {
            warn!(
                file = %path.display(),
                declared = %config.route_id,
                "routeId differs from file name; using file name"
            );
            config.route_id = route_id.to_string();
        }

        config.validate()?;
        debug!(
            route = %config.route_id,
            request = config.mappings.request.len(),
            response = config.mappings.response.len(),
            "loaded route"
        );
        Ok(config)
    }
}
