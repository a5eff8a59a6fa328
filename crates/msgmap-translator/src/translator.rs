//! Translator facade

use crate::collaborators::{Encryptor, ForwardRequest, Forwarder};
use crate::options::{TranslationOptions, TranslationResult};
use crate::{Direction, Result, TranslationError};
use msgmap_codec::MessageFormat;
use msgmap_mapping::{MappingConfig, MappingEngine, RouteLoader, RouteRegistry, Transformer};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Routes directory used when none is configured
pub const DEFAULT_ROUTES_DIR: &str = "./mappings";

/// Translates messages for configured routes
///
/// Route configs are loaded on first use and cached; call
/// [`Translator::registry`] to refresh them.
pub struct Translator {
    registry: RouteRegistry,
    engine: MappingEngine,
    encryptor: Option<Arc<dyn Encryptor>>,
    forwarder: Option<Arc<dyn Forwarder>>,
}

impl Translator {
    /// Translator over `routes_dir` without collaborators
    pub fn new(routes_dir: impl Into<PathBuf>) -> Self {
        TranslatorBuilder::new().routes_dir(routes_dir).build()
    }

    #[must_use]
    pub fn builder() -> TranslatorBuilder {
        TranslatorBuilder::new()
    }

    /// Route cache backing this translator
    #[must_use]
    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    /// Map an inbound message to the route's canonical XML
    ///
    /// # Errors
    ///
    /// Returns [`TranslationError::Load`] when the route cannot be loaded and
    /// [`TranslationError::Translate`] when the message cannot be mapped.
    pub fn translate_request(&self, content: &str, route_id: &str) -> Result<String> {
        let config = self.route(route_id)?;
        self.request(content, &config)
    }

    /// Map a canonical XML reply back to the route's inbound format (JSON
    /// when the route does not declare one)
    ///
    /// # Errors
    ///
    /// As for [`Translator::translate_request`].
    pub fn translate_response(&self, content: &str, route_id: &str) -> Result<String> {
        self.translate_response_as(content, route_id, None)
    }

    /// Like [`Translator::translate_response`], with an explicit reply format
    /// taking precedence over the route's inbound format
    ///
    /// # Errors
    ///
    /// As for [`Translator::translate_request`].
    pub fn translate_response_as(&self, content: &str, route_id: &str, format: Option<MessageFormat>) -> Result<String> {
        let config = self.route(route_id)?;
        let reply_format = format.or(config.inbound_format).unwrap_or(MessageFormat::Json);
        self.engine
            .transform_from_target(content, &config, reply_format)
            .map_err(|source| TranslationError::Translate {
                route: route_id.to_string(),
                direction: Direction::Response,
                source,
            })
    }

    /// Map a request, then encrypt and forward it as `options` ask
    ///
    /// # Errors
    ///
    /// Besides load and mapping failures, fails when a requested step has no
    /// collaborator configured, when forwarding lacks an endpoint, or when a
    /// collaborator reports an error.
    pub fn translate_with_options(&self, content: &str, options: &TranslationOptions) -> Result<TranslationResult> {
        let route = options.route_id.as_str();
        let config = self.route(route)?;

        if options.forward && options.endpoint.as_deref().is_none_or(|e| e.trim().is_empty()) {
            return Err(TranslationError::InvalidOptions(format!(
                "forwarding requested for routeId {route} without an endpoint"
            )));
        }

        let mut target = self.request(content, &config)?;

        if options.encrypt {
            let encryptor = self.encryptor.as_ref().ok_or(TranslationError::EncryptorMissing)?;
            target = encryptor
                .encrypt(&target, options.encryption_type, options.encryption_key_ref.as_deref())
                .map_err(TranslationError::Encryption)?;
            debug!(route, kind = %options.encryption_type, "encrypted target message");
        }

        if !options.forward {
            return Ok(TranslationResult::without_forwarding(target));
        }

        let forwarder = self.forwarder.as_ref().ok_or(TranslationError::ForwarderMissing)?;
        let endpoint = options.endpoint.as_deref().unwrap_or_default();
        let request = ForwardRequest {
            endpoint,
            body: &target,
            api_key: options.forwarding_api_key.as_deref(),
            connect_timeout: options.connect_timeout,
            read_timeout: options.read_timeout,
        };
        let response = forwarder
            .forward(&request)
            .map_err(|source| TranslationError::Forwarding {
                endpoint: endpoint.to_string(),
                source,
            })?;
        info!(route, endpoint, "forwarded target message");

        Ok(TranslationResult::with_forwarding(target, response))
    }

    fn route(&self, route_id: &str) -> Result<Arc<MappingConfig>> {
        self.registry
            .get_or_load(route_id)
            .map_err(|source| TranslationError::Load {
                route: route_id.to_string(),
                source,
            })
    }

    fn request(&self, content: &str, config: &MappingConfig) -> Result<String> {
        self.engine
            .transform_to_target(content, config)
            .map_err(|source| TranslationError::Translate {
                route: config.route_id.clone(),
                direction: Direction::Request,
                source,
            })
    }
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("registry", &self.registry)
            .field("encryptor", &self.encryptor.is_some())
            .field("forwarder", &self.forwarder.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Translator`]
#[derive(Default)]
pub struct TranslatorBuilder {
    routes_dir: Option<PathBuf>,
    transformer: Option<Transformer>,
    encryptor: Option<Arc<dyn Encryptor>>,
    forwarder: Option<Arc<dyn Forwarder>>,
}

impl TranslatorBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory holding `<routeId>.yaml` files; defaults to `./mappings`
    #[must_use]
    pub fn routes_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.routes_dir = Some(dir.into());
        self
    }

    /// Transformer used by the engine, e.g. with a fixed clock
    #[must_use]
    pub fn transformer(mut self, transformer: Transformer) -> Self {
        self.transformer = Some(transformer);
        self
    }

    #[must_use]
    pub fn encryptor(mut self, encryptor: impl Encryptor + 'static) -> Self {
        self.encryptor = Some(Arc::new(encryptor));
        self
    }

    #[must_use]
    pub fn forwarder(mut self, forwarder: impl Forwarder + 'static) -> Self {
        self.forwarder = Some(Arc::new(forwarder));
        self
    }

    #[must_use]
    pub fn build(self) -> Translator {
        let routes_dir = self
            .routes_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ROUTES_DIR));
        Translator {
            registry: RouteRegistry::new(RouteLoader::new(routes_dir)),
            engine: self
                .transformer
                .map_or_else(MappingEngine::new, MappingEngine::with_transformer),
            encryptor: self.encryptor,
            forwarder: self.forwarder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_routes_dir() {
        let translator = TranslatorBuilder::new().build();
        assert_eq!(
            translator.registry().loader().routes_dir(),
            std::path::Path::new(DEFAULT_ROUTES_DIR)
        );
    }

    #[test]
    fn test_unknown_route_is_load_error() {
        let translator = Translator::new("/nonexistent/routes");
        let err = translator.translate_request("{}", "missing").unwrap_err();
        assert!(matches!(err, TranslationError::Load { ref route, .. } if route == "missing"));
        assert_eq!(err.to_string(), "Failed to load mapping for routeId: missing");
    }
}
