//! Integration tests for the translator facade with stub collaborators.

use msgmap_translator::{
    BoxError, EncryptionKind, Encryptor, ForwardRequest, Forwarder, TranslationError, TranslationOptions, Translator,
};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

fn testdata() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../testdata")
}

fn message(name: &str) -> String {
    fs::read_to_string(testdata().join("messages").join(name)).unwrap()
}

/// Tags content with the cipher and key instead of encrypting it
struct TaggingEncryptor;

impl Encryptor for TaggingEncryptor {
    fn encrypt(&self, content: &str, kind: EncryptionKind, key_ref: Option<&str>) -> Result<String, BoxError> {
        match key_ref {
            Some(key) => Ok(format!("{kind}[{key}]:{}", content.len())),
            None => Err("missing key reference".into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Delivered {
    endpoint: String,
    body: String,
    api_key: Option<String>,
    connect_timeout: Duration,
}

#[derive(Default, Clone)]
struct RecordingForwarder {
    delivered: Arc<Mutex<Vec<Delivered>>>,
    fail: bool,
}

impl Forwarder for RecordingForwarder {
    fn forward(&self, request: &ForwardRequest<'_>) -> Result<String, BoxError> {
        if self.fail {
            return Err("connection refused".into());
        }
        self.delivered.lock().unwrap().push(Delivered {
            endpoint: request.endpoint.to_string(),
            body: request.body.to_string(),
            api_key: request.api_key.map(str::to_string),
            connect_timeout: request.connect_timeout,
        });
        Ok("<Ack/>".to_string())
    }
}

fn translator() -> Translator {
    Translator::new(testdata().join("routes"))
}

#[test]
fn test_translate_request_and_response() {
    let translator = translator();

    let xml = translator
        .translate_request(&message("credit-transfer.json"), "credit-transfer")
        .unwrap();
    assert!(xml.contains("<MsgId>MSG-20240307-0001</MsgId>"));

    let json = translator
        .translate_response(&message("pacs002-reply.xml"), "credit-transfer")
        .unwrap();
    assert!(json.contains(r#""responseCode":"25""#), "{json}");
}

#[test]
fn test_response_uses_inbound_format() {
    let reply = translator()
        .translate_response(&message("legacy-reply.xml"), "legacy-soap")
        .unwrap();
    assert!(reply.starts_with("<?xml"));
    assert!(reply.contains("<TSQuerySingleResponse>"));
}

#[test]
fn test_response_defaults_to_json() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("no-format.yaml"),
        "mappings:\n  response:\n    - from: \"constant:OK\"\n      to: status\n",
    )
    .unwrap();

    let reply = Translator::new(dir.path())
        .translate_response("<Document/>", "no-format")
        .unwrap();
    assert_eq!(reply, r#"{"status":"OK"}"#);
}

#[test]
fn test_malformed_input_is_translate_error() {
    let err = translator()
        .translate_request("{broken", "credit-transfer")
        .unwrap_err();
    assert!(matches!(err, TranslationError::Translate { .. }));
    assert_eq!(err.to_string(), "Failed to translate request for routeId: credit-transfer");
}

#[test]
fn test_options_without_extras() {
    let result = translator()
        .translate_with_options(&message("credit-transfer.json"), &TranslationOptions::new("credit-transfer"))
        .unwrap();
    assert!(!result.forwarded);
    assert!(result.forwarding_response.is_none());
    assert!(result.target_message.contains("<Purp><Cd>SUPP</Cd></Purp>"));
}

#[test]
fn test_encrypt_then_forward() -> anyhow::Result<()> {
    let forwarder = RecordingForwarder::default();
    let delivered = Arc::clone(&forwarder.delivered);
    let translator = Translator::builder()
        .routes_dir(testdata().join("routes"))
        .encryptor(TaggingEncryptor)
        .forwarder(forwarder)
        .build();

    let options = TranslationOptions::new("legacy-soap")
        .with_encryption(EncryptionKind::Pgp, "partner")
        .with_forwarding("https://core.example.test/iso/status", Some("secret".to_string()));
    let result = translator.translate_with_options(&message("legacy-query.xml"), &options)?;

    assert!(result.forwarded);
    assert_eq!(result.forwarding_response.as_deref(), Some("<Ack/>"));
    assert!(result.target_message.starts_with("PGP[partner]:"));

    let delivered = delivered.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].body, result.target_message);
    assert_eq!(delivered[0].api_key.as_deref(), Some("secret"));
    assert_eq!(delivered[0].connect_timeout, Duration::from_millis(5_000));
    Ok(())
}

#[test]
fn test_missing_collaborators() {
    let translator = translator();
    let input = message("credit-transfer.json");

    let encrypt = TranslationOptions::new("credit-transfer").with_encryption(EncryptionKind::Aes, "k");
    assert!(matches!(
        translator.translate_with_options(&input, &encrypt),
        Err(TranslationError::EncryptorMissing)
    ));

    let forward = TranslationOptions::new("credit-transfer").with_forwarding("https://x.test", None);
    assert!(matches!(
        translator.translate_with_options(&input, &forward),
        Err(TranslationError::ForwarderMissing)
    ));
}

#[test]
fn test_forward_without_endpoint() {
    let translator = Translator::builder()
        .routes_dir(testdata().join("routes"))
        .forwarder(RecordingForwarder::default())
        .build();
    let mut options = TranslationOptions::new("credit-transfer");
    options.forward = true;

    let err = translator
        .translate_with_options(&message("credit-transfer.json"), &options)
        .unwrap_err();
    assert!(matches!(err, TranslationError::InvalidOptions(_)));
}

#[test]
fn test_collaborator_failures() {
    let translator = Translator::builder()
        .routes_dir(testdata().join("routes"))
        .encryptor(TaggingEncryptor)
        .forwarder(RecordingForwarder {
            fail: true,
            ..RecordingForwarder::default()
        })
        .build();
    let input = message("credit-transfer.json");

    let mut no_key = TranslationOptions::new("credit-transfer");
    no_key.encrypt = true;
    let err = translator.translate_with_options(&input, &no_key).unwrap_err();
    assert_eq!(err.to_string(), "Encryption failed: missing key reference");

    let forward = TranslationOptions::new("credit-transfer").with_forwarding("https://down.test", None);
    let err = translator.translate_with_options(&input, &forward).unwrap_err();
    assert!(matches!(err, TranslationError::Forwarding { ref endpoint, .. } if endpoint == "https://down.test"));
}
