//! HTTP client construction, including TLS trust and key material.
//!
//! The client is built exactly once per logical connection. When trust or key
//! material is configured, the connection is forced onto TLS 1.1/1.2 with
//! hostname verification disabled: cluster certificates are typically
//! self-signed and issued per node, so they are not expected to match the
//! hostnames the driver dials.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use tracing::debug;

use crate::connection::ConnectionParams;
use crate::error::ConnectionError;

/// Lookup hook for files distributed by an external mechanism.
///
/// When the driver runs inside a distributed-compute host, store paths may
/// name files shipped to the worker rather than ordinary local paths. A
/// resolver maps such a name to the local path the mechanism materialized.
pub trait FileResolver: Send + Sync {
    /// Resolve a distributed file name to a local path, if known.
    fn resolve(&self, name: &str) -> Option<PathBuf>;
}

/// On-disk format of trust or key material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFormat {
    /// PEM-encoded certificate (trust material)
    Pem,
    /// DER-encoded certificate (trust material)
    Der,
    /// PKCS#12 archive (key material)
    Pkcs12,
}

impl FromStr for StoreFormat {
    type Err = ConnectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PEM" => Ok(StoreFormat::Pem),
            "DER" => Ok(StoreFormat::Der),
            "PKCS12" | "P12" => Ok(StoreFormat::Pkcs12),
            other => Err(ConnectionError::InvalidParameter {
                parameter: "storeType".to_string(),
                message: format!("Unsupported store type '{}', expected PEM, DER or PKCS12", other),
            }),
        }
    }
}

/// Descriptor of a trust-store or key-store file.
#[derive(Clone)]
pub struct StoreDescriptor {
    /// Path to the store, local or resolvable through a [`FileResolver`]
    pub path: String,
    /// Encoding of the store
    pub format: StoreFormat,
    password: Option<String>,
}

impl StoreDescriptor {
    /// Create a descriptor.
    pub fn new(path: impl Into<String>, format: StoreFormat, password: Option<String>) -> Self {
        Self {
            path: path.into(),
            format,
            password,
        }
    }

    pub(crate) fn password(&self) -> &str {
        self.password.as_deref().unwrap_or("")
    }
}

// Store passwords never reach log output.
impl fmt::Debug for StoreDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreDescriptor")
            .field("path", &self.path)
            .field("format", &self.format)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Build the shared HTTP client from the connection's TLS options.
///
/// Without trust or key material this is a plain client (plus the optional
/// custom user agent). With material, every filesystem, decoding, or TLS
/// construction failure surfaces synchronously as a configuration error;
/// nothing here is retried.
pub fn build_http_client(params: &ConnectionParams) -> Result<reqwest::Client, ConnectionError> {
    let mut builder = reqwest::Client::builder();

    if let Some(agent) = params.user_agent() {
        builder = builder.user_agent(agent.to_string());
    }

    let trust = params.trust_store();
    let key = params.key_store();

    if trust.is_some() || key.is_some() {
        builder = builder
            .use_native_tls()
            .min_tls_version(reqwest::tls::Version::TLS_1_1)
            .max_tls_version(reqwest::tls::Version::TLS_1_2)
            .danger_accept_invalid_hostnames(true);

        if let Some(store) = trust {
            let bytes = read_store(store, params.file_resolver())?;
            let certificate = match store.format {
                StoreFormat::Pem => reqwest::Certificate::from_pem(&bytes),
                StoreFormat::Der => reqwest::Certificate::from_der(&bytes),
                StoreFormat::Pkcs12 => {
                    return Err(ConnectionError::Configuration(format!(
                        "Trust store {} must be PEM or DER encoded",
                        store.path
                    )))
                }
            }
            .map_err(|e| {
                ConnectionError::Configuration(format!(
                    "Failed to load trust material from {}: {}",
                    store.path, e
                ))
            })?;
            builder = builder.add_root_certificate(certificate);
        }

        if let Some(store) = key {
            let bytes = read_store(store, params.file_resolver())?;
            let identity = match store.format {
                StoreFormat::Pkcs12 => {
                    reqwest::Identity::from_pkcs12_der(&bytes, store.password())
                }
                StoreFormat::Pem | StoreFormat::Der => {
                    return Err(ConnectionError::Configuration(format!(
                        "Key store {} must be a PKCS12 archive",
                        store.path
                    )))
                }
            }
            .map_err(|e| {
                ConnectionError::Configuration(format!(
                    "Failed to load key material from {}: {}",
                    store.path, e
                ))
            })?;
            builder = builder.identity(identity);
        }
    }

    builder
        .build()
        .map_err(|e| ConnectionError::Configuration(format!("Failed to build HTTP client: {}", e)))
}

/// Resolve a store path and read its contents.
///
/// A path that is not a local file is handed to the file resolver; a path
/// neither resolves is a fatal configuration error naming the path.
fn read_store(
    store: &StoreDescriptor,
    resolver: Option<&Arc<dyn FileResolver>>,
) -> Result<Vec<u8>, ConnectionError> {
    let local = Path::new(&store.path);
    let resolved: PathBuf = if local.exists() {
        local.to_path_buf()
    } else {
        match resolver.and_then(|r| r.resolve(&store.path)) {
            Some(path) if path.exists() => {
                debug!(name = %store.path, path = %path.display(), "resolved store through file resolver");
                path
            }
            _ => {
                return Err(ConnectionError::MissingTlsFile {
                    path: store.path.clone(),
                })
            }
        }
    };

    std::fs::read(&resolved).map_err(|e| {
        ConnectionError::Configuration(format!("Failed to read {}: {}", resolved.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionBuilder;

    struct MapResolver {
        name: String,
        target: PathBuf,
    }

    impl FileResolver for MapResolver {
        fn resolve(&self, name: &str) -> Option<PathBuf> {
            (name == self.name).then(|| self.target.clone())
        }
    }

    fn temp_file(name: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("restpp-rs-test-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_store_format_parsing() {
        assert_eq!("PEM".parse::<StoreFormat>().unwrap(), StoreFormat::Pem);
        assert_eq!("pem".parse::<StoreFormat>().unwrap(), StoreFormat::Pem);
        assert_eq!("der".parse::<StoreFormat>().unwrap(), StoreFormat::Der);
        assert_eq!("PKCS12".parse::<StoreFormat>().unwrap(), StoreFormat::Pkcs12);
        assert_eq!("p12".parse::<StoreFormat>().unwrap(), StoreFormat::Pkcs12);
        assert!("JKS".parse::<StoreFormat>().is_err());
    }

    #[test]
    fn test_store_descriptor_redacts_password() {
        let store = StoreDescriptor::new("/tmp/key.p12", StoreFormat::Pkcs12, Some("hunter2".into()));
        let debug = format!("{:?}", store);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_client_without_material_builds() {
        let params = ConnectionBuilder::new()
            .host("localhost")
            .graph("example_graph")
            .build()
            .unwrap();
        assert!(build_http_client(&params).is_ok());
    }

    #[test]
    fn test_missing_trust_store_names_path() {
        let params = ConnectionBuilder::new()
            .host("localhost")
            .trust_store(StoreDescriptor::new(
                "/nonexistent/trust.pem",
                StoreFormat::Pem,
                None,
            ))
            .build()
            .unwrap();

        match build_http_client(&params) {
            Err(ConnectionError::MissingTlsFile { path }) => {
                assert_eq!(path, "/nonexistent/trust.pem");
            }
            other => panic!("Expected MissingTlsFile, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_resolver_fallback_is_consulted() {
        let target = temp_file("resolved.pem", b"not a certificate");
        let params = ConnectionBuilder::new()
            .host("localhost")
            .trust_store(StoreDescriptor::new("dist/trust.pem", StoreFormat::Pem, None))
            .file_resolver(Arc::new(MapResolver {
                name: "dist/trust.pem".to_string(),
                target: target.clone(),
            }))
            .build()
            .unwrap();

        // Resolution succeeds; the garbage contents then fail as a
        // configuration error rather than a missing file.
        match build_http_client(&params) {
            Err(ConnectionError::Configuration(message)) => {
                assert!(message.contains("trust material"));
            }
            other => panic!("Expected Configuration error, got {:?}", other.map(|_| ())),
        }
        std::fs::remove_file(target).ok();
    }

    #[test]
    fn test_malformed_trust_material_is_configuration_error() {
        let path = temp_file("garbage.pem", b"-----BEGIN NONSENSE-----");
        let params = ConnectionBuilder::new()
            .host("localhost")
            .trust_store(StoreDescriptor::new(
                path.to_str().unwrap(),
                StoreFormat::Pem,
                None,
            ))
            .build()
            .unwrap();

        assert!(matches!(
            build_http_client(&params),
            Err(ConnectionError::Configuration(_))
        ));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_pkcs12_rejected_as_trust_material() {
        let path = temp_file("trust.p12", b"irrelevant");
        let params = ConnectionBuilder::new()
            .host("localhost")
            .trust_store(StoreDescriptor::new(
                path.to_str().unwrap(),
                StoreFormat::Pkcs12,
                None,
            ))
            .build()
            .unwrap();

        match build_http_client(&params) {
            Err(ConnectionError::Configuration(message)) => {
                assert!(message.contains("PEM or DER"));
            }
            other => panic!("Expected Configuration error, got {:?}", other.map(|_| ())),
        }
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_pem_rejected_as_key_material() {
        let path = temp_file("key.pem", b"irrelevant");
        let params = ConnectionBuilder::new()
            .host("localhost")
            .key_store(StoreDescriptor::new(
                path.to_str().unwrap(),
                StoreFormat::Pem,
                None,
            ))
            .build()
            .unwrap();

        match build_http_client(&params) {
            Err(ConnectionError::Configuration(message)) => {
                assert!(message.contains("PKCS12"));
            }
            other => panic!("Expected Configuration error, got {:?}", other.map(|_| ())),
        }
        std::fs::remove_file(path).ok();
    }
}
