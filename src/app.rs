use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    adapters::outbound::{
        gcp::TokenSource,
        messaging::{InMemoryPublisher, PubsubPublisher},
        storage::{GcsSettings, ObjectStoreAdapter, StoreProvider},
    },
    domain::{errors::ConfigError, models::ErrorPolicy, value_objects::BucketName},
    ports::{messaging::EventPublisher, storage::ObjectStorage},
    services::{BlobServiceImpl, FetchServiceImpl, RelayServiceImpl},
};

/// Bucket that finalized objects are moved into. The only key that is
/// required in every deployment.
pub const ENV_BUCKET_DESTINATION: &str = "BUCKET_DESTINATION";
/// Project that topics are resolved against; required with the pubsub backend
pub const ENV_PROJECT_ID: &str = "PROJECT_ID";
/// Topic for successful fetch notifications; enables fetching when set
pub const ENV_OUTPUT_TOPIC: &str = "OUTPUT_TOPIC_NAME";
/// Topic for failed fetch notifications; enables fetching when set
pub const ENV_ERROR_TOPIC: &str = "ERROR_TOPIC_NAME";
/// `memory` (default) or `gcs`
pub const ENV_STORAGE_BACKEND: &str = "STORAGE_BACKEND";
/// `memory` (default) or `pubsub`
pub const ENV_PUBLISHER_BACKEND: &str = "PUBLISHER_BACKEND";
/// Failure routing for the relay: `suppress`, `propagate`, `dead-letter:<topic>`
pub const ENV_ERROR_POLICY: &str = "RELAY_ON_ERROR";
/// Path to a service account key file for storage access
pub const ENV_SERVICE_ACCOUNT_PATH: &str = "GOOGLE_SERVICE_ACCOUNT_PATH";
/// Storage endpoint override, for emulators
pub const ENV_STORAGE_ENDPOINT: &str = "STORAGE_EMULATOR_HOST";
/// Pub/Sub endpoint override, for emulators
pub const ENV_PUBSUB_ENDPOINT: &str = "PUBSUB_EMULATOR_HOST";
/// Fixed bearer token; when absent the metadata server is used
pub const ENV_ACCESS_TOKEN: &str = "GCP_ACCESS_TOKEN";

/// Storage backend configuration
#[derive(Debug, Clone)]
pub enum StorageBackend {
    InMemory,
    Gcs {
        service_account_path: Option<String>,
        endpoint: Option<String>,
    },
}

/// Publisher backend configuration
#[derive(Debug, Clone)]
pub enum PublisherBackend {
    InMemory,
    Pubsub {
        project: String,
        endpoint: Option<String>,
        access_token: Option<String>,
    },
}

/// Topics for fetch notifications; present only when fetching is enabled
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub output_topic: String,
    pub error_topic: String,
}

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub destination: BucketName,
    pub storage_backend: StorageBackend,
    pub publisher_backend: PublisherBackend,
    pub error_policy: ErrorPolicy,
    pub fetch: Option<FetchConfig>,
}

impl AppConfig {
    /// In-memory configuration for testing and development
    pub fn in_memory(destination: BucketName) -> Self {
        Self {
            destination,
            storage_backend: StorageBackend::InMemory,
            publisher_backend: PublisherBackend::InMemory,
            error_policy: ErrorPolicy::default(),
            fetch: None,
        }
    }

    /// Read configuration from a key/value snapshot.
    ///
    /// Missing keys are collected across the whole map and reported in one
    /// error, so a fresh deployment is not fixed one variable at a time.
    /// Blank values count as missing.
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| -> Option<&str> {
            vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
        };

        let destination_raw = get(ENV_BUCKET_DESTINATION);
        let publisher_kind = get(ENV_PUBLISHER_BACKEND).unwrap_or("memory");
        let output_topic = get(ENV_OUTPUT_TOPIC);
        let error_topic = get(ENV_ERROR_TOPIC);

        let fetch_enabled = output_topic.is_some() || error_topic.is_some();

        let mut missing = Vec::new();
        if destination_raw.is_none() {
            missing.push(ENV_BUCKET_DESTINATION.to_string());
        }
        // Topics resolve against a project, so the fetch surface needs one too.
        if (publisher_kind == "pubsub" || fetch_enabled) && get(ENV_PROJECT_ID).is_none() {
            missing.push(ENV_PROJECT_ID.to_string());
        }
        if fetch_enabled {
            if output_topic.is_none() {
                missing.push(ENV_OUTPUT_TOPIC.to_string());
            }
            if error_topic.is_none() {
                missing.push(ENV_ERROR_TOPIC.to_string());
            }
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingKeys(missing));
        }

        let Some(destination_raw) = destination_raw else {
            return Err(ConfigError::MissingKeys(vec![
                ENV_BUCKET_DESTINATION.to_string(),
            ]));
        };
        let destination =
            BucketName::new(destination_raw.to_string()).map_err(|e| ConfigError::Invalid {
                key: ENV_BUCKET_DESTINATION.to_string(),
                value: destination_raw.to_string(),
                expected: e.to_string(),
            })?;

        let storage_backend = match get(ENV_STORAGE_BACKEND).unwrap_or("memory") {
            "memory" => StorageBackend::InMemory,
            "gcs" => StorageBackend::Gcs {
                service_account_path: get(ENV_SERVICE_ACCOUNT_PATH).map(|v| v.to_string()),
                endpoint: get(ENV_STORAGE_ENDPOINT).map(|v| v.to_string()),
            },
            other => {
                return Err(ConfigError::Invalid {
                    key: ENV_STORAGE_BACKEND.to_string(),
                    value: other.to_string(),
                    expected: "memory or gcs".to_string(),
                })
            }
        };

        let publisher_backend = match publisher_kind {
            "memory" => PublisherBackend::InMemory,
            "pubsub" => {
                let Some(project) = get(ENV_PROJECT_ID) else {
                    return Err(ConfigError::MissingKeys(vec![ENV_PROJECT_ID.to_string()]));
                };
                PublisherBackend::Pubsub {
                    project: project.to_string(),
                    endpoint: get(ENV_PUBSUB_ENDPOINT).map(|v| v.to_string()),
                    access_token: get(ENV_ACCESS_TOKEN).map(|v| v.to_string()),
                }
            }
            other => {
                return Err(ConfigError::Invalid {
                    key: ENV_PUBLISHER_BACKEND.to_string(),
                    value: other.to_string(),
                    expected: "memory or pubsub".to_string(),
                })
            }
        };

        let error_policy = match get(ENV_ERROR_POLICY) {
            None => ErrorPolicy::default(),
            Some(raw) => ErrorPolicy::parse(raw).ok_or_else(|| ConfigError::Invalid {
                key: ENV_ERROR_POLICY.to_string(),
                value: raw.to_string(),
                expected: "suppress, propagate, or dead-letter:<topic>".to_string(),
            })?,
        };

        let fetch = match (output_topic, error_topic) {
            (Some(output), Some(error)) => Some(FetchConfig {
                output_topic: output.to_string(),
                error_topic: error.to_string(),
            }),
            _ => None,
        };

        Ok(Self {
            destination,
            storage_backend,
            publisher_backend,
            error_policy,
            fetch,
        })
    }

    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_map(&vars)
    }
}

/// Application dependencies container
#[derive(Clone)]
pub struct AppDependencies {
    pub storage: Arc<dyn ObjectStorage>,
    pub publisher: Arc<dyn EventPublisher>,
}

/// Application services container
pub struct AppServices {
    pub relay_service: RelayServiceImpl,
    pub blob_service: BlobServiceImpl,
    pub fetch_service: Option<FetchServiceImpl>,
}

/// Application builder for dependency injection
pub struct AppBuilder {
    config: AppConfig,
}

impl AppBuilder {
    /// Create a new application builder
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Build the outbound dependencies
    pub fn build_dependencies(&self) -> Result<AppDependencies, AppError> {
        let storage: Arc<dyn ObjectStorage> = match &self.config.storage_backend {
            StorageBackend::InMemory => Arc::new(ObjectStoreAdapter::new(StoreProvider::Memory)),
            StorageBackend::Gcs {
                service_account_path,
                endpoint,
            } => Arc::new(ObjectStoreAdapter::new(StoreProvider::Gcs(GcsSettings {
                service_account_path: service_account_path.clone(),
                endpoint: endpoint.clone(),
            }))),
        };

        let publisher: Arc<dyn EventPublisher> = match &self.config.publisher_backend {
            PublisherBackend::InMemory => Arc::new(InMemoryPublisher::new()),
            PublisherBackend::Pubsub {
                project,
                endpoint,
                access_token,
            } => {
                let client = http_client()?;
                let token_source = Arc::new(match access_token {
                    Some(token) => TokenSource::fixed(token.clone()),
                    None => TokenSource::metadata(client.clone()),
                });
                let publisher = match endpoint {
                    Some(endpoint) => PubsubPublisher::with_base_url(
                        client,
                        endpoint.clone(),
                        project.clone(),
                        token_source,
                    ),
                    None => PubsubPublisher::new(client, project.clone(), token_source),
                };
                Arc::new(publisher)
            }
        };

        Ok(AppDependencies { storage, publisher })
    }

    /// Build the complete application with services
    pub fn build(&self) -> Result<AppServices, AppError> {
        let deps = self.build_dependencies()?;
        self.build_with(deps)
    }

    /// Build the services over dependencies constructed elsewhere. Lets a
    /// caller keep a handle on the same storage the services use.
    pub fn build_with(&self, deps: AppDependencies) -> Result<AppServices, AppError> {
        let relay_service = RelayServiceImpl::new(
            deps.storage.clone(),
            deps.publisher.clone(),
            self.config.destination.clone(),
            self.config.error_policy.clone(),
        );

        let blob_service = BlobServiceImpl::new(deps.storage.clone());

        let fetch_service = match &self.config.fetch {
            Some(fetch) => Some(FetchServiceImpl::new(
                deps.storage.clone(),
                deps.publisher.clone(),
                http_client()?,
                fetch.output_topic.clone(),
                fetch.error_topic.clone(),
            )),
            None => None,
        };

        Ok(AppServices {
            relay_service,
            blob_service,
            fetch_service,
        })
    }
}

fn http_client() -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .build()
        .map_err(|e| AppError::HttpClientInit {
            message: e.to_string(),
        })
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Storage initialization error: {message}")]
    StorageInit { message: String },

    #[error("HTTP client initialization error: {message}")]
    HttpClientInit { message: String },
}

/// Convenience functions for common configurations
///
/// Create an in-memory application for testing and development
pub fn create_in_memory_app(destination: &str) -> Result<AppServices, AppError> {
    let destination = BucketName::new(destination.to_string()).map_err(|e| {
        AppError::Configuration(ConfigError::Invalid {
            key: ENV_BUCKET_DESTINATION.to_string(),
            value: destination.to_string(),
            expected: e.to_string(),
        })
    })?;

    AppBuilder::new(AppConfig::in_memory(destination)).build()
}

/// Create a GCS-backed application with an in-memory publisher
pub fn create_gcs_app(
    destination: &str,
    service_account_path: Option<String>,
) -> Result<AppServices, AppError> {
    let destination = BucketName::new(destination.to_string()).map_err(|e| {
        AppError::Configuration(ConfigError::Invalid {
            key: ENV_BUCKET_DESTINATION.to_string(),
            value: destination.to_string(),
            expected: e.to_string(),
        })
    })?;

    let config = AppConfig {
        destination,
        storage_backend: StorageBackend::Gcs {
            service_account_path,
            endpoint: None,
        },
        publisher_backend: PublisherBackend::InMemory,
        error_policy: ErrorPolicy::default(),
        fetch: None,
    };

    AppBuilder::new(config).build()
}

/// Create application from environment variables
pub fn create_app_from_env() -> Result<AppServices, AppError> {
    let config = AppConfig::from_env()?;
    AppBuilder::new(config).build()
}
