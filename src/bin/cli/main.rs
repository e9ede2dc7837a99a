use anyhow::{bail, Context, Result};
use bytes::Bytes;
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio_util::io::StreamReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cloud_relay::{
    adapters::inbound::http::dto::{FetchOutcomeDto, RelayOutcomeDto},
    adapters::outbound::gcp::{
        BigQueryClient, FirestoreClient, SourceFormat, TableReference, TokenSource,
    },
    app::{AppBuilder, AppConfig, AppDependencies, AppServices, ENV_ACCESS_TOKEN, ENV_PROJECT_ID},
    domain::{
        models::{FetchRequest, StorageEvent, ATTR_BUCKET_ID, ATTR_EVENT_TYPE, ATTR_OBJECT_ID},
        value_objects::{BucketName, ObjectName, ObjectUri},
    },
    ports::{
        messaging::EventPublisher,
        services::{BlobService, FetchService, RelayService},
        storage::ObjectStorage,
    },
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LoadFormat {
    Csv,
    Json,
}

impl From<LoadFormat> for SourceFormat {
    fn from(format: LoadFormat) -> Self {
        match format {
            LoadFormat::Csv => SourceFormat::Csv,
            LoadFormat::Json => SourceFormat::NewlineDelimitedJson,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "cloud-relay-cli")]
#[command(about = "Run relay operations directly against the configured backends", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a storage notification through the relay
    Move {
        /// Source bucket
        bucket: String,
        /// Source object
        object: String,
        /// Event type attribute
        #[arg(long, default_value = "OBJECT_FINALIZE")]
        event_type: String,
    },

    /// Mirror a remote file into a bucket
    Fetch {
        /// Source URL; supports the $DATEISO and $DATEDIFF tokens
        url: String,
        /// Destination bucket
        bucket: String,
        /// Destination object name
        destination: String,
        /// Days subtracted from today for $DATEDIFF
        #[arg(long)]
        datediff: Option<i64>,
    },

    /// Upload a local file to a bucket
    Upload {
        /// File to upload
        file: PathBuf,
        /// Destination bucket
        bucket: String,
        /// Destination object name
        object: String,
        /// Content type; defaults to text/csv
        #[arg(long)]
        content_type: Option<String>,
    },

    /// Stream an object to a file or stdout
    Cat {
        /// Source bucket
        bucket: String,
        /// Source object
        object: String,
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Publish a message to a topic
    Publish {
        /// Topic short name
        topic: String,
        /// Message body
        message: String,
    },

    /// Start a load job from bucket objects into a table
    Load {
        /// Source object URIs (gs://bucket/name)
        #[arg(required = true)]
        uris: Vec<String>,
        /// Destination dataset
        #[arg(long)]
        dataset: String,
        /// Destination table
        #[arg(long)]
        table: String,
        /// Source data format
        #[arg(long, value_enum, default_value_t = LoadFormat::Csv)]
        format: LoadFormat,
    },

    /// Request a manual run of a transfer config
    TransferRun {
        /// Full transfer config resource name
        /// (projects/<p>/locations/<l>/transferConfigs/<id>)
        resource: String,
    },

    /// Merge fields into a document
    DocSet {
        /// Collection id
        collection: String,
        /// Document id
        document: String,
        /// Fields as a JSON object
        fields: String,
    },

    /// Delete every document in a collection
    DocClear {
        /// Collection id
        collection: String,
        /// Documents deleted per listing round
        #[arg(long, default_value = "20")]
        batch_size: usize,
    },
}

/// Storage and messaging wired from the environment, sharing one set of
/// dependencies so direct access and the services see the same state.
struct Backends {
    deps: AppDependencies,
    services: AppServices,
}

fn backends() -> Result<Backends> {
    let config = AppConfig::from_env().context("Invalid configuration")?;
    let builder = AppBuilder::new(config);
    let deps = builder.build_dependencies()?;
    let services = builder.build_with(deps.clone())?;
    Ok(Backends { deps, services })
}

/// Client plus credentials for the commands that talk to the Google APIs
struct Apis {
    client: reqwest::Client,
    project: String,
    token_source: Arc<TokenSource>,
}

fn apis() -> Result<Apis> {
    let project = std::env::var(ENV_PROJECT_ID)
        .with_context(|| format!("{} is required", ENV_PROJECT_ID))?;
    let client = reqwest::Client::builder().build()?;
    let token_source = Arc::new(match std::env::var(ENV_ACCESS_TOKEN) {
        Ok(token) => TokenSource::fixed(token),
        Err(_) => TokenSource::metadata(client.clone()),
    });

    Ok(Apis {
        client,
        project,
        token_source,
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Move {
            bucket,
            object,
            event_type,
        } => {
            let backends = backends()?;

            let mut attributes = HashMap::new();
            attributes.insert(ATTR_BUCKET_ID.to_string(), bucket);
            attributes.insert(ATTR_OBJECT_ID.to_string(), object);
            attributes.insert(ATTR_EVENT_TYPE.to_string(), event_type);

            let event = StorageEvent::from_attributes(&attributes)?;
            let outcome = backends.services.relay_service.handle_event(event).await?;
            print_json(&RelayOutcomeDto::from(outcome))?;
        }

        Commands::Fetch {
            url,
            bucket,
            destination,
            datediff,
        } => {
            let backends = backends()?;
            let Some(fetch_service) = backends.services.fetch_service else {
                bail!("Fetching requires OUTPUT_TOPIC_NAME and ERROR_TOPIC_NAME to be set");
            };

            let request = FetchRequest {
                source_url: url,
                bucket,
                destination,
                datediff,
            };

            // A failed fetch is part of the outcome, not a process error.
            let outcome = fetch_service.handle_request(request).await;
            print_json(&FetchOutcomeDto::from(outcome))?;
        }

        Commands::Upload {
            file,
            bucket,
            object,
            content_type,
        } => {
            let backends = backends()?;
            let bucket = BucketName::new(bucket)?;
            let object = ObjectName::new(object)?;
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let uri = backends
                .services
                .blob_service
                .upload(&bucket, &object, Bytes::from(data), content_type.as_deref())
                .await?;
            println!("{}", uri);
        }

        Commands::Cat {
            bucket,
            object,
            output,
        } => {
            let backends = backends()?;
            let bucket = BucketName::new(bucket)?;
            let object = ObjectName::new(object)?;

            let read = backends.deps.storage.get_stream(&bucket, &object).await?;
            let mut reader = StreamReader::new(read.stream);

            match output {
                Some(path) => {
                    let mut file = tokio::fs::File::create(&path)
                        .await
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    tokio::io::copy(&mut reader, &mut file).await?;
                    file.flush().await?;
                }
                None => {
                    let mut stdout = tokio::io::stdout();
                    tokio::io::copy(&mut reader, &mut stdout).await?;
                    stdout.flush().await?;
                }
            }
        }

        Commands::Publish { topic, message } => {
            let backends = backends()?;
            let id = backends
                .deps
                .publisher
                .publish(&topic, Bytes::from(message))
                .await?;
            println!("{}", id);
        }

        Commands::Load {
            uris,
            dataset,
            table,
            format,
        } => {
            let apis = apis()?;
            let uris: Vec<ObjectUri> = uris
                .iter()
                .map(|raw| raw.parse())
                .collect::<Result<_, _>>()?;

            let bigquery = BigQueryClient::new(apis.client, apis.project, apis.token_source);
            let job_id = bigquery
                .start_load_job(&uris, &TableReference::new(dataset, table), format.into())
                .await?;
            println!("{}", job_id);
        }

        Commands::TransferRun { resource } => {
            let apis = apis()?;
            let bigquery = BigQueryClient::new(apis.client, apis.project, apis.token_source);
            let runs = bigquery.start_transfer_run(&resource).await?;
            for run in runs {
                println!("{}", run);
            }
        }

        Commands::DocSet {
            collection,
            document,
            fields,
        } => {
            let apis = apis()?;
            let value: serde_json::Value =
                serde_json::from_str(&fields).context("Fields must be a JSON object")?;
            let Some(fields) = value.as_object() else {
                bail!("Fields must be a JSON object");
            };

            let firestore = FirestoreClient::new(apis.client, apis.project, apis.token_source);
            firestore
                .update_document(&collection, &document, fields)
                .await?;
        }

        Commands::DocClear {
            collection,
            batch_size,
        } => {
            let apis = apis()?;
            let firestore = FirestoreClient::new(apis.client, apis.project, apis.token_source);
            let deleted = firestore.delete_collection(&collection, batch_size).await?;
            println!("{}", deleted);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_parsing() {
        let cli = Cli::parse_from(["cloud-relay-cli", "move", "landing-zone", "daily/file.csv"]);

        match cli.command {
            Commands::Move {
                bucket,
                object,
                event_type,
            } => {
                assert_eq!(bucket, "landing-zone");
                assert_eq!(object, "daily/file.csv");
                assert_eq!(event_type, "OBJECT_FINALIZE");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_fetch_parsing() {
        let cli = Cli::parse_from([
            "cloud-relay-cli",
            "fetch",
            "https://example.com/$DATEDIFF.csv",
            "landing-zone",
            "daily/$DATEISO.csv",
            "--datediff",
            "3",
        ]);

        match cli.command {
            Commands::Fetch { url, datediff, .. } => {
                assert_eq!(url, "https://example.com/$DATEDIFF.csv");
                assert_eq!(datediff, Some(3));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_load_parsing() {
        let cli = Cli::parse_from([
            "cloud-relay-cli",
            "load",
            "gs://landing-zone/a.csv",
            "gs://landing-zone/b.csv",
            "--dataset",
            "analytics",
            "--table",
            "reports",
        ]);

        match cli.command {
            Commands::Load { uris, format, .. } => {
                assert_eq!(uris.len(), 2);
                assert_eq!(format, LoadFormat::Csv);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
