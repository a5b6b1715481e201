//! sealbox: encrypted file storage CLI
//!
//! Commands:
//!   upload <path>          - encrypt and store a file
//!   fetch <id> [-o <path>] - retrieve and decrypt a file
//!   ls                     - list visible files
//!   rm <id>                - delete a file and its ciphertext
//!   rename <id> <stem>     - rename (extension is kept)
//!   share <id> <email>...  - replace the share list
//!   usage                  - per-kind space usage for an account
//!
//! The master password is read from SEALBOX_MASTER_PASSWORD; commands that
//! touch ciphertext abort without it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use secrecy::SecretString;
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

use sealbox_core::config::SealboxConfig;
use sealbox_core::types::{FileKind, FileQuery, SortKey, SortOrder};
use sealbox_crypto::{EnvelopeCodec, MasterSecret};
use sealbox_files::{FileService, UploadRequest};
use sealbox_storage::{build_operator, JsonMetadataStore, ObjectStore};

#[derive(Parser, Debug)]
#[command(name = "sealbox", version, about = "Encrypted file storage client")]
struct Cli {
    /// Path to sealbox.toml configuration file
    #[arg(
        long,
        short = 'c',
        env = "SEALBOX_CONFIG",
        default_value = "/etc/sealbox/sealbox.toml"
    )]
    config: PathBuf,

    /// Account the commands act as
    #[arg(long, env = "SEALBOX_OWNER", default_value = "local")]
    owner: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SEALBOX_LOG", default_value = "info")]
    log: String,

    /// Log format (json, text)
    #[arg(long, env = "SEALBOX_LOG_FORMAT", default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Image,
    Document,
    Video,
    Audio,
    Other,
}

impl From<KindArg> for FileKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Image => FileKind::Image,
            KindArg::Document => FileKind::Document,
            KindArg::Video => FileKind::Video,
            KindArg::Audio => FileKind::Audio,
            KindArg::Other => FileKind::Other,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortArg {
    Name,
    Size,
    Created,
}

impl From<SortArg> for SortKey {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Name => SortKey::Name,
            SortArg::Size => SortKey::Size,
            SortArg::Created => SortKey::CreatedAt,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OrderArg {
    Asc,
    Desc,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt and upload a local file
    Upload {
        /// Local file to upload
        path: PathBuf,
        /// Stored file name (default: the local file name)
        #[arg(long)]
        name: Option<String>,
        /// MIME type recorded in the metadata
        #[arg(long, default_value = "application/octet-stream")]
        mime: String,
    },

    /// Download and decrypt a file
    Fetch {
        /// File id
        id: Uuid,
        /// Destination path (default: the stored file name in the current dir)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// List files visible to the account
    Ls {
        /// Restrict to these kinds
        #[arg(long)]
        kind: Vec<KindArg>,
        /// Case-insensitive name substring
        #[arg(long)]
        search: Option<String>,
        /// Sort key (default: created, newest first)
        #[arg(long)]
        sort: Option<SortArg>,
        /// Sort order
        #[arg(long)]
        order: Option<OrderArg>,
        /// Maximum number of results
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Delete a file and its ciphertext
    Rm {
        /// File id
        id: Uuid,
    },

    /// Rename a file (the extension is kept)
    Rename {
        /// File id
        id: Uuid,
        /// New name without extension
        stem: String,
    },

    /// Replace the list of emails a file is shared with
    Share {
        /// File id
        id: Uuid,
        /// Recipient emails (empty to unshare)
        emails: Vec<String>,
    },

    /// Show per-kind space usage for the account
    Usage,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log, &cli.log_format);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "sealbox starting"
    );

    let config = load_config(&cli.config).await?;
    let op = build_operator(&config.storage)?;

    // Only the commands that touch ciphertext require the master password;
    // catalog-only commands run without it (and could never reach the codec).
    let secret = match &cli.command {
        Commands::Upload { .. } | Commands::Fetch { .. } => MasterSecret::from_env()
            .context("set SEALBOX_MASTER_PASSWORD to encrypt or decrypt files")?,
        _ => MasterSecret::from_env()
            .unwrap_or_else(|_| MasterSecret::new(SecretString::from(""))),
    };
    let service = FileService::new(
        EnvelopeCodec::new(secret),
        ObjectStore::new(op.clone()),
        JsonMetadataStore::new(op),
    );

    match cli.command {
        Commands::Upload { path, name, mime } => {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            let name = name.unwrap_or_else(|| {
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "unnamed".into())
            });
            let record = service
                .upload(
                    UploadRequest {
                        name,
                        mime,
                        owner: cli.owner,
                    },
                    &bytes,
                )
                .await?;
            println!("{}  {}", record.id, record.name);
        }

        Commands::Fetch { id, output } => {
            let (record, plaintext) = service.retrieve(&id).await?;
            let dest = output.unwrap_or_else(|| PathBuf::from(&record.name));
            tokio::fs::write(&dest, &plaintext)
                .await
                .with_context(|| format!("writing {}", dest.display()))?;
            println!("{}  ({} bytes)", dest.display(), plaintext.len());
        }

        Commands::Ls {
            kind,
            search,
            sort,
            order,
            limit,
        } => {
            let query = FileQuery {
                owner: Some(cli.owner.clone()),
                shared_with: Some(cli.owner),
                kinds: kind.into_iter().map(FileKind::from).collect(),
                search,
                sort_key: sort.map(SortKey::from),
                sort_order: order.map(|o| match o {
                    OrderArg::Asc => SortOrder::Asc,
                    OrderArg::Desc => SortOrder::Desc,
                }),
                limit,
            };
            for record in service.list(&query).await? {
                println!(
                    "{}  {:>10}  {:<8?}  {}",
                    record.id, record.size, record.kind, record.name
                );
            }
        }

        Commands::Rm { id } => {
            service.delete(&id).await?;
            println!("deleted {id}");
        }

        Commands::Rename { id, stem } => {
            let record = service.rename(&id, &stem).await?;
            println!("{}  {}", record.id, record.name);
        }

        Commands::Share { id, emails } => {
            let record = service.update_shared(&id, emails).await?;
            println!("{}  shared with {}", record.id, record.shared_with.join(", "));
        }

        Commands::Usage => {
            let usage = service.total_space_used(&cli.owner).await?;
            println!("image:    {:>12} bytes", usage.image.size);
            println!("document: {:>12} bytes", usage.document.size);
            println!("video:    {:>12} bytes", usage.video.size);
            println!("audio:    {:>12} bytes", usage.audio.size);
            println!("other:    {:>12} bytes", usage.other.size);
            println!("used:     {:>12} / {} bytes", usage.used, usage.quota);
        }
    }

    Ok(())
}

async fn load_config(path: &PathBuf) -> Result<SealboxConfig> {
    if path.exists() {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| anyhow::anyhow!("reading config {}: {e}", path.display()))?;
        toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("parsing config {}: {e}", path.display()))
    } else {
        tracing::warn!(
            "config file not found: {}  (using defaults)",
            path.display()
        );
        Ok(SealboxConfig::default())
    }
}

fn init_logging(level: &str, format: &LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json())
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .init();
        }
    }
}
