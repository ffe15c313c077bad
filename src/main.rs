// Copyright 2025 coScene
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use storage_factory::{load_config, parse_uri, AdapterFactory};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Storage Factory - Resolve storage URIs and configurations into backends
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Storage URI, e.g. local:///tmp/data or memory://
    uri: Option<String>,

    /// Path to a YAML backend configuration
    #[arg(short, long, conflicts_with = "uri")]
    config: Option<PathBuf>,

    /// Print the resolved configuration as JSON without building a backend
    #[arg(long)]
    dry_run: bool,

    /// List objects under this prefix once the backend is built
    #[arg(long)]
    list: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match (&args.uri, &args.config) {
        (Some(uri), _) => parse_uri(uri)?,
        (None, Some(path)) => {
            info!("Loading configuration from: {:?}", path);
            load_config(path)?
        }
        (None, None) => bail!("either a storage URI or --config is required"),
    };

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let factory = AdapterFactory::builtin();
    let backend = factory.create(config)?;
    println!("{}", backend.backend_type());

    if let Some(prefix) = &args.list {
        for path in backend.list(prefix).await? {
            println!("{}", path);
        }
    }

    Ok(())
}
