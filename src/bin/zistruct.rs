//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of ZiStruct.
//! The ZiStruct project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.


//! # ZiStruct Command Line
//!
//! `zistruct transform|validate|merge`, reading JSON files (data defaults
//! to stdin) and printing pretty JSON.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use zistruct::{merge, transform_with, validate_with, ZiNode, ZiStructConfig};

#[derive(Parser)]
#[command(name = "zistruct")]
#[command(about = "Transform and validate JSON by example", long_about = None)]
struct Cli {
    /// Settings file (JSON) for base key, message length and separator.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build output shaped like SPEC from DATA.
    Transform {
        #[arg(long)]
        spec: PathBuf,

        /// Data file; stdin when omitted.
        #[arg(long)]
        data: Option<PathBuf>,

        /// Extra data and helper values merged into the store.
        #[arg(long)]
        extra: Option<PathBuf>,
    },
    /// Check DATA against the shape in SPEC.
    Validate {
        #[arg(long)]
        spec: PathBuf,

        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Merge FILES left to right, later files winning.
    Merge {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn read_json(path: &Path) -> Result<ZiNode> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let value: Value =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    Ok(ZiNode::from(value))
}

fn read_data(path: Option<&Path>) -> Result<ZiNode> {
    match path {
        Some(p) => read_json(p),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text).context("reading stdin")?;
            let value: Value = serde_json::from_str(&text).context("parsing stdin")?;
            Ok(ZiNode::from(value))
        }
    }
}

fn print(node: Option<ZiNode>) -> Result<()> {
    let value = node.map(|n| n.to_value()).unwrap_or(Value::Null);
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => ZiStructConfig::from_path(path)?,
        None => ZiStructConfig::default(),
    };

    match cli.cmd {
        Commands::Transform { spec, data, extra } => {
            let spec = read_json(&spec)?;
            let data = read_data(data.as_deref())?;
            let extra = extra.as_deref().map(read_json).transpose()?;
            print(transform_with(Some(&data), &spec, extra.as_ref(), None, &config))?;
        }
        Commands::Validate { spec, data } => {
            let spec = read_json(&spec)?;
            let data = read_data(data.as_deref())?;
            match validate_with(&data, &spec, None, &config) {
                Ok(out) => print(Some(out))?,
                Err(err) => {
                    eprintln!("{err}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Merge { files } => {
            let nodes = files
                .iter()
                .map(|f| read_json(f))
                .collect::<Result<Vec<_>>>()?;
            print(merge(&nodes))?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    run(cli)
}
