// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

pub const DEFAULT_CONFIG: &str = "tests/config.yaml";
pub const DEFAULT_LOGGER_CONFIG: &str = "tests/config_logger.yaml";

/// Attach an in-memory disk to a bus, scan it and exercise the unit.
#[derive(Debug, Clone, Parser)]
#[clap(name = "scsi-bus-rs", version)]
pub struct Cli {
    /// Bus and backend YAML config
    #[clap(short, long, default_value = DEFAULT_CONFIG)]
    pub config: String,

    /// Logger YAML config
    #[clap(short, long, default_value = DEFAULT_LOGGER_CONFIG)]
    pub logger: String,
}

/// Config file locations after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliPaths {
    pub config: PathBuf,
    pub logger: PathBuf,
}

impl Cli {
    pub fn resolve(&self) -> Result<CliPaths> {
        Ok(CliPaths {
            config: resolve_config_path(&self.config)?,
            logger: resolve_config_path(&self.logger)?,
        })
    }
}

pub fn resolve_config_path(rel: &str) -> Result<PathBuf> {
    let p = Path::new(rel);

    let abs = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()
            .context("cannot get current working dir")?
            .join(p)
    };

    let canon = abs
        .canonicalize()
        .with_context(|| format!("failed to canonicalize path {abs:?}"))?;

    Ok(canon)
}
