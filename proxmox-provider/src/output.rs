//! Snapshot sink: stdout lines or an atomically replaced file.

use anyhow::{Context, Result};
use proxmox_provider_types::RoutingConfiguration;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sink {
    /// One JSON document per line
    Stdout,
    /// Whole file replaced on every snapshot
    File(PathBuf),
}

impl Sink {
    pub fn new(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Stdout, Self::File)
    }

    pub fn publish(&self, config: &RoutingConfiguration) -> Result<()> {
        let json = config.to_dynamic_json().context("Failed to serialize configuration")?;

        match self {
            Self::Stdout => {
                let mut out = std::io::stdout().lock();
                writeln!(out, "{}", json).context("Failed to write to stdout")?;
                out.flush().context("Failed to flush stdout")?;
            },
            Self::File(path) => {
                write_atomic(path, &json)?;
                tracing::debug!("Wrote configuration to {}", path.display());
            },
        }

        Ok(())
    }
}

/// Write to a sibling temp file, then rename over `path`.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp = temp_path(path);
    std::fs::write(&tmp, contents)
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}
