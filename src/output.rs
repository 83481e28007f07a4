use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::parser::event::Event;

pub fn to_json(events: &[Event], pretty: bool) -> Result<Vec<u8>> {
    let bytes = if pretty {
        serde_json::to_vec_pretty(events)?
    } else {
        serde_json::to_vec(events)?
    };
    Ok(bytes)
}

/// Sibling path the output is staged in before it replaces the target.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write the events as JSON, replacing `path` only once the bytes are on disk.
pub fn write_events(path: &Path, events: &[Event], pretty: bool) -> Result<()> {
    let bytes = to_json(events, pretty)?;
    let staging = staging_path(path);

    let staged = fs::write(&staging, &bytes)
        .with_context(|| format!("failed to write {}", staging.display()))
        .and_then(|()| {
            fs::rename(&staging, path)
                .with_context(|| format!("failed to replace {}", path.display()))
        });
    if let Err(e) = staged {
        let _ = fs::remove_file(&staging);
        return Err(e);
    }

    info!(path = %path.display(), events = events.len(), bytes = bytes.len(), "wrote events");
    Ok(())
}
