use anyhow::{bail, Context, Result};
use bacterio_common::StateSnapshot;
use log::info;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

/// On-disk encoding of a [`StateSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotFormat {
    #[default]
    Json,
    Bincode,
    MessagePack,
}

impl SnapshotFormat {
    /// Guesses the format from a file extension. Unknown extensions give `None`.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(SnapshotFormat::Json),
            "bin" | "bincode" => Some(SnapshotFormat::Bincode),
            "msgpack" | "mp" => Some(SnapshotFormat::MessagePack),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            SnapshotFormat::Json => "json",
            SnapshotFormat::Bincode => "bin",
            SnapshotFormat::MessagePack => "msgpack",
        }
    }
}

impl FromStr for SnapshotFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(SnapshotFormat::Json),
            "bincode" | "bin" => Ok(SnapshotFormat::Bincode),
            "messagepack" | "msgpack" => Ok(SnapshotFormat::MessagePack),
            other => bail!("unknown snapshot format '{}' (expected json, bincode or messagepack)", other),
        }
    }
}

impl fmt::Display for SnapshotFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SnapshotFormat::Json => "json",
            SnapshotFormat::Bincode => "bincode",
            SnapshotFormat::MessagePack => "messagepack",
        };
        f.write_str(name)
    }
}

fn resolve(path: &Path, format: Option<SnapshotFormat>) -> SnapshotFormat {
    format.or_else(|| SnapshotFormat::from_path(path)).unwrap_or_default()
}

/// Writes `snapshot` to `path`. Without an explicit format the extension decides,
/// falling back to JSON.
pub fn save_state<P: AsRef<Path>>(path: P, snapshot: &StateSnapshot, format: Option<SnapshotFormat>) -> Result<()> {
    let path = path.as_ref();
    let format = resolve(path, format);
    let file = File::create(path).with_context(|| format!("Error creating state file '{}'", path.display()))?;
    let mut writer = BufWriter::new(file);

    match format {
        SnapshotFormat::Json => serde_json::to_writer(&mut writer, snapshot)
            .with_context(|| format!("Error serializing state to JSON '{}'", path.display()))?,
        SnapshotFormat::Bincode => bincode::serialize_into(&mut writer, snapshot)
            .with_context(|| format!("Error serializing state to bincode '{}'", path.display()))?,
        SnapshotFormat::MessagePack => rmp_serde::encode::write(&mut writer, snapshot)
            .with_context(|| format!("Error serializing state to MessagePack '{}'", path.display()))?,
    }
    writer.flush()?;

    info!(
        "State saved to {} ({} format, {} bacteria, {} predators)",
        path.display(),
        format,
        snapshot.bacteria_count(),
        snapshot.predator_count()
    );
    Ok(())
}

/// Reads a snapshot written by [`save_state`].
///
/// Only decodes; whether the occupants fit the field is checked when the
/// snapshot is turned into a population.
pub fn load_state<P: AsRef<Path>>(path: P, format: Option<SnapshotFormat>) -> Result<StateSnapshot> {
    let path = path.as_ref();
    let format = resolve(path, format);
    let file = File::open(path).with_context(|| format!("Error opening state file '{}'", path.display()))?;
    let reader = BufReader::new(file);

    let snapshot: StateSnapshot = match format {
        SnapshotFormat::Json => serde_json::from_reader(reader)
            .with_context(|| format!("Error parsing JSON state '{}'", path.display()))?,
        SnapshotFormat::Bincode => bincode::deserialize_from(reader)
            .with_context(|| format!("Error parsing bincode state '{}'", path.display()))?,
        SnapshotFormat::MessagePack => rmp_serde::from_read(reader)
            .with_context(|| format!("Error parsing MessagePack state '{}'", path.display()))?,
    };
    info!(
        "Loaded state from {}: {} cells, {} bacteria, {} predators",
        path.display(),
        snapshot.cells.len(),
        snapshot.bacteria_count(),
        snapshot.predator_count()
    );
    Ok(snapshot)
}
