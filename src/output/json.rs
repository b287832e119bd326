use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Write a value as pretty-printed JSON (2-space indent, UTF-8, non-ASCII
/// kept as-is), creating parent directories as needed.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let file = File::create(path).with_context(|| format!("Failed to create: {:?}", path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("Failed to serialize: {:?}", path))?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Read a JSON file into a typed value.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open: {:?}", path))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse JSON: {:?}", path))
}

/// Copy output files into the frontend's static-asset directory.
pub fn publish(files: &[&Path], public_dir: &Path) -> Result<()> {
    fs::create_dir_all(public_dir)
        .with_context(|| format!("Failed to create directory: {:?}", public_dir))?;

    for file in files {
        let name = file
            .file_name()
            .with_context(|| format!("Output path has no file name: {:?}", file))?;
        fs::copy(file, public_dir.join(name))
            .with_context(|| format!("Failed to copy {:?} to {:?}", file, public_dir))?;
    }

    println!("Copied {} file(s) to {:?}", files.len(), public_dir);
    Ok(())
}
