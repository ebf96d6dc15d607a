use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

pub fn now_utc_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Hashes a reader to the end, keeping the bytes that went through the hasher.
pub fn sha256_reader<R: Read>(mut reader: R) -> io::Result<(String, Vec<u8>)> {
    let mut hasher = Sha256::new();
    let mut contents = Vec::new();
    let mut buf = [0_u8; 8192];

    loop {
        let count = reader.read(&mut buf)?;
        if count == 0 {
            break;
        }
        hasher.update(&buf[..count]);
        contents.extend_from_slice(&buf[..count]);
    }

    Ok((format!("{:x}", hasher.finalize()), contents))
}

pub fn write_bytes(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        ensure_directory(parent)?;
    }

    let mut file =
        File::create(path).with_context(|| format!("failed to create file: {}", path.display()))?;
    file.write_all(data)
        .with_context(|| format!("failed to write file: {}", path.display()))?;

    Ok(())
}

pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut data = serde_json::to_vec_pretty(value)
        .with_context(|| format!("failed to serialize json: {}", path.display()))?;
    data.push(b'\n');
    write_bytes(path, &data)
}

/// Writes to `path` when given, otherwise to stdout.
pub fn write_output(path: Option<&Path>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => write_bytes(path, data),
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(data)
                .context("failed to write to stdout")?;
            stdout.flush().context("failed to flush stdout")
        }
    }
}
