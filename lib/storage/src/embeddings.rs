//! Party embedding persistence
//!
//! Two formats share one (key, vector) list:
//!
//! - CSV: header `,0,1,...,d-1`, then one row per party with the party key
//!   followed by its components. Floats use Rust's shortest round-trip
//!   formatting, so save-then-load reproduces every component exactly.
//! - Binary: a `bincode` snapshot of the same list for fast reloads of large
//!   candidate pools.
//!
//! All writes go through a temporary file and an atomic rename.

use crate::catalog::csv_error;
use atomicwrites::{AtomicFile, OverwriteBehavior};
use fiesta_core::{Error, PartyEmbedding, Result, Vector};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::info;

/// On-disk layout for an embedding list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingFormat {
    Csv,
    Binary,
}

impl EmbeddingFormat {
    /// `.csv` files are CSV, anything else is a binary snapshot
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => EmbeddingFormat::Csv,
            _ => EmbeddingFormat::Binary,
        }
    }
}

/// Save embeddings, picking the format from the file extension
pub fn save_embeddings<P: AsRef<Path>>(path: P, embeddings: &[PartyEmbedding]) -> Result<()> {
    let path = path.as_ref();
    let format = EmbeddingFormat::from_path(path);

    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|file| {
            let mut writer = BufWriter::new(file);
            match format {
                EmbeddingFormat::Csv => write_csv(&mut writer, embeddings)?,
                EmbeddingFormat::Binary => bincode::serialize_into(&mut writer, embeddings)
                    .map_err(|e| Error::Serialization(e.to_string()))?,
            }
            writer.flush()?;
            Ok::<_, Error>(())
        })
        .map_err(|e| match e {
            atomicwrites::Error::Internal(io) => Error::Io(io),
            atomicwrites::Error::User(e) => e,
        })?;

    info!(path = %path.display(), parties = embeddings.len(), ?format, "saved embeddings");
    Ok(())
}

/// Load embeddings, picking the format from the file extension
pub fn load_embeddings<P: AsRef<Path>>(path: P) -> Result<Vec<PartyEmbedding>> {
    let path = path.as_ref();
    let format = EmbeddingFormat::from_path(path);
    let reader = BufReader::new(File::open(path)?);

    let embeddings = match format {
        EmbeddingFormat::Csv => read_csv(reader)?,
        EmbeddingFormat::Binary => {
            let embeddings: Vec<PartyEmbedding> = bincode::deserialize_from(reader)
                .map_err(|e| Error::Serialization(e.to_string()))?;
            check_dimensions(&embeddings)?;
            embeddings
        }
    };

    info!(path = %path.display(), parties = embeddings.len(), ?format, "loaded embeddings");
    Ok(embeddings)
}

/// Write embeddings as CSV
pub fn write_csv<W: Write>(writer: W, embeddings: &[PartyEmbedding]) -> Result<()> {
    let dim = check_dimensions(embeddings)?;
    let mut writer = csv::Writer::from_writer(writer);

    let mut header = vec![String::new()];
    header.extend((0..dim).map(|i| i.to_string()));
    writer.write_record(&header).map_err(csv_error)?;

    let mut row = Vec::with_capacity(dim + 1);
    for embedding in embeddings {
        row.clear();
        row.push(embedding.key().to_string());
        row.extend(embedding.vector().as_slice().iter().map(|v| v.to_string()));
        writer.write_record(&row).map_err(csv_error)?;
    }

    writer.flush()?;
    Ok(())
}

/// Read embeddings written by [`write_csv`]
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<PartyEmbedding>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let dim = reader.headers().map_err(csv_error)?.len().saturating_sub(1);

    let mut embeddings = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let actual = record.len().saturating_sub(1);
        if actual != dim {
            return Err(Error::InvalidDimension {
                expected: dim,
                actual,
            });
        }

        let key = record.get(0).unwrap_or_default();
        let data = record
            .iter()
            .skip(1)
            .map(|cell| {
                cell.trim().parse::<f32>().map_err(|_| {
                    Error::Persistence(format!("party '{}' has a non-numeric component '{}'", key, cell))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        embeddings.push(PartyEmbedding::new(key, Vector::new(data)));
    }

    Ok(embeddings)
}

/// Common dimension of all embeddings (0 for an empty list)
fn check_dimensions(embeddings: &[PartyEmbedding]) -> Result<usize> {
    let dim = embeddings.first().map_or(0, |e| e.vector().dim());
    match embeddings.iter().find(|e| e.vector().dim() != dim) {
        Some(odd) => Err(Error::InvalidDimension {
            expected: dim,
            actual: odd.vector().dim(),
        }),
        None => Ok(dim),
    }
}
