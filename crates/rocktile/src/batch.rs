//! Parallel decoding of many tiles.

use rayon::prelude::*;
use rocktile_decode::{DecodedMesh, RawTileRecord, decode_mesh};
use rocktile_geo::authalic_to_geodetic_tile;

use crate::error::{Error, Result};
use crate::index::TileKey;

/// Options for [`decode_batch`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Order successes by tile key instead of input order.
    pub sort_by_key: bool,
    /// Rewrite each placement from the authalic sphere onto WGS84.
    pub transform_to_wgs84: bool,
}

/// One tile to decode.
#[derive(Debug, Clone)]
pub struct TileJob<'a> {
    pub key: TileKey,
    pub record: RawTileRecord<'a>,
}

#[derive(Debug, Clone)]
pub struct DecodedTile {
    pub key: TileKey,
    pub mesh: DecodedMesh,
}

/// A tile that was skipped, and why.
#[derive(Debug)]
pub struct TileFailure {
    pub key: TileKey,
    pub error: Error,
}

/// Outcome of a batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub decoded: Vec<DecodedTile>,
    /// In input order.
    pub failed: Vec<TileFailure>,
}

/// Decode every job on the rayon pool.
///
/// A tile that fails is logged with its key and left out of
/// [`BatchReport::decoded`]; it never stops the rest of the batch.
#[must_use]
pub fn decode_batch(jobs: &[TileJob<'_>], options: &BatchOptions) -> BatchReport {
    let results: Vec<_> = jobs
        .par_iter()
        .map(|job| (job.key.clone(), decode_tile(&job.record, options)))
        .collect();

    let mut report = BatchReport::default();
    for (key, result) in results {
        match result {
            Ok(mesh) => report.decoded.push(DecodedTile { key, mesh }),
            Err(error) => {
                tracing::warn!("Skipping tile {}: {}", key, error);
                report.failed.push(TileFailure { key, error });
            }
        }
    }

    if options.sort_by_key {
        report.decoded.sort_by(|a, b| a.key.cmp(&b.key));
    }

    tracing::debug!("Decoded {} of {} tiles", report.decoded.len(), jobs.len());
    report
}

fn decode_tile(record: &RawTileRecord<'_>, options: &BatchOptions) -> Result<DecodedMesh> {
    let mut mesh = decode_mesh(record)?;
    if options.transform_to_wgs84 {
        mesh.placement = authalic_to_geodetic_tile(&mesh.placement)?;
    }
    Ok(mesh)
}
