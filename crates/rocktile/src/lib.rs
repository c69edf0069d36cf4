//! Tile keys, OBB index export and batch decoding for rocktree tiles.
//!
//! This crate sits on top of [`rocktile_decode`] and [`rocktile_geo`]:
//!
//! - [`index`]: Node keys and the version 1 index-file record format
//! - [`export`]: Bounding boxes to index records, optionally corrected onto WGS84
//! - [`batch`]: Decode many tiles in parallel, skipping the ones that fail
//!
//! # Example
//!
//! ```
//! use rocktile::{IndexWriter, TileKey, read_index};
//! use rocktile::export::{ExportOptions, index_record_for_obb};
//! use rocktile_decode::unpack_obb;
//!
//! # fn main() -> rocktile::Result<()> {
//! // Ten texels of extent on each axis, no rotation.
//! let mut packed = [0u8; 15];
//! packed[6..9].copy_from_slice(&[10, 10, 10]);
//! let obb = unpack_obb(&packed, glam::Vec3::new(6_371_010.0, 0.0, 0.0), 1.0)?;
//! let record = index_record_for_obb(TileKey::new("0213")?, &obb, &ExportOptions::default())?;
//!
//! let mut writer = IndexWriter::new(Vec::new());
//! writer.write_record(&record)?;
//! let records = read_index(writer.into_inner()?.as_slice())?;
//! assert_eq!(records, vec![record]);
//! # Ok(())
//! # }
//! ```

mod error;

pub mod batch;
pub mod export;
pub mod index;

pub use batch::{BatchOptions, BatchReport, DecodedTile, TileFailure, TileJob, decode_batch};
pub use error::{Error, Result};
pub use export::{ExportOptions, export_bulk, index_record_for_obb};
pub use index::{IndexRecord, IndexWriter, KEY_LEN, RECORD_LEN, TileKey, read_index};

// Re-export the lower-level crates for convenience.
pub use rocktile_decode;
pub use rocktile_geo;
