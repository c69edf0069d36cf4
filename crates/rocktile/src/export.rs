//! Turning node bounding boxes into index records.
//!
//! Boxes decoded from bulk metadata live in the authalic ECEF frame, in
//! meters. Exported records are divided by the WGS84 equatorial radius so
//! that the globe has unit radius, and are optionally corrected onto the
//! WGS84 ellipsoid first.

use std::io::Write;

use glam::{DMat3, DQuat, DVec3, Vec3};
use rocktile_decode::{OrientedBoundingBox, unpack_obb, unpack_path_and_flags};
use rocktile_geo::{
    WGS84, WGS84_EQUATORIAL_RADIUS, authalic_to_geodetic_corners, authalic_to_wgs84_pt,
    quat_from_rotation_matrix, unit_wm_to_geodetic,
};

use crate::error::Result;
use crate::index::{IndexRecord, IndexWriter, TileKey};

/// Box-local corners used to fit the WGS84 correction, as fractions of the
/// box: the minimum corner, then the far end of z, x and y.
const FIT_CORNERS: [DVec3; 4] = [
    DVec3::new(0.0, 0.0, 0.0),
    DVec3::new(0.0, 0.0, 1.0),
    DVec3::new(1.0, 0.0, 0.0),
    DVec3::new(0.0, 1.0, 0.0),
];

/// Options for [`index_record_for_obb`] and [`export_bulk`].
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    /// Re-project boxes from the authalic sphere onto WGS84.
    pub transform_to_wgs84: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            transform_to_wgs84: true,
        }
    }
}

/// Build the index record for one box.
///
/// With [`ExportOptions::transform_to_wgs84`] set, four box corners are
/// mapped through the authalic correction. The fitted linear part `T`
/// then gives `extent' = T · extent`, `R' = T · R`, and the center is
/// corrected directly.
///
/// Fit corners are `center + R · offset`, with the center left unrotated.
/// Records for rotated boxes therefore differ from index files written by
/// exporters that rotate the center along with the offsets.
pub fn index_record_for_obb(
    key: TileKey,
    obb: &OrientedBoundingBox,
    options: &ExportOptions,
) -> Result<IndexRecord> {
    let (center, extent, rotation) = if options.transform_to_wgs84 {
        let corners = FIT_CORNERS.map(|c| {
            obb.center + obb.orientation * ((c - 0.5) * 2.0 * obb.extents)
        });
        let linear = DMat3::from_mat4(authalic_to_geodetic_corners(&corners)?);
        (
            authalic_to_wgs84_pt(obb.center),
            linear * obb.extents,
            linear * obb.orientation,
        )
    } else {
        (obb.center, obb.extents, obb.orientation)
    };

    Ok(IndexRecord {
        key,
        center: (center / WGS84_EQUATORIAL_RADIUS).as_vec3(),
        extent: (extent / WGS84_EQUATORIAL_RADIUS).as_vec3(),
        orientation: quat_from_rotation_matrix(&rotation).as_quat(),
    })
}

/// One node entry of a bulk: its packed path and packed box.
#[derive(Debug, Clone)]
pub struct NodeObb {
    pub path_and_flags: u32,
    pub obb: Vec<u8>,
}

/// The parts of one bulk's metadata that export needs.
#[derive(Debug, Clone)]
pub struct BulkObbs {
    /// Path of the bulk itself; node paths are relative to it.
    pub path: String,
    pub head_node_center: Vec3,
    /// Meters per texel, indexed by relative level minus one.
    pub meters_per_texel: Vec<f32>,
    pub nodes: Vec<NodeObb>,
}

/// Write a record for every node of a bulk that `keep` accepts.
///
/// Nodes whose box does not decode, or cannot be corrected onto WGS84, are
/// logged and skipped. Returns the number of records written.
pub fn export_bulk<W: Write>(
    writer: &mut IndexWriter<W>,
    bulk: &BulkObbs,
    options: &ExportOptions,
    mut keep: impl FnMut(&TileKey) -> bool,
) -> Result<usize> {
    let mut written = 0;
    for node in &bulk.nodes {
        let unpacked = unpack_path_and_flags(node.path_and_flags);
        let key = TileKey::join(&bulk.path, &unpacked.path)?;
        if !keep(&key) {
            continue;
        }

        let Some(&meters_per_texel) = bulk.meters_per_texel.get(unpacked.level - 1) else {
            tracing::warn!(
                "Skipping {}: bulk {} has no meters-per-texel for level {}",
                key,
                bulk.path,
                unpacked.level
            );
            continue;
        };

        let obb = match unpack_obb(&node.obb, bulk.head_node_center, meters_per_texel) {
            Ok(obb) => obb,
            Err(e) => {
                tracing::warn!("Skipping {} from bulk {}: {}", key, bulk.path, e);
                continue;
            }
        };

        let record = match index_record_for_obb(key.clone(), &obb, options) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Skipping {} from bulk {}: {}", key, bulk.path, e);
                continue;
            }
        };
        writer.write_record(&record)?;
        written += 1;
    }

    tracing::debug!(
        "Exported {} of {} nodes from bulk {:?}",
        written,
        bulk.nodes.len(),
        bulk.path
    );
    Ok(written)
}

/// Axis-aligned bounds of a unit Web Mercator tile, in globe units.
///
/// The tile at `level` covers `2 / 2^level` of the `[-1, 1]` square starting
/// at `(x, y)`, between two altitudes in meters. The result is axis-aligned
/// in ECEF and scaled by the WGS84 equatorial radius.
#[must_use]
pub fn wm_tile_bounds(
    level: u32,
    y: u32,
    x: u32,
    min_alt: f64,
    max_alt: f64,
) -> OrientedBoundingBox {
    let tiles = f64::from(1u32 << level.min(31));
    let size = 2.0 / tiles;
    let origin = DVec3::new(
        2.0 * f64::from(x) / tiles - 1.0,
        2.0 * f64::from(y) / tiles - 1.0,
        0.0,
    );

    let corners: [DVec3; 8] = std::array::from_fn(|i| {
        let bit = |b: usize| f64::from(u8::from((i >> b) & 1 == 1));
        let mut position = unit_wm_to_geodetic(origin + DVec3::new(bit(0), bit(1), 0.0) * size);
        position.alt = if (i >> 2) & 1 == 1 { max_alt } else { min_alt };
        WGS84.geodetic_to_ecef(position) / WGS84_EQUATORIAL_RADIUS
    });

    let center = corners.iter().sum::<DVec3>() / 8.0;
    let extents = corners
        .iter()
        .fold(DVec3::ZERO, |acc, &c| acc.max(c - center));

    OrientedBoundingBox {
        center,
        extents,
        orientation: DMat3::IDENTITY,
    }
}

/// Identity-oriented record for a Web Mercator tile box.
#[must_use]
pub fn index_record_for_wm_tile(key: TileKey, bounds: &OrientedBoundingBox) -> IndexRecord {
    IndexRecord {
        key,
        center: bounds.center.as_vec3(),
        extent: bounds.extents.as_vec3(),
        orientation: DQuat::IDENTITY.as_quat(),
    }
}
