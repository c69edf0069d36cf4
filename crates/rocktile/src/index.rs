//! Version 1 OBB index files.
//!
//! An index file is a flat run of fixed-size records with no header:
//!
//! - Bytes 0-25: Node key, ASCII octal digits padded with `0xFF`
//! - Bytes 26-65: 10 × little-endian `f32`: center (3), extents (3),
//!   orientation quaternion (`w, x, y, z`)

use std::fmt;
use std::io::{Read, Write};

use glam::{Quat, Vec3};
use rocktile_decode::DecodeError;

use crate::error::{Error, Result};

/// Maximum number of octant digits in a key.
pub const KEY_LEN: usize = 26;

/// Size of one encoded record.
pub const RECORD_LEN: usize = KEY_LEN + 10 * 4;

const KEY_PADDING: u8 = 0xFF;

/// Full octant path of a node, from the root.
///
/// Keys order lexicographically by path, so a parent sorts before its
/// children.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileKey(String);

impl TileKey {
    /// Validate an octant path such as `"30604"`.
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let reason = if path.is_empty() {
            Some("empty path")
        } else if path.len() > KEY_LEN {
            Some("longer than 26 digits")
        } else if !path.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
            Some("not an octal digit string")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(Error::InvalidKey { key: path, reason }),
            None => Ok(Self(path)),
        }
    }

    /// Join a bulk path and a node path relative to it.
    pub fn join(bulk_path: &str, relative: &str) -> Result<Self> {
        Self::new(format!("{bulk_path}{relative}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Depth of the node, one per digit.
    #[must_use]
    pub fn level(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; KEY_LEN] {
        let mut bytes = [KEY_PADDING; KEY_LEN];
        bytes[..self.0.len()].copy_from_slice(self.0.as_bytes());
        bytes
    }

    /// Parse a padded key. Digits must be contiguous from the start.
    pub fn from_bytes(bytes: &[u8; KEY_LEN]) -> Result<Self> {
        let len = bytes
            .iter()
            .position(|&b| b == KEY_PADDING)
            .unwrap_or(KEY_LEN);
        if bytes[len..].iter().any(|&b| b != KEY_PADDING) {
            return Err(Error::InvalidKey {
                key: String::from_utf8_lossy(bytes).into_owned(),
                reason: "digits after padding",
            });
        }
        Self::new(String::from_utf8_lossy(&bytes[..len]).into_owned())
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One node's bounding box in an index file.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRecord {
    pub key: TileKey,
    pub center: Vec3,
    /// Half-widths along the orientation's axes.
    pub extent: Vec3,
    pub orientation: Quat,
}

impl IndexRecord {
    #[must_use]
    pub fn to_bytes(&self) -> [u8; RECORD_LEN] {
        let mut out = [0u8; RECORD_LEN];
        out[..KEY_LEN].copy_from_slice(&self.key.to_bytes());

        let q = self.orientation;
        let floats = [
            self.center.x,
            self.center.y,
            self.center.z,
            self.extent.x,
            self.extent.y,
            self.extent.z,
            q.w,
            q.x,
            q.y,
            q.z,
        ];
        for (chunk, value) in out[KEY_LEN..].chunks_exact_mut(4).zip(floats) {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        out
    }

    pub fn from_bytes(bytes: &[u8; RECORD_LEN]) -> Result<Self> {
        let (key, rest) = bytes.split_at(KEY_LEN);
        let key: &[u8; KEY_LEN] = key.try_into().map_err(|_| DecodeError::InvalidLength {
            what: "index key",
            actual: key.len(),
        })?;

        let mut floats = [0f32; 10];
        for (value, chunk) in floats.iter_mut().zip(rest.chunks_exact(4)) {
            *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        let [cx, cy, cz, ex, ey, ez, w, x, y, z] = floats;

        Ok(Self {
            key: TileKey::from_bytes(key)?,
            center: Vec3::new(cx, cy, cz),
            extent: Vec3::new(ex, ey, ez),
            orientation: Quat::from_xyzw(x, y, z, w),
        })
    }
}

/// Streams records into an index file.
#[derive(Debug)]
pub struct IndexWriter<W: Write> {
    inner: W,
    written: usize,
}

impl<W: Write> IndexWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    pub fn write_record(&mut self, record: &IndexRecord) -> Result<()> {
        self.inner.write_all(&record.to_bytes())?;
        self.written += 1;
        Ok(())
    }

    #[must_use]
    pub fn records_written(&self) -> usize {
        self.written
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Read every record of an index file.
pub fn read_index<R: Read>(mut reader: R) -> Result<Vec<IndexRecord>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    if bytes.len() % RECORD_LEN != 0 {
        return Err(DecodeError::InvalidLength {
            what: "index file (must be a multiple of 66 bytes)",
            actual: bytes.len(),
        }
        .into());
    }

    let records = bytes
        .chunks_exact(RECORD_LEN)
        .map(|chunk| {
            let chunk: &[u8; RECORD_LEN] =
                chunk.try_into().map_err(|_| DecodeError::InvalidLength {
                    what: "index record",
                    actual: chunk.len(),
                })?;
            IndexRecord::from_bytes(chunk)
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!("Read {} index records", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(path: &str) -> IndexRecord {
        IndexRecord {
            key: TileKey::new(path).unwrap(),
            center: Vec3::new(0.5, -0.25, 0.75),
            extent: Vec3::new(1e-6, 2e-6, 3e-6),
            orientation: Quat::from_xyzw(0.0, 0.0, 0.6, 0.8),
        }
    }

    #[test]
    fn key_validation() {
        assert!(TileKey::new("0123456701234567012345670").is_ok());
        assert!(TileKey::new("0".repeat(26)).is_ok());
        assert!(TileKey::new("0".repeat(27)).is_err());
        assert!(TileKey::new("").is_err());
        assert!(TileKey::new("018").is_err());
        assert!(TileKey::new("0a").is_err());
    }

    #[test]
    fn key_bytes_are_padded() {
        let key = TileKey::new("304").unwrap();
        let bytes = key.to_bytes();
        assert_eq!(&bytes[..3], b"304");
        assert!(bytes[3..].iter().all(|&b| b == 0xFF));
        assert_eq!(TileKey::from_bytes(&bytes).unwrap(), key);
    }

    #[test]
    fn key_rejects_digits_after_padding() {
        let mut bytes = TileKey::new("30").unwrap().to_bytes();
        bytes[5] = b'1';
        assert!(matches!(
            TileKey::from_bytes(&bytes),
            Err(Error::InvalidKey { reason: "digits after padding", .. })
        ));
    }

    #[test]
    fn keys_sort_parents_first() {
        let mut keys: Vec<_> = ["1", "01", "0", "007"]
            .into_iter()
            .map(|p| TileKey::new(p).unwrap())
            .collect();
        keys.sort();
        let sorted: Vec<_> = keys.iter().map(TileKey::as_str).collect();
        assert_eq!(sorted, vec!["0", "007", "01", "1"]);
    }

    #[test]
    fn record_layout() {
        let bytes = record("21").to_bytes();
        assert_eq!(bytes.len(), 66);
        assert_eq!(&bytes[..2], b"21");
        assert_eq!(bytes[2], 0xFF);
        assert_eq!(&bytes[26..30], &0.5f32.to_le_bytes());
        // Quaternion is stored w first.
        assert_eq!(&bytes[50..54], &0.8f32.to_le_bytes());
        assert_eq!(&bytes[62..66], &0.6f32.to_le_bytes());
    }

    #[test]
    fn writer_then_reader() {
        let mut writer = IndexWriter::new(Vec::new());
        writer.write_record(&record("0")).unwrap();
        writer.write_record(&record("0123")).unwrap();
        assert_eq!(writer.records_written(), 2);
        let bytes = writer.into_inner().unwrap();
        assert_eq!(bytes.len(), 2 * RECORD_LEN);

        let records = read_index(bytes.as_slice()).unwrap();
        assert_eq!(records, vec![record("0"), record("0123")]);
    }

    #[test]
    fn reader_rejects_partial_records() {
        let mut bytes = record("5").to_bytes().to_vec();
        bytes.pop();
        let err = read_index(bytes.as_slice()).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode(DecodeError::InvalidLength { actual: 65, .. })
        ));
    }

    #[test]
    fn empty_file_has_no_records() {
        assert!(read_index(std::io::empty()).unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn key_order_survives_encoding(a in "[0-7]{1,26}", b in "[0-7]{1,26}") {
            let (a, b) = (TileKey::new(a).unwrap(), TileKey::new(b).unwrap());
            // 0xFF padding sorts after every digit, so byte order differs
            // from key order only where one key is a prefix of the other.
            let bytes_order = a.to_bytes().cmp(&b.to_bytes());
            if a.as_str().starts_with(b.as_str()) || b.as_str().starts_with(a.as_str()) {
                prop_assert_eq!(bytes_order, b.cmp(&a));
            } else {
                prop_assert_eq!(bytes_order, a.cmp(&b));
            }
            prop_assert_eq!(TileKey::from_bytes(&a.to_bytes()).unwrap(), a);
        }
    }
}
