//! Print the contents of a version 1 OBB index file.
//!
//! Run: `cargo run -p rocktile --features tools --bin inspect_index -- <index.v1.bin> [limit]`
//!
//! Each record is printed with its key, its center as WGS84 longitude,
//! latitude and altitude, and its extents in meters. A summary of levels
//! follows.

use std::collections::BTreeMap;
use std::env;
use std::fs::File;
use std::io::BufReader;
use std::process;

use rocktile::rocktile_geo::{WGS84_EQUATORIAL_RADIUS, ecef_to_geodetic};
use rocktile::{IndexRecord, read_index};

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let Some(path) = args.get(1) else {
        eprintln!("usage: inspect_index <index.v1.bin> [limit]");
        process::exit(2);
    };
    let limit = match args.get(2).map(|s| s.parse::<usize>()) {
        None => 20,
        Some(Ok(limit)) => limit,
        Some(Err(e)) => {
            eprintln!("invalid limit: {e}");
            process::exit(2);
        }
    };

    let records = match File::open(path)
        .map_err(rocktile::Error::from)
        .and_then(|file| read_index(BufReader::new(file)))
    {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Failed to read {path}: {e}");
            process::exit(1);
        }
    };

    println!("{path}: {} records\n", records.len());
    for record in records.iter().take(limit) {
        print_record(record);
    }
    if records.len() > limit {
        println!("... {} more", records.len() - limit);
    }

    let mut levels: BTreeMap<usize, usize> = BTreeMap::new();
    for record in &records {
        *levels.entry(record.key.level()).or_default() += 1;
    }
    println!("\nRecords per level:");
    for (level, count) in levels {
        println!("  {level:2}: {count}");
    }
}

fn print_record(record: &IndexRecord) {
    let center = record.center.as_dvec3() * WGS84_EQUATORIAL_RADIUS;
    let extent = record.extent.as_dvec3() * WGS84_EQUATORIAL_RADIUS;
    let geodetic = ecef_to_geodetic(center.x, center.y, center.z);
    let q = record.orientation;

    println!(
        "{:<26} lon {:>11.6} lat {:>10.6} alt {:>9.1}m  ext [{:.1}, {:.1}, {:.1}]m  q [{:.4}, {:.4}, {:.4}, {:.4}]",
        record.key.as_str(),
        geodetic.lon,
        geodetic.lat,
        geodetic.alt,
        extent.x,
        extent.y,
        extent.z,
        q.w,
        q.x,
        q.y,
        q.z
    );
}
