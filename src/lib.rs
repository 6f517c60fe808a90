//! # `d64kit` main library
//!
//! This library reads Commodore 1541 disk images (D64), lists the directory the
//! way the machine itself would, and copies files out of the image.
//!
//! ## Architecture
//!
//! Disk image operations are built around two layers:
//! * `img::DiskImage` maps `[track,sector]` pairs to sector data, does not try to interpret a file system
//! * `fs::cbm::Disk` imposes the CBM DOS file system on the sector data
//!
//! When a `Disk` object is created it takes ownership of some `DiskImage`.
//! Images are never written back, so nothing on the host is ever modified
//! except for files that are explicitly extracted.
//!
//! ## Faults
//!
//! A sector link that points outside the disk geometry is reported as
//! `img::Error::GeometryFault`.  The library propagates it like any other error,
//! it is up to the caller to decide whether to carry on.  The `d64list` binary
//! stops immediately, the way the drive would refuse to go on.
//!
//! ## Command Line
//!
//! The `d64list` binary is a thin layer over `commands::catalog`.

pub mod img;
pub mod fs;
pub mod commands;

use std::io::Read;
use log::{info,warn};
use img::DiskImage;

pub type DYNERR = Box<dyn std::error::Error>;
pub type STDRESULT = Result<(),Box<dyn std::error::Error>>;

/// Load a disk image from a file.  The file has to be exactly one D64 image.
pub fn create_img_from_file(img_path: &str) -> Result<Box<dyn DiskImage>,DYNERR> {
    let img = img::d64::D64::from_file(img_path)?;
    info!("identified D64 image");
    Ok(Box::new(img))
}

/// Load the first disk image from a stream.  The stream is not read past the image,
/// so whatever follows is still available to the caller.
pub fn create_img_from_reader<R: Read>(reader: &mut R) -> Result<Box<dyn DiskImage>,DYNERR> {
    let img = img::d64::D64::from_reader(reader)?;
    info!("identified D64 image");
    Ok(Box::new(img))
}

/// Wrap an image in the CBM DOS file system.  The image is used even if the
/// header does not look right, since the listing is still useful.
fn try_img(img: Box<dyn DiskImage>) -> Result<fs::cbm::Disk,DYNERR> {
    if fs::cbm::Disk::test_img(&img) {
        info!("identified CBM DOS file system");
    } else {
        warn!("header does not look like CBM DOS 2.6, continuing anyway");
    }
    let disk = fs::cbm::Disk::from_img(img)?;
    let bad_tracks = disk.check_bam();
    if bad_tracks > 0 {
        warn!("BAM is inconsistent on {} tracks",bad_tracks);
    }
    Ok(disk)
}

/// Calls `create_img_from_file` and imposes the file system.
pub fn create_fs_from_file(img_path: &str) -> Result<fs::cbm::Disk,DYNERR> {
    try_img(create_img_from_file(img_path)?)
}

/// Calls `create_img_from_reader` on a stream and imposes the file system.
pub fn create_fs_from_reader<R: Read>(reader: &mut R) -> Result<fs::cbm::Disk,DYNERR> {
    try_img(create_img_from_reader(reader)?)
}

