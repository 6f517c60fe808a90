//! # Disk Image Module
//!
//! Disk images are represented by objects implementing the `DiskImage` trait.
//! The object type is named for the disk image type that it handles, e.g., `D64`.
//!
//! ## Relation to File Systems
//!
//! The `DiskImage` trait object serves as the underlying storage for `fs` modules.
//! The `fs` modules work by reading sectors from the disk image, addressed by
//! `[track,sector]` pairs.  Mapping a pair to a place in the image happens here,
//! never in `fs`.  A disk image is immutable once it has been loaded.
//!
//! ## Faults
//!
//! A request for a track or sector that does not exist on the disk produces
//! `Error::GeometryFault`.  This mirrors the drive's own `67,ILLEGAL TRACK OR SECTOR`
//! error.  The library only reports it; the `d64list` binary treats it as fatal.

pub mod d64;

use std::fmt;
use crate::DYNERR;

/// Enumerates disk image errors.  The `Display` trait will print equivalent long message.
#[derive(thiserror::Error,Debug,PartialEq)]
pub enum Error {
    #[error("cannot open disk image")]
    NotFound,
    #[error("disk image could not be read")]
    Unreadable,
    #[error("too small for a .D64 file")]
    TooSmall,
    #[error("too big for a .D64 file")]
    TooLarge,
    #[error("67,ILLEGAL TRACK OR SECTOR,{track},{sector}")]
    GeometryFault { track: u8, sector: u8 }
}

/// Enumerates the disk image types this crate understands.
#[derive(PartialEq,Eq,Clone,Copy,Debug)]
pub enum DiskImageType {
    D64
}

impl fmt::Display for DiskImageType {
    fn fmt(&self,f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::D64 => write!(f,"d64")
        }
    }
}

/// Read-only access to the sectors of a loaded disk image.
pub trait DiskImage {
    /// Number of tracks, tracks are numbered from 1
    fn track_count(&self) -> usize;
    /// Number of sectors on the given track, or error if the track does not exist
    fn sector_count(&self,track: u8) -> Result<usize,DYNERR>;
    /// Borrow the 256 bytes of the sector at `[track,sector]`
    fn read_sector(&self,ts: [u8;2]) -> Result<&[u8],DYNERR>;
    fn what_am_i(&self) -> DiskImageType;
    fn file_extensions(&self) -> Vec<String>;
    /// Flattened image, exactly as it would be stored on the host
    fn to_bytes(&self) -> Vec<u8>;
}

/// True if the error is a geometry fault, which callers should treat as unrecoverable.
pub fn is_geometry_fault(err: &DYNERR) -> bool {
    matches!(err.downcast_ref::<Error>(),Some(Error::GeometryFault {..}))
}
