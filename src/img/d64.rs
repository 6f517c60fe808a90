//! ## Support for Commodore 1541 disk images (D64)
//!
//! D64 images are a simple sequential dump of the 683 sectors of a 35 track disk.
//! The number of sectors per track depends on the speed zone, so locating a sector
//! requires summing over the preceding tracks.  Only the standard 174848 byte
//! variant (no error bytes, no extra tracks) is accepted.

use std::io::Read;
use log::{trace,debug,error};
use crate::img;
use crate::DYNERR;

pub const SECTOR_SIZE: usize = 256;
pub const SECTOR_COUNT: usize = 683;
pub const IMAGE_SIZE: usize = SECTOR_SIZE*SECTOR_COUNT;
pub const TRACKS: u8 = 35;

/// Sectors on tracks 1 through 35
const SECTORS_PER_TRACK: [u8;35] = [
    21,21,21,21,21,21,21,21,21,21,21,21,21,21,21,21,21,
    19,19,19,19,19,19,19,
    18,18,18,18,18,18,
    17,17,17,17,17
];

pub fn file_extensions() -> Vec<String> {
    vec!["d64".to_string()]
}

/// Sector count for a track, or None if there is no such track.
pub fn sectors_on_track(track: u8) -> Option<usize> {
    match track {
        0 => None,
        t if t>TRACKS => None,
        t => Some(SECTORS_PER_TRACK[t as usize - 1] as usize)
    }
}

/// Zero based index of the sector within the image.
/// Tracks are numbered from 1, sectors from 0.
pub fn locate(track: u8,sector: u8) -> Result<usize,img::Error> {
    match sectors_on_track(track) {
        Some(count) if (sector as usize) < count => {
            let preceding: usize = SECTORS_PER_TRACK[0..track as usize - 1].iter().map(|s| *s as usize).sum();
            Ok(preceding + sector as usize)
        },
        _ => {
            error!("attempt to access track {} sector {}",track,sector);
            Err(img::Error::GeometryFault { track, sector })
        }
    }
}

/// Keep reading until `buf` is full or the source is exhausted, returns bytes read.
fn fill_buffer<R: Read>(reader: &mut R,buf: &mut [u8]) -> Result<usize,img::Error> {
    let mut count = 0;
    while count < buf.len() {
        match reader.read(&mut buf[count..]) {
            Ok(0) => break,
            Ok(n) => {
                trace!("read {} bytes",n);
                count += n;
            },
            Err(e) if e.kind()==std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                error!("read failed after {} bytes: {}",count,e);
                return Err(img::Error::Unreadable);
            }
        }
    }
    Ok(count)
}

/// Wrapper for D64 data.
pub struct D64 {
    data: Vec<u8>
}

impl D64 {
    /// Take a copy of an in-memory image, the length has to be exact.
    pub fn from_bytes(data: &[u8]) -> Result<Self,img::Error> {
        match data.len() {
            IMAGE_SIZE => Ok(Self { data: data.to_vec() }),
            x if x < IMAGE_SIZE => Err(img::Error::TooSmall),
            _ => Err(img::Error::TooLarge)
        }
    }
    /// Load an image file.  The file has to hold exactly one image, a longer
    /// file is refused even if it starts with a valid image.
    pub fn from_file(img_path: &str) -> Result<Self,img::Error> {
        let mut file = match std::fs::File::open(img_path) {
            Ok(f) => f,
            Err(e) => {
                // missing or not permitted, either way it never opened
                debug!("open {} failed: {}",img_path,e);
                return Err(img::Error::NotFound);
            }
        };
        let mut data = vec![0;IMAGE_SIZE];
        if fill_buffer(&mut file,&mut data)? < IMAGE_SIZE {
            return Err(img::Error::TooSmall);
        }
        let mut extra: [u8;1] = [0];
        if fill_buffer(&mut file,&mut extra)? > 0 {
            return Err(img::Error::TooLarge);
        }
        debug!("loaded {}",img_path);
        Ok(Self { data })
    }
    /// Load the first image from a continuous stream such as stdin.
    /// Bytes after the image are left unread.
    pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self,img::Error> {
        let mut data = vec![0;IMAGE_SIZE];
        let count = fill_buffer(reader,&mut data)?;
        if count < IMAGE_SIZE {
            error!("stream ended after {} bytes",count);
            return Err(img::Error::TooSmall);
        }
        Ok(Self { data })
    }
}

impl img::DiskImage for D64 {
    fn track_count(&self) -> usize {
        TRACKS as usize
    }
    fn sector_count(&self,track: u8) -> Result<usize,DYNERR> {
        match sectors_on_track(track) {
            Some(count) => Ok(count),
            None => Err(Box::new(img::Error::GeometryFault { track, sector: 0 }))
        }
    }
    fn read_sector(&self,ts: [u8;2]) -> Result<&[u8],DYNERR> {
        trace!("read track {} sector {}",ts[0],ts[1]);
        let offset = locate(ts[0],ts[1])? * SECTOR_SIZE;
        Ok(&self.data[offset..offset+SECTOR_SIZE])
    }
    fn what_am_i(&self) -> img::DiskImageType {
        img::DiskImageType::D64
    }
    fn file_extensions(&self) -> Vec<String> {
        file_extensions()
    }
    fn to_bytes(&self) -> Vec<u8> {
        self.data.clone()
    }
}
