//! ### CBM DOS directory structures
//!
//! These are fixed length structures that are decoded directly from sector
//! buffers.  The image is read-only, so there is no path back to bytes.

use bit_vec::BitVec;
use log::{trace,warn};
use super::types::*;

/// Header sector at track 18 sector 0, holds the BAM and the disk name.
pub struct Header {
    pub dir_track: u8,
    pub dir_sector: u8,
    pub dos_version: u8,
    pub pad1: u8,
    /// 4 bytes per track: free count followed by a 3 byte sector bitmap
    pub bam: [u8;140],
    pub disk_name: [u8;16],
    pub pad2: [u8;2],
    pub disk_id: [u8;2],
    pub pad3: u8,
    pub dos_type: [u8;2]
}

impl Header {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            dir_track: bytes[0],
            dir_sector: bytes[1],
            dos_version: bytes[2],
            pad1: bytes[3],
            bam: bytes[4..144].try_into().expect("bad slice length"),
            disk_name: bytes[144..160].try_into().expect("bad slice length"),
            pad2: [bytes[160],bytes[161]],
            disk_id: [bytes[162],bytes[163]],
            pad3: bytes[164],
            dos_type: [bytes[165],bytes[166]]
        }
    }
    /// The 23 bytes that show up in the header line: name, padding, ID, padding, DOS type
    pub fn label_field(&self) -> Vec<u8> {
        [
            self.disk_name.to_vec(),
            self.pad2.to_vec(),
            self.disk_id.to_vec(),
            vec![self.pad3],
            self.dos_type.to_vec()
        ].concat()
    }
    fn bam_entry(&self,track: u8) -> &[u8] {
        let i = (track as usize - 1)*4;
        &self.bam[i..i+4]
    }
    /// Free count the BAM stores for a track (1-35).
    pub fn free_on_track(&self,track: u8) -> u8 {
        self.bam_entry(track)[0]
    }
    /// Free sectors according to the BAM bitmap for a track (1-35).
    /// Bit n of the 3 byte map (LSB first within each byte) is set if sector n is free.
    pub fn bitmap_free(&self,track: u8,sectors: usize) -> usize {
        let bits = BitVec::from_bytes(&self.bam_entry(track)[1..4]);
        (0..sectors).filter(|s| bits.get((s/8)*8 + 7 - s%8).unwrap_or(false)).count()
    }
    /// Sum of the per-track free counts, the directory track is not counted.
    pub fn blocks_free(&self) -> usize {
        (1..=35u8).filter(|t| *t!=HEADER_TRACK).map(|t| self.free_on_track(t) as usize).sum()
    }
    /// Log any track whose free count disagrees with its bitmap.
    /// Returns the number of inconsistent tracks.
    pub fn check_bam(&self,sectors_on_track: impl Fn(u8) -> usize) -> usize {
        let mut bad = 0;
        for track in 1..=35u8 {
            let counted = self.bitmap_free(track,sectors_on_track(track));
            let stored = self.free_on_track(track) as usize;
            trace!("track {}: {} free, bitmap says {}",track,stored,counted);
            if counted!=stored {
                warn!("BAM track {} claims {} free sectors, bitmap has {}",track,stored,counted);
                bad += 1;
            }
        }
        bad
    }
}

/// One 32 byte slot of a directory block.
/// The link bytes are only meaningful in the first slot of a block.
pub struct DirectoryEntry {
    pub next_track: u8,
    pub next_sector: u8,
    pub file_type: u8,
    pub first_track: u8,
    pub first_sector: u8,
    pub name: [u8;16],
    pub side_track: u8,
    pub side_sector: u8,
    pub record_len: u8,
    pub pad1: [u8;6],
    pub blocks: [u8;2]
}

impl DirectoryEntry {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            next_track: bytes[0],
            next_sector: bytes[1],
            file_type: bytes[2],
            first_track: bytes[3],
            first_sector: bytes[4],
            name: bytes[5..21].try_into().expect("bad slice length"),
            side_track: bytes[21],
            side_sector: bytes[22],
            record_len: bytes[23],
            pad1: bytes[24..30].try_into().expect("bad slice length"),
            blocks: [bytes[30],bytes[31]]
        }
    }
    /// A slot is in use if its attribute byte is not zero.
    pub fn is_present(&self) -> bool {
        self.file_type != 0
    }
    /// Name bytes up to, not including, the first padding byte
    pub fn name_bytes(&self) -> &[u8] {
        match self.name.iter().position(|c| *c==PAD_BYTE) {
            Some(end) => &self.name[0..end],
            None => &self.name
        }
    }
    pub fn block_count(&self) -> u16 {
        u16::from_le_bytes(self.blocks)
    }
}

/// A directory sector: link to the next block plus 8 entries.
pub struct DirectoryBlock {
    pub next_track: u8,
    pub next_sector: u8,
    pub entries: Vec<DirectoryEntry>
}

impl DirectoryBlock {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let entries = (0..ENTRIES_PER_BLOCK)
            .map(|i| DirectoryEntry::from_bytes(&bytes[i*ENTRY_SIZE..(i+1)*ENTRY_SIZE]))
            .collect();
        Self {
            next_track: bytes[0],
            next_sector: bytes[1],
            entries
        }
    }
}
