//! # CBM DOS file system module
//! This reads disk images containing one standard 1541 volume.
//!
//! * The directory is a chain of blocks starting at track 18 sector 1
//! * Each file is a chain of sectors, every sector carries 254 bytes of payload
//! * Nothing is ever written back to the image
//!
//! Chains on a damaged disk can loop.  The directory walk stops after
//! `MAX_DIRECTORY_ENTRIES` slots, and file chains are refused if they revisit
//! a sector.

pub mod types;
pub mod petscii;
pub mod names;
pub mod display;
mod directory;

use std::io::Write;
use std::path::Path;
use bit_vec::BitVec;
use log::{debug,info,warn,error};

use types::*;
use directory::*;
use petscii::Charset;
use crate::img::DiskImage;
use crate::img::d64;
use crate::DYNERR;

/// Decoded directory entry, names already translated for display.
#[derive(Clone,Debug)]
pub struct CatalogEntry {
    /// raw attribute byte
    pub attrib: u8,
    pub blocks: u16,
    /// `[track,sector]` of the first data sector
    pub start: [u8;2],
    pub name: String,
    pub raw_name: Vec<u8>,
    /// `[track,sector]` of the first side sector, REL files only
    pub side: [u8;2],
    pub record_len: u8
}

impl CatalogEntry {
    fn from_entry(entry: &DirectoryEntry,charset: Charset) -> Self {
        Self {
            attrib: entry.file_type,
            blocks: entry.block_count(),
            start: [entry.first_track,entry.first_sector],
            name: petscii::decode(entry.name_bytes(),charset),
            raw_name: entry.name_bytes().to_vec(),
            side: [entry.side_track,entry.side_sector],
            record_len: entry.record_len
        }
    }
    pub fn type_code(&self) -> u8 {
        self.attrib & TYPE_MASK
    }
    /// None if the type code is not used by CBM DOS
    pub fn file_type(&self) -> Option<FileType> {
        num_traits::FromPrimitive::from_u8(self.type_code())
    }
    pub fn is_closed(&self) -> bool {
        self.attrib & CLOSED_FLAG > 0
    }
    pub fn is_locked(&self) -> bool {
        self.attrib & LOCKED_FLAG > 0
    }
    /// Properly closed file of a type that can be copied out as a plain chain
    pub fn is_extractable(&self) -> bool {
        self.is_closed() && self.file_type().map_or(false,|t| t.is_normal())
    }
}

/// Everything a directory listing shows.
pub struct Catalog {
    pub charset: Charset,
    /// disk name with the padding trimmed
    pub label: String,
    /// 23 columns of name, ID, and DOS type, with column 16 replaced by a quote
    pub header: String,
    pub disk_id: String,
    pub dos_type: String,
    pub entries: Vec<CatalogEntry>,
    pub blocks_free: usize
}

/// Translate header bytes, padding shows as a space.
fn decode_padded(codes: &[u8],charset: Charset) -> String {
    codes.iter().map(|c| match *c {
        PAD_BYTE => ' ',
        x => petscii::translate(x,charset)
    }).collect()
}

/// The primary interface for disk operations.
pub struct Disk {
    header: Header,
    img: Box<dyn DiskImage>
}

impl Disk {
    /// Create a disk file system using the given image as storage.
    /// The Disk takes ownership of the image.
    pub fn from_img(img: Box<dyn DiskImage>) -> Result<Self,DYNERR> {
        let header = Header::from_bytes(img.read_sector([HEADER_TRACK,HEADER_SECTOR])?);
        Ok(Self {
            header,
            img
        })
    }
    /// Test an image to see if the header looks like CBM DOS.
    /// The listing does not depend on this, it is only used for diagnostics.
    pub fn test_img(img: &Box<dyn DiskImage>) -> bool {
        let buf = match img.read_sector([HEADER_TRACK,HEADER_SECTOR]) {
            Ok(b) => b,
            Err(_) => return false
        };
        let header = Header::from_bytes(buf);
        if header.dir_track!=HEADER_TRACK {
            debug!("directory link points to track {}",header.dir_track);
            return false;
        }
        if header.dos_version!=0x41 {
            debug!("DOS version byte is {:02X}",header.dos_version);
            return false;
        }
        true
    }
    pub fn get_img(&self) -> &Box<dyn DiskImage> {
        &self.img
    }
    /// Compare BAM free counts with the bitmaps, returns count of bad tracks
    pub fn check_bam(&self) -> usize {
        self.header.check_bam(|t| d64::sectors_on_track(t).unwrap_or(0))
    }
    /// Walk the directory chain and decode everything needed for a listing.
    pub fn catalog(&self,charset: Charset) -> Result<Catalog,DYNERR> {
        let field = self.header.label_field();
        let mut header_chars: Vec<char> = decode_padded(&field[0..HEADER_LEN],charset).chars().collect();
        header_chars[NAME_LEN] = '"';
        let mut ans = Catalog {
            charset,
            label: decode_padded(&self.header.disk_name,charset).trim_end().to_string(),
            header: header_chars.into_iter().collect(),
            disk_id: decode_padded(&self.header.disk_id,charset),
            dos_type: decode_padded(&self.header.dos_type,charset),
            entries: Vec::new(),
            blocks_free: self.header.blocks_free()
        };
        let mut ts = [HEADER_TRACK,FIRST_DIRECTORY_SECTOR];
        let mut slots: usize = 0;
        loop {
            let block = DirectoryBlock::from_bytes(self.img.read_sector(ts)?);
            for entry in &block.entries {
                if slots >= MAX_DIRECTORY_ENTRIES {
                    break;
                }
                if entry.is_present() {
                    debug!("entry {} raw name {}",slots,hex::encode(entry.name_bytes()));
                    ans.entries.push(CatalogEntry::from_entry(entry,charset));
                }
                slots += 1;
            }
            if block.next_track==0 {
                break;
            }
            if slots >= MAX_DIRECTORY_ENTRIES {
                warn!("directory chain did not end after {} entries",MAX_DIRECTORY_ENTRIES);
                break;
            }
            ts = [block.next_track,block.next_sector];
        }
        info!("found {} files",ans.entries.len());
        Ok(ans)
    }
    /// Find an entry by its translated name, the comparison uses the upper case set.
    pub fn find_entry(&self,name: &str) -> Result<CatalogEntry,DYNERR> {
        let catalog = self.catalog(Charset::Uppercase)?;
        match catalog.entries.into_iter().find(|e| e.name==name.to_uppercase()) {
            Some(entry) => Ok(entry),
            None => Err(Box::new(Error::FileNotFound))
        }
    }
    /// Follow the sector chain starting at `start`, writing the payload to `sink`.
    /// Returns the number of bytes written.
    pub fn extract(&self,start: [u8;2],sink: &mut dyn Write) -> Result<usize,DYNERR> {
        let mut visited = BitVec::from_elem(d64::SECTOR_COUNT,false);
        let mut ts = start;
        let mut count: usize = 0;
        loop {
            let idx = d64::locate(ts[0],ts[1])?;
            if visited.get(idx).unwrap_or(false) {
                error!("chain revisits track {} sector {}",ts[0],ts[1]);
                return Err(Box::new(Error::DamagedChain));
            }
            visited.set(idx,true);
            let buf = self.img.read_sector(ts)?;
            let size = match buf[0] {
                0 if buf[1]==0 => {
                    warn!("terminal sector at track {} sector {} has no byte count",ts[0],ts[1]);
                    0
                },
                0 => buf[1] as usize - 1,
                _ => PAYLOAD_SIZE
            };
            if let Err(e) = sink.write_all(&buf[2..2+size]) {
                error!("write failed after {} bytes: {}",count,e);
                return Err(Box::new(Error::WriteFailed));
            }
            count += size;
            if buf[0]==0 {
                return Ok(count);
            }
            ts = [buf[0],buf[1]];
        }
    }
    /// Read the whole chain of a file into memory.
    pub fn read_chain(&self,start: [u8;2]) -> Result<Vec<u8>,DYNERR> {
        let mut ans: Vec<u8> = Vec::new();
        self.extract(start,&mut ans)?;
        Ok(ans)
    }
    /// Read a file by name.
    pub fn read_file(&self,name: &str) -> Result<Vec<u8>,DYNERR> {
        let entry = self.find_entry(name)?;
        self.read_chain(entry.start)
    }
    /// Save a file to the host, the host file is created or truncated.
    pub fn save_file(&self,entry: &CatalogEntry,path: &Path) -> Result<usize,DYNERR> {
        let mut opts = std::fs::OpenOptions::new();
        opts.write(true).create(true).truncate(true);
        #[cfg(unix)]
        std::os::unix::fs::OpenOptionsExt::mode(&mut opts,0o664);
        let mut file = match opts.open(path) {
            Ok(f) => f,
            Err(e) => {
                error!("cannot open {}: {}",path.display(),e);
                return Err(Box::new(Error::OpenFailed));
            }
        };
        let count = self.extract(entry.start,&mut file)?;
        info!("saved {} bytes to {}",count,path.display());
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::img;
    use crate::img::d64::{D64,IMAGE_SIZE,SECTOR_SIZE,locate};

    fn offset(track: u8,sector: u8) -> usize {
        locate(track,sector).unwrap()*SECTOR_SIZE
    }

    fn blank() -> Vec<u8> {
        let mut dat = vec![0;IMAGE_SIZE];
        let h = offset(18,0);
        dat[h] = 18;
        dat[h+1] = 1;
        dat[h+2] = 0x41;
        dat[h+144..h+167].fill(PAD_BYTE);
        dat[h+144..h+153].copy_from_slice(b"TEST DISK");
        dat[h+162..h+164].copy_from_slice(b"01");
        dat[h+165..h+167].copy_from_slice(b"2A");
        let d = offset(18,1);
        dat[d+1] = 0xff;
        dat
    }

    fn disk(dat: &[u8]) -> Disk {
        Disk::from_img(Box::new(D64::from_bytes(dat).unwrap())).unwrap()
    }

    fn add_entry(dat: &mut Vec<u8>,dir_sector: u8,slot: usize,attrib: u8,name: &[u8],start: [u8;2],blocks: u16) {
        let e = offset(18,dir_sector) + slot*ENTRY_SIZE;
        dat[e+2] = attrib;
        dat[e+3] = start[0];
        dat[e+4] = start[1];
        dat[e+5..e+21].fill(PAD_BYTE);
        dat[e+5..e+5+name.len()].copy_from_slice(name);
        dat[e+30..e+32].copy_from_slice(&u16::to_le_bytes(blocks));
    }

    #[test]
    fn empty_directory() {
        let mut dat = blank();
        let h = offset(18,0);
        let mut expected = 0;
        for track in 1..=35usize {
            dat[h+track*4] = (track % 7) as u8 + 1;
            if track!=18 {
                expected += (track % 7) + 1;
            }
        }
        let catalog = disk(&dat).catalog(Charset::Uppercase).unwrap();
        assert_eq!(catalog.label,"TEST DISK");
        assert_eq!(catalog.header,"TEST DISK       \" 01 2A");
        assert_eq!(catalog.disk_id,"01");
        assert_eq!(catalog.dos_type,"2A");
        assert_eq!(catalog.entries.len(),0);
        assert_eq!(catalog.blocks_free,expected);
    }

    #[test]
    fn entries_across_blocks() {
        let mut dat = blank();
        add_entry(&mut dat,1,0,0x82,b"FIRST",[17,0],1);
        add_entry(&mut dat,1,7,0x81,b"SECOND",[17,1],2);
        let d = offset(18,1);
        dat[d] = 18;
        dat[d+1] = 4;
        add_entry(&mut dat,4,2,0xc2,b"THIRD",[17,2],3);
        let catalog = disk(&dat).catalog(Charset::Lowercase).unwrap();
        let names: Vec<String> = catalog.entries.iter().map(|e| e.name.clone()).collect();
        assert_eq!(names,vec!["first","second","third"]);
        assert!(catalog.entries[2].is_locked());
        assert!(catalog.entries[2].is_closed());
        assert_eq!(catalog.entries[1].file_type(),Some(FileType::Sequential));
        assert_eq!(catalog.entries[1].blocks,2);
    }

    #[test]
    fn circular_directory_stops() {
        let mut dat = blank();
        let d = offset(18,1);
        dat[d] = 18;
        dat[d+1] = 1;
        add_entry(&mut dat,1,3,0x82,b"LOOP",[17,0],1);
        let catalog = disk(&dat).catalog(Charset::Uppercase).unwrap();
        // 144 slots over 18 passes of the same block
        assert_eq!(catalog.entries.len(),18);
    }

    #[test]
    fn bad_directory_link_is_fault() {
        let mut dat = blank();
        let d = offset(18,1);
        dat[d] = 40;
        dat[d+1] = 0;
        let err = disk(&dat).catalog(Charset::Uppercase).err().unwrap();
        assert!(img::is_geometry_fault(&err));
    }

    #[test]
    fn two_sector_chain() {
        let mut dat = blank();
        let a = offset(17,0);
        dat[a] = 17;
        dat[a+1] = 10;
        dat[a+2..a+256].fill(0x11);
        let b = offset(17,10);
        dat[b] = 0;
        dat[b+1] = 51;
        dat[b+2..b+256].fill(0x22);
        let d = disk(&dat);
        let data = d.read_chain([17,0]).unwrap();
        assert_eq!(data.len(),304);
        assert!(data[0..254].iter().all(|x| *x==0x11));
        assert!(data[254..].iter().all(|x| *x==0x22));
    }

    #[test]
    fn full_last_sector() {
        let mut dat = blank();
        let a = offset(1,0);
        dat[a+1] = 255;
        let d = disk(&dat);
        assert_eq!(d.read_chain([1,0]).unwrap().len(),254);
    }

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self,_buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn short_write_fails() {
        let mut dat = blank();
        let a = offset(17,0);
        dat[a+1] = 10;
        let err = disk(&dat).extract([17,0],&mut FullDisk).err().unwrap();
        assert!(matches!(err.downcast_ref::<Error>(),Some(Error::WriteFailed)));
        assert_eq!(err.to_string(),"short write to output file");
    }

    #[test]
    fn terminal_without_count() {
        let mut dat = blank();
        let a = offset(17,0);
        dat[a] = 17;
        dat[a+1] = 2;
        // 17/2 is all zeros, so its byte count is missing
        let data = disk(&dat).read_chain([17,0]).unwrap();
        assert_eq!(data.len(),254);
        assert_eq!(disk(&dat).read_chain([17,2]).unwrap().len(),0);
    }

    #[test]
    fn circular_chain_refused() {
        let mut dat = blank();
        let a = offset(20,3);
        dat[a] = 20;
        dat[a+1] = 5;
        let b = offset(20,5);
        dat[b] = 20;
        dat[b+1] = 3;
        let err = disk(&dat).read_chain([20,3]).err().unwrap();
        assert!(matches!(err.downcast_ref::<Error>(),Some(Error::DamagedChain)));
    }

    #[test]
    fn lookup_by_name() {
        let mut dat = blank();
        add_entry(&mut dat,1,0,0x82,b"HELLO",[17,0],1);
        let a = offset(17,0);
        dat[a+1] = 4;
        dat[a+2..a+5].copy_from_slice(&[1,8,0]);
        let d = disk(&dat);
        assert_eq!(d.read_file("hello").unwrap(),vec![1,8,0]);
        let err = d.read_file("nothing").err().unwrap();
        assert_eq!(err.to_string(),"62,FILE NOT FOUND,00,00");
    }

    #[test]
    fn header_sanity() {
        let img: Box<dyn DiskImage> = Box::new(D64::from_bytes(&blank()).unwrap());
        assert!(Disk::test_img(&img));
        let zeros: Box<dyn DiskImage> = Box::new(D64::from_bytes(&vec![0;IMAGE_SIZE]).unwrap());
        assert!(!Disk::test_img(&zeros));
    }
}
