use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::fmt;

pub const HEADER_TRACK: u8 = 18;
pub const HEADER_SECTOR: u8 = 0;
pub const FIRST_DIRECTORY_SECTOR: u8 = 1;
pub const ENTRY_SIZE: usize = 32;
pub const ENTRIES_PER_BLOCK: usize = 8;
/// Directory slots visited before the walk gives up, 18 blocks worth
pub const MAX_DIRECTORY_ENTRIES: usize = 144;
pub const NAME_LEN: usize = 16;
/// The header line shows the disk name, ID, and DOS type in this many columns
pub const HEADER_LEN: usize = 23;
pub const PAYLOAD_SIZE: usize = 254;
/// Shifted space, pads names on disk
pub const PAD_BYTE: u8 = 0xa0;

pub const TYPE_MASK: u8 = 0x07;
pub const LOCKED_FLAG: u8 = 0x40;
pub const CLOSED_FLAG: u8 = 0x80;

/// Enumerates file system errors.  Errors that have an equivalent in CBM DOS
/// display the drive's message, the others a long message.
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("cannot open output file")]
    OpenFailed,
    #[error("short write to output file")]
    WriteFailed,
    #[error("sector chain is circular or too long")]
    DamagedChain,
    #[error("62,FILE NOT FOUND,00,00")]
    FileNotFound
}

/// Enumerates the file types, the code is the low 3 bits of the attribute byte.
/// Codes 5 through 7 are not used by CBM DOS and have no variant here.
/// * FileType to u8: `as u8`
/// * u8 to FileType: `FileType::from_u8` (use FromPrimitive trait)
#[derive(FromPrimitive,PartialEq,Eq,Clone,Copy,Debug)]
pub enum FileType {
    Deleted = 0x00,
    Sequential = 0x01,
    Program = 0x02,
    User = 0x03,
    Relative = 0x04
}

impl FileType {
    /// Types whose data is a plain sector chain that can be copied out
    pub fn is_normal(&self) -> bool {
        matches!(self,Self::Sequential | Self::Program | Self::User)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self,f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deleted => write!(f,"DEL"),
            Self::Sequential => write!(f,"SEQ"),
            Self::Program => write!(f,"PRG"),
            Self::User => write!(f,"USR"),
            Self::Relative => write!(f,"REL")
        }
    }
}

/// Three letter upper case name of the type code, unused codes give `???`.
pub fn type_name(code: u8) -> String {
    match FileType::from_u8(code & TYPE_MASK) {
        Some(typ) => typ.to_string(),
        None => "???".to_string()
    }
}

#[test]
fn type_names() {
    assert_eq!(type_name(2),"PRG");
    assert_eq!(type_name(0x82),"PRG");
    assert_eq!(type_name(0),"DEL");
    assert_eq!(type_name(4),"REL");
    for code in 5..8 {
        assert_eq!(type_name(code),"???");
    }
    assert!(FileType::Program.is_normal());
    assert!(!FileType::Relative.is_normal());
}
