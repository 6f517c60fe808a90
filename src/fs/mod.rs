//! # File System Module
//!
//! File system modules handle interactions with directories and files.
//! A file system takes ownership of some disk image, which it uses as
//! read-only storage.  At present the only file system is CBM DOS as found
//! on 1541 disks, see `cbm`.
//!
//! Translation between the disk's character set and host text happens here,
//! as does the construction of host file names.  Neither concern leaks into `img`.

pub mod cbm;
