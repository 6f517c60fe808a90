//! ## Catalog command
//!
//! Lists each disk image in turn.  In copy mode every closed SEQ, PRG, or USR
//! file is offered for saving to the host, with a suggested name.  The prompts
//! are interleaved with the listing, so the terminal ends up looking like
//! a listing with the answers typed in at the end of the lines.

use std::io::{BufRead,Write};
use std::path::Path;
use log::{debug,warn,error};
use crate::fs::cbm::{Disk,CatalogEntry,display,names};
use crate::fs::cbm::petscii::Charset;
use crate::img;
use super::CommandError;
use crate::{DYNERR,STDRESULT};

/// What to do with each image
#[derive(Clone,Copy,Debug)]
pub struct Options {
    pub charset: Charset,
    pub copy_mode: bool,
    /// append `.prg` etc. to suggested names
    pub extensions: bool,
    /// print the image path above the listing
    pub print_name: bool,
    pub json: bool,
    pub indent: Option<u16>
}

impl Default for Options {
    fn default() -> Self {
        Self {
            charset: Charset::Uppercase,
            copy_mode: false,
            extensions: true,
            print_name: false,
            json: false,
            indent: None
        }
    }
}

impl Options {
    pub fn from_matches(cmd: &clap::ArgMatches) -> Self {
        Self {
            charset: Charset::from_flag(cmd.get_flag("lower")),
            copy_mode: cmd.get_flag("copy"),
            extensions: !cmd.get_flag("noext"),
            print_name: cmd.get_flag("names"),
            json: cmd.get_flag("json"),
            indent: cmd.get_one::<u16>("indent").copied()
        }
    }
}

/// Print a prompt and read one line without its line ending, None at end of input.
fn ask<R: BufRead,W: Write>(prompt: &str,input: &mut R,out: &mut W) -> Result<Option<String>,DYNERR> {
    write!(out,"{}",prompt)?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(|c| c=='\n' || c=='\r').to_string()))
}

/// Keep asking until the answer is exactly `y` or `n`.
fn confirm<R: BufRead,W: Write>(input: &mut R,out: &mut W) -> Result<bool,DYNERR> {
    loop {
        match ask(" (y/n)",input,out)? {
            Some(ans) if ans=="y" => return Ok(true),
            Some(ans) if ans=="n" => return Ok(false),
            Some(ans) => debug!("ignoring answer {:?}",ans),
            None => {
                warn!("input ended while waiting for y/n, taking it as n");
                return Ok(false);
            }
        }
    }
}

/// Offer one file for saving.  Only geometry faults are passed up, any other
/// failure is reported and the listing goes on.
fn copy_entry<R: BufRead,W: Write>(disk: &Disk,entry: &CatalogEntry,opts: &Options,input: &mut R,out: &mut W) -> STDRESULT {
    if !confirm(input,out)? {
        return Ok(());
    }
    let suggested = names::normalize(&entry.name,entry.type_code(),opts.extensions);
    let dest = match ask(&format!("Destination ({}):",suggested),input,out)? {
        Some(ans) if ans.is_empty() => suggested,
        Some(ans) => ans,
        None => {
            warn!("input ended while waiting for a destination, {} not saved",suggested);
            return Ok(());
        }
    };
    match disk.save_file(entry,Path::new(&dest)) {
        Ok(count) => debug!("{} bytes copied to {}",count,dest),
        Err(e) if img::is_geometry_fault(&e) => return Err(e),
        Err(e) => eprintln!("d64list: error saving {}: {}",dest,e)
    }
    Ok(())
}

/// List one image to `out`, prompting on `input` in copy mode.
/// Without copy mode the output is identical to `display::listing`.
pub fn list_image<R: BufRead,W: Write>(disk: &Disk,source_name: &str,opts: &Options,input: &mut R,out: &mut W) -> STDRESULT {
    let catalog = disk.catalog(opts.charset)?;
    if opts.json {
        writeln!(out,"{}",display::to_json(&catalog,opts.indent))?;
        return Ok(());
    }
    write!(out,"\n")?;
    if opts.print_name {
        writeln!(out,"{}:",source_name)?;
    }
    write!(out,"{}",display::header_line(&catalog))?;
    // after a prompt the user's own line feed ends the line
    let mut cr = true;
    for entry in &catalog.entries {
        if cr {
            write!(out,"\n")?;
        }
        write!(out,"{}",display::entry_line(entry,&catalog))?;
        cr = true;
        if opts.copy_mode && entry.is_extractable() {
            copy_entry(disk,entry,opts,input,out)?;
            cr = false;
        }
    }
    if cr {
        write!(out,"\n")?;
    }
    writeln!(out,"{}",display::trailer_line(&catalog))?;
    writeln!(out)?;
    Ok(())
}

/// Message for an image that could not be loaded
pub fn load_error_message(source_name: &str,err: &DYNERR) -> String {
    match err.downcast_ref::<img::Error>() {
        Some(img::Error::TooSmall) | Some(img::Error::TooLarge) => format!("d64list: error reading {} ({})",source_name,err),
        Some(img::Error::NotFound) => format!("d64list: cannot open {}",source_name),
        Some(img::Error::Unreadable) => format!("d64list: error reading {} ({})",source_name,err),
        _ => format!("d64list: {}: {}",source_name,err)
    }
}

/// Run the catalog over every image named on the command line, or over stdin.
/// Images that fail to load are skipped, but the result is then an error.
pub fn catalog(cmd: &clap::ArgMatches) -> STDRESULT {
    let opts = Options::from_matches(cmd);
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let paths: Vec<String> = match cmd.get_many::<String>("images") {
        Some(vals) => vals.cloned().collect(),
        None => Vec::new()
    };
    if paths.is_empty() {
        if atty::is(atty::Stream::Stdin) {
            error!("pipe a disk image or give a path");
            return Err(Box::new(CommandError::InvalidCommand));
        }
        let disk = match crate::create_fs_from_reader(&mut input) {
            Ok(disk) => disk,
            // a failing stream cannot be skipped like a bad file
            Err(e) if matches!(e.downcast_ref::<img::Error>(),Some(img::Error::Unreadable)) => return Err(e),
            Err(e) => {
                eprintln!("{}",load_error_message("stdin",&e));
                return Err(Box::new(CommandError::InputNotAvailable));
            }
        };
        return list_image(&disk,"stdin",&opts,&mut input,&mut out);
    }
    let mut skipped = 0;
    for path in &paths {
        match crate::create_fs_from_file(path) {
            Ok(disk) => list_image(&disk,path,&opts,&mut input,&mut out)?,
            Err(e) => {
                eprintln!("{}",load_error_message(path,&e));
                skipped += 1;
            }
        }
    }
    match skipped {
        0 => Ok(()),
        n => {
            debug!("{} of {} images skipped",n,paths.len());
            Err(Box::new(CommandError::InputNotAvailable))
        }
    }
}
