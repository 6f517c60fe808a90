//! # Command Line Interface
//!
//! `d64list [-lcef] [IMAGE]...`, the arguments are built in `cli.rs`
//! and the work is done in `commands::catalog`.

mod cli;

use d64kit::commands;
use d64kit::img;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let mut main_cmd = cli::build_cli();
    let matches = main_cmd.clone().get_matches();

    if matches.get_flag("help") {
        if let Err(e) = main_cmd.print_long_help() {
            eprintln!("d64list: {}",e);
        }
        std::process::exit(1);
    }

    if let Err(e) = commands::catalog::catalog(&matches) {
        // geometry faults print like the drive's own error channel
        if img::is_geometry_fault(&e) {
            eprintln!("{}",e);
        } else {
            eprintln!("d64list: {}",e);
        }
        std::process::exit(1);
    }
}
