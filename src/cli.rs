use clap::{value_parser, crate_version, Arg, ArgAction, Command, ValueHint};

const LONG_HELP: &str = "Lists the directory of each D64 disk image the way a 1541 would show it.
If no image is given, one image is read from standard input,
which then has to be a pipe or a file rather than the terminal.
Set RUST_LOG environment variable to control logging level.
  levels: trace,debug,info,warn,error

Examples:
---------
list two disks:        `d64list games.d64 demos.d64`
lower case charset:    `d64list -lf games.d64`
copy files out:        `d64list -c games.d64`
from a pipe:           `gunzip -c games.d64.gz | d64list`
catalog as JSON:       `d64list -j --indent 2 games.d64`";

const COPY_HELP: &str = "For each closed SEQ, PRG, or USR file, ask whether to save it.
Answer with exactly `y` or `n`.  After `y` a destination is asked for,
an empty line accepts the suggested name.";

fn flag(id: &'static str, short: char, long: &'static str, help: &'static str) -> Arg {
    Arg::new(id).short(short).long(long).help(help)
        .action(ArgAction::SetTrue)
}

pub fn build_cli() -> Command {
    Command::new("d64list")
        .about("D64 lister and extractor")
        .after_long_help(LONG_HELP)
        .version(crate_version!())
        .disable_help_flag(true)
        .arg(Arg::new("help").short('h').short_alias('?').long("help").help("print usage and exit")
            .action(ArgAction::SetTrue))
        .arg(flag("lower", 'l', "lower", "use lowercase charset"))
        .arg(flag("copy", 'c', "copy", "copy mode").long_help(COPY_HELP))
        .arg(flag("noext", 'e', "no-ext", "no extensions on suggested names in copy mode"))
        .arg(flag("names", 'f', "names", "print input filenames"))
        .arg(flag("json", 'j', "json", "print the catalog as JSON"))
        .arg(Arg::new("indent").long("indent").help("JSON indentation, omit to minify")
            .value_name("SPACES")
            .value_parser(value_parser!(u16).range(0..16))
            .requires("json")
            .required(false))
        .arg(Arg::new("images").value_name("IMAGE").help("disk images to list, stdin if none")
            .value_hint(ValueHint::FilePath)
            .action(ArgAction::Append)
            .num_args(0..))
}
