use camino::Utf8PathBuf;
use clap::Parser;
use kindling::{ConfigFile, TranslateOptions};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineArgs {
    /// The config to compile, as YAML (read from standard input if not given)
    pub input: Option<Utf8PathBuf>,

    /// Where to write the compiled JSON document (standard output if not given)
    #[arg(short, long)]
    pub output: Option<Utf8PathBuf>,

    /// The path to a kindling.toml config file
    #[arg(short, long)]
    pub config_file: Option<Utf8PathBuf>,

    /// Fail if there are any warnings
    #[arg(long)]
    pub strict: bool,

    /// Never gzip resources embedded into the output
    #[arg(long)]
    pub no_resource_auto_compression: bool,

    /// Indent the output for reading
    #[arg(long)]
    pub pretty: bool,

    /// Increase logging verbosity level (0: warn; 1: info; 2: info, pretty; 3: debug; 4: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl CommandLineArgs {
    /// Combines the config file's options with those given on the command line
    ///
    /// Flags only ever switch an option on, so a flag that is not given leaves the file's
    /// value in place.
    pub fn options(&self, file: Option<ConfigFile>) -> TranslateOptions {
        let mut options = file.map(TranslateOptions::from).unwrap_or_default();
        options.strict |= self.strict;
        options.no_resource_auto_compression |= self.no_resource_auto_compression;
        options
    }
}
