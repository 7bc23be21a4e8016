use std::io::{Read, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{span, Level};

mod args;
use args::CommandLineArgs;
use kindling::{compile, ConfigFile};

fn init_logger(verbosity: u8) {
    let sub = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_file(false)
        .with_line_number(false);
    let (level, pretty) = match verbosity {
        0 => (Level::WARN, false),
        1 => (Level::INFO, false),
        2 => (Level::INFO, true),
        3 => (Level::DEBUG, true),
        _ => (Level::TRACE, true),
    };
    let sub = sub.with_max_level(level);
    if pretty {
        sub.pretty().init();
    } else {
        sub.init();
    }
}

fn main() -> Result<()> {
    let args = CommandLineArgs::parse();

    init_logger(args.verbose);
    let span = span!(
        Level::DEBUG,
        "main",
        input = args.input.as_ref().map(|p| p.as_str()).unwrap_or("-")
    );
    let _guard = span.enter();

    let file = args.config_file.as_ref().map(ConfigFile::load).transpose()?;
    let options = args.options(file);

    let text = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Reading config {path:?}"))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Reading config from standard input")?;
            text
        }
    };
    let input: serde_yaml::Value = serde_yaml::from_str(&text).context("Parsing config")?;

    let output = match compile(&input, &options) {
        Ok(output) => output,
        Err(e) => {
            eprint!("{}", e.report());
            return Err(e.into());
        }
    };
    eprint!("{}", output.report);

    let mut json = output.to_json(args.pretty)?;
    json.push('\n');
    match &args.output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("Writing output {path:?}"))?;
            tracing::info!("Wrote {}", path);
        }
        None => std::io::stdout()
            .write_all(json.as_bytes())
            .context("Writing output")?,
    }
    Ok(())
}
