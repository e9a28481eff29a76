use std::ffi::OsString;
use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Result};
use clap::{arg, command, error::ErrorKind, ArgMatches, Command};
use common::{encoding, event, export, settings::Settings};
use log::info;

pub const USAGE: &str = "Usage: xml-event-extractor <XML-file>";

/// Environment variable holding the log filter, `env_logger` syntax.
pub const LOG_ENV: &str = "XML_EVENT_EXTRACTOR_LOG";

pub fn build_command() -> Command {
    command!() // requires `cargo` feature
        .name("xml-event-extractor")
        .about("Extracts relevant security events from a PowerShell CLIXML export into a CSV file")
        .arg(arg!(<file> "XML file produced by Export-Clixml").allow_hyphen_values(true))
        .arg(arg!(-c --config <FILE> "Sets a custom config file").required(false))
        .arg(arg!(-v --verbosity ... "Sets the level of verbosity"))
}

#[derive(Debug)]
pub enum Invocation {
    Run(ArgMatches),
    /// Help or version was requested; clap renders it.
    Display(clap::Error),
    /// Wrong arguments
    Usage,
}

pub fn parse_args<I, T>(args: I) -> Invocation
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match build_command().try_get_matches_from(args) {
        Ok(matches) => Invocation::Run(matches),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Invocation::Display(err),
            _ => Invocation::Usage,
        },
    }
}

/// Level used when the log environment variable is not set.
pub fn default_log_level(verbosity_arg_count: u8, verbosity_setting: Option<&String>) -> String {
    match verbosity_arg_count {
        0 => verbosity_setting
            .cloned()
            .unwrap_or_else(|| "warn".to_owned()),
        1 => "info".to_owned(),
        2 => "debug".to_owned(),
        _ => "trace".to_owned(),
    }
}

fn banner() -> String {
    let version = format!("Version {}", env!("CARGO_PKG_VERSION"));
    [
        "###############################".to_owned(),
        "# XML Event Extractor         #".to_owned(),
        "# --------------------------  #".to_owned(),
        format!("# {:<28}#", version),
        "###############################".to_owned(),
        format!(
            "Started at {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ),
    ]
    .join("\n")
}

fn report<W: Write>(out: &mut W, extraction: &event::Extraction) -> Result<()> {
    writeln!(out, "{} objects found in the XML file.", extraction.candidates())?;
    if extraction.events().is_empty() {
        writeln!(out, "No relevant events found.")?;
        return Ok(());
    }
    writeln!(out, "{} relevant events found.", extraction.events().len())?;
    for event in extraction.events() {
        writeln!(out, "{}", event.summary())?;
    }
    Ok(())
}

/// Prints a fatal error as a single diagnostic line.
pub fn report_failure<W: Write>(out: &mut W, err: &anyhow::Error) {
    // Nothing left to do if the diagnostic itself cannot be written
    let _ = writeln!(out, "{:#}", err);
}

/// Loads `<file>`, extracts its catalogued events and writes them as CSV.
/// Progress is reported to `out`.
pub fn run<W: Write>(matches: &ArgMatches, settings: &Settings, out: &mut W) -> Result<()> {
    let file = matches
        .get_one::<String>("file")
        .ok_or_else(|| anyhow!("Missing input file"))?;

    writeln!(out, "\n{}\n", banner())?;
    writeln!(out, "\n[*] Checking if the file '{}' exists...", file)?;
    let document = encoding::load(Path::new(file))?;
    writeln!(
        out,
        "\n[*] XML file successfully loaded (Encoding: {}).",
        document.encoding()
    )?;

    let extraction = event::extract_events(document.content())?;
    writeln!(out, "Root tag of the XML file: {}", extraction.root_tag())?;
    report(out, &extraction)?;

    let output = Path::new(settings.output().path());
    writeln!(out, "\nExporting filtered events to '{}'...", output.display())?;
    export::export_to_file(output, extraction.events())?;
    info!(
        "{} events from {} exported to {}",
        extraction.events().len(),
        file,
        output.display()
    );
    writeln!(out, "Export completed.")?;
    Ok(())
}
