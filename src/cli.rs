// Command line interface module
// Handles parsing of command line arguments and the event script input

use crate::config::{Settings, CUSTOM_GIF_PATH};
use crate::script_host::{parse_script, ScriptEvent};
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// vibecat - A sidebar cat that animates one GIF frame per keystroke
#[derive(Parser, Debug)]
#[command(name = "vibecat")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Event script to replay (read from a stdin pipe when omitted)
    #[arg(value_name = "EVENTS")]
    pub events_path: Option<PathBuf>,

    /// JSON settings file (e.g. {"vibecat.customGifPath": "cat.gif"})
    #[arg(short, long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Custom GIF, overriding the settings file
    #[arg(short, long, value_name = "PATH")]
    pub custom_gif_path: Option<String>,

    /// Workspace folder; the first one resolves relative GIF paths
    #[arg(short, long = "workspace", value_name = "DIR")]
    pub workspace_folders: Vec<PathBuf>,

    /// Directory holding the bundled assets
    #[arg(long, value_name = "DIR", default_value = env!("CARGO_MANIFEST_DIR"))]
    pub extension_path: PathBuf,

    /// Write the panel document here on every update instead of printing
    /// the final one to stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Parsed arguments with settings and events resolved
#[derive(Debug)]
pub struct ParsedArgs {
    pub settings: Settings,
    pub workspace_folders: Vec<PathBuf>,
    pub extension_path: PathBuf,
    pub output: Option<PathBuf>,
    pub events: Vec<ScriptEvent>,
}

/// Check if stdin has data available (is a pipe)
fn stdin_has_data() -> bool {
    !atty::is(atty::Stream::Stdin)
}

/// Read the event script from stdin
fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

/// Parse command line arguments, the settings file and the event script
pub fn parse_args() -> Result<ParsedArgs> {
    let args = Args::parse();

    let mut settings = match args.settings {
        Some(ref path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(path) = args.custom_gif_path {
        settings.set(CUSTOM_GIF_PATH, Some(path));
    }

    let script = read_script(args.events_path.as_deref(), stdin_has_data(), read_stdin)?;

    Ok(ParsedArgs {
        settings,
        workspace_folders: args.workspace_folders,
        extension_path: args.extension_path,
        output: args.output,
        events: parse_script(&script)?,
    })
}

/// Pick the event script source.
///
/// An explicit script file always wins; stdin is only consulted when no file
/// is given and it is a pipe. A pipe that delivers nothing is an error.
fn read_script(
    events_path: Option<&Path>,
    stdin_is_pipe: bool,
    read_stdin: impl FnOnce() -> Result<String>,
) -> Result<String> {
    if let Some(path) = events_path {
        return fs::read_to_string(path)
            .with_context(|| format!("Failed to read event script: {}", path.display()));
    }

    if !stdin_is_pipe {
        return Ok(String::new());
    }

    let script = read_stdin().context("Failed to read event script from stdin")?;
    if script.trim().is_empty() {
        bail!(
            "No events received from stdin.\n\
             Usage: vibecat <EVENTS> [OPTIONS]\n\
             Or:    cat events.txt | vibecat [OPTIONS]"
        );
    }
    Ok(script)
}
