// vibecat - A sidebar cat that animates one GIF frame per keystroke
// Shows a GIF in an editor panel and steps it forward on every edit or cursor move

mod cli;
mod config;
mod extension;
mod frame_state;
mod host;
mod image_loader;
mod panel;
mod script_host;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use extension::VibeCat;
use log::info;
use script_host::{FileWebview, ScriptHost};

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let args = cli::parse_args()?;

    info!(
        "Starting vibecat with extension path {:?}, {} scripted events",
        args.extension_path,
        args.events.len()
    );

    let host = ScriptHost::new(args.settings, args.workspace_folders, args.extension_path);
    let mut vibecat = VibeCat::activate(host);

    // The panel becomes visible right away in the command-line host
    let print_final = args.output.is_none();
    let (webview, latest) = FileWebview::new(args.output);
    vibecat.resolve_webview_view(Box::new(webview));

    script_host::run(&mut vibecat, args.events);

    if print_final {
        println!("{}", latest.borrow());
    }

    vibecat.deactivate();
    Ok(())
}
