// Script host module
// A command-line stand-in for the editor: replays an event script
// and writes every rendered panel document to disk

use crate::config::Settings;
use crate::extension::VibeCat;
use crate::frame_state::LoadOutcome;
use crate::host::{Host, HostEvent};
use crate::panel::{Webview, WebviewOptions};
use anyhow::{bail, Result};
use log::{debug, info, warn};
use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use std::str::FromStr;
use std::sync::mpsc;
use std::thread;

/// One line of an event script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptEvent {
    /// `select`: the cursor moved
    Select,
    /// `type`: text was typed
    Type,
    /// `config <key> [value]`: a setting was changed, or cleared without a value
    Config { key: String, value: Option<String> },
}

impl FromStr for ScriptEvent {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = line
            .split_once(char::is_whitespace)
            .map(|(verb, rest)| (verb, rest.trim()))
            .unwrap_or((line, ""));

        match verb {
            "select" | "type" if !rest.is_empty() => Err(format!("'{verb}' takes no arguments")),
            "select" => Ok(ScriptEvent::Select),
            "type" => Ok(ScriptEvent::Type),
            "config" => {
                let (key, value) = rest
                    .split_once(char::is_whitespace)
                    .map(|(key, value)| (key, Some(value.trim().to_string())))
                    .unwrap_or((rest, None));
                if key.is_empty() {
                    return Err("'config' needs a key".to_string());
                }
                Ok(ScriptEvent::Config {
                    key: key.to_string(),
                    value,
                })
            }
            other => Err(format!("Unknown event '{other}'")),
        }
    }
}

/// Parse a whole script, skipping blank lines and `#` comments
pub fn parse_script(text: &str) -> Result<Vec<ScriptEvent>> {
    let mut events = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match line.parse() {
            Ok(event) => events.push(event),
            Err(err) => bail!("Event script line {}: {}", number + 1, err),
        }
    }
    Ok(events)
}

/// Host backed by command-line settings; notices go to stderr
#[derive(Debug)]
pub struct ScriptHost {
    settings: Settings,
    workspace_folders: Vec<PathBuf>,
    extension_path: PathBuf,
}

impl ScriptHost {
    pub fn new(
        settings: Settings,
        workspace_folders: Vec<PathBuf>,
        extension_path: PathBuf,
    ) -> Self {
        Self {
            settings,
            workspace_folders,
            extension_path,
        }
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }
}

impl Host for ScriptHost {
    fn configuration(&self) -> Settings {
        self.settings.clone()
    }

    fn workspace_folders(&self) -> Vec<PathBuf> {
        self.workspace_folders.clone()
    }

    fn extension_path(&self) -> PathBuf {
        self.extension_path.clone()
    }

    fn show_error_message(&self, message: &str) {
        eprintln!("vibecat: {message}");
    }
}

/// Webview that mirrors the latest document into a file
#[derive(Debug)]
pub struct FileWebview {
    output: Option<PathBuf>,
    latest: Rc<RefCell<String>>,
}

impl FileWebview {
    /// Returns the webview and a handle to the latest document
    pub fn new(output: Option<PathBuf>) -> (Self, Rc<RefCell<String>>) {
        let latest = Rc::new(RefCell::new(String::new()));
        (
            Self {
                output,
                latest: Rc::clone(&latest),
            },
            latest,
        )
    }
}

impl Webview for FileWebview {
    fn set_options(&mut self, options: WebviewOptions) {
        debug!("Webview options: {:?}", options);
    }

    fn set_html(&mut self, html: String) {
        if let Some(ref path) = self.output {
            if let Err(e) = fs::write(path, &html) {
                warn!("Failed to write panel to {}: {}", path.display(), e);
            }
        }
        *self.latest.borrow_mut() = html;
    }
}

/// Replay `events` against the extension.
///
/// Reloads triggered by settings changes decode on worker threads; their
/// outcomes are applied between events and drained before returning.
pub fn run(vibecat: &mut VibeCat<ScriptHost>, events: Vec<ScriptEvent>) {
    let (sender, receiver) = mpsc::channel::<LoadOutcome>();
    let mut in_flight = 0usize;

    for event in events {
        while let Ok(outcome) = receiver.try_recv() {
            in_flight -= 1;
            vibecat.finish_load(outcome);
        }

        let event = match event {
            ScriptEvent::Select => HostEvent::SelectionChanged,
            ScriptEvent::Type => HostEvent::TextDocumentChanged,
            ScriptEvent::Config { key, value } => {
                let change = vibecat.host_mut().settings_mut().set(&key, value);
                HostEvent::ConfigurationChanged(change)
            }
        };

        if let Some(request) = vibecat.handle_event(event) {
            debug!("Starting load {:?} on a worker thread", request.generation);
            let sender = sender.clone();
            in_flight += 1;
            thread::spawn(move || {
                // The receiver only goes away once run() has returned
                let _ = sender.send(request.run());
            });
        }
    }

    while in_flight > 0 {
        match receiver.recv() {
            Ok(outcome) => {
                in_flight -= 1;
                vibecat.finish_load(outcome);
            }
            Err(_) => break,
        }
    }

    info!(
        "Event script done: frame {} of {}",
        vibecat.state().cursor() + 1,
        vibecat.state().total_frames()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CUSTOM_GIF_PATH;
    use crate::image_loader::{load_frames, resolve_gif_path};
    use crate::test_support::write_gif;
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn parses_events() {
        let script = "\
# warm up
select
type

config vibecat.customGifPath cats/my dance.gif
config vibecat.customGifPath
";
        assert_eq!(
            parse_script(script).unwrap(),
            vec![
                ScriptEvent::Select,
                ScriptEvent::Type,
                ScriptEvent::Config {
                    key: CUSTOM_GIF_PATH.to_string(),
                    value: Some("cats/my dance.gif".to_string()),
                },
                ScriptEvent::Config {
                    key: CUSTOM_GIF_PATH.to_string(),
                    value: None,
                },
            ]
        );
    }

    #[test]
    fn rejects_unknown_events_with_line_number() {
        let err = parse_script("select\njump 3\n").unwrap_err();
        assert_eq!(err.to_string(), "Event script line 2: Unknown event 'jump'");

        assert!("select now".parse::<ScriptEvent>().is_err());
        assert!("config".parse::<ScriptEvent>().is_err());
    }

    #[test]
    fn replays_script_and_writes_panel() {
        let ext = TempDir::new().unwrap();
        fs::create_dir(ext.path().join("assets")).unwrap();
        write_gif(&ext.path().join("assets").join("vibecat.gif"), 3);
        write_gif(&ext.path().join("other.gif"), 6);
        let output = ext.path().join("panel.html");

        let host = ScriptHost::new(Settings::default(), Vec::new(), ext.path().to_path_buf());
        let mut vibecat = VibeCat::activate(host);
        let (webview, latest) = FileWebview::new(Some(output.clone()));
        vibecat.resolve_webview_view(Box::new(webview));

        let other = ext.path().join("other.gif");
        let script = format!(
            "select\ntype\nconfig editor.fontSize 12\nconfig {} {}\n",
            CUSTOM_GIF_PATH,
            other.display()
        );
        run(&mut vibecat, parse_script(&script).unwrap());

        assert_eq!(vibecat.state().total_frames(), 6);
        assert_eq!(vibecat.state().cursor(), 0);
        assert_eq!(fs::read_to_string(&output).unwrap(), *latest.borrow());
        assert!(latest.borrow().contains("VibeCat Frame 1"));
    }

    #[test]
    fn demo_script_only_needs_shipped_files() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        let workspace = root.join("demos");
        let text = fs::read_to_string(workspace.join("typing.events")).unwrap();
        let events = parse_script(&text).unwrap();

        let mut settings = Settings::default();
        for event in &events {
            if let ScriptEvent::Config { key, value } = event {
                settings.set(key, value.clone());
                let path = resolve_gif_path(&settings, &[workspace.clone()], root);
                assert!(load_frames(&path).is_ok(), "{}", path.display());
            }
        }

        let host = ScriptHost::new(Settings::default(), vec![workspace], root.to_path_buf());
        let mut vibecat = VibeCat::activate(host);
        run(&mut vibecat, events);
        assert_eq!(vibecat.state().total_frames(), 12);
    }
}
