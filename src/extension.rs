// Extension module
// Wires host events to the frame state and the panel

use crate::config::CUSTOM_GIF_PATH;
use crate::frame_state::{FrameState, Generation, LoadOutcome};
use crate::host::{Host, HostEvent};
use crate::image_loader::{self, LoadError};
use crate::panel::{VibeCatViewProvider, Webview, VIEW_TYPE};
use log::{debug, error, info, warn};
use std::path::PathBuf;

/// A load that has been scheduled but not run yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub generation: Generation,
    pub path: PathBuf,
}

impl LoadRequest {
    /// Decode the GIF. Safe to call on any thread.
    pub fn run(self) -> LoadOutcome {
        LoadOutcome {
            generation: self.generation,
            result: image_loader::load_frames(&self.path),
        }
    }
}

/// The running extension
pub struct VibeCat<H: Host> {
    host: H,
    state: FrameState,
    provider: VibeCatViewProvider,
}

impl<H: Host> VibeCat<H> {
    /// Register the panel and load the configured GIF
    pub fn activate(host: H) -> Self {
        info!("VibeCat extension is now active!");

        let mut state = FrameState::new();
        let mut provider = VibeCatViewProvider::new(host.extension_path());
        provider.attach(&mut state);
        debug!("Registered webview view provider {}", VIEW_TYPE);

        let mut vibecat = Self {
            host,
            state,
            provider,
        };
        vibecat.reload();
        vibecat
    }

    /// Release the panel
    pub fn deactivate(&mut self) {
        self.provider.detach(&mut self.state);
    }

    #[cfg(test)]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn state(&self) -> &FrameState {
        &self.state
    }

    /// The host made the panel visible
    pub fn resolve_webview_view(&mut self, webview: Box<dyn Webview>) {
        self.provider.resolve_webview_view(webview, &self.state.view());
    }

    /// React to one host event.
    ///
    /// A change of the custom GIF setting resets the state and returns the
    /// load to run; the caller hands its outcome to [`VibeCat::finish_load`].
    pub fn handle_event(&mut self, event: HostEvent) -> Option<LoadRequest> {
        match event {
            HostEvent::SelectionChanged | HostEvent::TextDocumentChanged => {
                self.state.advance();
                None
            }
            HostEvent::ConfigurationChanged(change) => {
                if change.affects_configuration(CUSTOM_GIF_PATH) {
                    Some(self.begin_reload())
                } else {
                    None
                }
            }
        }
    }

    /// Handle an event, running any resulting load before returning
    #[cfg(test)]
    pub fn dispatch(&mut self, event: HostEvent) {
        if let Some(request) = self.handle_event(event) {
            self.finish_load(request.run());
        }
    }

    /// Reset the state and load the configured GIF synchronously
    pub fn reload(&mut self) {
        let request = self.begin_reload();
        self.finish_load(request.run());
    }

    /// Empty the store and describe the load that should refill it
    pub fn begin_reload(&mut self) -> LoadRequest {
        let generation = self.state.reset();
        let path = image_loader::resolve_gif_path(
            &self.host.configuration(),
            &self.host.workspace_folders(),
            &self.host.extension_path(),
        );
        debug!("Loading GIF frames from {}", path.display());

        LoadRequest { generation, path }
    }

    /// Install a finished load, or report why it failed.
    ///
    /// Outcomes of superseded loads are dropped without a notice.
    pub fn finish_load(&mut self, outcome: LoadOutcome) {
        if outcome.generation != self.state.generation() {
            debug!("Ignoring outcome of superseded load {:?}", outcome.generation);
            return;
        }

        match outcome.result {
            Ok(frames) => {
                self.state.install(outcome.generation, frames);
            }
            Err(err) => self.report_load_error(&err),
        }
    }

    fn report_load_error(&self, err: &LoadError) {
        match err {
            LoadError::NotFound(_) => warn!("{}", err),
            _ => error!("Error loading GIF frames: {}", err),
        }
        self.host.show_error_message(&err.user_message());
    }
}
