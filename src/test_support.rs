// Shared fixtures for unit tests

use crate::config::Settings;
use crate::host::Host;
use crate::panel::{Webview, WebviewOptions};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Frame, Rgba, RgbaImage};
use std::cell::RefCell;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Solid colour of fixture frame `index`
pub fn frame_color(index: usize) -> [u8; 4] {
    let step = (index * 20 % 256) as u8;
    [step, 255 - step, 64, 255]
}

/// Write an animated GIF whose frames are filled with `frame_color(i)`
pub fn write_gif(path: &Path, frames: usize) {
    let file = File::create(path).unwrap();
    let mut encoder = GifEncoder::new(file);
    encoder.set_repeat(Repeat::Infinite).unwrap();
    for index in 0..frames {
        let image = RgbaImage::from_pixel(4, 4, Rgba(frame_color(index)));
        encoder.encode_frame(Frame::new(image)).unwrap();
    }
}

/// Host with in-memory settings that records every notice
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub settings: Settings,
    pub workspace_folders: Vec<PathBuf>,
    pub extension_path: PathBuf,
    messages: RefCell<Vec<String>>,
}

impl RecordingHost {
    pub fn new(extension_path: &Path) -> Self {
        Self {
            extension_path: extension_path.to_path_buf(),
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl Host for RecordingHost {
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
        self.messages.borrow_mut().push(message.to_string());
    }
}

#[derive(Debug, Default)]
pub struct WebviewRecord {
    pub options: Option<WebviewOptions>,
    pub html: Vec<String>,
}

/// Webview that keeps every document it was given
#[derive(Debug, Default)]
pub struct RecordingWebview {
    record: Rc<RefCell<WebviewRecord>>,
}

impl RecordingWebview {
    pub fn record(&self) -> Rc<RefCell<WebviewRecord>> {
        Rc::clone(&self.record)
    }
}

impl Webview for RecordingWebview {
    fn set_options(&mut self, options: WebviewOptions) {
        self.record.borrow_mut().options = Some(options);
    }

    fn set_html(&mut self, html: String) {
        self.record.borrow_mut().html.push(html);
    }
}
