// Image loading module
// Resolves the configured GIF and turns it into displayable frames

use crate::config::Settings;
use base64::{prelude::BASE64_STANDARD, Engine};
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, ImageFormat};
use log::{debug, info};
use std::fs;
use std::io::{self, Cursor};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::thread;
use thiserror::Error;

/// Location of the bundled GIF, relative to the extension directory
pub const DEFAULT_GIF: [&str; 2] = ["assets", "vibecat.gif"];

/// Upper bound on frame encoder threads
const MAX_ENCODE_WORKERS: usize = 8;

/// Notice shown for every failure other than a missing file
const LOAD_FAILED_NOTICE: &str = "Failed to load GIF frames";

/// Errors raised while turning a GIF file into frames
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("GIF file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read GIF file {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to decode GIF: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode frame {index}: {source}")]
    Encode {
        index: usize,
        source: image::ImageError,
    },

    #[error("Frame encoder thread panicked")]
    Worker,
}

impl LoadError {
    /// The advisory text handed to the host for this failure
    pub fn user_message(&self) -> String {
        match self {
            LoadError::NotFound(_) => self.to_string(),
            _ => LOAD_FAILED_NOTICE.to_string(),
        }
    }
}

/// One still image of the animation, ready to embed in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// MIME type of the encoded image
    mime: &'static str,
    /// `data:` URI carrying the base64 encoded image
    data_url: String,
}

impl Frame {
    /// Wrap PNG bytes as a frame
    pub fn from_png(png: &[u8]) -> Self {
        let mime = "image/png";
        Self {
            mime,
            data_url: format!("data:{};base64,{}", mime, BASE64_STANDARD.encode(png)),
        }
    }

    #[cfg(test)]
    pub fn mime(&self) -> &'static str {
        self.mime
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }
}

/// Pick the GIF to display.
///
/// A non-blank custom path wins; relative custom paths are joined onto the
/// first workspace folder when there is one. Otherwise the bundled GIF under
/// `extension_path` is used.
pub fn resolve_gif_path(
    settings: &Settings,
    workspace_folders: &[PathBuf],
    extension_path: &Path,
) -> PathBuf {
    match settings.custom_gif_path() {
        Some(custom) => {
            let path = PathBuf::from(custom);
            match workspace_folders.first() {
                Some(root) if path.is_relative() => root.join(path),
                _ => path,
            }
        }
        None => DEFAULT_GIF
            .iter()
            .fold(extension_path.to_path_buf(), |path, part| path.join(part)),
    }
}

/// Decode every frame of the GIF at `path` and encode each one as PNG.
///
/// The returned frames are in decode order.
pub fn load_frames(path: &Path) -> Result<Vec<Frame>, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let data = fs::read(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes from {}", data.len(), path.display());

    let frames = load_from_bytes(&data)?;
    info!("Loaded {} frames from GIF", frames.len());

    Ok(frames)
}

/// Decode a GIF held in memory
fn load_from_bytes(data: &[u8]) -> Result<Vec<Frame>, LoadError> {
    let decoder = GifDecoder::new(Cursor::new(data)).map_err(LoadError::Decode)?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .map_err(LoadError::Decode)?;

    encode_frames(&frames)
}

/// Encode frames on a bounded set of scoped threads.
///
/// Each worker takes one contiguous chunk, so joining the workers in spawn
/// order yields the frames in their original order.
fn encode_frames(frames: &[image::Frame]) -> Result<Vec<Frame>, LoadError> {
    if frames.is_empty() {
        return Ok(Vec::new());
    }

    let workers = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
        .min(MAX_ENCODE_WORKERS);
    let chunk_size = frames.len().div_ceil(workers);
    debug!("Encoding {} frames on up to {} threads", frames.len(), workers);

    thread::scope(|scope| -> Result<Vec<Frame>, LoadError> {
        let handles: Vec<_> = frames
            .chunks(chunk_size)
            .enumerate()
            .map(|(chunk_index, chunk)| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .enumerate()
                        .map(|(offset, frame)| {
                            encode_frame(chunk_index * chunk_size + offset, frame)
                        })
                        .collect::<Result<Vec<_>, _>>()
                })
            })
            .collect();

        let mut encoded = Vec::with_capacity(frames.len());
        for handle in handles {
            let chunk = handle.join().map_err(|_| LoadError::Worker)??;
            encoded.extend(chunk);
        }
        Ok(encoded)
    })
}

/// Encode one composited frame as PNG
fn encode_frame(index: usize, frame: &image::Frame) -> Result<Frame, LoadError> {
    let mut png = Vec::new();
    frame
        .buffer()
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|source| LoadError::Encode { index, source })?;

    Ok(Frame::from_png(&png))
}
