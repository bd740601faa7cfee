// Panel module
// Renders the sidebar document and pushes it to the host's webview

use crate::frame_state::{FrameState, FrameView, SubscriptionId};
use log::debug;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

/// Id the panel is registered under
pub const VIEW_TYPE: &str = "vibeCatView";

/// Settings applied to the webview when it is resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebviewOptions {
    pub enable_scripts: bool,
    /// Directories the webview may load local resources from
    pub local_resource_roots: Vec<PathBuf>,
}

/// A host-managed surface showing a document we fully control
pub trait Webview {
    fn set_options(&mut self, options: WebviewOptions);
    fn set_html(&mut self, html: String);
}

type ViewSlot = Rc<RefCell<Option<Box<dyn Webview>>>>;

/// Provides the content of the `vibeCatView` panel
pub struct VibeCatViewProvider {
    extension_path: PathBuf,
    view: ViewSlot,
    subscription: Option<SubscriptionId>,
}

impl VibeCatViewProvider {
    pub fn new(extension_path: PathBuf) -> Self {
        Self {
            extension_path,
            view: Rc::new(RefCell::new(None)),
            subscription: None,
        }
    }

    /// Re-render on every change of `state`
    pub fn attach(&mut self, state: &mut FrameState) {
        if self.subscription.is_some() {
            return;
        }

        let view = Rc::clone(&self.view);
        self.subscription = Some(state.subscribe(Box::new(move |frames| {
            update_webview(&view, frames);
        })));
    }

    /// Stop listening to `state` and let go of the webview
    pub fn detach(&mut self, state: &mut FrameState) {
        if let Some(id) = self.subscription.take() {
            state.unsubscribe(id);
        }
        self.view.borrow_mut().take();
    }

    /// Take ownership of the host's webview and render into it at once
    pub fn resolve_webview_view(
        &mut self,
        mut webview: Box<dyn Webview>,
        frames: &FrameView<'_>,
    ) {
        webview.set_options(WebviewOptions {
            enable_scripts: true,
            local_resource_roots: vec![self.extension_path.clone()],
        });
        *self.view.borrow_mut() = Some(webview);
        update_webview(&self.view, frames);
    }

    #[cfg(test)]
    pub fn is_resolved(&self) -> bool {
        self.view.borrow().is_some()
    }
}

fn update_webview(view: &ViewSlot, frames: &FrameView<'_>) {
    if let Some(webview) = view.borrow_mut().as_mut() {
        debug!(
            "Rendering frame {} of {}",
            frames.cursor() + 1,
            frames.total_frames()
        );
        webview.set_html(render_html(frames));
    }
}

/// Build the panel document for the given frames.
///
/// Pure: the same frames and cursor always give the same document.
pub fn render_html(frames: &FrameView<'_>) -> String {
    let Some(frame) = frames.current() else {
        return PLACEHOLDER_HTML.to_string();
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
	<meta charset="UTF-8">
	<meta name="viewport" content="width=device-width, initial-scale=1.0">
	<title>VibeCat</title>
	<style>
		body {{
			padding: 0;
			margin: 0;
			display: flex;
			align-items: center;
			justify-content: center;
			height: 100vh;
		}}
		img {{
			max-width: 100%;
			height: auto;
			image-rendering: pixelated;
		}}
	</style>
</head>
<body>
	<img src="{src}" alt="VibeCat Frame {number}" />
</body>
</html>"#,
        src = frame.data_url(),
        number = frames.cursor() + 1,
    )
}

const PLACEHOLDER_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
	<meta charset="UTF-8">
	<meta name="viewport" content="width=device-width, initial-scale=1.0">
	<title>VibeCat</title>
</head>
<body>
	<p>Loading VibeCat...</p>
</body>
</html>"#;
