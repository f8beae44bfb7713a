//! Application shell.
//!
//! Opens one window holding one web view, loads a page, and runs the event
//! loop until the window is destroyed.

use tracing::{debug, info, warn};

use crate::toolkit::{BrowserView, Propagation, Subscription, Toolkit, WindowHandle, WindowSpec};
use crate::types::errors::ShellError;

pub const DEFAULT_URL: &str = "http://www.webkitgtk.org/";
pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;

/// Fixed shell settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub url: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            title: "html2pdf".to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            url: DEFAULT_URL.to_string(),
        }
    }
}

impl ShellConfig {
    fn window_spec(&self) -> WindowSpec {
        WindowSpec {
            title: self.title.clone(),
            width: self.width,
            height: self.height,
            // Shown together with its child by `show_all`.
            visible: false,
        }
    }
}

/// A wired-up window and view, ready to run.
pub struct Shell<T: Toolkit> {
    // Declared first so handlers are disconnected before the handles drop.
    _subscriptions: Vec<Subscription>,
    view: T::View,
    window: T::Window,
    toolkit: T,
}

impl<T: Toolkit> Shell<T> {
    /// Creates the window and view and connects their lifecycle handlers.
    ///
    /// A failed load request is logged and otherwise ignored, like any
    /// later load failure.
    pub fn build(mut toolkit: T, config: &ShellConfig) -> Result<Self, ShellError> {
        let window = toolkit.create_window(&config.window_spec())?;
        let view = toolkit.create_view()?;
        window.add(&view)?;

        let main_loop = toolkit.main_loop();
        let on_destroy = window.signals().destroy.connect(move |_| {
            debug!("main window destroyed, leaving event loop");
            main_loop.quit();
        });

        let target = window.clone();
        let on_close = view.signals().close.connect(move |_| {
            debug!(window = %target.id(), "web view asked to close");
            target.destroy();
            Propagation::Stop
        });

        if let Err(err) = view.load_uri(&config.url) {
            warn!(url = %config.url, error = %err, "load request rejected");
        }
        view.grab_focus();
        window.show_all()?;

        info!(
            backend = toolkit.backend_name(),
            url = %config.url,
            width = config.width,
            height = config.height,
            "shell ready"
        );
        Ok(Self {
            _subscriptions: vec![on_destroy, on_close],
            view,
            window,
            toolkit,
        })
    }

    pub fn window(&self) -> &T::Window {
        &self.window
    }

    pub fn view(&self) -> &T::View {
        &self.view
    }

    /// Blocks on the event loop; returns once the window has been destroyed.
    pub fn run(mut self) -> Result<(), ShellError> {
        self.toolkit.run()?;
        info!("shell finished");
        Ok(())
    }
}

/// Builds the shell on `toolkit` and runs it to completion.
pub fn run<T: Toolkit>(toolkit: T, config: &ShellConfig) -> Result<(), ShellError> {
    Shell::build(toolkit, config)?.run()
}
