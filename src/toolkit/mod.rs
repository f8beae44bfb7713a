// html2pdf toolkit layer
// Owned handles for windows, web views and print operations, signal wiring,
// and the event loop contract shared by the native and headless backends.

pub mod headless;
pub mod runtime;
pub mod signal;

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::types::errors::{PrintError, ToolkitError};
use crate::types::paper::PageSetup;

pub use signal::{HandlerId, Propagation, Signal, Subscription};

/// Identifies a top-level window within one toolkit instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

/// Identifies a web view within one toolkit instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

/// Parameters for a new top-level window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub visible: bool,
}

/// Progress notifications emitted while a view loads a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadEvent {
    Started,
    Redirected,
    Committed,
    Finished,
}

/// Content state of a view, derived from its load events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Unloaded,
    Loading,
    Loaded,
}

impl LoadState {
    pub fn after(self, event: LoadEvent) -> LoadState {
        match event {
            LoadEvent::Started | LoadEvent::Redirected | LoadEvent::Committed => LoadState::Loading,
            LoadEvent::Finished => LoadState::Loaded,
        }
    }
}

/// How the user dismissed a print dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintResponse {
    Print,
    Cancel,
}

/// Signals emitted by a top-level window.
#[derive(Debug)]
pub struct WindowSignals {
    /// Fired once, when the window is destroyed.
    pub destroy: Signal<()>,
}

impl WindowSignals {
    pub fn new() -> Self {
        Self { destroy: Signal::new("destroy") }
    }

    pub fn clear(&self) {
        self.destroy.clear();
    }
}

impl Default for WindowSignals {
    fn default() -> Self {
        Self::new()
    }
}

/// Signals emitted by a web view.
#[derive(Debug)]
pub struct ViewSignals {
    /// The page asked for its window to be closed.
    pub close: Signal<(), Propagation>,
    pub load_changed: Signal<LoadEvent>,
}

impl ViewSignals {
    pub fn new() -> Self {
        Self {
            close: Signal::new("close"),
            load_changed: Signal::new("load-changed"),
        }
    }

    pub fn clear(&self) {
        self.close.clear();
        self.load_changed.clear();
    }
}

impl Default for ViewSignals {
    fn default() -> Self {
        Self::new()
    }
}

/// Quit flag shared between an event loop and the handlers it dispatches.
#[derive(Debug, Clone, Default)]
pub struct MainLoop {
    quit: Rc<Cell<bool>>,
}

impl MainLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks the loop to return after the current dispatch.
    pub fn quit(&self) {
        self.quit.set(true);
    }

    pub fn quit_requested(&self) -> bool {
        self.quit.get()
    }

    /// Clears a previous quit request before the loop is entered again.
    pub fn reset(&self) {
        self.quit.set(false);
    }
}

/// A prepared print operation; released when dropped.
pub trait PrintDialog {
    /// Shows the native print dialog and blocks until it is dismissed.
    fn run_dialog(&self) -> Result<PrintResponse, PrintError>;
}

/// Handle to an embedded web view. Clones refer to the same view.
pub trait BrowserView: Clone + 'static {
    type PrintOperation: PrintDialog;

    fn id(&self) -> ViewId;
    fn signals(&self) -> &ViewSignals;
    /// Requests navigation; completion is only reported via `load_changed`.
    fn load_uri(&self, uri: &str) -> Result<(), ToolkitError>;
    fn grab_focus(&self);
    fn load_state(&self) -> LoadState;
    fn create_print_operation(&self, setup: &PageSetup) -> Result<Self::PrintOperation, PrintError>;
}

/// Handle to a top-level window. Clones refer to the same window.
pub trait WindowHandle: Clone + 'static {
    type View: BrowserView;

    fn id(&self) -> WindowId;
    fn signals(&self) -> &WindowSignals;
    /// Embeds `view` as the window's only child.
    fn add(&self, view: &Self::View) -> Result<(), ToolkitError>;
    fn show_all(&self) -> Result<(), ToolkitError>;
    /// Destroys the window and its child, firing `destroy` once.
    fn destroy(&self);
    fn is_destroyed(&self) -> bool;
}

/// A windowing toolkit paired with a browser engine.
pub trait Toolkit {
    type View: BrowserView;
    type Window: WindowHandle<View = Self::View>;

    fn backend_name(&self) -> &'static str;
    fn create_window(&mut self, spec: &WindowSpec) -> Result<Self::Window, ToolkitError>;
    fn create_view(&mut self) -> Result<Self::View, ToolkitError>;
    fn main_loop(&self) -> MainLoop;
    /// Blocks dispatching events until [`MainLoop::quit`] is called.
    fn run(&mut self) -> Result<(), ToolkitError>;
}
