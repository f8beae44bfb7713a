use std::fmt;

// === ToolkitError ===

/// Errors reported by the windowing toolkit or the browser engine.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolkitError {
    /// The native event loop was already created in this process.
    AlreadyInitialized(String),
    /// The toolkit failed to create a top-level window.
    WindowCreation(String),
    /// The browser engine failed to create a web view.
    ViewCreation(String),
    /// The window already holds a child widget.
    ContainerOccupied(String),
    /// The handle refers to a widget that has been destroyed.
    Destroyed(String),
    /// The browser engine rejected a load request.
    LoadRequest(String),
    /// The event loop could not run to completion.
    EventLoop(String),
}

impl fmt::Display for ToolkitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolkitError::AlreadyInitialized(msg) => {
                write!(f, "Toolkit already initialized: {}", msg)
            }
            ToolkitError::WindowCreation(msg) => write!(f, "Window creation failed: {}", msg),
            ToolkitError::ViewCreation(msg) => write!(f, "Web view creation failed: {}", msg),
            ToolkitError::ContainerOccupied(msg) => write!(f, "Window already has a child: {}", msg),
            ToolkitError::Destroyed(msg) => write!(f, "Widget destroyed: {}", msg),
            ToolkitError::LoadRequest(msg) => write!(f, "Load request failed: {}", msg),
            ToolkitError::EventLoop(msg) => write!(f, "Event loop error: {}", msg),
        }
    }
}

impl std::error::Error for ToolkitError {}

// === PrintError ===

/// Errors raised while setting up or running a native print dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum PrintError {
    /// The view has no live native widget to print from.
    ViewUnavailable(String),
    /// The native print dialog reported a failure.
    Dialog(String),
}

impl fmt::Display for PrintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrintError::ViewUnavailable(msg) => write!(f, "View unavailable for printing: {}", msg),
            PrintError::Dialog(msg) => write!(f, "Print dialog failed: {}", msg),
        }
    }
}

impl std::error::Error for PrintError {}

// === PaperError ===

/// Errors related to paper stock lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum PaperError {
    /// No paper stock is registered under the given key.
    UnknownStock(String),
}

impl fmt::Display for PaperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaperError::UnknownStock(key) => write!(f, "Unknown paper stock: {}", key),
        }
    }
}

impl std::error::Error for PaperError {}

// === ShellError ===

/// Errors that stop the application shell from starting or running.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellError {
    /// A toolkit call failed while wiring or running the shell.
    Toolkit(ToolkitError),
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::Toolkit(err) => write!(f, "Shell toolkit error: {}", err),
        }
    }
}

impl std::error::Error for ShellError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShellError::Toolkit(err) => Some(err),
        }
    }
}

impl From<ToolkitError> for ShellError {
    fn from(err: ToolkitError) -> Self {
        ShellError::Toolkit(err)
    }
}
