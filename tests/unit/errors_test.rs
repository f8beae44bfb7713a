use html2pdf::types::errors::*;

// === ToolkitError Tests ===

#[test]
fn toolkit_error_display_variants() {
    assert_eq!(
        ToolkitError::AlreadyInitialized("second event loop".to_string()).to_string(),
        "Toolkit already initialized: second event loop"
    );
    assert_eq!(
        ToolkitError::WindowCreation("no display".to_string()).to_string(),
        "Window creation failed: no display"
    );
    assert_eq!(
        ToolkitError::ViewCreation("engine missing".to_string()).to_string(),
        "Web view creation failed: engine missing"
    );
    assert_eq!(
        ToolkitError::ContainerOccupied("window#1".to_string()).to_string(),
        "Window already has a child: window#1"
    );
    assert_eq!(
        ToolkitError::Destroyed("view#2".to_string()).to_string(),
        "Widget destroyed: view#2"
    );
    assert_eq!(
        ToolkitError::LoadRequest("bad url".to_string()).to_string(),
        "Load request failed: bad url"
    );
    assert_eq!(
        ToolkitError::EventLoop("drained".to_string()).to_string(),
        "Event loop error: drained"
    );
}

#[test]
fn toolkit_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(ToolkitError::Destroyed("view#1".to_string()));
    assert!(err.source().is_none());
}

// === PrintError Tests ===

#[test]
fn print_error_display_variants() {
    assert_eq!(
        PrintError::ViewUnavailable("view#3".to_string()).to_string(),
        "View unavailable for printing: view#3"
    );
    assert_eq!(
        PrintError::Dialog("spooler offline".to_string()).to_string(),
        "Print dialog failed: spooler offline"
    );
}

// === PaperError Tests ===

#[test]
fn paper_error_display() {
    assert_eq!(
        PaperError::UnknownStock("a11".to_string()).to_string(),
        "Unknown paper stock: a11"
    );
}

// === ShellError Tests ===

#[test]
fn shell_error_wraps_toolkit_error() {
    let err: ShellError = ToolkitError::WindowCreation("no display".to_string()).into();
    assert_eq!(err.to_string(), "Shell toolkit error: Window creation failed: no display");
}

#[test]
fn shell_error_exposes_source() {
    use std::error::Error;

    let err = ShellError::from(ToolkitError::EventLoop("drained".to_string()));
    let source = err.source().expect("shell error should carry its toolkit cause");
    assert_eq!(source.to_string(), "Event loop error: drained");
}
