//! html2pdf — web page viewer with a native print-to-file dialog.
//!
//! Entry point: opens the main window on the native toolkit and blocks until
//! it is closed. When built without the `gui` feature, runs the same shell
//! and printer on the headless toolkit as a console demo.

use tracing_subscriber::EnvFilter;

/// Logs `html2pdf=info` unless `RUST_LOG` says otherwise.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("html2pdf=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(feature = "gui")]
fn main() {
    use html2pdf::shell::{self, ShellConfig};
    use html2pdf::ui::native::NativeToolkit;

    init_logging();
    tracing::info!("html2pdf v{} starting", env!("CARGO_PKG_VERSION"));

    let result = NativeToolkit::new()
        .map_err(html2pdf::types::errors::ShellError::from)
        .and_then(|toolkit| shell::run(toolkit, &ShellConfig::default()));

    if let Err(err) = result {
        tracing::error!(error = %err, "html2pdf failed");
        std::process::exit(1);
    }
}

#[cfg(not(feature = "gui"))]
fn main() {
    use html2pdf::printer::Printer;
    use html2pdf::shell::{Shell, ShellConfig};
    use html2pdf::toolkit::headless::{HeadlessEvent, HeadlessToolkit};
    use html2pdf::toolkit::WindowHandle;

    init_logging();
    println!("html2pdf v{} — headless demo", env!("CARGO_PKG_VERSION"));

    let toolkit = HeadlessToolkit::new();
    let driver = toolkit.driver();
    let shell = match Shell::build(toolkit, &ShellConfig::default()) {
        Ok(shell) => shell,
        Err(err) => {
            eprintln!("  shell failed: {}", err);
            std::process::exit(1);
        }
    };
    driver.post(HeadlessEvent::CloseRequested(shell.window().id()));
    if let Err(err) = shell.run() {
        eprintln!("  shell failed: {}", err);
        std::process::exit(1);
    }
    println!("  shell: window opened, page loaded, window closed");
    for call in driver.journal() {
        println!("    {:?}", call);
    }

    let mut print_toolkit = HeadlessToolkit::new();
    let printer = match Printer::create(&mut print_toolkit) {
        Ok(printer) => printer,
        Err(err) => {
            eprintln!("  printer failed: {}", err);
            std::process::exit(1);
        }
    };
    match printer.print() {
        Ok(bytes) => println!("  printer: dialog shown, {} bytes returned", bytes.len()),
        Err(err) => println!("  printer: {}", err),
    }
}
