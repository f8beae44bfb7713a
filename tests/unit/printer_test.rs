//! Tests for the print shim on the headless toolkit.

use html2pdf::printer::Printer;
use html2pdf::shell::{Shell, ShellConfig};
use html2pdf::toolkit::headless::{Call, HeadlessEvent, HeadlessToolkit};
use html2pdf::toolkit::{BrowserView, LoadState, PrintResponse, Toolkit, WindowHandle};
use html2pdf::types::errors::PrintError;
use html2pdf::types::paper::{MarginOverrides, Orientation, PageSetup, PaperStock};

#[test]
fn test_new_registers_exactly_one_load_handler() {
    let mut toolkit = HeadlessToolkit::new();
    let view = toolkit.create_view().unwrap();
    assert_eq!(view.signals().load_changed.handler_count(), 0);

    let printer = Printer::new(view.clone());
    assert_eq!(view.signals().load_changed.handler_count(), 1);
    assert_eq!(view.signals().close.handler_count(), 0);

    drop(printer);
    assert_eq!(view.signals().load_changed.handler_count(), 0);
}

#[test]
fn test_factory_print_on_unloaded_view_returns_empty_success() {
    let mut toolkit = HeadlessToolkit::new();
    let driver = toolkit.driver();
    let printer = Printer::create(&mut toolkit).unwrap();

    assert_eq!(printer.view().load_state(), LoadState::Unloaded);
    assert_eq!(printer.print(), Ok(Vec::new()));

    let view = printer.view().id();
    assert_eq!(
        driver.journal(),
        vec![
            Call::CreateView(view),
            Call::CreatePrintOperation { view, setup: PageSetup::default() },
            Call::RunPrintDialog(view),
            Call::ReleasePrintOperation(view),
        ]
    );
}

#[test]
fn test_cancelled_dialog_still_returns_empty_success() {
    let mut toolkit = HeadlessToolkit::new();
    let driver = toolkit.driver();
    let printer = Printer::create(&mut toolkit).unwrap();

    driver.script_print_response(Ok(PrintResponse::Cancel));
    assert_eq!(printer.print(), Ok(Vec::new()));
    assert_eq!(
        driver.journal().last(),
        Some(&Call::ReleasePrintOperation(printer.view().id()))
    );
}

#[test]
fn test_failed_dialog_is_not_reported() {
    let mut toolkit = HeadlessToolkit::new();
    let driver = toolkit.driver();
    let printer = Printer::create(&mut toolkit).unwrap();

    driver.script_print_response(Err(PrintError::Dialog("no printers".to_string())));
    assert_eq!(printer.print(), Ok(Vec::new()));
    assert_eq!(
        driver.journal().last(),
        Some(&Call::ReleasePrintOperation(printer.view().id()))
    );
}

#[test]
fn test_every_print_gets_its_own_operation() {
    let mut toolkit = HeadlessToolkit::new();
    let driver = toolkit.driver();
    let printer = Printer::create(&mut toolkit).unwrap();

    for _ in 0..3 {
        printer.print().unwrap();
    }
    let journal = driver.journal();
    let created = journal
        .iter()
        .filter(|c| matches!(c, Call::CreatePrintOperation { .. }))
        .count();
    let released = journal
        .iter()
        .filter(|c| matches!(c, Call::ReleasePrintOperation(_)))
        .count();
    assert_eq!((created, released), (3, 3));
}

#[test]
fn test_print_after_view_destroyed_still_succeeds() {
    let toolkit = HeadlessToolkit::new();
    let driver = toolkit.driver();
    let shell = Shell::build(toolkit, &ShellConfig::default()).unwrap();
    let printer = Printer::new(shell.view().clone());

    shell.window().destroy();
    driver.clear_journal();

    assert_eq!(printer.print(), Ok(Vec::new()));
    assert!(driver.journal().is_empty());
}

#[test]
fn test_print_loaded_view_passes_page_setup() {
    let toolkit = HeadlessToolkit::new();
    let driver = toolkit.driver();
    let shell = Shell::build(toolkit, &ShellConfig::default()).unwrap();
    let view = shell.view().clone();

    let setup = PageSetup {
        stock: PaperStock::lookup("letter").unwrap(),
        orientation: Orientation::Landscape,
        margins: MarginOverrides { all: Some(10.0), ..Default::default() }.resolve(),
        scale: Some(0.8),
        print_background: true,
        page_ranges: Some("1-2".to_string()),
    };
    let printer = Printer::new(view.clone()).with_page_setup(setup.clone());
    assert_eq!(printer.page_setup(), &setup);

    driver.post(HeadlessEvent::CloseRequested(shell.window().id()));
    // Printing happens before the loop has delivered any load event.
    assert_eq!(view.load_state(), LoadState::Unloaded);
    assert_eq!(printer.print(), Ok(Vec::new()));
    assert!(driver
        .journal()
        .contains(&Call::CreatePrintOperation { view: view.id(), setup }));

    shell.run().unwrap();
}
