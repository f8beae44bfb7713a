//! Tests for the headless toolkit backend: handle lifecycles, event dispatch
//! and the call journal.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use html2pdf::toolkit::headless::{Call, HeadlessEvent, HeadlessToolkit};
use html2pdf::toolkit::{
    runtime, BrowserView, LoadEvent, LoadState, Propagation, Toolkit, WindowHandle, WindowSpec,
};
use html2pdf::types::errors::ToolkitError;

fn spec() -> WindowSpec {
    WindowSpec {
        title: "test".to_string(),
        width: 320,
        height: 240,
        visible: false,
    }
}

#[test]
fn test_toolkit_initializes_runtime_once() {
    let _first = HeadlessToolkit::new();
    let _second = HeadlessToolkit::new();
    assert!(runtime::is_initialized());
    assert!(runtime::get().is_some());
}

#[test]
fn test_window_accepts_a_single_child() {
    let mut toolkit = HeadlessToolkit::new();
    let window = toolkit.create_window(&spec()).unwrap();
    let first = toolkit.create_view().unwrap();
    let second = toolkit.create_view().unwrap();

    window.add(&first).unwrap();
    let err = window.add(&second).unwrap_err();
    assert!(matches!(err, ToolkitError::ContainerOccupied(_)));
    assert_eq!(window.child().map(|v| v.id()), Some(first.id()));
    assert_eq!(first.parent(), Some(window.id()));
}

#[test]
fn test_view_cannot_join_two_windows() {
    let mut toolkit = HeadlessToolkit::new();
    let a = toolkit.create_window(&spec()).unwrap();
    let b = toolkit.create_window(&spec()).unwrap();
    let view = toolkit.create_view().unwrap();

    a.add(&view).unwrap();
    assert!(matches!(b.add(&view), Err(ToolkitError::ContainerOccupied(_))));
}

#[test]
fn test_destroy_fires_once_and_releases_child() {
    let mut toolkit = HeadlessToolkit::new();
    let window = toolkit.create_window(&spec()).unwrap();
    let view = toolkit.create_view().unwrap();
    window.add(&view).unwrap();

    let fired = Rc::new(Cell::new(0));
    let f = Rc::clone(&fired);
    window.signals().destroy.connect(move |_| f.set(f.get() + 1)).forget();

    window.destroy();
    window.destroy();

    assert_eq!(fired.get(), 1);
    assert!(window.is_destroyed());
    assert!(view.is_released());
    assert_eq!(window.signals().destroy.handler_count(), 0);
    assert!(matches!(view.load_uri("http://example.com/"), Err(ToolkitError::Destroyed(_))));
    assert!(matches!(window.show_all(), Err(ToolkitError::Destroyed(_))));
}

#[test]
fn test_load_uri_completes_when_loop_dispatches() {
    let mut toolkit = HeadlessToolkit::new();
    let driver = toolkit.driver();
    let view = toolkit.create_view().unwrap();

    let events = Rc::new(RefCell::new(Vec::new()));
    let _sub = {
        let events = Rc::clone(&events);
        view.signals()
            .load_changed
            .connect(move |e: &LoadEvent| events.borrow_mut().push(*e))
    };

    view.load_uri("http://example.com/").unwrap();
    assert_eq!(view.load_state(), LoadState::Unloaded);
    assert_eq!(driver.pending_events(), 3);

    // Quit once the page reports it has finished loading.
    let main_loop = toolkit.main_loop();
    let _quit = view.signals().load_changed.connect(move |e: &LoadEvent| {
        if *e == LoadEvent::Finished {
            main_loop.quit();
        }
    });
    toolkit.run().unwrap();

    assert_eq!(view.load_state(), LoadState::Loaded);
    assert_eq!(
        *events.borrow(),
        vec![LoadEvent::Started, LoadEvent::Committed, LoadEvent::Finished]
    );
    assert_eq!(view.uri().as_deref(), Some("http://example.com/"));
}

#[test]
fn test_run_without_quit_reports_drained_queue() {
    let mut toolkit = HeadlessToolkit::new();
    let err = toolkit.run().unwrap_err();
    assert!(matches!(err, ToolkitError::EventLoop(_)));
}

#[test]
fn test_close_request_destroys_window_by_default() {
    let mut toolkit = HeadlessToolkit::new();
    let driver = toolkit.driver();
    let window = toolkit.create_window(&spec()).unwrap();

    let main_loop = toolkit.main_loop();
    let _quit = window.signals().destroy.connect(move |_| main_loop.quit());
    driver.post(HeadlessEvent::CloseRequested(window.id()));

    toolkit.run().unwrap();
    assert!(window.is_destroyed());
    assert!(driver.journal().contains(&Call::DestroyWindow(window.id())));
}

#[test]
fn test_view_close_reaches_handlers() {
    let mut toolkit = HeadlessToolkit::new();
    let driver = toolkit.driver();
    let view = toolkit.create_view().unwrap();

    let main_loop = toolkit.main_loop();
    let _close = view.signals().close.connect(move |_| {
        main_loop.quit();
        Propagation::Stop
    });
    driver.post(HeadlessEvent::ViewClose(view.id()));

    toolkit.run().unwrap();
    assert_eq!(driver.pending_events(), 0);
}

#[test]
fn test_events_for_dropped_handles_are_ignored() {
    let mut toolkit = HeadlessToolkit::new();
    let driver = toolkit.driver();
    let view_id = toolkit.create_view().unwrap().id();
    let window = toolkit.create_window(&spec()).unwrap();

    driver.post(HeadlessEvent::ViewClose(view_id));
    driver.post(HeadlessEvent::Load(view_id, LoadEvent::Finished));
    driver.post(HeadlessEvent::CloseRequested(window.id()));
    let main_loop = toolkit.main_loop();
    let _quit = window.signals().destroy.connect(move |_| main_loop.quit());

    toolkit.run().unwrap();
    assert!(driver.view(view_id).is_none());
}

#[test]
fn test_journal_records_calls_in_order() {
    let mut toolkit = HeadlessToolkit::new();
    let driver = toolkit.driver();
    let window = toolkit.create_window(&spec()).unwrap();
    let view = toolkit.create_view().unwrap();
    window.add(&view).unwrap();
    view.grab_focus();
    window.show_all().unwrap();

    assert_eq!(
        driver.journal(),
        vec![
            Call::CreateWindow {
                window: window.id(),
                title: "test".to_string(),
                width: 320,
                height: 240,
            },
            Call::CreateView(view.id()),
            Call::Add { window: window.id(), view: view.id() },
            Call::GrabFocus(view.id()),
            Call::ShowAll(window.id()),
        ]
    );
    assert!(window.is_visible());
    assert!(view.has_focus());

    driver.clear_journal();
    assert!(driver.journal().is_empty());
}
