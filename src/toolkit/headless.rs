//! In-process toolkit backend with no display.
//!
//! Events are queued through a [`HeadlessDriver`] and dispatched by
//! [`HeadlessToolkit::run`]. Every toolkit call made by the application is
//! appended to a journal, so callers can check exactly what was asked of the
//! toolkit. Print dialogs answer from a scripted queue (default: print).

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::{Rc, Weak};

use tracing::{debug, info, trace};

use super::runtime;
use super::{
    BrowserView, LoadEvent, LoadState, MainLoop, PrintDialog, PrintResponse, Propagation,
    Toolkit, ViewId, ViewSignals, WindowHandle, WindowId, WindowSignals, WindowSpec,
};
use crate::types::errors::{PrintError, ToolkitError};
use crate::types::paper::PageSetup;

const BACKEND: &str = "headless";

/// An input event waiting to be dispatched by the loop.
#[derive(Debug, Clone, PartialEq)]
pub enum HeadlessEvent {
    /// The window manager asks to close a window.
    CloseRequested(WindowId),
    /// The page in a view called `window.close()`.
    ViewClose(ViewId),
    /// The engine reports load progress for a view.
    Load(ViewId, LoadEvent),
}

/// A toolkit call, as recorded in the journal.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateWindow { window: WindowId, title: String, width: u32, height: u32 },
    CreateView(ViewId),
    Add { window: WindowId, view: ViewId },
    LoadUri { view: ViewId, uri: String },
    GrabFocus(ViewId),
    ShowAll(WindowId),
    DestroyWindow(WindowId),
    CreatePrintOperation { view: ViewId, setup: PageSetup },
    RunPrintDialog(ViewId),
    ReleasePrintOperation(ViewId),
}

#[derive(Default)]
struct Shared {
    next_id: Cell<u64>,
    queue: RefCell<VecDeque<HeadlessEvent>>,
    journal: RefCell<Vec<Call>>,
    print_responses: RefCell<VecDeque<Result<PrintResponse, PrintError>>>,
    windows: RefCell<HashMap<WindowId, Weak<WindowInner>>>,
    views: RefCell<HashMap<ViewId, Weak<ViewInner>>>,
}

impl Shared {
    fn next_id(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn record(&self, call: Call) {
        trace!(?call, "toolkit call");
        self.journal.borrow_mut().push(call);
    }

    fn post(&self, event: HeadlessEvent) {
        self.queue.borrow_mut().push_back(event);
    }

    fn window(&self, id: WindowId) -> Option<HeadlessWindow> {
        let inner = self.windows.borrow().get(&id).and_then(Weak::upgrade);
        inner.map(|inner| HeadlessWindow { inner })
    }

    fn view(&self, id: ViewId) -> Option<HeadlessView> {
        let inner = self.views.borrow().get(&id).and_then(Weak::upgrade);
        inner.map(|inner| HeadlessView { inner })
    }
}

/// Headless toolkit instance; owns the event queue and the main loop.
pub struct HeadlessToolkit {
    shared: Rc<Shared>,
    main_loop: MainLoop,
}

impl HeadlessToolkit {
    pub fn new() -> Self {
        runtime::initialize(BACKEND);
        Self {
            shared: Rc::new(Shared::default()),
            main_loop: MainLoop::new(),
        }
    }

    /// Returns a handle for feeding events and reading the journal.
    pub fn driver(&self) -> HeadlessDriver {
        HeadlessDriver {
            shared: Rc::clone(&self.shared),
        }
    }

    fn dispatch(&self, event: HeadlessEvent) {
        debug!(?event, "dispatch");
        match event {
            HeadlessEvent::CloseRequested(id) => match self.shared.window(id) {
                // Default delete action: destroy the window.
                Some(window) => window.destroy(),
                None => debug!(window = %id, "close requested for unknown window"),
            },
            HeadlessEvent::ViewClose(id) => match self.shared.view(id) {
                Some(view) if !view.inner.released.get() => {
                    if view.inner.signals.close.emit(&()) == Propagation::Proceed {
                        debug!(view = %id, "close not handled");
                    }
                }
                _ => debug!(view = %id, "close for released view"),
            },
            HeadlessEvent::Load(id, load_event) => match self.shared.view(id) {
                Some(view) if !view.inner.released.get() => {
                    let state = view.inner.state.get().after(load_event);
                    view.inner.state.set(state);
                    view.inner.signals.load_changed.emit(&load_event);
                }
                _ => debug!(view = %id, "load event for released view"),
            },
        }
    }
}

impl Default for HeadlessToolkit {
    fn default() -> Self {
        Self::new()
    }
}

impl Toolkit for HeadlessToolkit {
    type View = HeadlessView;
    type Window = HeadlessWindow;

    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn create_window(&mut self, spec: &WindowSpec) -> Result<HeadlessWindow, ToolkitError> {
        let id = WindowId(self.shared.next_id());
        let inner = Rc::new(WindowInner {
            id,
            spec: spec.clone(),
            shared: Rc::clone(&self.shared),
            signals: WindowSignals::new(),
            child: RefCell::new(None),
            visible: Cell::new(spec.visible),
            destroyed: Cell::new(false),
        });
        self.shared.windows.borrow_mut().insert(id, Rc::downgrade(&inner));
        self.shared.record(Call::CreateWindow {
            window: id,
            title: spec.title.clone(),
            width: spec.width,
            height: spec.height,
        });
        Ok(HeadlessWindow { inner })
    }

    fn create_view(&mut self) -> Result<HeadlessView, ToolkitError> {
        let id = ViewId(self.shared.next_id());
        let inner = Rc::new(ViewInner {
            id,
            shared: Rc::clone(&self.shared),
            signals: ViewSignals::new(),
            uri: RefCell::new(None),
            state: Cell::new(LoadState::Unloaded),
            focused: Cell::new(false),
            parent: Cell::new(None),
            released: Cell::new(false),
        });
        self.shared.views.borrow_mut().insert(id, Rc::downgrade(&inner));
        self.shared.record(Call::CreateView(id));
        Ok(HeadlessView { inner })
    }

    fn main_loop(&self) -> MainLoop {
        self.main_loop.clone()
    }

    fn run(&mut self) -> Result<(), ToolkitError> {
        self.main_loop.reset();
        info!(backend = BACKEND, "entering event loop");
        loop {
            if self.main_loop.quit_requested() {
                info!(backend = BACKEND, "event loop finished");
                return Ok(());
            }
            let next = self.shared.queue.borrow_mut().pop_front();
            match next {
                Some(event) => self.dispatch(event),
                None => {
                    return Err(ToolkitError::EventLoop(
                        "event queue drained before quit was requested".to_string(),
                    ))
                }
            }
        }
    }
}

/// Test and demo access to a [`HeadlessToolkit`].
#[derive(Clone)]
pub struct HeadlessDriver {
    shared: Rc<Shared>,
}

impl HeadlessDriver {
    pub fn post(&self, event: HeadlessEvent) {
        self.shared.post(event);
    }

    pub fn pending_events(&self) -> usize {
        self.shared.queue.borrow().len()
    }

    pub fn journal(&self) -> Vec<Call> {
        self.shared.journal.borrow().clone()
    }

    pub fn clear_journal(&self) {
        self.shared.journal.borrow_mut().clear();
    }

    /// Queues the answer of the next print dialog.
    pub fn script_print_response(&self, response: Result<PrintResponse, PrintError>) {
        self.shared.print_responses.borrow_mut().push_back(response);
    }

    pub fn window(&self, id: WindowId) -> Option<HeadlessWindow> {
        self.shared.window(id)
    }

    pub fn view(&self, id: ViewId) -> Option<HeadlessView> {
        self.shared.view(id)
    }
}

struct WindowInner {
    id: WindowId,
    spec: WindowSpec,
    shared: Rc<Shared>,
    signals: WindowSignals,
    child: RefCell<Option<HeadlessView>>,
    visible: Cell<bool>,
    destroyed: Cell<bool>,
}

/// Headless top-level window.
#[derive(Clone)]
pub struct HeadlessWindow {
    inner: Rc<WindowInner>,
}

impl HeadlessWindow {
    pub fn title(&self) -> &str {
        &self.inner.spec.title
    }

    pub fn size(&self) -> (u32, u32) {
        (self.inner.spec.width, self.inner.spec.height)
    }

    pub fn is_visible(&self) -> bool {
        self.inner.visible.get()
    }

    pub fn child(&self) -> Option<HeadlessView> {
        self.inner.child.borrow().clone()
    }
}

impl WindowHandle for HeadlessWindow {
    type View = HeadlessView;

    fn id(&self) -> WindowId {
        self.inner.id
    }

    fn signals(&self) -> &WindowSignals {
        &self.inner.signals
    }

    fn add(&self, view: &HeadlessView) -> Result<(), ToolkitError> {
        if self.inner.destroyed.get() {
            return Err(ToolkitError::Destroyed(self.inner.id.to_string()));
        }
        if view.inner.released.get() {
            return Err(ToolkitError::Destroyed(view.inner.id.to_string()));
        }
        if self.inner.child.borrow().is_some() {
            return Err(ToolkitError::ContainerOccupied(self.inner.id.to_string()));
        }
        if let Some(parent) = view.inner.parent.get() {
            return Err(ToolkitError::ContainerOccupied(format!(
                "{} is already inside {}",
                view.inner.id, parent
            )));
        }
        view.inner.parent.set(Some(self.inner.id));
        *self.inner.child.borrow_mut() = Some(view.clone());
        self.inner.shared.record(Call::Add {
            window: self.inner.id,
            view: view.inner.id,
        });
        Ok(())
    }

    fn show_all(&self) -> Result<(), ToolkitError> {
        if self.inner.destroyed.get() {
            return Err(ToolkitError::Destroyed(self.inner.id.to_string()));
        }
        self.inner.visible.set(true);
        self.inner.shared.record(Call::ShowAll(self.inner.id));
        Ok(())
    }

    fn destroy(&self) {
        if self.inner.destroyed.replace(true) {
            return;
        }
        self.inner.visible.set(false);
        self.inner.shared.record(Call::DestroyWindow(self.inner.id));
        self.inner.signals.destroy.emit(&());

        let child = self.inner.child.borrow_mut().take();
        if let Some(view) = child {
            view.release();
        }
        self.inner.signals.clear();
        debug!(window = %self.inner.id, "window destroyed");
    }

    fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }
}

struct ViewInner {
    id: ViewId,
    shared: Rc<Shared>,
    signals: ViewSignals,
    uri: RefCell<Option<String>>,
    state: Cell<LoadState>,
    focused: Cell<bool>,
    parent: Cell<Option<WindowId>>,
    released: Cell<bool>,
}

/// Headless web view. Loads complete when the loop dispatches their events.
#[derive(Clone)]
pub struct HeadlessView {
    inner: Rc<ViewInner>,
}

impl HeadlessView {
    pub fn uri(&self) -> Option<String> {
        self.inner.uri.borrow().clone()
    }

    pub fn has_focus(&self) -> bool {
        self.inner.focused.get()
    }

    pub fn parent(&self) -> Option<WindowId> {
        self.inner.parent.get()
    }

    pub fn is_released(&self) -> bool {
        self.inner.released.get()
    }

    fn release(&self) {
        if self.inner.released.replace(true) {
            return;
        }
        self.inner.focused.set(false);
        self.inner.signals.clear();
    }
}

impl BrowserView for HeadlessView {
    type PrintOperation = HeadlessPrintOperation;

    fn id(&self) -> ViewId {
        self.inner.id
    }

    fn signals(&self) -> &ViewSignals {
        &self.inner.signals
    }

    fn load_uri(&self, uri: &str) -> Result<(), ToolkitError> {
        if self.inner.released.get() {
            return Err(ToolkitError::Destroyed(self.inner.id.to_string()));
        }
        *self.inner.uri.borrow_mut() = Some(uri.to_string());
        self.inner.shared.record(Call::LoadUri {
            view: self.inner.id,
            uri: uri.to_string(),
        });
        for event in [LoadEvent::Started, LoadEvent::Committed, LoadEvent::Finished] {
            self.inner.shared.post(HeadlessEvent::Load(self.inner.id, event));
        }
        Ok(())
    }

    fn grab_focus(&self) {
        if self.inner.released.get() {
            return;
        }
        self.inner.focused.set(true);
        self.inner.shared.record(Call::GrabFocus(self.inner.id));
    }

    fn load_state(&self) -> LoadState {
        self.inner.state.get()
    }

    fn create_print_operation(&self, setup: &PageSetup) -> Result<HeadlessPrintOperation, PrintError> {
        if self.inner.released.get() {
            return Err(PrintError::ViewUnavailable(self.inner.id.to_string()));
        }
        self.inner.shared.record(Call::CreatePrintOperation {
            view: self.inner.id,
            setup: setup.clone(),
        });
        Ok(HeadlessPrintOperation { view: self.clone() })
    }
}

/// Print operation bound to a headless view; records its release on drop.
pub struct HeadlessPrintOperation {
    view: HeadlessView,
}

impl PrintDialog for HeadlessPrintOperation {
    fn run_dialog(&self) -> Result<PrintResponse, PrintError> {
        let shared = &self.view.inner.shared;
        shared.record(Call::RunPrintDialog(self.view.inner.id));
        let scripted = shared.print_responses.borrow_mut().pop_front();
        scripted.unwrap_or(Ok(PrintResponse::Print))
    }
}

impl Drop for HeadlessPrintOperation {
    fn drop(&mut self) {
        self.view
            .inner
            .shared
            .record(Call::ReleasePrintOperation(self.view.inner.id));
    }
}
