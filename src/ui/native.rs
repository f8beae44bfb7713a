//! Native toolkit backend using `tao` windows and `wry` web views.
//!
//! - `wry` callbacks (IPC, page load) run outside our dispatch, so they only
//!   forward a `UserEvent` through the event loop proxy. Signals are emitted
//!   when the loop delivers that event, on the GUI thread.
//! - Pages signal "close" by calling `window.close()`, which an
//!   initialization script routes to the IPC channel.
//! - A view is created inside a hidden host window and rebuilt inside its
//!   real parent when added to a window.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicBool, Ordering};

use tao::dpi::LogicalSize;
use tao::event::{Event, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopBuilder, EventLoopProxy};
use tao::platform::run_return::EventLoopExtRunReturn;
use tao::window::{Window, WindowBuilder};
use tracing::{debug, info, trace, warn};
use wry::{PageLoadEvent, WebView, WebViewBuilder};

use crate::toolkit::runtime;
use crate::toolkit::{
    BrowserView, LoadEvent, LoadState, MainLoop, PrintDialog, PrintResponse, Propagation, Toolkit,
    ViewId, ViewSignals, WindowHandle, WindowId, WindowSignals, WindowSpec,
};
use crate::types::errors::{PrintError, ToolkitError};
use crate::types::paper::PageSetup;

const BACKEND: &str = "wry";

const CLOSE_HOOK_JS: &str = r#"
window.close = function () {
  window.ipc.postMessage(JSON.stringify({ cmd: 'close' }));
};
"#;

/// `tao` allows a single event loop per process.
static EVENT_LOOP_CREATED: AtomicBool = AtomicBool::new(false);

#[derive(Debug)]
enum UserEvent {
    ViewClose(ViewId),
    PageLoad(ViewId, LoadEvent),
}

#[derive(Default)]
struct Registry {
    next_id: Cell<u64>,
    windows: RefCell<HashMap<tao::window::WindowId, Weak<WindowInner>>>,
    views: RefCell<HashMap<ViewId, Weak<ViewInner>>>,
}

impl Registry {
    fn next_id(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn window(&self, id: tao::window::WindowId) -> Option<NativeWindow> {
        let inner = self.windows.borrow().get(&id).and_then(Weak::upgrade);
        inner.map(|inner| NativeWindow { inner })
    }

    fn view(&self, id: ViewId) -> Option<NativeView> {
        let inner = self.views.borrow().get(&id).and_then(Weak::upgrade);
        inner.map(|inner| NativeView { inner })
    }
}

pub struct NativeToolkit {
    registry: Rc<Registry>,
    proxy: EventLoopProxy<UserEvent>,
    main_loop: MainLoop,
    event_loop: EventLoop<UserEvent>,
}

impl NativeToolkit {
    pub fn new() -> Result<Self, ToolkitError> {
        if EVENT_LOOP_CREATED.swap(true, Ordering::SeqCst) {
            return Err(ToolkitError::AlreadyInitialized(
                "the native event loop can only be created once per process".to_string(),
            ));
        }
        runtime::initialize(BACKEND);

        let event_loop: EventLoop<UserEvent> = EventLoopBuilder::with_user_event().build();
        let proxy = event_loop.create_proxy();
        Ok(Self {
            registry: Rc::new(Registry::default()),
            proxy,
            main_loop: MainLoop::new(),
            event_loop,
        })
    }
}

fn dispatch(registry: &Registry, event: Event<'_, UserEvent>) {
    match event {
        Event::WindowEvent {
            window_id,
            event: WindowEvent::CloseRequested,
            ..
        } => {
            // Default delete action: destroy the window.
            if let Some(window) = registry.window(window_id) {
                window.destroy();
            }
        }
        Event::WindowEvent {
            window_id,
            event: WindowEvent::Destroyed,
            ..
        } => {
            // Only reached when the platform destroyed the window on its own.
            if let Some(window) = registry.window(window_id) {
                window.destroy();
            }
        }
        Event::UserEvent(UserEvent::ViewClose(id)) => {
            if let Some(view) = registry.view(id).filter(|v| !v.inner.released.get()) {
                if view.inner.signals.close.emit(&()) == Propagation::Proceed {
                    debug!(view = %id, "close not handled");
                }
            }
        }
        Event::UserEvent(UserEvent::PageLoad(id, load_event)) => {
            if let Some(view) = registry.view(id).filter(|v| !v.inner.released.get()) {
                let state = view.inner.state.get().after(load_event);
                view.inner.state.set(state);
                view.inner.signals.load_changed.emit(&load_event);
            }
        }
        _ => {}
    }
}

impl Toolkit for NativeToolkit {
    type View = NativeView;
    type Window = NativeWindow;

    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn create_window(&mut self, spec: &WindowSpec) -> Result<NativeWindow, ToolkitError> {
        let window = WindowBuilder::new()
            .with_title(spec.title.as_str())
            .with_inner_size(LogicalSize::new(f64::from(spec.width), f64::from(spec.height)))
            .with_visible(spec.visible)
            .build(&self.event_loop)
            .map_err(|e| ToolkitError::WindowCreation(e.to_string()))?;

        let id = WindowId(self.registry.next_id());
        let native_id = window.id();
        let inner = Rc::new(WindowInner {
            id,
            native_id,
            registry: Rc::downgrade(&self.registry),
            signals: WindowSignals::new(),
            window: RefCell::new(Some(window)),
            child: RefCell::new(None),
            destroyed: Cell::new(false),
        });
        self.registry
            .windows
            .borrow_mut()
            .insert(native_id, Rc::downgrade(&inner));
        debug!(window = %id, title = %spec.title, width = spec.width, height = spec.height, "window created");
        Ok(NativeWindow { inner })
    }

    fn create_view(&mut self) -> Result<NativeView, ToolkitError> {
        let id = ViewId(self.registry.next_id());
        let host = WindowBuilder::new()
            .with_visible(false)
            .build(&self.event_loop)
            .map_err(|e| ToolkitError::ViewCreation(e.to_string()))?;

        let inner = Rc::new(ViewInner {
            id,
            proxy: self.proxy.clone(),
            signals: ViewSignals::new(),
            state: Cell::new(LoadState::Unloaded),
            url: RefCell::new(None),
            webview: RefCell::new(None),
            host: RefCell::new(None),
            parent: Cell::new(None),
            released: Cell::new(false),
        });
        inner.realize(&host)?;
        *inner.host.borrow_mut() = Some(host);

        self.registry.views.borrow_mut().insert(id, Rc::downgrade(&inner));
        debug!(view = %id, "web view created");
        Ok(NativeView { inner })
    }

    fn main_loop(&self) -> MainLoop {
        self.main_loop.clone()
    }

    fn run(&mut self) -> Result<(), ToolkitError> {
        self.main_loop.reset();
        let registry = Rc::clone(&self.registry);
        let main_loop = self.main_loop.clone();

        info!(backend = BACKEND, "entering event loop");
        let exit_code = self.event_loop.run_return(move |event, _target, control_flow| {
            *control_flow = ControlFlow::Wait;
            dispatch(&registry, event);
            if main_loop.quit_requested() {
                *control_flow = ControlFlow::Exit;
            }
        });
        info!(backend = BACKEND, exit_code, "event loop finished");

        if exit_code != 0 {
            return Err(ToolkitError::EventLoop(format!("exited with code {}", exit_code)));
        }
        Ok(())
    }
}

struct WindowInner {
    id: WindowId,
    native_id: tao::window::WindowId,
    registry: Weak<Registry>,
    signals: WindowSignals,
    window: RefCell<Option<Window>>,
    child: RefCell<Option<NativeView>>,
    destroyed: Cell<bool>,
}

/// A `tao` top-level window.
#[derive(Clone)]
pub struct NativeWindow {
    inner: Rc<WindowInner>,
}

impl WindowHandle for NativeWindow {
    type View = NativeView;

    fn id(&self) -> WindowId {
        self.inner.id
    }

    fn signals(&self) -> &WindowSignals {
        &self.inner.signals
    }

    fn add(&self, view: &NativeView) -> Result<(), ToolkitError> {
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

        {
            let window = self.inner.window.borrow();
            let window = window
                .as_ref()
                .ok_or_else(|| ToolkitError::Destroyed(self.inner.id.to_string()))?;
            view.inner.realize(window)?;
        }
        let host = view.inner.host.borrow_mut().take();
        drop(host);

        view.inner.parent.set(Some(self.inner.id));
        *self.inner.child.borrow_mut() = Some(view.clone());
        debug!(window = %self.inner.id, view = %view.inner.id, "view embedded");
        Ok(())
    }

    fn show_all(&self) -> Result<(), ToolkitError> {
        let window = self.inner.window.borrow();
        let window = window
            .as_ref()
            .ok_or_else(|| ToolkitError::Destroyed(self.inner.id.to_string()))?;
        window.set_visible(true);
        Ok(())
    }

    fn destroy(&self) {
        if self.inner.destroyed.replace(true) {
            return;
        }
        self.inner.signals.destroy.emit(&());

        let child = self.inner.child.borrow_mut().take();
        if let Some(view) = child {
            view.release();
        }
        // The web view must go before the window that hosts it.
        let window = self.inner.window.borrow_mut().take();
        drop(window);

        if let Some(registry) = self.inner.registry.upgrade() {
            registry.windows.borrow_mut().remove(&self.inner.native_id);
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
    proxy: EventLoopProxy<UserEvent>,
    signals: ViewSignals,
    state: Cell<LoadState>,
    url: RefCell<Option<String>>,
    webview: RefCell<Option<WebView>>,
    host: RefCell<Option<Window>>,
    parent: Cell<Option<WindowId>>,
    released: Cell<bool>,
}

impl ViewInner {
    /// Builds a web view inside `window`, replacing any previous one.
    fn realize(&self, window: &Window) -> Result<(), ToolkitError> {
        let url = self.url.borrow().clone();
        let webview = build_webview(self.id, &self.proxy, url.as_deref(), window)?;
        let previous = self.webview.replace(Some(webview));
        drop(previous);
        Ok(())
    }

    fn with_webview<T>(&self, f: impl FnOnce(&WebView) -> T) -> Option<T> {
        self.webview.borrow().as_ref().map(f)
    }
}

impl Drop for ViewInner {
    fn drop(&mut self) {
        self.webview.get_mut().take();
        self.host.get_mut().take();
    }
}

fn build_webview(
    id: ViewId,
    proxy: &EventLoopProxy<UserEvent>,
    url: Option<&str>,
    window: &Window,
) -> Result<WebView, ToolkitError> {
    let ipc_proxy = proxy.clone();
    let load_proxy = proxy.clone();

    let mut builder = WebViewBuilder::new()
        .with_initialization_script(CLOSE_HOOK_JS)
        .with_ipc_handler(move |request: wry::http::Request<String>| {
            let body = request.body().as_str();
            trace!(view = %id, "[IPC] {}", body.chars().take(200).collect::<String>());
            let msg: Option<serde_json::Value> = serde_json::from_str(body).ok();
            let is_close = msg
                .as_ref()
                .and_then(|m| m.get("cmd"))
                .and_then(|c| c.as_str())
                == Some("close");
            if is_close {
                let _ = ipc_proxy.send_event(UserEvent::ViewClose(id));
            }
        })
        .with_on_page_load_handler(move |event, _url| {
            let load_event = match event {
                PageLoadEvent::Started => LoadEvent::Started,
                PageLoadEvent::Finished => LoadEvent::Finished,
            };
            let _ = load_proxy.send_event(UserEvent::PageLoad(id, load_event));
        });
    if let Some(url) = url {
        builder = builder.with_url(url);
    }

    #[cfg(target_os = "linux")]
    let built = {
        use tao::platform::unix::WindowExtUnix;
        use wry::WebViewBuilderExtUnix;
        let vbox = window
            .default_vbox()
            .ok_or_else(|| ToolkitError::ViewCreation("window has no GTK container".to_string()))?;
        builder.build_gtk(vbox)
    };

    #[cfg(not(target_os = "linux"))]
    let built = builder.build(window);

    built.map_err(|e| ToolkitError::ViewCreation(e.to_string()))
}

/// A `wry` web view.
#[derive(Clone)]
pub struct NativeView {
    inner: Rc<ViewInner>,
}

impl NativeView {
    fn release(&self) {
        if self.inner.released.replace(true) {
            return;
        }
        self.inner.webview.borrow_mut().take();
        self.inner.host.borrow_mut().take();
        self.inner.signals.clear();
        debug!(view = %self.inner.id, "web view released");
    }
}

impl BrowserView for NativeView {
    type PrintOperation = NativePrintOperation;

    fn id(&self) -> ViewId {
        self.inner.id
    }

    fn signals(&self) -> &ViewSignals {
        &self.inner.signals
    }

    fn load_uri(&self, uri: &str) -> Result<(), ToolkitError> {
        *self.inner.url.borrow_mut() = Some(uri.to_string());
        self.inner
            .with_webview(|webview| webview.load_url(uri))
            .ok_or_else(|| ToolkitError::Destroyed(self.inner.id.to_string()))?
            .map_err(|e| ToolkitError::LoadRequest(e.to_string()))
    }

    fn grab_focus(&self) {
        if let Some(Err(err)) = self.inner.with_webview(|webview| webview.focus()) {
            warn!(view = %self.inner.id, error = %err, "could not focus web view");
        }
    }

    fn load_state(&self) -> LoadState {
        self.inner.state.get()
    }

    fn create_print_operation(&self, setup: &PageSetup) -> Result<NativePrintOperation, PrintError> {
        if self.inner.released.get() {
            return Err(PrintError::ViewUnavailable(self.inner.id.to_string()));
        }
        // The engine's own dialog owns paper and margin selection.
        debug!(
            view = %self.inner.id,
            page_setup = %serde_json::to_string(setup).unwrap_or_default(),
            "print operation created"
        );
        Ok(NativePrintOperation { view: self.clone() })
    }
}

pub struct NativePrintOperation {
    view: NativeView,
}

impl PrintDialog for NativePrintOperation {
    /// `wry` does not report whether the user cancelled, so a dialog that
    /// opened and closed without error counts as [`PrintResponse::Print`].
    fn run_dialog(&self) -> Result<PrintResponse, PrintError> {
        let inner = &self.view.inner;
        inner
            .with_webview(|webview| webview.print())
            .ok_or_else(|| PrintError::ViewUnavailable(inner.id.to_string()))?
            .map(|_| PrintResponse::Print)
            .map_err(|e| PrintError::Dialog(e.to_string()))
    }
}

impl Drop for NativePrintOperation {
    fn drop(&mut self) {
        trace!(view = %self.view.inner.id, "print operation released");
    }
}
