//! Print-to-file shim over a web view.
//!
//! A [`Printer`] holds a view and hands it to the native print dialog. The
//! document the dialog produces is written (or not) by the platform's print
//! pipeline; the printer never sees it, so [`Printer::print`] always answers
//! with an empty buffer.

use tracing::{debug, trace, warn};

use crate::toolkit::{BrowserView, LoadEvent, PrintDialog, PrintResponse, Subscription, Toolkit};
use crate::types::errors::{PrintError, ToolkitError};
use crate::types::paper::PageSetup;

pub struct Printer<V: BrowserView> {
    view: V,
    page_setup: PageSetup,
    // Keeps the load-changed handler connected for the printer's lifetime.
    _load_changed: Subscription,
}

impl<V: BrowserView> Printer<V> {
    /// Wraps an existing view and registers one load-changed handler on it.
    ///
    /// The handler does not gate printing: `print` may run before the view
    /// has finished loading, which yields a blank or partial page.
    pub fn new(view: V) -> Self {
        let view_id = view.id();
        let load_changed = view
            .signals()
            .load_changed
            .connect(move |event: &LoadEvent| {
                trace!(view = %view_id, ?event, "printer saw load change");
            });
        Self {
            view,
            page_setup: PageSetup::default(),
            _load_changed: load_changed,
        }
    }

    /// Builds a printer around a fresh view that has never loaded anything.
    pub fn create<T>(toolkit: &mut T) -> Result<Self, ToolkitError>
    where
        T: Toolkit<View = V>,
    {
        let view = toolkit.create_view()?;
        debug!(view = %view.id(), backend = toolkit.backend_name(), "printer created its own view");
        Ok(Self::new(view))
    }

    pub fn with_page_setup(mut self, page_setup: PageSetup) -> Self {
        self.page_setup = page_setup;
        self
    }

    pub fn page_setup(&self) -> &PageSetup {
        &self.page_setup
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Opens the native print dialog for the held view and blocks until it
    /// is dismissed.
    ///
    /// Always returns `Ok` with an empty buffer. Whether the user printed,
    /// cancelled, or the dialog failed is only logged.
    pub fn print(&self) -> Result<Vec<u8>, PrintError> {
        debug!(view = %self.view.id(), state = ?self.view.load_state(), "printing");

        let operation = match self.view.create_print_operation(&self.page_setup) {
            Ok(operation) => operation,
            Err(err) => {
                warn!(error = %err, "could not create print operation");
                return Ok(Vec::new());
            }
        };

        match operation.run_dialog() {
            Ok(PrintResponse::Print) => debug!("print dialog accepted"),
            Ok(PrintResponse::Cancel) => debug!("print dialog cancelled"),
            Err(err) => warn!(error = %err, "print dialog failed"),
        }

        Ok(Vec::new())
    }
}
