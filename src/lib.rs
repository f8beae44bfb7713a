//! html2pdf — open a web page in an embedded browser view and print it
//! through the platform's print dialog.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod printer;
pub mod shell;
pub mod toolkit;
pub mod types;

#[cfg(feature = "gui")]
pub mod ui;
