//! html2pdf native UI backend.
//!
//! Uses `wry` for the web view and `tao` for windows and the event loop:
//! - Linux: WebKitGTK, with the native print operation dialog
//! - macOS: WKWebView
//! - Windows: WebView2

pub mod native;
