//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the catalog lists, the
//! current view and selection, and the search box.

mod model;

pub use model::*;
