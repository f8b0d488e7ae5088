//! Web form for script and topic generation.
//!
//! A single HTML page with two forms, plus JSON endpoints for scripting:
//! - `GET /` renders the forms
//! - `POST /script` and `POST /topics` generate and re-render the page
//! - `POST /download` returns a script as a text attachment
//! - `POST /api/script` and `POST /api/topics` return JSON

mod page;
pub mod server;

pub use server::AppState;
