//! Ratatui front-end: an admin login followed by book and user lists with
//! modal forms for adding, issuing and returning books. All rules live in
//! `circulation`; this layer only collects strings and shows outcomes.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::{App, MAX_LOGIN_ATTEMPTS};
pub use terminal::run_app;
