//! Look up GitHub users by name and show their public profile.
//!
//! The crate is split so that everything but the window itself can be tested
//! headless: [`state`] holds the search lifecycle as a reducer, [`controller`]
//! pairs it with a [`client::ProfileSource`], and the binary renders the
//! state into the Slint UI.

pub mod avatar;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod models;
pub mod state;
