//! Terminal commands.

pub mod serve;
pub mod setup;
pub mod show;
pub mod ui;
