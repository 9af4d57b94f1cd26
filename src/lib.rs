//! Core library for the loading-report command line application.
//!
//! A run reads the spreadsheets dropped into a set of source folders, keeps
//! the rows scheduled for the next day and renders them into one plain-text
//! report. Format readers live under [`io`], the shared data types in
//! [`model`], column synonym matching in [`resolve`], date selection in
//! [`filter`], grouping in [`aggregate`], text layout in [`render`], and the
//! orchestration of a whole run in [`pipeline`]. The outside world (listing,
//! archiving, delivery) is reached through the traits in [`collab`].

pub mod aggregate;
pub mod collab;
pub mod config;
pub mod error;
pub mod filter;
pub mod io;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod resolve;

pub use config::{ConsumePolicy, ReportConfig};
pub use error::{ReportError, Result};
