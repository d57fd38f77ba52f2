//! Traffic accident severity dashboard.
//!
//! The [`pipeline`] module holds the inference path; [`routes`] and
//! [`catalog`] make up the dashboard served around it.

pub mod catalog;
pub mod config;
pub mod pipeline;
pub mod routes;
