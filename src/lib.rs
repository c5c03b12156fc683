//! Data Sweeper: load CSV / Excel tables, clean them, keep the columns you
//! need and convert the result back to CSV or Excel.
//!
//! The [`data`] module is the whole pipeline as plain functions over
//! [`data::Dataset`] values; the desktop app and the `sweep` command line
//! tool are thin shells around it.

pub mod config;
pub mod data;
