//! Command-line companion for the Kea control protocol.
//!
//! The `keactl` binary wraps [`kea_protocol`] for use from scripts and by
//! operators:
//!
//! - [`definitions`] - embedded catalogue of standard option definitions,
//!   extendable from TOML files
//! - [`config_scan`] - decode every `option-data` entry of a Kea DHCP
//!   configuration, scope by scope
//! - [`report`] - text and JSON rendering of replies, options and scans

pub mod config_scan;
pub mod definitions;
pub mod report;
