//! Certificate metadata extraction
//!
//! Turns a PEM-encoded X.509 certificate into a [`Ca`](crate::types::Ca)
//! record. Everything here is pure: no I/O, no backend access.
//!
//! - `core`: PEM envelope checks and record assembly
//! - `name_extraction`: subject attribute collection
//! - `key_extraction`: key algorithm and size
//! - `key_pair`: private key to certificate matching

pub mod core;
pub mod key_extraction;
pub mod key_pair;
pub mod name_extraction;

pub use core::{ca_crt, decode_certificate_pem, extract, extract_from_certificate, public_key_pem};
pub use key_pair::verify_key_pair;
