//! Common test utilities and helpers.
//!
//! Shared by the integration suites:
//! - PDF fixture builders
//! - Page inspection and fixture encryption
//! - Multipart request construction

#![allow(dead_code)]

pub mod fixtures;
pub mod http;
pub mod pdf_helpers;

pub use fixtures::*;
pub use http::*;
pub use pdf_helpers::*;
