//! Conversion client
//!
//! Submits one conversion job to the backend, classifies failures and
//! resolves the returned download path against the backend origin.

mod classify;
mod error;
mod http;
mod models;
mod resolve;
mod traits;

pub use classify::{TransportFailure, classify};
pub use error::{ClientInitError, ConversionError, ErrorKind};
pub use http::{ClientSettings, ConversionClient};
pub use models::{
    ConversionRequest, ConversionResult, GENERIC_FAILURE, Quality, ResolvedDownload,
    extract_detail,
};
pub use resolve::{endpoint, origin_label, resolve_download};
pub use traits::Converter;
