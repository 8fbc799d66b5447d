//! Verification of cloud provider signed instance identity documents.
//!
//! A caller hands over the exact bytes of an identity document, the base64
//! transported signature the provider issued for it and the [`Scheme`] the
//! signature was produced with. The [`Verifier`] resolves the pinned
//! [`TrustAnchor`] for the region the document claims and checks the
//! signature with it, either as a bare PKCS#1 v1.5 signature or as a CMS
//! `SignedData` envelope.
//!
//! Misconfiguration and caller mistakes surface as [`AttestError`]; a
//! signature that simply does not hold up is `Ok(false)`.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

pub mod anchor;
mod asn1;
pub mod cms;
pub mod config;
mod error;
pub mod raw;
pub mod scheme;
pub mod store;
mod syntactic_validation;
pub mod verify;

#[cfg(any(feature = "mock", test))]
pub mod mock;

pub use anchor::{AnchorKey, TrustAnchor};
pub use config::{KeySizePolicy, VerifierConfig};
pub use error::AttestError;
pub use scheme::Scheme;
pub use store::{CertStore, FsCertStore, InMemoryCertStore};
pub use verify::Verifier;
