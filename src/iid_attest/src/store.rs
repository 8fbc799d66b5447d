//! Certificate stores mapping a scheme and region to anchor certificate
//! bytes.
//!
//! The verifier never performs I/O on its own; everything it trusts comes
//! through a [`CertStore`]. Implementations must be safe for concurrent
//! reads, which is why the trait requires `Send + Sync`.

use std::{
	collections::HashMap,
	io::ErrorKind,
	path::{Path, PathBuf},
};

use crate::{AttestError, Scheme};

/// Directory the filesystem store reads from when none is configured.
pub const DEFAULT_CERT_DIR: &str = "certs";

/// Extensions tried, in order, for a region's certificate file.
const CERT_FILE_EXTENSIONS: [&str; 2] = ["pem", "der"];

/// Something that can look up the PEM or DER encoded anchor certificate for a
/// scheme and region. This is made generic so the backing storage is entirely
/// up to the caller.
pub trait CertStore: Send + Sync {
	/// Get the certificate bytes registered for `region` in the namespace of
	/// `scheme`.
	///
	/// Returns `Ok(None)` when there is no entry. Errors are reserved for
	/// failures of the store itself.
	fn get(
		&self,
		scheme: Scheme,
		region: &str,
	) -> Result<Option<Vec<u8>>, AttestError>;
}

impl<T: CertStore + ?Sized> CertStore for &T {
	fn get(
		&self,
		scheme: Scheme,
		region: &str,
	) -> Result<Option<Vec<u8>>, AttestError> {
		(**self).get(scheme, region)
	}
}

impl<T: CertStore + ?Sized> CertStore for std::sync::Arc<T> {
	fn get(
		&self,
		scheme: Scheme,
		region: &str,
	) -> Result<Option<Vec<u8>>, AttestError> {
		(**self).get(scheme, region)
	}
}

/// A [`CertStore`] holding certificates in memory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCertStore {
	certs: HashMap<(Scheme, String), Vec<u8>>,
}

impl InMemoryCertStore {
	/// Create an empty store.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Register `cert` (PEM or DER) for `region` under `scheme`, replacing
	/// any previous entry.
	pub fn insert(
		&mut self,
		scheme: Scheme,
		region: impl Into<String>,
		cert: impl Into<Vec<u8>>,
	) {
		self.certs.insert((scheme, region.into()), cert.into());
	}

	/// Builder style [`Self::insert`].
	#[must_use]
	pub fn with(
		mut self,
		scheme: Scheme,
		region: impl Into<String>,
		cert: impl Into<Vec<u8>>,
	) -> Self {
		self.insert(scheme, region, cert);
		self
	}

	/// Number of registered certificates.
	#[must_use]
	pub fn len(&self) -> usize {
		self.certs.len()
	}

	/// Whether no certificate is registered.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.certs.is_empty()
	}
}

impl CertStore for InMemoryCertStore {
	fn get(
		&self,
		scheme: Scheme,
		region: &str,
	) -> Result<Option<Vec<u8>>, AttestError> {
		Ok(self.certs.get(&(scheme, region.to_string())).cloned())
	}
}

/// A [`CertStore`] reading `<root>/<namespace>/<region>.pem`, falling back to
/// `<root>/<namespace>/<region>.der`.
#[derive(Debug, Clone)]
pub struct FsCertStore {
	root: PathBuf,
}

impl FsCertStore {
	/// Create a store rooted at `root`.
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	/// The directory this store reads from.
	#[must_use]
	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Region keys become file names, so anything that could escape the
	/// namespace directory is never looked up.
	fn is_safe_region(region: &str) -> bool {
		!region.is_empty()
			&& region
				.bytes()
				.all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
	}
}

impl Default for FsCertStore {
	fn default() -> Self {
		Self::new(DEFAULT_CERT_DIR)
	}
}

impl CertStore for FsCertStore {
	fn get(
		&self,
		scheme: Scheme,
		region: &str,
	) -> Result<Option<Vec<u8>>, AttestError> {
		if !Self::is_safe_region(region) {
			log::warn!("refusing to look up unsafe region key {region:?}");
			return Ok(None);
		}

		let dir = self.root.join(scheme.namespace());
		for ext in CERT_FILE_EXTENSIONS {
			let path = dir.join(format!("{region}.{ext}"));
			match std::fs::read(&path) {
				Ok(bytes) => {
					log::debug!("read anchor from {}", path.display());
					return Ok(Some(bytes));
				}
				Err(e) if e.kind() == ErrorKind::NotFound => continue,
				Err(e) => return Err(e.into()),
			}
		}

		Ok(None)
	}
}
