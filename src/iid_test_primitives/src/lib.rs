//! Primitive types for test setup.

use std::ops::Deref;

use rand::{distributions::Alphanumeric, prelude::*};

const RANDOM_SUFFIX_LEN: usize = 12;

/// Wrapper type for [`std::path::Path`] that attempts to remove a file or
/// directory at the path on drop.
#[derive(Debug)]
pub struct PathWrapper(String);

impl PathWrapper {
	/// A fresh path under the system temp directory that nothing exists at
	/// yet. `prefix` keeps paths of concurrently running tests apart and
	/// readable.
	#[must_use]
	pub fn random(prefix: &str) -> Self {
		let suffix: String = thread_rng()
			.sample_iter(&Alphanumeric)
			.take(RANDOM_SUFFIX_LEN)
			.map(char::from)
			.collect();
		let path = std::env::temp_dir().join(format!("{prefix}.{suffix}"));

		Self(path.to_string_lossy().into_owned())
	}
}

impl Drop for PathWrapper {
	fn drop(&mut self) {
		// Try removing it both as a file and as a directory. One of these
		// will always fail
		drop(std::fs::remove_dir_all(&self.0));
		drop(std::fs::remove_file(&self.0));
	}
}

impl Deref for PathWrapper {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl AsRef<std::path::Path> for PathWrapper {
	fn as_ref(&self) -> &std::path::Path {
		std::path::Path::new(&self.0)
	}
}
