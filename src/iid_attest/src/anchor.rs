//! Trust anchors and their resolution from a [`CertStore`].
//!
//! Exactly one certificate is trusted per scheme and region. No chain is
//! built above it and its validity window is informational only.

use der::{asn1::ObjectIdentifier, pem::PemLabel, Decode, Document};
use rsa::{traits::PublicKeyParts, BigUint, RsaPublicKey};
use sha2::{Digest, Sha256};
use x509_cert::Certificate;

use crate::{syntactic_validation, AttestError, CertStore, KeySizePolicy, Scheme};

/// `rsaEncryption` from PKCS#1.
pub const RSA_ENCRYPTION_OID: ObjectIdentifier =
	ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

const PEM_PREAMBLE: &[u8] = b"-----BEGIN";

/// Public key of a [`TrustAnchor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorKey {
	/// PKCS#1 RSA public key, big endian unsigned integers.
	Rsa {
		/// Modulus `n`.
		modulus: Vec<u8>,
		/// Public exponent `e`.
		exponent: Vec<u8>,
	},
	/// Any key that is not a well formed RSA key, for example the DSA keys
	/// of the legacy namespace.
	Unsupported {
		/// Algorithm of the subject public key info.
		algorithm: ObjectIdentifier,
		/// Contents of the subject public key bit string.
		key: Vec<u8>,
	},
}

/// A parsed anchor certificate, pinned for one scheme and region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustAnchor {
	scheme: Scheme,
	region: String,
	subject: String,
	issuer: String,
	serial_number: Vec<u8>,
	not_before: u64,
	not_after: u64,
	public_key: AnchorKey,
	der: Vec<u8>,
	fingerprint: [u8; 32],
}

/// Extract a DER encoded certificate from bytes representing a PEM encoded
/// certificate.
///
/// Anything that is not a PEM `CERTIFICATE` fails with
/// [`AttestError::MalformedCertificate`].
pub fn cert_from_pem(pem: &[u8]) -> Result<Vec<u8>, AttestError> {
	decode_pem_certificate(pem).map_err(AttestError::MalformedCertificate)
}

fn decode_pem_certificate(pem: &[u8]) -> der::Result<Vec<u8>> {
	let (label, doc) = Document::from_pem(std::str::from_utf8(pem)?)?;
	Certificate::validate_pem_label(label)?;

	Ok(doc.as_bytes().to_vec())
}

/// SHA-256 over a DER encoded certificate.
#[must_use]
pub fn fingerprint(der: &[u8]) -> [u8; 32] {
	Sha256::digest(der).into()
}

/// Resolve the anchor registered in `store` for `region` under `scheme`.
///
/// # Arguments
///
/// * `store` - where the anchor certificates live.
/// * `region` - region key claimed by the identity document.
/// * `scheme` - the scheme whose namespace is searched.
pub fn resolve<S: CertStore + ?Sized>(
	store: &S,
	region: &str,
	scheme: Scheme,
) -> Result<TrustAnchor, AttestError> {
	syntactic_validation::region(region)?;

	let bytes = store.get(scheme, region)?.ok_or_else(|| {
		AttestError::AnchorNotFound { scheme, region: region.to_string() }
	})?;
	let anchor = TrustAnchor::from_cert_bytes(scheme, region, &bytes)?;

	log::debug!(
		"resolved {scheme} anchor for {region}: subject={}, fingerprint={}",
		anchor.subject,
		hex::encode(anchor.fingerprint)
	);
	Ok(anchor)
}

impl TrustAnchor {
	/// Parse PEM or DER encoded certificate bytes into an anchor for
	/// `region` under `scheme`.
	pub fn from_cert_bytes(
		scheme: Scheme,
		region: &str,
		bytes: &[u8],
	) -> Result<Self, AttestError> {
		let start = bytes
			.iter()
			.position(|b| !b.is_ascii_whitespace())
			.unwrap_or(bytes.len());
		let der = if bytes[start..].starts_with(PEM_PREAMBLE) {
			cert_from_pem(&bytes[start..])?
		} else {
			bytes.to_vec()
		};

		let cert =
			Certificate::from_der(&der).map_err(AttestError::MalformedCertificate)?;
		let tbs = &cert.tbs_certificate;
		let spki = &tbs.subject_public_key_info;

		let key = spki.subject_public_key.as_bytes().ok_or_else(|| {
			AttestError::MalformedCertificate(
				der::Tag::BitString.value_error(),
			)
		})?;
		let public_key = match rsa::pkcs1::RsaPublicKey::from_der(key) {
			Ok(rsa_key) if spki.algorithm.oid == RSA_ENCRYPTION_OID => {
				AnchorKey::Rsa {
					modulus: rsa_key.modulus.as_bytes().to_vec(),
					exponent: rsa_key.public_exponent.as_bytes().to_vec(),
				}
			}
			_ => AnchorKey::Unsupported {
				algorithm: spki.algorithm.oid,
				key: key.to_vec(),
			},
		};

		Ok(Self {
			scheme,
			region: region.to_string(),
			subject: tbs.subject.to_string(),
			issuer: tbs.issuer.to_string(),
			serial_number: tbs.serial_number.as_bytes().to_vec(),
			not_before: tbs.validity.not_before.to_unix_duration().as_secs(),
			not_after: tbs.validity.not_after.to_unix_duration().as_secs(),
			public_key,
			fingerprint: fingerprint(&der),
			der,
		})
	}

	/// Scheme whose namespace this anchor was resolved from.
	#[must_use]
	pub fn scheme(&self) -> Scheme {
		self.scheme
	}

	/// Region key this anchor was resolved for.
	#[must_use]
	pub fn region(&self) -> &str {
		&self.region
	}

	/// Subject distinguished name, RFC 4514 string.
	#[must_use]
	pub fn subject(&self) -> &str {
		&self.subject
	}

	/// Issuer distinguished name, RFC 4514 string.
	#[must_use]
	pub fn issuer(&self) -> &str {
		&self.issuer
	}

	/// Certificate serial number, big endian.
	#[must_use]
	pub fn serial_number(&self) -> &[u8] {
		&self.serial_number
	}

	/// Start of the validity window in seconds since the unix epoch.
	#[must_use]
	pub fn not_before(&self) -> u64 {
		self.not_before
	}

	/// End of the validity window in seconds since the unix epoch.
	#[must_use]
	pub fn not_after(&self) -> u64 {
		self.not_after
	}

	/// Whether `seconds_since_epoch` falls inside the validity window.
	/// Verification does not consult this.
	#[must_use]
	pub fn is_valid_at(&self, seconds_since_epoch: u64) -> bool {
		(self.not_before..=self.not_after).contains(&seconds_since_epoch)
	}

	/// The anchor's public key.
	#[must_use]
	pub fn public_key(&self) -> &AnchorKey {
		&self.public_key
	}

	/// DER encoding of the certificate.
	#[must_use]
	pub fn der(&self) -> &[u8] {
		&self.der
	}

	/// SHA-256 over [`Self::der`].
	#[must_use]
	pub fn fingerprint(&self) -> &[u8; 32] {
		&self.fingerprint
	}

	/// [`Self::fingerprint`] as lower case hex.
	#[must_use]
	pub fn fingerprint_hex(&self) -> String {
		hex::encode(self.fingerprint)
	}

	/// The RSA key to verify signatures of this anchor's scheme with.
	///
	/// Fails with [`AttestError::InvalidKeyMaterial`] when the anchor does not
	/// hold a usable RSA key, or when its modulus size does not match the
	/// scheme and `policy` is [`KeySizePolicy::Strict`].
	pub fn rsa_public_key(
		&self,
		policy: KeySizePolicy,
	) -> Result<RsaPublicKey, AttestError> {
		let AnchorKey::Rsa { modulus, exponent } = &self.public_key else {
			return Err(AttestError::InvalidKeyMaterial(format!(
				"{} anchor for {} does not hold an RSA key",
				self.scheme, self.region
			)));
		};

		let key = RsaPublicKey::new(
			BigUint::from_bytes_be(modulus),
			BigUint::from_bytes_be(exponent),
		)
		.map_err(|e| AttestError::InvalidKeyMaterial(e.to_string()))?;

		if let Some(expected) = self.scheme.expected_modulus_bits() {
			let actual = key.n().bits();
			if actual != expected {
				let reason = format!(
					"{} anchor for {} has a {actual} bit modulus, expected {expected}",
					self.scheme, self.region
				);
				match policy {
					KeySizePolicy::Strict => {
						return Err(AttestError::InvalidKeyMaterial(reason))
					}
					KeySizePolicy::Warn => log::warn!("{reason}"),
				}
			}
		}

		Ok(key)
	}
}
