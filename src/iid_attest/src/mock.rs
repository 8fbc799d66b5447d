//! Fixtures for tests. Never use in production.
//!
//! The anchors are self-signed certificates carrying the provider's subject,
//! the signatures were produced over [`MOCK_IDENTITY_DOCUMENT`] with the
//! matching private keys using OpenSSL. Signatures are kept in their
//! transport encoding, base64 wrapped at 76 columns.

use crate::{InMemoryCertStore, Scheme};

/// Region every mock anchor is registered for.
pub const MOCK_REGION: &str = "ap-southeast-2";

/// Identity document claiming [`MOCK_REGION`], byte for byte as signed.
pub const MOCK_IDENTITY_DOCUMENT: &[u8] =
	std::include_bytes!("./static/identity_document.json");

/// [`MOCK_IDENTITY_DOCUMENT`] with a different instance id.
pub const MOCK_OTHER_IDENTITY_DOCUMENT: &[u8] =
	std::include_bytes!("./static/other_identity_document.json");

/// 1024 bit RSA anchor for [`Scheme::RawRsa1024`].
pub const MOCK_RAW_RSA_1024_CERT_PEM: &[u8] =
	std::include_bytes!("./static/raw_rsa_1024_ap-southeast-2.pem");

/// [`MOCK_RAW_RSA_1024_CERT_PEM`] DER encoded.
pub const MOCK_RAW_RSA_1024_CERT_DER: &[u8] =
	std::include_bytes!("./static/raw_rsa_1024_ap-southeast-2.der");

/// 2048 bit RSA anchor for [`Scheme::RawRsa2048Envelope`].
pub const MOCK_RAW_RSA_2048_CMS_CERT_PEM: &[u8] =
	std::include_bytes!("./static/raw_rsa_2048_cms_ap-southeast-2.pem");

/// DSA anchor for [`Scheme::DsaLegacy`].
pub const MOCK_DSA_LEGACY_CERT_PEM: &[u8] =
	std::include_bytes!("./static/dsa_legacy_ap-southeast-2.pem");

/// A 2048 bit RSA certificate with the same subject as the genuine anchors
/// but a key the provider does not hold.
pub const MOCK_FORGED_CERT_PEM: &[u8] =
	std::include_bytes!("./static/forged_rsa_2048.pem");

/// `notBefore` of the RSA mock anchors, seconds since the unix epoch.
pub const MOCK_ANCHOR_NOT_BEFORE: u64 = 1_792_210_153;

/// `notAfter` of the RSA mock anchors, seconds since the unix epoch.
pub const MOCK_ANCHOR_NOT_AFTER: u64 = 7_408_210_153;

/// Raw PKCS#1 v1.5 SHA-256 signature of [`MOCK_IDENTITY_DOCUMENT`] by the
/// 1024 bit anchor's key.
pub const MOCK_RAW_SIGNATURE: &str = include_str!("./static/raw_signature.b64");

/// Detached CMS signature with signed attributes and the signer certificate
/// embedded.
pub const MOCK_CMS_SIGNED_ATTRS: &str =
	include_str!("./static/cms_signed_attrs.b64");

/// Detached CMS signature without signed attributes.
pub const MOCK_CMS_NO_ATTRS: &str = include_str!("./static/cms_no_attrs.b64");

/// Detached CMS signature without any embedded certificate.
pub const MOCK_CMS_NO_CERTS: &str = include_str!("./static/cms_no_certs.b64");

/// CMS signature that also carries the signed document as `eContent`.
pub const MOCK_CMS_ATTACHED: &str = include_str!("./static/cms_attached.b64");

/// Detached CMS signature using SHA-512.
pub const MOCK_CMS_SHA512: &str = include_str!("./static/cms_sha512.b64");

/// Genuine signature, but the only embedded certificate is
/// [`MOCK_FORGED_CERT_PEM`].
pub const MOCK_CMS_FOREIGN_CERT: &str =
	include_str!("./static/cms_foreign_cert.b64");

/// Signed with the forged key, embedding [`MOCK_FORGED_CERT_PEM`].
pub const MOCK_CMS_FORGED: &str = include_str!("./static/cms_forged.b64");

/// Genuine signature over [`MOCK_OTHER_IDENTITY_DOCUMENT`].
pub const MOCK_CMS_OTHER_DOCUMENT: &str =
	include_str!("./static/cms_other_document.b64");

/// Two signers: the genuine key and the forged key.
pub const MOCK_CMS_TWO_SIGNERS: &str =
	include_str!("./static/cms_two_signers.b64");

/// A store with every mock anchor registered for [`MOCK_REGION`].
#[must_use]
pub fn mock_cert_store() -> InMemoryCertStore {
	InMemoryCertStore::new()
		.with(Scheme::RawRsa1024, MOCK_REGION, MOCK_RAW_RSA_1024_CERT_PEM)
		.with(
			Scheme::RawRsa2048Envelope,
			MOCK_REGION,
			MOCK_RAW_RSA_2048_CMS_CERT_PEM,
		)
		.with(Scheme::DsaLegacy, MOCK_REGION, MOCK_DSA_LEGACY_CERT_PEM)
}

/// Decode one of the base64 mock signatures.
///
/// # Panics
///
/// Panics if `encoded` is not base64.
#[must_use]
pub fn mock_signature_bytes(encoded: &str) -> Vec<u8> {
	crate::verify::decode_signature(encoded)
		.expect("mock signatures are valid base64")
}
