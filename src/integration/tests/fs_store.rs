use std::path::Path;

use iid_attest::{
	mock::{
		MOCK_CMS_SIGNED_ATTRS, MOCK_IDENTITY_DOCUMENT,
		MOCK_RAW_RSA_1024_CERT_DER, MOCK_RAW_RSA_2048_CMS_CERT_PEM,
		MOCK_RAW_SIGNATURE, MOCK_REGION,
	},
	store::DEFAULT_CERT_DIR,
	AttestError, CertStore, FsCertStore, Scheme, Verifier,
};
use iid_test_primitives::PathWrapper;
use integration::write_anchor;

#[test]
fn verifies_against_a_certificate_directory() {
	let root: PathWrapper =
		PathWrapper::random("verifies_against_a_certificate_directory");
	let root_path = Path::new(&*root);
	write_anchor(
		root_path,
		Scheme::RawRsa1024,
		MOCK_REGION,
		"der",
		MOCK_RAW_RSA_1024_CERT_DER,
	);
	write_anchor(
		root_path,
		Scheme::RawRsa2048Envelope,
		MOCK_REGION,
		"pem",
		MOCK_RAW_RSA_2048_CMS_CERT_PEM,
	);

	let verifier = Verifier::new(FsCertStore::new(root_path));

	assert!(verifier
		.verify(MOCK_IDENTITY_DOCUMENT, MOCK_RAW_SIGNATURE, Scheme::RawRsa1024)
		.unwrap());
	assert!(verifier
		.verify(
			MOCK_IDENTITY_DOCUMENT,
			MOCK_CMS_SIGNED_ATTRS,
			Scheme::RawRsa2048Envelope
		)
		.unwrap());

	// Nothing is registered for the legacy namespace.
	match verifier.resolve_anchor(MOCK_REGION, Scheme::DsaLegacy) {
		Err(AttestError::AnchorNotFound { scheme: Scheme::DsaLegacy, .. }) => {}
		other => panic!("{other:?}"),
	}
}

#[test]
fn region_claims_cannot_escape_the_namespace() {
	let root: PathWrapper =
		PathWrapper::random("region_claims_cannot_escape_the_namespace");
	let root_path = Path::new(&*root);
	// Reachable from the raw-rsa-2048-cms namespace only via `..`.
	write_anchor(
		root_path,
		Scheme::RawRsa1024,
		MOCK_REGION,
		"der",
		MOCK_RAW_RSA_1024_CERT_DER,
	);
	let store = FsCertStore::new(root_path);

	let traversal = format!("../{}/{MOCK_REGION}", Scheme::RawRsa1024.namespace());
	assert!(store
		.get(Scheme::RawRsa2048Envelope, &traversal)
		.unwrap()
		.is_none());

	let document = format!(r#"{{"region":"{traversal}"}}"#);
	match Verifier::new(store).verify(
		document.as_bytes(),
		MOCK_RAW_SIGNATURE,
		Scheme::RawRsa2048Envelope,
	) {
		Err(AttestError::AnchorNotFound { region, .. }) => {
			assert_eq!(region, traversal);
		}
		other => panic!("{other:?}"),
	}
}

#[test]
fn default_store_reads_the_certs_directory() {
	let store = FsCertStore::default();

	assert_eq!(store.root(), Path::new(DEFAULT_CERT_DIR));
	assert_eq!(DEFAULT_CERT_DIR, "certs");
}
