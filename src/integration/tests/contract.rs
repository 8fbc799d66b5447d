//! Caller mistakes and misconfiguration surface as errors, never as a
//! negative verdict.

use iid_attest::{
	mock::{
		mock_cert_store, MOCK_CMS_SIGNED_ATTRS, MOCK_DSA_LEGACY_CERT_PEM,
		MOCK_IDENTITY_DOCUMENT, MOCK_RAW_SIGNATURE, MOCK_REGION,
	},
	AttestError, InMemoryCertStore, Scheme, Verifier,
};

#[test]
fn unknown_scheme_is_unsupported() {
	let verifier = Verifier::new(mock_cert_store());

	for scheme in ["unknown", "", "RAW-RSA-1024", "rsa2048"] {
		match verifier.verify_named(
			MOCK_IDENTITY_DOCUMENT,
			MOCK_RAW_SIGNATURE,
			scheme,
		) {
			Err(AttestError::UnsupportedScheme(name)) => assert_eq!(name, scheme),
			other => panic!("{scheme}: {other:?}"),
		}
	}
}

#[test]
fn legacy_procedure_names_still_map() {
	let verifier = Verifier::new(mock_cert_store());

	let scheme = Scheme::from_legacy_procedure("base64").unwrap();
	assert!(verifier
		.verify(MOCK_IDENTITY_DOCUMENT, MOCK_RAW_SIGNATURE, scheme)
		.unwrap());

	let scheme = Scheme::from_legacy_procedure("rsa2048").unwrap();
	assert!(verifier
		.verify(MOCK_IDENTITY_DOCUMENT, MOCK_CMS_SIGNED_ATTRS, scheme)
		.unwrap());
}

#[test]
fn legacy_dsa_scheme_is_not_verified() {
	let verifier = Verifier::new(mock_cert_store());

	let anchor =
		verifier.resolve_anchor(MOCK_REGION, Scheme::DsaLegacy).unwrap();
	assert_eq!(anchor.scheme(), Scheme::DsaLegacy);

	match verifier.verify(
		MOCK_IDENTITY_DOCUMENT,
		MOCK_RAW_SIGNATURE,
		Scheme::DsaLegacy,
	) {
		Err(AttestError::UnsupportedScheme(_)) => {}
		other => panic!("{other:?}"),
	}
	match verifier.verify_with_anchor(
		MOCK_IDENTITY_DOCUMENT,
		MOCK_RAW_SIGNATURE,
		Scheme::DsaLegacy,
		&anchor,
	) {
		Err(AttestError::UnsupportedScheme(_)) => {}
		other => panic!("{other:?}"),
	}
}

#[test]
fn missing_inputs_are_contract_errors() {
	let verifier = Verifier::new(mock_cert_store());

	for scheme in [Scheme::RawRsa1024, Scheme::RawRsa2048Envelope] {
		match verifier.verify(b"", MOCK_RAW_SIGNATURE, scheme) {
			Err(AttestError::MissingInput("document")) => {}
			other => panic!("{other:?}"),
		}
		for signature in ["", "   ", "\n"] {
			match verifier.verify(MOCK_IDENTITY_DOCUMENT, signature, scheme) {
				Err(AttestError::MissingInput("signature")) => {}
				other => panic!("{other:?}"),
			}
		}
	}

	match verifier.resolve_anchor("", Scheme::RawRsa1024) {
		Err(AttestError::MissingInput("region")) => {}
		other => panic!("{other:?}"),
	}
}

#[test]
fn missing_anchor_is_not_a_negative_verdict() {
	// The store knows the region, just not under this scheme.
	let store = InMemoryCertStore::new().with(
		Scheme::DsaLegacy,
		MOCK_REGION,
		MOCK_DSA_LEGACY_CERT_PEM,
	);
	let verifier = Verifier::new(store);

	match verifier.verify(
		MOCK_IDENTITY_DOCUMENT,
		MOCK_RAW_SIGNATURE,
		Scheme::RawRsa1024,
	) {
		Err(e @ AttestError::AnchorNotFound { .. }) => {
			assert_eq!(
				e.to_string(),
				"no raw-rsa-1024 certificate for region: ap-southeast-2"
			);
		}
		other => panic!("{other:?}"),
	}
}

#[test]
fn malformed_anchor_is_not_a_negative_verdict() {
	let store = InMemoryCertStore::new()
		.with(Scheme::RawRsa1024, MOCK_REGION, b"garbage".to_vec())
		.with(
			Scheme::RawRsa2048Envelope,
			MOCK_REGION,
			b"-----BEGIN CERTIFICATE-----\n!!!!\n-----END CERTIFICATE-----\n"
				.to_vec(),
		);
	let verifier = Verifier::new(store);

	match verifier.verify(
		MOCK_IDENTITY_DOCUMENT,
		MOCK_RAW_SIGNATURE,
		Scheme::RawRsa1024,
	) {
		Err(AttestError::MalformedCertificate(_)) => {}
		other => panic!("{other:?}"),
	}
	match verifier.verify(
		MOCK_IDENTITY_DOCUMENT,
		MOCK_CMS_SIGNED_ATTRS,
		Scheme::RawRsa2048Envelope,
	) {
		Err(AttestError::MalformedCertificate(_)) => {}
		other => panic!("{other:?}"),
	}
}

#[test]
fn document_without_region_cannot_select_an_anchor() {
	let verifier = Verifier::new(mock_cert_store());

	match verifier.verify(
		br#"{"instanceId":"i-050c2e3dd07033e9e"}"#,
		MOCK_RAW_SIGNATURE,
		Scheme::RawRsa1024,
	) {
		Err(AttestError::MissingRegion) => {}
		other => panic!("{other:?}"),
	}
	match verifier.verify(b"region: ap-southeast-2", MOCK_RAW_SIGNATURE, Scheme::RawRsa1024)
	{
		Err(AttestError::MalformedDocument(_)) => {}
		other => panic!("{other:?}"),
	}
}
