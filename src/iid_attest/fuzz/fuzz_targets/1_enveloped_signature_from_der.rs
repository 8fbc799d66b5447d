#![no_main]

use libfuzzer_sys::fuzz_target;

use iid_attest::cms::{verify_enveloped, SignedData};
use iid_attest::mock::{
	MOCK_IDENTITY_DOCUMENT, MOCK_RAW_RSA_2048_CMS_CERT_PEM, MOCK_REGION,
};
use iid_attest::{KeySizePolicy, Scheme, TrustAnchor};

fuzz_target!(|data: &[u8]| {
	// the decoder must reject arbitrary bytes without panicking
	if let Ok(signed_data) = SignedData::from_der(data) {
		// debug print, signals how often this path is hit
		println!(
			"decoded envelope with {} signer(s), data length: {}",
			signed_data.signer_infos.len(),
			data.len()
		);
	}

	let anchor = TrustAnchor::from_cert_bytes(
		Scheme::RawRsa2048Envelope,
		MOCK_REGION,
		MOCK_RAW_RSA_2048_CMS_CERT_PEM,
	)
	.unwrap();
	// a genuine verdict is only expected for variants of the mock envelopes
	let _ = verify_enveloped(
		MOCK_IDENTITY_DOCUMENT,
		data,
		&anchor,
		KeySizePolicy::Strict,
	);
});
