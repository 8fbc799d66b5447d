#![no_main]

use libfuzzer_sys::fuzz_target;

use iid_attest::mock::{mock_cert_store, MOCK_IDENTITY_DOCUMENT, MOCK_RAW_SIGNATURE};
use iid_attest::{Scheme, Verifier};

fuzz_target!(|data: &[u8]| {
	let verifier = Verifier::new(mock_cert_store());

	// fuzzer controlled document with a genuine signature, this mostly
	// exercises the region extraction
	for scheme in Scheme::ALL {
		let _ = verifier.verify(data, MOCK_RAW_SIGNATURE, scheme);
	}

	// genuine document with a fuzzer controlled signature
	let signature = String::from_utf8_lossy(data);
	let _ = verifier.verify(
		MOCK_IDENTITY_DOCUMENT,
		&signature,
		Scheme::RawRsa2048Envelope,
	);
	if let Ok(true) =
		verifier.verify(MOCK_IDENTITY_DOCUMENT, &signature, Scheme::RawRsa1024)
	{
		// only the genuine signature, modulo whitespace, can verify
		assert_eq!(
			signature.split_ascii_whitespace().collect::<String>(),
			MOCK_RAW_SIGNATURE.split_ascii_whitespace().collect::<String>(),
			"forged raw signature accepted"
		);
	}
});
