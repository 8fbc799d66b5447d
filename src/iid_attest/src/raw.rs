//! Bare PKCS#1 v1.5 signatures over the SHA-256 digest of an identity
//! document.

use rsa::Pkcs1v15Sign;
use sha2::{Digest, Sha256};

use crate::{AttestError, KeySizePolicy, Scheme, TrustAnchor};

/// Verify `signature` over `document` with `anchor`.
///
/// The document is hashed exactly as given. Anything wrong with the
/// signature itself is `Ok(false)`; an anchor that cannot verify
/// [`Scheme::RawRsa1024`] signatures is an error.
pub fn verify_raw(
	document: &[u8],
	signature: &[u8],
	anchor: &TrustAnchor,
	policy: KeySizePolicy,
) -> Result<bool, AttestError> {
	if anchor.scheme() != Scheme::RawRsa1024 {
		return Err(AttestError::AnchorSchemeMismatch {
			expected: Scheme::RawRsa1024,
			actual: anchor.scheme(),
		});
	}

	let key = anchor.rsa_public_key(policy)?;
	let digest = Sha256::digest(document);

	match key.verify(Pkcs1v15Sign::new::<Sha256>(), &digest, signature) {
		Ok(()) => Ok(true),
		Err(e) => {
			log::warn!(
				"raw signature ({} bytes) rejected by anchor {}: {e}",
				signature.len(),
				hex::encode(anchor.fingerprint())
			);
			Ok(false)
		}
	}
}

#[cfg(test)]
mod test {
	use rand::Rng;

	use super::*;
	use crate::mock::{
		mock_signature_bytes, MOCK_IDENTITY_DOCUMENT,
		MOCK_OTHER_IDENTITY_DOCUMENT, MOCK_RAW_RSA_1024_CERT_PEM,
		MOCK_RAW_RSA_2048_CMS_CERT_PEM, MOCK_RAW_SIGNATURE, MOCK_REGION,
	};

	fn anchor() -> TrustAnchor {
		TrustAnchor::from_cert_bytes(
			Scheme::RawRsa1024,
			MOCK_REGION,
			MOCK_RAW_RSA_1024_CERT_PEM,
		)
		.unwrap()
	}

	#[test]
	fn genuine_signature_verifies() {
		let signature = mock_signature_bytes(MOCK_RAW_SIGNATURE);
		assert_eq!(signature.len(), 128);

		assert!(verify_raw(
			MOCK_IDENTITY_DOCUMENT,
			&signature,
			&anchor(),
			KeySizePolicy::Strict
		)
		.unwrap());
	}

	#[test]
	fn any_flipped_signature_bit_is_rejected() {
		let signature = mock_signature_bytes(MOCK_RAW_SIGNATURE);
		let anchor = anchor();
		let mut rng = rand::thread_rng();

		for _ in 0..16 {
			let mut tampered = signature.clone();
			let position = rng.gen_range(0..tampered.len());
			tampered[position] ^= 1 << rng.gen_range(0..8);

			assert!(!verify_raw(
				MOCK_IDENTITY_DOCUMENT,
				&tampered,
				&anchor,
				KeySizePolicy::Strict
			)
			.unwrap());
		}
	}

	#[test]
	fn other_document_is_rejected() {
		assert!(!verify_raw(
			MOCK_OTHER_IDENTITY_DOCUMENT,
			&mock_signature_bytes(MOCK_RAW_SIGNATURE),
			&anchor(),
			KeySizePolicy::Strict
		)
		.unwrap());
	}

	#[test]
	fn malformed_signature_bytes_are_negative() {
		let anchor = anchor();
		let signature = mock_signature_bytes(MOCK_RAW_SIGNATURE);

		for bytes in [&[][..], &signature[1..], &[0xff; 128][..], &[0u8; 256][..]]
		{
			assert!(!verify_raw(
				MOCK_IDENTITY_DOCUMENT,
				bytes,
				&anchor,
				KeySizePolicy::Strict
			)
			.unwrap());
		}
	}

	#[test]
	fn anchor_must_match_expected_key_size() {
		// The 2048 bit envelope anchor, filed under the raw namespace.
		let misfiled = TrustAnchor::from_cert_bytes(
			Scheme::RawRsa1024,
			MOCK_REGION,
			MOCK_RAW_RSA_2048_CMS_CERT_PEM,
		)
		.unwrap();
		let signature = mock_signature_bytes(MOCK_RAW_SIGNATURE);

		match verify_raw(
			MOCK_IDENTITY_DOCUMENT,
			&signature,
			&misfiled,
			KeySizePolicy::Strict,
		) {
			Err(AttestError::InvalidKeyMaterial(_)) => {}
			other => panic!("{other:?}"),
		}

		// Tolerated, but the key still does not verify the signature.
		assert!(!verify_raw(
			MOCK_IDENTITY_DOCUMENT,
			&signature,
			&misfiled,
			KeySizePolicy::Warn
		)
		.unwrap());
	}

	#[test]
	fn anchor_must_belong_to_the_raw_scheme() {
		let envelope_anchor = TrustAnchor::from_cert_bytes(
			Scheme::RawRsa2048Envelope,
			MOCK_REGION,
			MOCK_RAW_RSA_2048_CMS_CERT_PEM,
		)
		.unwrap();

		match verify_raw(
			MOCK_IDENTITY_DOCUMENT,
			&mock_signature_bytes(MOCK_RAW_SIGNATURE),
			&envelope_anchor,
			KeySizePolicy::Strict,
		) {
			Err(AttestError::AnchorSchemeMismatch { expected, actual }) => {
				assert_eq!(expected, Scheme::RawRsa1024);
				assert_eq!(actual, Scheme::RawRsa2048Envelope);
			}
			other => panic!("{other:?}"),
		}
	}
}
