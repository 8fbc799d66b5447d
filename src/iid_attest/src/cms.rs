//! CMS (PKCS#7) `SignedData` envelopes carrying a detached signature over
//! an identity document.
//!
//! Only what verification needs is decoded. The envelope's own
//! certificates never decide trust: the signature is always checked with
//! the out-of-band [`TrustAnchor`].

use der::{asn1::ObjectIdentifier, Decode, Tag, TagNumber};
use rsa::Pkcs1v15Sign;
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::{
	anchor::{fingerprint, RSA_ENCRYPTION_OID},
	asn1::{algorithm_oid, Node},
	AttestError, KeySizePolicy, Scheme, TrustAnchor,
};

/// `id-signedData`
pub const SIGNED_DATA_OID: ObjectIdentifier =
	ObjectIdentifier::new_unwrap("1.2.840.113549.1.7.2");
/// `id-contentType` signed attribute.
pub const CONTENT_TYPE_OID: ObjectIdentifier =
	ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.3");
/// `id-messageDigest` signed attribute.
pub const MESSAGE_DIGEST_OID: ObjectIdentifier =
	ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.4");

const SHA256_OID: ObjectIdentifier =
	ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.1");
const SHA384_OID: ObjectIdentifier =
	ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.2");
const SHA512_OID: ObjectIdentifier =
	ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.3");
const SHA256_WITH_RSA_OID: ObjectIdentifier =
	ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11");
const SHA384_WITH_RSA_OID: ObjectIdentifier =
	ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.12");
const SHA512_WITH_RSA_OID: ObjectIdentifier =
	ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.13");

/// Universal `SET` tag, replacing the `[0] IMPLICIT` tag of the signed
/// attributes when they are hashed.
const SET_TAG: u8 = 0x31;

/// Digest algorithms a `SignerInfo` may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
	/// SHA-256
	Sha256,
	/// SHA-384
	Sha384,
	/// SHA-512
	Sha512,
}

impl DigestAlgorithm {
	/// The algorithm identified by `oid`, if supported.
	#[must_use]
	pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
		[Self::Sha256, Self::Sha384, Self::Sha512]
			.into_iter()
			.find(|algorithm| algorithm.oid() == *oid)
	}

	/// The object identifier of this algorithm.
	#[must_use]
	pub fn oid(self) -> ObjectIdentifier {
		match self {
			Self::Sha256 => SHA256_OID,
			Self::Sha384 => SHA384_OID,
			Self::Sha512 => SHA512_OID,
		}
	}

	/// Hash `data`.
	#[must_use]
	pub fn digest(self, data: &[u8]) -> Vec<u8> {
		match self {
			Self::Sha256 => Sha256::digest(data).to_vec(),
			Self::Sha384 => Sha384::digest(data).to_vec(),
			Self::Sha512 => Sha512::digest(data).to_vec(),
		}
	}

	fn pkcs1v15(self) -> Pkcs1v15Sign {
		match self {
			Self::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
			Self::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
			Self::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
		}
	}
}

/// A certificate from the `certificates` field of a `SignedData`.
///
/// Only fingerprinted, never decoded as X.509.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedCertificate<'a> {
	/// DER encoding as found in the envelope.
	pub der: &'a [u8],
	/// SHA-256 over [`Self::der`].
	pub fingerprint: [u8; 32],
}

/// One signed attribute: its type and the encodings of its values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
	/// `attrType`
	pub oid: ObjectIdentifier,
	/// Each element of `attrValues`, header included.
	pub values: Vec<&'a [u8]>,
}

/// The `signedAttrs` of a `SignerInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedAttributes<'a> {
	raw: &'a [u8],
	attributes: Vec<Attribute<'a>>,
}

impl<'a> SignedAttributes<'a> {
	/// Every attribute, in encoding order.
	#[must_use]
	pub fn attributes(&self) -> &[Attribute<'a>] {
		&self.attributes
	}

	/// Attributes of type `oid`.
	pub fn get<'s>(
		&'s self,
		oid: &'s ObjectIdentifier,
	) -> impl Iterator<Item = &'s Attribute<'a>> + 's {
		self.attributes.iter().filter(move |a| a.oid == *oid)
	}

	/// The bytes the signature covers: the attributes exactly as encoded,
	/// with the implicit tag swapped for the universal `SET` tag.
	#[must_use]
	pub fn to_be_signed(&self) -> Vec<u8> {
		let mut bytes = self.raw.to_vec();
		bytes[0] = SET_TAG;
		bytes
	}
}

/// The parts of a `SignerInfo` verification needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerInfo<'a> {
	/// `digestAlgorithm`
	pub digest_algorithm: ObjectIdentifier,
	/// `signedAttrs`
	pub signed_attributes: Option<SignedAttributes<'a>>,
	/// `signatureAlgorithm`
	pub signature_algorithm: ObjectIdentifier,
	/// `signature`
	pub signature: &'a [u8],
}

/// A decoded `ContentInfo` of type `signedData`.
#[derive(Debug, Clone)]
pub struct SignedData<'a> {
	/// `digestAlgorithms`
	pub digest_algorithms: Vec<ObjectIdentifier>,
	/// `encapContentInfo.eContentType`
	pub content_type: ObjectIdentifier,
	/// `encapContentInfo.eContent`, absent for detached signatures.
	pub content: Option<&'a [u8]>,
	/// Certificates in the `certificates` field. Other certificate choices
	/// are skipped.
	pub certificates: Vec<EmbeddedCertificate<'a>>,
	/// `signerInfos`
	pub signer_infos: Vec<SignerInfo<'a>>,
}

impl<'a> SignedData<'a> {
	/// Decode a DER encoded `ContentInfo` wrapping `SignedData`.
	///
	/// Fails with [`AttestError::MalformedSignature`] if the bytes are not
	/// well formed or the content type is not `signedData`.
	pub fn from_der(bytes: &'a [u8]) -> Result<Self, AttestError> {
		Self::decode(bytes)
			.map_err(|e| AttestError::MalformedSignature(e.to_string()))
	}

	fn decode(bytes: &'a [u8]) -> der::Result<Self> {
		let mut content_info =
			Node::parse(bytes)?.assert_tag(Tag::Sequence)?.fields()?;
		let content_type =
			content_info.next_tagged(Tag::ObjectIdentifier)?.oid()?;
		if content_type != SIGNED_DATA_OID {
			return Err(der::ErrorKind::OidUnknown { oid: content_type }.into());
		}
		let explicit = content_info.next_field()?;
		if !explicit.is_context(TagNumber::N0, true) {
			return Err(explicit.tag().value_error());
		}
		content_info.finish()?;

		let [signed_data] = explicit.children()?[..] else {
			return Err(explicit.tag().value_error());
		};
		let mut fields = signed_data.assert_tag(Tag::Sequence)?.fields()?;

		fields.next_tagged(Tag::Integer)?;

		let digest_algorithms = fields
			.next_tagged(Tag::Set)?
			.children()?
			.iter()
			.map(algorithm_oid)
			.collect::<der::Result<Vec<_>>>()?;

		let mut encap = fields.next_tagged(Tag::Sequence)?.fields()?;
		let content_type = encap.next_tagged(Tag::ObjectIdentifier)?.oid()?;
		let content = match encap.optional_context(TagNumber::N0, true) {
			Some(explicit) => match explicit.children()?[..] {
				[octets] => Some(octets.octet_string()?),
				_ => return Err(explicit.tag().value_error()),
			},
			None => None,
		};
		encap.finish()?;

		let mut certificates = Vec::new();
		if let Some(set) = fields.optional_context(TagNumber::N0, true) {
			for choice in set.children()? {
				if choice.tag() == Tag::Sequence {
					certificates.push(EmbeddedCertificate {
						der: choice.raw(),
						fingerprint: fingerprint(choice.raw()),
					});
				}
			}
		}
		// Revocation information plays no part in a pinned anchor.
		fields.optional_context(TagNumber::N1, true);

		let signer_infos = fields
			.next_tagged(Tag::Set)?
			.children()?
			.iter()
			.map(SignerInfo::decode)
			.collect::<der::Result<Vec<_>>>()?;
		fields.finish()?;

		Ok(Self {
			digest_algorithms,
			content_type,
			content,
			certificates,
			signer_infos,
		})
	}
}

impl<'a> SignerInfo<'a> {
	fn decode(node: &Node<'a>) -> der::Result<Self> {
		let mut fields = node.assert_tag(Tag::Sequence)?.fields()?;

		fields.next_tagged(Tag::Integer)?;
		// sid: issuerAndSerialNumber or [0] subjectKeyIdentifier. The anchor
		// is authoritative, so the signer identifier is not matched.
		fields.next_field()?;
		let digest_algorithm = algorithm_oid(&fields.next_field()?)?;

		let signed_attributes = fields
			.optional_context(TagNumber::N0, true)
			.map(|attrs| {
				let attributes = attrs
					.children()?
					.iter()
					.map(Attribute::decode)
					.collect::<der::Result<Vec<_>>>()?;
				Ok::<_, der::Error>(SignedAttributes { raw: attrs.raw(), attributes })
			})
			.transpose()?;

		let signature_algorithm = algorithm_oid(&fields.next_field()?)?;
		let signature = fields.next_field()?.octet_string()?;
		fields.optional_context(TagNumber::N1, true);
		fields.finish()?;

		Ok(Self {
			digest_algorithm,
			signed_attributes,
			signature_algorithm,
			signature,
		})
	}
}

impl<'a> Attribute<'a> {
	fn decode(node: &Node<'a>) -> der::Result<Self> {
		let mut fields = node.assert_tag(Tag::Sequence)?.fields()?;
		let oid = fields.next_tagged(Tag::ObjectIdentifier)?.oid()?;
		let values = fields
			.next_tagged(Tag::Set)?
			.children()?
			.iter()
			.map(Node::raw)
			.collect();
		fields.finish()?;

		Ok(Self { oid, values })
	}

	/// The single value of this attribute, `None` for multi valued or
	/// empty attributes.
	#[must_use]
	pub fn single_value(&self) -> Option<&'a [u8]> {
		match self.values[..] {
			[value] => Some(value),
			_ => None,
		}
	}
}

/// Which certificate the signature is checked against, and what happened to
/// the certificates the envelope brought along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateSelection<'t> {
	/// The envelope carries no certificate; the anchor is used.
	Injected(&'t TrustAnchor),
	/// The envelope carries the anchor itself.
	Embedded(&'t TrustAnchor),
	/// The envelope carries only certificates other than the anchor. They
	/// are ignored and the anchor is used.
	Overridden {
		/// The certificate actually used.
		anchor: &'t TrustAnchor,
		/// Number of embedded certificates that were ignored.
		ignored: usize,
	},
}

impl<'t> CertificateSelection<'t> {
	/// The certificate to verify against. Always the anchor.
	#[must_use]
	pub fn certificate(&self) -> &'t TrustAnchor {
		match *self {
			Self::Injected(anchor)
			| Self::Embedded(anchor)
			| Self::Overridden { anchor, .. } => anchor,
		}
	}
}

/// Choose the certificate to verify `signed_data` with.
///
/// The out-of-band anchor always wins; embedded certificates are only
/// compared against it by fingerprint so a disagreement can be reported.
#[must_use]
pub fn select_verification_certificate<'t>(
	signed_data: &SignedData<'_>,
	anchor: &'t TrustAnchor,
) -> CertificateSelection<'t> {
	if signed_data.certificates.is_empty() {
		return CertificateSelection::Injected(anchor);
	}

	let embeds_anchor = signed_data
		.certificates
		.iter()
		.any(|cert| cert.fingerprint == *anchor.fingerprint());
	if embeds_anchor {
		CertificateSelection::Embedded(anchor)
	} else {
		CertificateSelection::Overridden {
			anchor,
			ignored: signed_data.certificates.len(),
		}
	}
}

/// Verify `cms` as a detached CMS `SignedData` signature over `document`
/// with `anchor`.
///
/// Returns `Ok(false)` for any cryptographic mismatch or unsupported
/// algorithm. Errors are reserved for envelopes that cannot be decoded,
/// signer counts other than one, and anchors that cannot verify
/// [`Scheme::RawRsa2048Envelope`] signatures.
pub fn verify_enveloped(
	document: &[u8],
	cms: &[u8],
	anchor: &TrustAnchor,
	policy: KeySizePolicy,
) -> Result<bool, AttestError> {
	if anchor.scheme() != Scheme::RawRsa2048Envelope {
		return Err(AttestError::AnchorSchemeMismatch {
			expected: Scheme::RawRsa2048Envelope,
			actual: anchor.scheme(),
		});
	}

	let signed_data = SignedData::from_der(cms)?;
	let signer = match &signed_data.signer_infos[..] {
		[signer] => signer,
		signers => {
			return Err(AttestError::UnsupportedSignerCount(signers.len()))
		}
	};

	let selection = select_verification_certificate(&signed_data, anchor);
	if let CertificateSelection::Overridden { ignored, .. } = selection {
		log::warn!(
			"ignoring {ignored} embedded certificate(s) not matching anchor {}",
			hex::encode(anchor.fingerprint())
		);
	}
	let key = selection.certificate().rsa_public_key(policy)?;

	let Some(digest_algorithm) =
		DigestAlgorithm::from_oid(&signer.digest_algorithm)
	else {
		log::warn!(
			"unsupported digest algorithm {}",
			signer.digest_algorithm
		);
		return Ok(false);
	};
	if !accepts_signature_algorithm(
		&signer.signature_algorithm,
		digest_algorithm,
	) {
		log::warn!(
			"unsupported signature algorithm {} with {digest_algorithm:?}",
			signer.signature_algorithm
		);
		return Ok(false);
	}

	let content_digest = digest_algorithm.digest(document);
	let signed_digest = match &signer.signed_attributes {
		Some(attributes) => {
			if !attributes_match(
				attributes,
				&content_digest,
				&signed_data.content_type,
			) {
				return Ok(false);
			}
			digest_algorithm.digest(&attributes.to_be_signed())
		}
		None => content_digest,
	};

	match key.verify(digest_algorithm.pkcs1v15(), &signed_digest, signer.signature)
	{
		Ok(()) => Ok(true),
		Err(e) => {
			log::warn!("envelope signature rejected: {e}");
			Ok(false)
		}
	}
}

fn accepts_signature_algorithm(
	oid: &ObjectIdentifier,
	digest_algorithm: DigestAlgorithm,
) -> bool {
	let bound = [
		(SHA256_WITH_RSA_OID, DigestAlgorithm::Sha256),
		(SHA384_WITH_RSA_OID, DigestAlgorithm::Sha384),
		(SHA512_WITH_RSA_OID, DigestAlgorithm::Sha512),
	];

	*oid == RSA_ENCRYPTION_OID
		|| bound.contains(&(*oid, digest_algorithm))
}

/// Check the `messageDigest` and `contentType` signed attributes.
fn attributes_match(
	attributes: &SignedAttributes<'_>,
	content_digest: &[u8],
	content_type: &ObjectIdentifier,
) -> bool {
	for attribute in attributes.get(&CONTENT_TYPE_OID) {
		let declared = attribute
			.single_value()
			.and_then(|value| ObjectIdentifier::from_der(value).ok());
		if declared.as_ref() != Some(content_type) {
			log::warn!("contentType attribute does not match {content_type}");
			return false;
		}
	}

	let mut digests = attributes.get(&MESSAGE_DIGEST_OID);
	let (Some(attribute), None) = (digests.next(), digests.next()) else {
		log::warn!("signed attributes need exactly one messageDigest");
		return false;
	};
	let declared = attribute
		.single_value()
		.and_then(|value| Node::parse(value).ok())
		.and_then(|node| node.octet_string().ok());
	if declared != Some(content_digest) {
		log::warn!("messageDigest does not match the document");
		return false;
	}

	true
}
