//! A generic DER tree.
//!
//! Every node borrows from the input. Header and length checks are left to
//! the `der` reader, so walking the tree never does offset arithmetic of its
//! own.

use der::{
	asn1::ObjectIdentifier, Decode, Encode, Length, Reader, SliceReader, Tag,
	TagNumber,
};

/// One TLV of a DER encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Node<'a> {
	tag: Tag,
	raw: &'a [u8],
	value: &'a [u8],
}

impl<'a> Node<'a> {
	/// Parse `bytes` as exactly one TLV.
	pub(crate) fn parse(bytes: &'a [u8]) -> der::Result<Self> {
		let mut reader = SliceReader::new(bytes)?;
		let node = Self::read(&mut reader)?;
		reader.finish(node)
	}

	fn read(reader: &mut SliceReader<'a>) -> der::Result<Self> {
		let header = reader.peek_header()?;
		let header_len = header.encoded_len()?;
		let raw = reader.read_slice((header_len + header.length)?)?;
		let value = &raw[usize::try_from(header_len)?..];

		Ok(Self { tag: header.tag, raw, value })
	}

	pub(crate) fn tag(&self) -> Tag {
		self.tag
	}

	/// The complete encoding, header included.
	pub(crate) fn raw(&self) -> &'a [u8] {
		self.raw
	}

	/// Fail unless the node is tagged `expected`.
	pub(crate) fn assert_tag(self, expected: Tag) -> der::Result<Self> {
		self.tag.assert_eq(expected)?;
		Ok(self)
	}

	/// Whether this is a context specific `[number]` node.
	pub(crate) fn is_context(&self, number: TagNumber, constructed: bool) -> bool {
		self.tag == Tag::ContextSpecific { constructed, number }
	}

	/// The nodes contained in a constructed node.
	pub(crate) fn children(&self) -> der::Result<Vec<Node<'a>>> {
		if !self.tag.is_constructed() {
			return Err(self.tag.value_error());
		}

		let mut reader = SliceReader::new(self.value)?;
		let mut children = Vec::new();
		while !reader.is_finished() {
			children.push(Self::read(&mut reader)?);
		}

		Ok(children)
	}

	/// A cursor over [`Self::children`], for walking `SEQUENCE` fields.
	pub(crate) fn fields(&self) -> der::Result<Fields<'a>> {
		Ok(Fields {
			nodes: self.children()?,
			position: 0,
			length: Length::try_from(self.value.len())?,
		})
	}

	pub(crate) fn oid(&self) -> der::Result<ObjectIdentifier> {
		ObjectIdentifier::from_der(self.raw)
	}

	/// Contents of an `OCTET STRING`.
	pub(crate) fn octet_string(&self) -> der::Result<&'a [u8]> {
		self.tag.assert_eq(Tag::OctetString)?;
		Ok(self.value)
	}
}

/// Sequential access to the fields of a constructed node.
#[derive(Debug)]
pub(crate) struct Fields<'a> {
	nodes: Vec<Node<'a>>,
	position: usize,
	length: Length,
}

impl<'a> Fields<'a> {
	/// The next mandatory field.
	pub(crate) fn next_field(&mut self) -> der::Result<Node<'a>> {
		let node = self
			.nodes
			.get(self.position)
			.copied()
			.ok_or_else(|| der::Error::incomplete(self.length))?;
		self.position += 1;
		Ok(node)
	}

	/// The next mandatory field, which must be tagged `tag`.
	pub(crate) fn next_tagged(&mut self, tag: Tag) -> der::Result<Node<'a>> {
		self.next_field()?.assert_tag(tag)
	}

	/// The next field if it is the optional context specific `[number]`.
	pub(crate) fn optional_context(
		&mut self,
		number: TagNumber,
		constructed: bool,
	) -> Option<Node<'a>> {
		let node = self.nodes.get(self.position).copied()?;
		if node.is_context(number, constructed) {
			self.position += 1;
			Some(node)
		} else {
			None
		}
	}

	/// Fail if any field was left unread.
	pub(crate) fn finish(self) -> der::Result<()> {
		match self.nodes.get(self.position) {
			Some(node) => Err(der::ErrorKind::TagUnexpected {
				expected: None,
				actual: node.tag,
			}
			.into()),
			None => Ok(()),
		}
	}
}

/// The algorithm of an `AlgorithmIdentifier`, parameters are ignored.
pub(crate) fn algorithm_oid(node: &Node<'_>) -> der::Result<ObjectIdentifier> {
	node.assert_tag(Tag::Sequence)?
		.fields()?
		.next_tagged(Tag::ObjectIdentifier)?
		.oid()
}

#[cfg(test)]
mod test {
	use super::*;

	// SEQUENCE { OID 2.5.4.3, [0] { NULL }, OCTET STRING 0x01 0x02 }
	const SAMPLE: &[u8] = &[
		0x30, 0x0d, 0x06, 0x03, 0x55, 0x04, 0x03, 0xa0, 0x02, 0x05, 0x00, 0x04,
		0x02, 0x01, 0x02,
	];

	#[test]
	fn parses_nested_nodes() {
		let root =
			Node::parse(SAMPLE).unwrap().assert_tag(Tag::Sequence).unwrap();
		assert_eq!(root.raw(), SAMPLE);
		assert_eq!(root.value, &SAMPLE[2..]);

		let mut fields = root.fields().unwrap();
		let oid = fields.next_tagged(Tag::ObjectIdentifier).unwrap();
		assert_eq!(oid.oid().unwrap(), ObjectIdentifier::new_unwrap("2.5.4.3"));

		let explicit = fields.optional_context(TagNumber::N0, true).unwrap();
		assert_eq!(explicit.raw(), &SAMPLE[7..11]);
		assert_eq!(explicit.children().unwrap()[0].tag(), Tag::Null);

		assert!(fields.optional_context(TagNumber::N1, false).is_none());
		let octets = fields.next_field().unwrap();
		assert_eq!(octets.octet_string().unwrap(), &[0x01, 0x02]);
		fields.finish().unwrap();
	}

	#[test]
	fn rejects_truncated_input() {
		assert!(Node::parse(&SAMPLE[..SAMPLE.len() - 1]).is_err());
		assert!(Node::parse(&[]).is_err());
	}

	#[test]
	fn rejects_trailing_bytes() {
		let mut bytes = SAMPLE.to_vec();
		bytes.push(0x00);
		assert!(Node::parse(&bytes).is_err());
	}

	#[test]
	fn rejects_lengths_past_the_parent() {
		// Inner OCTET STRING claims 5 bytes inside a 4 byte SEQUENCE.
		let bytes = [0x30, 0x04, 0x04, 0x05, 0x01, 0x02];
		let root = Node::parse(&bytes).unwrap();
		assert!(root.children().is_err());
	}

	#[test]
	fn rejects_indefinite_length() {
		let bytes = [0x30, 0x80, 0x05, 0x00, 0x00, 0x00];
		assert!(Node::parse(&bytes).is_err());
	}

	#[test]
	fn missing_and_extra_fields_are_errors() {
		let root = Node::parse(SAMPLE).unwrap();

		let mut fields = root.fields().unwrap();
		for _ in 0..3 {
			fields.next_field().unwrap();
		}
		assert!(fields.next_field().is_err());

		let mut fields = root.fields().unwrap();
		fields.next_field().unwrap();
		assert!(fields.finish().is_err());
	}

	#[test]
	fn primitive_nodes_have_no_children() {
		let octets = Node::parse(&[0x04, 0x01, 0xff]).unwrap();
		assert!(octets.children().is_err());
	}

	#[test]
	fn algorithm_identifier_with_and_without_parameters() {
		// sha256, no parameters
		let bare = [
			0x30, 0x0b, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04,
			0x02, 0x01,
		];
		// rsaEncryption, NULL parameters
		let with_null = [
			0x30, 0x0d, 0x06, 0x09, 0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01,
			0x01, 0x01, 0x05, 0x00,
		];

		assert_eq!(
			algorithm_oid(&Node::parse(&bare).unwrap()).unwrap(),
			ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.1")
		);
		assert_eq!(
			algorithm_oid(&Node::parse(&with_null).unwrap()).unwrap(),
			ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1")
		);
	}
}
