//! Raw attribute representation.
//!
//! Attributes carry everything the fixed class file structures do not: bytecode,
//! annotations, line tables, signatures. The codec deliberately keeps every attribute as
//! an opaque `(name, bytes)` pair:
//!
//! - Untouched attributes round-trip byte-for-byte, so a rewrite can never corrupt data
//!   it does not understand.
//! - Because the pool is append-only, constant indices inside attribute payloads stay
//!   valid without re-encoding the payloads.
//! - Decoding a class never touches instruction bytes; only the passes that need a
//!   specific attribute (`Code`, the annotation attributes) look inside it.

use crate::{
    file::{io::push_be, parser::Parser},
    metadata::pool::ConstantPool,
    Result,
};

/// Name of the attribute holding a method's bytecode.
pub const CODE: &str = "Code";
/// Name of the attribute holding runtime-visible annotations.
pub const RUNTIME_VISIBLE_ANNOTATIONS: &str = "RuntimeVisibleAnnotations";
/// Name of the attribute holding runtime-invisible (class-retention) annotations.
pub const RUNTIME_INVISIBLE_ANNOTATIONS: &str = "RuntimeInvisibleAnnotations";

/// A single attribute, carried as an uninterpreted payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Pool index of the `Utf8` entry naming this attribute
    pub name_index: u16,
    /// The raw attribute payload
    pub info: Vec<u8>,
}

impl Attribute {
    /// Resolve this attribute's name through the constant pool.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the name index does not resolve to a
    /// `Utf8` entry.
    pub fn name<'a>(&self, pool: &'a ConstantPool) -> Result<&'a str> {
        pool.utf8(self.name_index)
    }

    /// Decode one attribute from the parser's current position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for truncated input.
    pub fn decode(parser: &mut Parser<'_>) -> Result<Self> {
        let name_index = parser.read_be::<u16>()?;
        let length = parser.read_be::<u32>()? as usize;
        let info = parser.read_bytes(length)?.to_vec();
        Ok(Attribute { name_index, info })
    }

    /// Encode this attribute into an output buffer.
    pub fn encode(&self, out: &mut Vec<u8>) {
        push_be(out, self.name_index);
        push_be(out, self.info.len() as u32);
        out.extend_from_slice(&self.info);
    }
}

/// Decode a `u16`-counted attribute table.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] for truncated input.
pub fn decode_attributes(parser: &mut Parser<'_>) -> Result<Vec<Attribute>> {
    let count = parser.read_be::<u16>()? as usize;
    let mut attributes = Vec::with_capacity(count);
    for _ in 0..count {
        attributes.push(Attribute::decode(parser)?);
    }
    Ok(attributes)
}

/// Encode an attribute table, including its count word.
pub fn encode_attributes(attributes: &[Attribute], out: &mut Vec<u8>) {
    push_be(out, attributes.len() as u16);
    for attribute in attributes {
        attribute.encode(out);
    }
}

/// Returns `true` if the attribute is one of the two annotation-carrying attributes.
///
/// Environment tags can live in either: runtime-visible for annotations with runtime
/// retention, runtime-invisible for class retention.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the attribute name cannot be resolved.
pub fn is_annotation_attribute(attribute: &Attribute, pool: &ConstantPool) -> Result<bool> {
    let name = attribute.name(pool)?;
    Ok(name == RUNTIME_VISIBLE_ANNOTATIONS || name == RUNTIME_INVISIBLE_ANNOTATIONS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_round_trip() {
        let attribute = Attribute {
            name_index: 7,
            info: vec![0xDE, 0xAD, 0xBE, 0xEF],
        };

        let mut encoded = Vec::new();
        attribute.encode(&mut encoded);
        assert_eq!(encoded[..2], [0x00, 0x07]);
        assert_eq!(encoded[2..6], [0x00, 0x00, 0x00, 0x04]);

        let mut parser = Parser::new(&encoded);
        let decoded = Attribute::decode(&mut parser).unwrap();
        assert_eq!(decoded, attribute);
    }

    #[test]
    fn attribute_table_round_trip() {
        let attributes = vec![
            Attribute {
                name_index: 1,
                info: vec![],
            },
            Attribute {
                name_index: 2,
                info: vec![0x01],
            },
        ];

        let mut encoded = Vec::new();
        encode_attributes(&attributes, &mut encoded);

        let mut parser = Parser::new(&encoded);
        let decoded = decode_attributes(&mut parser).unwrap();
        assert_eq!(decoded, attributes);
    }

    #[test]
    fn truncated_attribute_fails() {
        // name_index = 1, declared length 10, only 2 payload bytes
        let data = [0x00, 0x01, 0x00, 0x00, 0x00, 0x0A, 0x01, 0x02];
        let mut parser = Parser::new(&data);
        assert!(Attribute::decode(&mut parser).is_err());
    }

    #[test]
    fn recognizes_annotation_attributes() {
        let mut pool = ConstantPool::new();
        let visible = pool.add_utf8(RUNTIME_VISIBLE_ANNOTATIONS).unwrap();
        let code = pool.add_utf8(CODE).unwrap();

        let annotation_attribute = Attribute {
            name_index: visible,
            info: vec![],
        };
        let code_attribute = Attribute {
            name_index: code,
            info: vec![],
        };
        assert!(is_annotation_attribute(&annotation_attribute, &pool).unwrap());
        assert!(!is_annotation_attribute(&code_attribute, &pool).unwrap());
    }
}
