//! Field and method entries.

use crate::{
    file::{io::push_be, parser::Parser},
    metadata::{
        attributes::{decode_attributes, encode_attributes, Attribute},
        flags::AccessFlags,
        pool::ConstantPool,
    },
    Result,
};

/// A field or method entry of a class.
///
/// Fields and methods share one layout in the class file format; what distinguishes them
/// is which table they sit in. Attributes (bytecode, annotations, signatures) are carried
/// raw.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    /// Access and property modifiers
    pub access: AccessFlags,
    /// Pool index of the `Utf8` entry holding the member name
    pub name_index: u16,
    /// Pool index of the `Utf8` entry holding the member descriptor
    pub descriptor_index: u16,
    /// The member's attributes, carried uninterpreted
    pub attributes: Vec<Attribute>,
}

impl Member {
    /// Resolve this member's name through the constant pool.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the index does not resolve to a `Utf8` entry.
    pub fn name<'a>(&self, pool: &'a ConstantPool) -> Result<&'a str> {
        pool.utf8(self.name_index)
    }

    /// Resolve this member's descriptor through the constant pool.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the index does not resolve to a `Utf8` entry.
    pub fn descriptor<'a>(&self, pool: &'a ConstantPool) -> Result<&'a str> {
        pool.utf8(self.descriptor_index)
    }

    /// Decode one field or method entry from the parser's current position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for truncated input.
    pub fn decode(parser: &mut Parser<'_>) -> Result<Self> {
        let access = AccessFlags::from_raw(parser.read_be::<u16>()?);
        let name_index = parser.read_be::<u16>()?;
        let descriptor_index = parser.read_be::<u16>()?;
        let attributes = decode_attributes(parser)?;
        Ok(Member {
            access,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    /// Encode this member into an output buffer.
    pub fn encode(&self, out: &mut Vec<u8>) {
        push_be(out, self.access.bits());
        push_be(out, self.name_index);
        push_be(out, self.descriptor_index);
        encode_attributes(&self.attributes, out);
    }
}
