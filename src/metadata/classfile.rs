//! The decoded structural form of a class file.
//!
//! [`crate::metadata::classfile::ClassFile`] is the unit the transformation pipeline
//! works on: one decode produces the structural form, every active pass observes and
//! mutates that one form during a shared walk, and one encode produces the output bytes.
//!
//! # What Is (And Is Not) Decoded
//!
//! The fixed skeleton — version, constant pool, access flags, the interface, field and
//! method tables — is decoded structurally. Attribute payloads, including method
//! bytecode, are carried as raw bytes. This split is deliberate:
//!
//! - Classes that are scanned and found clean never pay for instruction decoding.
//! - Attribute payloads the passes don't understand cannot be damaged.
//! - Appending to the constant pool leaves every payload's indices valid, so encoding
//!   is a straight serialization with no fix-up pass.
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use classweave::ClassFile;
//! use std::path::Path;
//!
//! let class = ClassFile::from_file(Path::new("Widget.class"))?;
//! println!("class {} with {} methods", class.name()?, class.methods.len());
//! # Ok::<(), classweave::Error>(())
//! ```

use std::path::Path;

use crate::{
    file::{io::push_be, parser::Parser, File},
    metadata::{
        attributes::{decode_attributes, encode_attributes, Attribute},
        flags::AccessFlags,
        member::Member,
        pool::ConstantPool,
    },
    Error, Result,
};

/// The magic number every class file starts with.
pub const CLASS_MAGIC: u32 = 0xCAFE_BABE;

/// A decoded class file.
///
/// Field order mirrors the on-disk layout. All parts are public: the transformation
/// passes are cooperating modules of this crate, and hosts embedding the library get
/// the same structural access.
pub struct ClassFile {
    /// Minor format version
    pub minor_version: u16,
    /// Major format version (e.g. 52 for Java 8)
    pub major_version: u16,
    /// The constant pool
    pub pool: ConstantPool,
    /// Class access and property modifiers
    pub access: AccessFlags,
    /// Pool index of this class's `Class` entry
    pub this_class: u16,
    /// Pool index of the superclass's `Class` entry, or 0 for `java/lang/Object`
    pub super_class: u16,
    /// Pool indices of the directly implemented interfaces, in declaration order
    pub interfaces: Vec<u16>,
    /// Field entries, in declaration order
    pub fields: Vec<Member>,
    /// Method entries, in declaration order
    pub methods: Vec<Member>,
    /// Class-level attributes, carried uninterpreted
    pub attributes: Vec<Attribute>,
}

impl ClassFile {
    /// Decode a class from raw bytes.
    ///
    /// # Arguments
    /// * `data` - The raw class file bytes
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] for empty input, [`crate::Error::NotSupported`]
    /// if the magic number is missing, and [`crate::Error::Malformed`] /
    /// [`crate::Error::OutOfBounds`] for structurally broken input. All decode failures
    /// are fatal for the affected class's load.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::Empty);
        }

        let mut parser = Parser::new(data);
        if parser.read_be::<u32>()? != CLASS_MAGIC {
            return Err(Error::NotSupported);
        }

        let minor_version = parser.read_be::<u16>()?;
        let major_version = parser.read_be::<u16>()?;
        let pool = ConstantPool::decode(&mut parser)?;

        let access = AccessFlags::from_raw(parser.read_be::<u16>()?);
        let this_class = parser.read_be::<u16>()?;
        let super_class = parser.read_be::<u16>()?;

        let interface_count = parser.read_be::<u16>()? as usize;
        let mut interfaces = Vec::with_capacity(interface_count);
        for _ in 0..interface_count {
            interfaces.push(parser.read_be::<u16>()?);
        }

        let field_count = parser.read_be::<u16>()? as usize;
        let mut fields = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            fields.push(Member::decode(&mut parser)?);
        }

        let method_count = parser.read_be::<u16>()? as usize;
        let mut methods = Vec::with_capacity(method_count);
        for _ in 0..method_count {
            methods.push(Member::decode(&mut parser)?);
        }

        let attributes = decode_attributes(&mut parser)?;

        Ok(ClassFile {
            minor_version,
            major_version,
            pool,
            access,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    /// Decode a class file from disk via a memory mapping.
    ///
    /// # Arguments
    /// * `path` - Path of the class file
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] for I/O failures, otherwise the same errors
    /// as [`ClassFile::decode`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::from_file(path)?;
        Self::decode(file.data())
    }

    /// Encode this class back into bytes.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(512);
        push_be(&mut out, CLASS_MAGIC);
        push_be(&mut out, self.minor_version);
        push_be(&mut out, self.major_version);
        self.pool.encode(&mut out);

        push_be(&mut out, self.access.bits());
        push_be(&mut out, self.this_class);
        push_be(&mut out, self.super_class);

        push_be(&mut out, self.interfaces.len() as u16);
        for interface in &self.interfaces {
            push_be(&mut out, *interface);
        }

        push_be(&mut out, self.fields.len() as u16);
        for field in &self.fields {
            field.encode(&mut out);
        }

        push_be(&mut out, self.methods.len() as u16);
        for method in &self.methods {
            method.encode(&mut out);
        }

        encode_attributes(&self.attributes, &mut out);
        out
    }

    /// The internal name of this class (e.g. `com/example/Widget`).
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `this_class` does not resolve.
    pub fn name(&self) -> Result<&str> {
        self.pool.class_name(self.this_class)
    }

    /// Resolve the internal names of the implemented interfaces, in order.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if any interface index does not resolve.
    pub fn interface_names(&self) -> Result<Vec<&str>> {
        self.interfaces
            .iter()
            .map(|&index| self.pool.class_name(index))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(ClassFile::decode(&[]), Err(Error::Empty)));
    }

    #[test]
    fn rejects_wrong_magic() {
        let data = [0x4D, 0x5A, 0x00, 0x00, 0x00, 0x00];
        assert!(matches!(
            ClassFile::decode(&data),
            Err(Error::NotSupported)
        ));
    }

    #[test]
    fn rejects_truncated_header() {
        let data = [0xCA, 0xFE, 0xBA, 0xBE, 0x00];
        assert!(ClassFile::decode(&data).is_err());
    }

    #[test]
    fn minimal_class_round_trip() {
        let mut pool = ConstantPool::new();
        let this_class = pool.add_class("com/example/Widget").unwrap();
        let super_class = pool.add_class("java/lang/Object").unwrap();

        let class = ClassFile {
            minor_version: 0,
            major_version: 52,
            pool,
            access: AccessFlags::PUBLIC | AccessFlags::SUPER,
            this_class,
            super_class,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        };

        let encoded = class.encode();
        let decoded = ClassFile::decode(&encoded).unwrap();
        assert_eq!(decoded.major_version, 52);
        assert_eq!(decoded.name().unwrap(), "com/example/Widget");
        assert_eq!(decoded.access, AccessFlags::PUBLIC | AccessFlags::SUPER);
        assert_eq!(decoded.encode(), encoded);
    }
}
