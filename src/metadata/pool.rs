//! Constant pool decoding, encoding and append-only mutation.
//!
//! The constant pool is the symbol table of a class file: every name, descriptor, string
//! and member reference in the class is an index into it. This module provides the
//! [`crate::metadata::pool::ConstantPool`] model with three capabilities the rewriting
//! passes rely on:
//!
//! - **Lossless round-trip** - entries are decoded structurally but UTF-8 payloads are
//!   kept as raw bytes, so modified UTF-8 data survives re-encoding byte-for-byte.
//! - **Lazy resolution** - names and member references are resolved to `&str` only when
//!   a pass asks for them, never eagerly for the whole pool.
//! - **Append-only mutation** - new entries are deduplicated against existing ones and
//!   always appended. Existing indices are never moved or removed, which is what keeps
//!   every untouched attribute blob in the class valid after a rewrite.
//!
//! # Index Model
//!
//! Pool indices are 1-based; slot 0 is reserved and `long`/`double` entries occupy two
//! slots, with the trailing slot unusable. Both placeholders are represented explicitly
//! by [`crate::metadata::pool::PoolEntry::Unusable`] so that `Vec` positions equal pool
//! indices.

use std::collections::HashMap;

use crate::{
    file::{io::push_be, parser::Parser},
    Result,
};

/// Constant pool tag for `CONSTANT_Utf8`
pub const TAG_UTF8: u8 = 1;
/// Constant pool tag for `CONSTANT_Integer`
pub const TAG_INTEGER: u8 = 3;
/// Constant pool tag for `CONSTANT_Float`
pub const TAG_FLOAT: u8 = 4;
/// Constant pool tag for `CONSTANT_Long`
pub const TAG_LONG: u8 = 5;
/// Constant pool tag for `CONSTANT_Double`
pub const TAG_DOUBLE: u8 = 6;
/// Constant pool tag for `CONSTANT_Class`
pub const TAG_CLASS: u8 = 7;
/// Constant pool tag for `CONSTANT_String`
pub const TAG_STRING: u8 = 8;
/// Constant pool tag for `CONSTANT_Fieldref`
pub const TAG_FIELD_REF: u8 = 9;
/// Constant pool tag for `CONSTANT_Methodref`
pub const TAG_METHOD_REF: u8 = 10;
/// Constant pool tag for `CONSTANT_InterfaceMethodref`
pub const TAG_INTERFACE_METHOD_REF: u8 = 11;
/// Constant pool tag for `CONSTANT_NameAndType`
pub const TAG_NAME_AND_TYPE: u8 = 12;
/// Constant pool tag for `CONSTANT_MethodHandle`
pub const TAG_METHOD_HANDLE: u8 = 15;
/// Constant pool tag for `CONSTANT_MethodType`
pub const TAG_METHOD_TYPE: u8 = 16;
/// Constant pool tag for `CONSTANT_Dynamic`
pub const TAG_DYNAMIC: u8 = 17;
/// Constant pool tag for `CONSTANT_InvokeDynamic`
pub const TAG_INVOKE_DYNAMIC: u8 = 18;
/// Constant pool tag for `CONSTANT_Module`
pub const TAG_MODULE: u8 = 19;
/// Constant pool tag for `CONSTANT_Package`
pub const TAG_PACKAGE: u8 = 20;

/// One slot of the constant pool.
#[derive(Debug, Clone, PartialEq)]
pub enum PoolEntry {
    /// Slot 0 and the trailing slot of every 8-byte constant
    Unusable,
    /// Raw (modified) UTF-8 payload, kept uninterpreted for lossless round-trips
    Utf8(Vec<u8>),
    /// 32-bit integer constant
    Integer(i32),
    /// 32-bit float constant
    Float(f32),
    /// 64-bit integer constant (occupies two slots)
    Long(i64),
    /// 64-bit float constant (occupies two slots)
    Double(f64),
    /// Class or interface reference
    Class {
        /// Index of the `Utf8` entry holding the internal class name
        name_index: u16,
    },
    /// String literal
    String {
        /// Index of the `Utf8` entry holding the string payload
        string_index: u16,
    },
    /// Field reference
    FieldRef {
        /// Index of the owning `Class` entry
        class_index: u16,
        /// Index of the `NameAndType` entry
        name_and_type_index: u16,
    },
    /// Class method reference
    MethodRef {
        /// Index of the owning `Class` entry
        class_index: u16,
        /// Index of the `NameAndType` entry
        name_and_type_index: u16,
    },
    /// Interface method reference
    InterfaceMethodRef {
        /// Index of the owning `Class` entry
        class_index: u16,
        /// Index of the `NameAndType` entry
        name_and_type_index: u16,
    },
    /// Name and descriptor pair
    NameAndType {
        /// Index of the `Utf8` entry holding the member name
        name_index: u16,
        /// Index of the `Utf8` entry holding the member descriptor
        descriptor_index: u16,
    },
    /// Method handle
    MethodHandle {
        /// The kind of the handle (getter, invoker, constructor, ...)
        reference_kind: u8,
        /// Index of the referenced member entry
        reference_index: u16,
    },
    /// Method type
    MethodType {
        /// Index of the `Utf8` entry holding the method descriptor
        descriptor_index: u16,
    },
    /// Dynamically computed constant
    Dynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap_method_attr_index: u16,
        /// Index of the `NameAndType` entry
        name_and_type_index: u16,
    },
    /// Dynamically computed call site
    InvokeDynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap_method_attr_index: u16,
        /// Index of the `NameAndType` entry
        name_and_type_index: u16,
    },
    /// Module declaration
    Module {
        /// Index of the `Utf8` entry holding the module name
        name_index: u16,
    },
    /// Package declaration
    Package {
        /// Index of the `Utf8` entry holding the package name
        name_index: u16,
    },
}

/// Which kind of member a call or field instruction references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// A `CONSTANT_Fieldref` entry
    Field,
    /// A `CONSTANT_Methodref` entry
    Method,
    /// A `CONSTANT_InterfaceMethodref` entry
    InterfaceMethod,
}

/// A member reference resolved to its symbolic (owner, name, descriptor) triple.
///
/// Borrowed from the pool; valid as long as the pool is not mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberRef<'a> {
    /// Whether the entry is a field, class method or interface method reference
    pub kind: RefKind,
    /// Internal name of the owning class (e.g. `java/lang/Object`)
    pub owner: &'a str,
    /// Member name
    pub name: &'a str,
    /// Member descriptor (e.g. `(I)V`)
    pub descriptor: &'a str,
}

/// The constant pool of a single class.
///
/// Decoded once per transform call, mutated only by appending deduplicated entries, and
/// encoded once when the class is written back out.
pub struct ConstantPool {
    entries: Vec<PoolEntry>,
    utf8_lookup: HashMap<Vec<u8>, u16>,
    class_lookup: HashMap<u16, u16>,
    name_and_type_lookup: HashMap<(u16, u16), u16>,
    ref_lookup: HashMap<(u8, u16, u16), u16>,
}

impl ConstantPool {
    /// Create an empty pool containing only the reserved slot 0.
    #[must_use]
    pub fn new() -> Self {
        ConstantPool {
            entries: vec![PoolEntry::Unusable],
            utf8_lookup: HashMap::new(),
            class_lookup: HashMap::new(),
            name_and_type_lookup: HashMap::new(),
            ref_lookup: HashMap::new(),
        }
    }

    /// Decode a constant pool from the parser's current position.
    ///
    /// # Arguments
    /// * `parser` - Cursor positioned at the `constant_pool_count` word
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for unknown tags or a zero count, and
    /// [`crate::Error::OutOfBounds`] for truncated input.
    pub fn decode(parser: &mut Parser<'_>) -> Result<Self> {
        let count = parser.read_be::<u16>()? as usize;
        if count == 0 {
            return Err(malformed_error!("Constant pool count must be at least 1"));
        }

        let mut entries = Vec::with_capacity(count);
        entries.push(PoolEntry::Unusable);

        while entries.len() < count {
            let tag = parser.read_be::<u8>()?;
            match tag {
                TAG_UTF8 => {
                    let length = parser.read_be::<u16>()? as usize;
                    entries.push(PoolEntry::Utf8(parser.read_bytes(length)?.to_vec()));
                }
                TAG_INTEGER => entries.push(PoolEntry::Integer(parser.read_be::<i32>()?)),
                TAG_FLOAT => entries.push(PoolEntry::Float(parser.read_be::<f32>()?)),
                TAG_LONG => {
                    entries.push(PoolEntry::Long(parser.read_be::<i64>()?));
                    entries.push(PoolEntry::Unusable);
                }
                TAG_DOUBLE => {
                    entries.push(PoolEntry::Double(parser.read_be::<f64>()?));
                    entries.push(PoolEntry::Unusable);
                }
                TAG_CLASS => entries.push(PoolEntry::Class {
                    name_index: parser.read_be::<u16>()?,
                }),
                TAG_STRING => entries.push(PoolEntry::String {
                    string_index: parser.read_be::<u16>()?,
                }),
                TAG_FIELD_REF => entries.push(PoolEntry::FieldRef {
                    class_index: parser.read_be::<u16>()?,
                    name_and_type_index: parser.read_be::<u16>()?,
                }),
                TAG_METHOD_REF => entries.push(PoolEntry::MethodRef {
                    class_index: parser.read_be::<u16>()?,
                    name_and_type_index: parser.read_be::<u16>()?,
                }),
                TAG_INTERFACE_METHOD_REF => entries.push(PoolEntry::InterfaceMethodRef {
                    class_index: parser.read_be::<u16>()?,
                    name_and_type_index: parser.read_be::<u16>()?,
                }),
                TAG_NAME_AND_TYPE => entries.push(PoolEntry::NameAndType {
                    name_index: parser.read_be::<u16>()?,
                    descriptor_index: parser.read_be::<u16>()?,
                }),
                TAG_METHOD_HANDLE => entries.push(PoolEntry::MethodHandle {
                    reference_kind: parser.read_be::<u8>()?,
                    reference_index: parser.read_be::<u16>()?,
                }),
                TAG_METHOD_TYPE => entries.push(PoolEntry::MethodType {
                    descriptor_index: parser.read_be::<u16>()?,
                }),
                TAG_DYNAMIC => entries.push(PoolEntry::Dynamic {
                    bootstrap_method_attr_index: parser.read_be::<u16>()?,
                    name_and_type_index: parser.read_be::<u16>()?,
                }),
                TAG_INVOKE_DYNAMIC => entries.push(PoolEntry::InvokeDynamic {
                    bootstrap_method_attr_index: parser.read_be::<u16>()?,
                    name_and_type_index: parser.read_be::<u16>()?,
                }),
                TAG_MODULE => entries.push(PoolEntry::Module {
                    name_index: parser.read_be::<u16>()?,
                }),
                TAG_PACKAGE => entries.push(PoolEntry::Package {
                    name_index: parser.read_be::<u16>()?,
                }),
                _ => {
                    return Err(malformed_error!(
                        "Unknown constant pool tag {} in slot {}",
                        tag,
                        entries.len()
                    ))
                }
            }
        }

        let mut pool = ConstantPool {
            entries,
            utf8_lookup: HashMap::new(),
            class_lookup: HashMap::new(),
            name_and_type_lookup: HashMap::new(),
            ref_lookup: HashMap::new(),
        };
        pool.build_lookup();
        Ok(pool)
    }

    // Seed the dedup maps from decoded entries so appends reuse what the compiler
    // already interned. First occurrence wins for duplicated entries.
    fn build_lookup(&mut self) {
        for (position, entry) in self.entries.iter().enumerate() {
            let index = position as u16;
            match entry {
                PoolEntry::Utf8(bytes) => {
                    self.utf8_lookup.entry(bytes.clone()).or_insert(index);
                }
                PoolEntry::Class { name_index } => {
                    self.class_lookup.entry(*name_index).or_insert(index);
                }
                PoolEntry::NameAndType {
                    name_index,
                    descriptor_index,
                } => {
                    self.name_and_type_lookup
                        .entry((*name_index, *descriptor_index))
                        .or_insert(index);
                }
                PoolEntry::FieldRef {
                    class_index,
                    name_and_type_index,
                } => {
                    self.ref_lookup
                        .entry((TAG_FIELD_REF, *class_index, *name_and_type_index))
                        .or_insert(index);
                }
                PoolEntry::MethodRef {
                    class_index,
                    name_and_type_index,
                } => {
                    self.ref_lookup
                        .entry((TAG_METHOD_REF, *class_index, *name_and_type_index))
                        .or_insert(index);
                }
                PoolEntry::InterfaceMethodRef {
                    class_index,
                    name_and_type_index,
                } => {
                    self.ref_lookup
                        .entry((
                            TAG_INTERFACE_METHOD_REF,
                            *class_index,
                            *name_and_type_index,
                        ))
                        .or_insert(index);
                }
                _ => {}
            }
        }
    }

    /// Encode the pool into an output buffer, including the leading count word.
    pub fn encode(&self, out: &mut Vec<u8>) {
        push_be(out, self.entries.len() as u16);
        for entry in self.entries.iter().skip(1) {
            match entry {
                PoolEntry::Unusable => {}
                PoolEntry::Utf8(bytes) => {
                    push_be(out, TAG_UTF8);
                    push_be(out, bytes.len() as u16);
                    out.extend_from_slice(bytes);
                }
                PoolEntry::Integer(value) => {
                    push_be(out, TAG_INTEGER);
                    push_be(out, *value);
                }
                PoolEntry::Float(value) => {
                    push_be(out, TAG_FLOAT);
                    push_be(out, *value);
                }
                PoolEntry::Long(value) => {
                    push_be(out, TAG_LONG);
                    push_be(out, *value);
                }
                PoolEntry::Double(value) => {
                    push_be(out, TAG_DOUBLE);
                    push_be(out, *value);
                }
                PoolEntry::Class { name_index } => {
                    push_be(out, TAG_CLASS);
                    push_be(out, *name_index);
                }
                PoolEntry::String { string_index } => {
                    push_be(out, TAG_STRING);
                    push_be(out, *string_index);
                }
                PoolEntry::FieldRef {
                    class_index,
                    name_and_type_index,
                } => {
                    push_be(out, TAG_FIELD_REF);
                    push_be(out, *class_index);
                    push_be(out, *name_and_type_index);
                }
                PoolEntry::MethodRef {
                    class_index,
                    name_and_type_index,
                } => {
                    push_be(out, TAG_METHOD_REF);
                    push_be(out, *class_index);
                    push_be(out, *name_and_type_index);
                }
                PoolEntry::InterfaceMethodRef {
                    class_index,
                    name_and_type_index,
                } => {
                    push_be(out, TAG_INTERFACE_METHOD_REF);
                    push_be(out, *class_index);
                    push_be(out, *name_and_type_index);
                }
                PoolEntry::NameAndType {
                    name_index,
                    descriptor_index,
                } => {
                    push_be(out, TAG_NAME_AND_TYPE);
                    push_be(out, *name_index);
                    push_be(out, *descriptor_index);
                }
                PoolEntry::MethodHandle {
                    reference_kind,
                    reference_index,
                } => {
                    push_be(out, TAG_METHOD_HANDLE);
                    push_be(out, *reference_kind);
                    push_be(out, *reference_index);
                }
                PoolEntry::MethodType { descriptor_index } => {
                    push_be(out, TAG_METHOD_TYPE);
                    push_be(out, *descriptor_index);
                }
                PoolEntry::Dynamic {
                    bootstrap_method_attr_index,
                    name_and_type_index,
                } => {
                    push_be(out, TAG_DYNAMIC);
                    push_be(out, *bootstrap_method_attr_index);
                    push_be(out, *name_and_type_index);
                }
                PoolEntry::InvokeDynamic {
                    bootstrap_method_attr_index,
                    name_and_type_index,
                } => {
                    push_be(out, TAG_INVOKE_DYNAMIC);
                    push_be(out, *bootstrap_method_attr_index);
                    push_be(out, *name_and_type_index);
                }
                PoolEntry::Module { name_index } => {
                    push_be(out, TAG_MODULE);
                    push_be(out, *name_index);
                }
                PoolEntry::Package { name_index } => {
                    push_be(out, TAG_PACKAGE);
                    push_be(out, *name_index);
                }
            }
        }
    }

    /// Number of pool slots, including the reserved slot 0.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the pool holds no usable entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    /// Look up the entry at `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the index is outside the pool.
    pub fn entry(&self, index: u16) -> Result<&PoolEntry> {
        self.entries
            .get(index as usize)
            .ok_or_else(|| malformed_error!("Constant pool index {} out of range", index))
    }

    /// Resolve the raw byte payload of the `Utf8` entry at `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the slot is not a `Utf8` entry.
    pub fn utf8_bytes(&self, index: u16) -> Result<&[u8]> {
        match self.entry(index)? {
            PoolEntry::Utf8(bytes) => Ok(bytes),
            _ => Err(malformed_error!(
                "Constant pool index {} is not a Utf8 entry",
                index
            )),
        }
    }

    /// Resolve the `Utf8` entry at `index` as a string slice.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the slot is not a `Utf8` entry or the
    /// payload is not valid UTF-8. Names and descriptors, the only payloads the
    /// rewriting passes resolve, are plain ASCII in practice.
    pub fn utf8(&self, index: u16) -> Result<&str> {
        std::str::from_utf8(self.utf8_bytes(index)?)
            .map_err(|_| malformed_error!("Constant pool index {} is not valid UTF-8", index))
    }

    /// Resolve the internal name of the `Class` entry at `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the slot is not a `Class` entry.
    pub fn class_name(&self, index: u16) -> Result<&str> {
        match self.entry(index)? {
            PoolEntry::Class { name_index } => self.utf8(*name_index),
            _ => Err(malformed_error!(
                "Constant pool index {} is not a Class entry",
                index
            )),
        }
    }

    /// Resolve a field/method reference entry to its symbolic triple.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the slot is not a member reference or any
    /// of the entries it points at is of the wrong kind.
    pub fn member_ref(&self, index: u16) -> Result<MemberRef<'_>> {
        let (kind, class_index, name_and_type_index) = match self.entry(index)? {
            PoolEntry::FieldRef {
                class_index,
                name_and_type_index,
            } => (RefKind::Field, *class_index, *name_and_type_index),
            PoolEntry::MethodRef {
                class_index,
                name_and_type_index,
            } => (RefKind::Method, *class_index, *name_and_type_index),
            PoolEntry::InterfaceMethodRef {
                class_index,
                name_and_type_index,
            } => (RefKind::InterfaceMethod, *class_index, *name_and_type_index),
            _ => {
                return Err(malformed_error!(
                    "Constant pool index {} is not a member reference",
                    index
                ))
            }
        };

        let (name_index, descriptor_index) = match self.entry(name_and_type_index)? {
            PoolEntry::NameAndType {
                name_index,
                descriptor_index,
            } => (*name_index, *descriptor_index),
            _ => {
                return Err(malformed_error!(
                    "Constant pool index {} is not a NameAndType entry",
                    name_and_type_index
                ))
            }
        };

        Ok(MemberRef {
            kind,
            owner: self.class_name(class_index)?,
            name: self.utf8(name_index)?,
            descriptor: self.utf8(descriptor_index)?,
        })
    }

    fn push(&mut self, entry: PoolEntry) -> Result<u16> {
        if self.entries.len() >= usize::from(u16::MAX) {
            return Err(malformed_error!(
                "Constant pool limit of {} entries exceeded",
                u16::MAX - 1
            ));
        }

        let index = self.entries.len() as u16;
        self.entries.push(entry);
        Ok(index)
    }

    /// Intern a UTF-8 string, returning the index of an existing or appended entry.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the pool is full.
    pub fn add_utf8(&mut self, value: &str) -> Result<u16> {
        if let Some(&index) = self.utf8_lookup.get(value.as_bytes()) {
            return Ok(index);
        }

        let index = self.push(PoolEntry::Utf8(value.as_bytes().to_vec()))?;
        self.utf8_lookup.insert(value.as_bytes().to_vec(), index);
        Ok(index)
    }

    /// Intern a `Class` entry for the given internal name.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the pool is full.
    pub fn add_class(&mut self, name: &str) -> Result<u16> {
        let name_index = self.add_utf8(name)?;
        if let Some(&index) = self.class_lookup.get(&name_index) {
            return Ok(index);
        }

        let index = self.push(PoolEntry::Class { name_index })?;
        self.class_lookup.insert(name_index, index);
        Ok(index)
    }

    /// Intern a `NameAndType` entry.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the pool is full.
    pub fn add_name_and_type(&mut self, name: &str, descriptor: &str) -> Result<u16> {
        let name_index = self.add_utf8(name)?;
        let descriptor_index = self.add_utf8(descriptor)?;
        if let Some(&index) = self
            .name_and_type_lookup
            .get(&(name_index, descriptor_index))
        {
            return Ok(index);
        }

        let index = self.push(PoolEntry::NameAndType {
            name_index,
            descriptor_index,
        })?;
        self.name_and_type_lookup
            .insert((name_index, descriptor_index), index);
        Ok(index)
    }

    fn add_ref(&mut self, tag: u8, owner: &str, name: &str, descriptor: &str) -> Result<u16> {
        let class_index = self.add_class(owner)?;
        let name_and_type_index = self.add_name_and_type(name, descriptor)?;
        if let Some(&index) = self
            .ref_lookup
            .get(&(tag, class_index, name_and_type_index))
        {
            return Ok(index);
        }

        let entry = match tag {
            TAG_FIELD_REF => PoolEntry::FieldRef {
                class_index,
                name_and_type_index,
            },
            TAG_INTERFACE_METHOD_REF => PoolEntry::InterfaceMethodRef {
                class_index,
                name_and_type_index,
            },
            _ => PoolEntry::MethodRef {
                class_index,
                name_and_type_index,
            },
        };
        let index = self.push(entry)?;
        self.ref_lookup
            .insert((tag, class_index, name_and_type_index), index);
        Ok(index)
    }

    /// Intern a `Fieldref` entry for the symbolic triple.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the pool is full.
    pub fn add_field_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> Result<u16> {
        self.add_ref(TAG_FIELD_REF, owner, name, descriptor)
    }

    /// Intern a `Methodref` entry for the symbolic triple.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the pool is full.
    pub fn add_method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> Result<u16> {
        self.add_ref(TAG_METHOD_REF, owner, name, descriptor)
    }

    /// Intern an `InterfaceMethodref` entry for the symbolic triple.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the pool is full.
    pub fn add_interface_method_ref(
        &mut self,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Result<u16> {
        self.add_ref(TAG_INTERFACE_METHOD_REF, owner, name, descriptor)
    }
}

impl Default for ConstantPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_utf8_dedups() {
        let mut pool = ConstantPool::new();
        let first = pool.add_utf8("hello").unwrap();
        let second = pool.add_utf8("hello").unwrap();
        assert_eq!(first, second);
        assert_eq!(pool.utf8(first).unwrap(), "hello");
    }

    #[test]
    fn add_method_ref_builds_dependent_entries() {
        let mut pool = ConstantPool::new();
        let index = pool
            .add_method_ref("java/lang/Object", "hashCode", "()I")
            .unwrap();

        let member = pool.member_ref(index).unwrap();
        assert_eq!(member.kind, RefKind::Method);
        assert_eq!(member.owner, "java/lang/Object");
        assert_eq!(member.name, "hashCode");
        assert_eq!(member.descriptor, "()I");
    }

    #[test]
    fn add_refs_distinguish_kinds() {
        let mut pool = ConstantPool::new();
        let method = pool.add_method_ref("a/B", "run", "()V").unwrap();
        let interface = pool.add_interface_method_ref("a/B", "run", "()V").unwrap();
        assert_ne!(method, interface);
        assert_eq!(
            pool.member_ref(interface).unwrap().kind,
            RefKind::InterfaceMethod
        );
    }

    #[test]
    fn encode_decode_round_trip() {
        let mut pool = ConstantPool::new();
        pool.add_class("com/example/Widget").unwrap();
        pool.add_method_ref("com/example/Widget", "spin", "(J)V")
            .unwrap();
        pool.push(PoolEntry::Long(42)).unwrap();
        pool.push(PoolEntry::Unusable).unwrap();
        pool.push(PoolEntry::Integer(-7)).unwrap();

        let mut encoded = Vec::new();
        pool.encode(&mut encoded);

        let mut parser = Parser::new(&encoded);
        let decoded = ConstantPool::decode(&mut parser).unwrap();
        assert_eq!(decoded.len(), pool.len());
        assert_eq!(decoded.class_name(2).unwrap(), "com/example/Widget");
    }

    #[test]
    fn decode_rejects_unknown_tag() {
        // count = 2, tag = 99
        let data = [0x00, 0x02, 0x63];
        let mut parser = Parser::new(&data);
        assert!(ConstantPool::decode(&mut parser).is_err());
    }

    #[test]
    fn decoded_entries_seed_dedup() {
        let mut pool = ConstantPool::new();
        pool.add_class("com/example/Widget").unwrap();
        let before = pool.len();

        let mut encoded = Vec::new();
        pool.encode(&mut encoded);
        let mut parser = Parser::new(&encoded);
        let mut decoded = ConstantPool::decode(&mut parser).unwrap();

        decoded.add_class("com/example/Widget").unwrap();
        assert_eq!(decoded.len(), before);
    }

    #[test]
    fn member_ref_rejects_wrong_entry() {
        let mut pool = ConstantPool::new();
        let index = pool.add_utf8("not a ref").unwrap();
        assert!(pool.member_ref(index).is_err());
    }
}
