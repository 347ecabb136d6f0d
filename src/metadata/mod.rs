//! Definitions, parsing and encoding of the class file format.
//!
//! This module implements the structural codec the transformation pipeline is built on.
//! It provides decoding of raw class bytes into a traversable structural model and
//! encoding of a (possibly mutated) model back to bytes.
//!
//! # Key Components
//!
//! ## Structural Model
//! - [`crate::metadata::classfile::ClassFile`] - The decoded class: header, constant
//!   pool, interfaces, fields, methods, attributes
//! - [`crate::metadata::member::Member`] - One field or method entry
//! - [`crate::metadata::attributes::Attribute`] - An uninterpreted attribute payload
//! - [`crate::metadata::flags::AccessFlags`] - Modifier bitflags with visibility helpers
//!
//! ## Constant Pool
//! - [`crate::metadata::pool::ConstantPool`] - Lossless decode/encode with lazy name
//!   resolution and append-only, deduplicated mutation
//!
//! ## Annotation Metadata
//! - [`crate::metadata::annotations`] - Structural reader for the annotation attributes
//!   that carry environment tags
//!
//! ## Synthesis
//! - [`crate::metadata::builder::ClassFileBuilder`] - Programmatic construction of
//!   small class files for tests and host shims

pub mod annotations;
pub mod attributes;
pub mod builder;
pub mod classfile;
pub mod flags;
pub mod member;
pub mod pool;
