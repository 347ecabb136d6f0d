//! # classweave Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the classweave library. Import this module to get quick access to the essential
//! types for class file analysis and load-time transformation.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all classweave operations
pub use crate::Error;

/// The result type used throughout classweave
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// The decoded structural form of a class file
pub use crate::ClassFile;

/// The load-time class transformer
pub use crate::ClassTransformer;

/// Low-level file parsing utilities
pub use crate::{File, Parser};

// ================================================================================================
// Structural Codec
// ================================================================================================

/// Access flag bitflags with visibility helpers
pub use crate::metadata::flags::AccessFlags;

/// Constant pool access and mutation
pub use crate::metadata::pool::{ConstantPool, MemberRef, PoolEntry, RefKind};

/// Raw attribute payloads
pub use crate::metadata::attributes::Attribute;

/// Field and method entries
pub use crate::metadata::member::Member;

/// Programmatic class construction
pub use crate::metadata::builder::{
    AnnotationDef, ClassFileBuilder, CodeDef, FieldDef, MethodDef,
};

// ================================================================================================
// Disassembler
// ================================================================================================

/// Opcode constants and the bytecode walker
pub use crate::disassembler::{opcodes, CodeCursor};

// ================================================================================================
// Transformation Pipeline
// ================================================================================================

/// The per-call execution context
pub use crate::transform::LoadContext;

/// The managed-namespace predicate
pub use crate::transform::is_game_class;

/// The game byte provider capability interface
pub use crate::transform::GameByteSource;

/// The physical side a process runs as
pub use crate::transform::environment::EnvironmentType;

/// Pass composition over a shared structural walk
pub use crate::transform::chain::{ClassPass, PassChain};

/// Call-site redirection
pub use crate::transform::redirect::{rewrite_calls, CallRedirect, GUAVA_REDIRECTS};

/// Visibility rewriting passes and the widen directive interface
pub use crate::transform::access::{AccessWidener, PackageAccessFixer, WidenRules};

/// Environment stripping, scan and strip phases
pub use crate::transform::strip::{ClassStripper, StripScan};
