// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]
//#![deny(unsafe_code)]
// - 'file/mod.rs' uses mmap to map a file into memory

//! # classweave
//!
//! A framework for load-time analysis and rewriting of JVM class files. Built in pure
//! Rust, `classweave` decodes compiled class bytes into a traversable structural model,
//! applies composable rewriting passes over a single shared walk, and encodes the result
//! back to bytes a classloader can define — without requiring a JVM.
//!
//! ## Features
//!
//! - **📦 Lossless structural codec** - One decode and one encode per class, with
//!   untouched attribute payloads carried byte-for-byte
//! - **🔗 Composable passes** - Independent rewrites observe the same walk in a fixed
//!   precedence chain, so a class is never decoded twice
//! - **🧹 Environment stripping** - Metadata-only scanning removes side-specific
//!   members, or fails the load when a whole class cannot exist here
//! - **🔓 Visibility rewriting** - Package access fixing and directive-driven access
//!   widening
//! - **🎯 Call redirection** - Patches call sites against renamed/removed library APIs
//!   without shifting a single instruction offset
//! - **🛡️ Memory safe** - Bounds-checked parsing with comprehensive error handling
//!
//! ## Quick Start
//!
//! Add `classweave` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! classweave = "0.2"
//! ```
//!
//! ### Using the Prelude
//!
//! For convenient access to the most commonly used types, import the prelude:
//!
//! ```rust,no_run
//! use classweave::prelude::*;
//!
//! let widener = WidenRules::new();
//! let transformer = ClassTransformer::new(&widener);
//! let ctx = LoadContext {
//!     is_development: false,
//!     environment: EnvironmentType::Client,
//!     requires_package_access_hack: true,
//! };
//!
//! let bytes = std::fs::read("Widget.class")?;
//! let transformed = transformer.transform(&ctx, "net.minecraft.Widget", &bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### Structural Analysis
//!
//! ```rust,no_run
//! use classweave::ClassFile;
//! use std::path::Path;
//!
//! let class = ClassFile::from_file(Path::new("Widget.class"))?;
//! println!("class {}", class.name()?);
//! for method in &class.methods {
//!     println!("  {}{}", method.name(&class.pool)?, method.descriptor(&class.pool)?);
//! }
//! # Ok::<(), classweave::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `classweave` is organized into several key modules:
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`metadata`] - The structural codec: constant pool, members, attributes, builders
//! - [`disassembler`] - Instruction stream walking for the `Code` attribute
//! - [`transform`] - The conditional transformation pipeline and its passes
//! - [`Error`] and [`Result`] - Comprehensive error handling
//!
//! ### The Transformation Pipeline
//!
//! The [`transform::ClassTransformer`] is the main entry point for load-time use. Per
//! class it runs the unconditional call-redirect cycle, then decides which conditional
//! passes apply (package access fixing, environment stripping, access widening),
//! composes the active ones into a single visitor chain, and pays for at most one
//! structural decode/encode cycle. Classes needing no structural change pass through
//! untouched.
//!
//! External collaborators — the widen directive set and the game byte provider — are
//! consumed through narrow capability traits ([`transform::access::AccessWidener`],
//! [`transform::GameByteSource`]) injected into the transformer, keeping the pipeline
//! testable without a host runtime.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result) with comprehensive error
//! information:
//!
//! ```rust,no_run
//! use classweave::{ClassFile, Error};
//!
//! match ClassFile::from_file(std::path::Path::new("Widget.class")) {
//!     Ok(class) => println!("Decoded successfully"),
//!     Err(Error::NotSupported) => println!("Not a class file"),
//!     Err(Error::Malformed { message, .. }) => println!("Malformed class: {}", message),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! ## Thread Safety
//!
//! A transform call reads process-wide frozen tables and writes only per-call buffers.
//! The entry points take `&self` and may be driven concurrently from parallel
//! class-loading threads; there is no interior mutability anywhere in the pipeline.

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

/// Convenient re-exports of the most commonly used types and traits.
///
/// This module provides a curated selection of the most frequently used types
/// from across the classweave library, allowing for convenient glob imports.
///
/// # Example
///
/// ```rust,no_run
/// use classweave::prelude::*;
///
/// let class = ClassFile::from_file("Widget.class".as_ref())?;
/// println!("{} methods", class.methods.len());
/// # Ok::<(), classweave::Error>(())
/// ```
pub mod prelude;

/// Instruction stream walking for the `Code` attribute.
///
/// Provides opcode constants, instruction length computation (including the
/// variable-length `wide`, `tableswitch` and `lookupswitch` forms) and the
/// bounds-checked [`disassembler::CodeCursor`] used to locate call sites for
/// operand patching.
pub mod disassembler;

/// Definitions, parsing and encoding of the class file format.
///
/// The structural codec: [`metadata::classfile::ClassFile`] and its parts (constant
/// pool, members, raw attributes), the annotation reader used for environment tags,
/// and the [`metadata::builder::ClassFileBuilder`] for synthesizing classes.
pub mod metadata;

/// The conditional load-time transformation pipeline.
///
/// Home of [`transform::ClassTransformer`], the pass chain, and the individual
/// rewriting passes (call redirection, package access fixing, access widening,
/// environment stripping).
pub mod transform;

/// `classweave` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always
/// [`Error`]. This is used consistently throughout the crate for all fallible
/// operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `classweave` Error type
///
/// The main error type for all operations in this crate. Provides detailed error
/// information for class decoding and load-time transformation.
pub use error::Error;

/// Low-level file access and parsing utilities.
pub use file::{parser::Parser, File};

/// The decoded structural form of a class file.
///
/// See [`metadata::classfile::ClassFile`] for structural access and the codec entry
/// points.
pub use metadata::classfile::ClassFile;

/// The load-time class transformer.
///
/// See [`transform::ClassTransformer`] for the orchestrated pipeline.
pub use transform::ClassTransformer;
