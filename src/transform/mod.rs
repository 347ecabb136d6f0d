//! The conditional transformation pipeline.
//!
//! Every class's bytes pass through here exactly once, at load time, before the
//! runtime's loader defines them. Three independent problems are solved at this single
//! point:
//!
//! - outdated calls to the Guava utility library are patched to its surviving API
//!   surface ([`crate::transform::redirect`]),
//! - visibility is relaxed for members nominated by widen directives or required by the
//!   package access hack ([`crate::transform::access`]),
//! - classes, members and interface implementations tagged for the other physical side
//!   are removed, failing the load outright when the class itself cannot exist here
//!   ([`crate::transform::strip`]).
//!
//! # Key Components
//!
//! - [`crate::transform::ClassTransformer`] - The orchestrator: decides which passes
//!   apply and runs one decode → combined walk → encode cycle
//! - [`crate::transform::LoadContext`] - The per-call execution context
//! - [`crate::transform::chain::PassChain`] - Pass composition over the shared walk
//! - [`crate::transform::access::AccessWidener`] /
//!   [`crate::transform::GameByteSource`] - Capability interfaces for the externally
//!   owned collaborators
//!
//! # Concurrency
//!
//! A transform call is a pure function of its inputs plus two frozen tables (the
//! redirect table and the widen directive snapshot). No shared state is written, so the
//! entry points may be called concurrently from parallel class-loading threads.
//!
//! # Usage Examples
//!
//! ```rust
//! use classweave::metadata::builder::ClassFileBuilder;
//! use classweave::transform::{
//!     access::WidenRules, environment::EnvironmentType, ClassTransformer, LoadContext,
//! };
//!
//! let widener = WidenRules::new();
//! let transformer = ClassTransformer::new(&widener);
//! let ctx = LoadContext {
//!     is_development: false,
//!     environment: EnvironmentType::Client,
//!     requires_package_access_hack: false,
//! };
//!
//! let bytes = ClassFileBuilder::new("com/example/Widget").build_bytes()?;
//! let transformed = transformer.transform(&ctx, "com.example.Widget", &bytes)?;
//! # Ok::<(), classweave::Error>(())
//! ```

pub mod access;
pub mod chain;
pub mod environment;
pub mod redirect;
pub mod strip;

use crate::{
    metadata::classfile::ClassFile,
    transform::{
        access::{AccessWidener, PackageAccessFixer},
        chain::PassChain,
        environment::EnvironmentType,
        redirect::{rewrite_calls, CallRedirect, GUAVA_REDIRECTS},
        strip::{ClassStripper, StripScan},
    },
    Error, Result,
};

/// Name prefix of the managed game namespace.
pub const GAME_CLASS_PREFIX: &str = "net.minecraft.";

/// Returns `true` if `name` belongs to the managed game namespace.
///
/// A class is managed when its name carries the game package prefix *or* contains no
/// package separator at all: obfuscated game classes live in the default package. This
/// exact predicate gates package access fixing, access widening and the
/// environment-strip exemption, so all three stay in agreement about what counts as a
/// game class.
#[must_use]
pub fn is_game_class(name: &str) -> bool {
    name.starts_with(GAME_CLASS_PREFIX) || !name.contains('.')
}

/// The execution context of one transform call.
///
/// Derived from launcher state by the host and immutable for the duration of the call;
/// different calls may carry different contexts.
#[derive(Debug, Clone, Copy)]
pub struct LoadContext {
    /// Whether the process runs a development workspace rather than a production
    /// launcher. In development, environment stripping also covers game classes to
    /// catch inconsistencies that production builds filter out at build time.
    pub is_development: bool,
    /// The physical side the process runs as
    pub environment: EnvironmentType,
    /// Whether the active mapping configuration splits remapped classes across
    /// classloader boundaries, requiring package-private access to be widened
    pub requires_package_access_hack: bool,
}

/// Capability interface over the game-specific class byte provider.
///
/// The game provider may carry patched or extracted bytes for a class that differ from
/// what the classloader found on disk; the hook entry point prefers those.
pub trait GameByteSource {
    /// The provider's bytes for `name`, if it has any.
    fn bytes_for(&self, name: &str) -> Option<Vec<u8>>;
}

/// The load-time class transformer.
///
/// Holds the two frozen inputs every call shares: the call redirect table and the
/// widen directive set. Both are read-only after construction, so one transformer may
/// serve any number of concurrent class loads.
pub struct ClassTransformer<'a> {
    widener: &'a dyn AccessWidener,
    redirects: &'static [CallRedirect],
}

impl<'a> ClassTransformer<'a> {
    /// Create a transformer with the built-in Guava redirect table.
    ///
    /// # Arguments
    /// * `widener` - The widen directive set, already populated and frozen
    #[must_use]
    pub fn new(widener: &'a dyn AccessWidener) -> Self {
        ClassTransformer {
            widener,
            redirects: GUAVA_REDIRECTS,
        }
    }

    /// Create a transformer with a custom redirect table.
    #[must_use]
    pub fn with_redirects(
        widener: &'a dyn AccessWidener,
        redirects: &'static [CallRedirect],
    ) -> Self {
        ClassTransformer { widener, redirects }
    }

    /// Transform one class for loading.
    ///
    /// The call redirect pass always runs first as its own decode → walk → encode
    /// cycle. The conditional passes are then selected from three independent
    /// decisions:
    ///
    /// - package access fixing: managed class *and* the package access hack is required
    /// - environment stripping: not a managed class, *or* a development workspace
    /// - access widening: managed class *and* nominated by the widen directives
    ///
    /// If no decision selects a pass, the redirected bytes are returned without paying
    /// for a structural decode. Otherwise the class is decoded once, the active passes
    /// are composed into a single chain (widener, then fixer, then stripper — so
    /// stripping filters first during the walk), and one combined walk plus encode
    /// produces the output. A chain that ends up empty after the strip scan returns
    /// the pre-chain bytes unchanged.
    ///
    /// # Arguments
    /// * `ctx` - The execution context for this call
    /// * `name` - The class name, dot-separated
    /// * `bytes` - The raw class bytes
    ///
    /// # Errors
    /// Returns [`crate::Error::EnvironmentIncompatible`] when the class itself is
    /// tagged for the other environment — the load must abort — and the codec's decode
    /// errors for malformed input. Nothing is caught internally.
    pub fn transform(&self, ctx: &LoadContext, name: &str, bytes: &[u8]) -> Result<Vec<u8>> {
        let bytes = rewrite_calls(bytes, self.redirects)?;

        let game_class = is_game_class(name);
        let transform_access = game_class && ctx.requires_package_access_hack;
        let environment_strip = !game_class || ctx.is_development;
        let apply_access_widener = game_class && self.widener.is_target(name);

        if !transform_access && !environment_strip && !apply_access_widener {
            return Ok(bytes);
        }

        let mut class = ClassFile::decode(&bytes)?;
        let mut chain = PassChain::new();

        if apply_access_widener {
            if let Some(pass) = self.widener.pass_for(name) {
                chain.wrap(pass);
            }
        }

        if transform_access {
            chain.wrap(Box::new(PackageAccessFixer));
        }

        if environment_strip {
            let scan = StripScan::scan(&class, ctx.environment)?;
            if scan.strip_entire_class() {
                return Err(Error::EnvironmentIncompatible {
                    class: name.to_string(),
                    environment: ctx.environment,
                });
            }
            if !scan.is_empty() {
                chain.wrap(Box::new(ClassStripper::new(scan)));
            }
        }

        if chain.is_empty() {
            return Ok(bytes);
        }

        chain.run(&mut class)?;
        Ok(class.encode())
    }

    /// Classloading-hook entry point.
    ///
    /// Asks the game byte source for this class first and falls back to the bytes the
    /// classloader supplied; whichever is found goes through [`Self::transform`].
    /// Returns `Ok(None)` only when neither source has bytes for the class.
    ///
    /// # Arguments
    /// * `source` - The game-specific byte provider
    /// * `ctx` - The execution context for this call
    /// * `name` - The class name as requested from the loader
    /// * `transformed_name` - The remapped name; accepted for hook-interface
    ///   compatibility, while lookups use the raw name the byte source indexes by
    /// * `bytes` - The bytes the classloader located, if any
    ///
    /// # Errors
    /// Same failure modes as [`Self::transform`].
    pub fn hook(
        &self,
        source: &dyn GameByteSource,
        ctx: &LoadContext,
        name: &str,
        _transformed_name: &str,
        bytes: Option<&[u8]>,
    ) -> Result<Option<Vec<u8>>> {
        match source.bytes_for(name) {
            Some(input) => self.transform(ctx, name, &input).map(Some),
            None => match bytes {
                Some(bytes) => self.transform(ctx, name, bytes).map(Some),
                None => Ok(None),
            },
        }
    }
}
