//! Pass composition over a single structural walk.
//!
//! Every rewriting pass observes the same decoded class during one shared traversal, so
//! the class is decoded exactly once and encoded exactly once per transform call no
//! matter how many passes are active. Composition is a flat precedence list of trait
//! objects rather than nested visitor inheritance: [`crate::transform::chain::PassChain`]
//! owns the ordered passes and drives the walk itself.
//!
//! # Ordering
//!
//! [`PassChain::wrap`] follows decorator construction order: a pass registered later
//! wraps all passes registered earlier and therefore observes the walk *first*. The
//! orchestrator registers the access widener, then the package access fixer, then the
//! stripper — so during the walk the stripper filters members before the fixer sees
//! them, and the fixer rewrites visibility before the widener. A member the stripper
//! removes is never offered to the downstream passes at all.

use crate::{
    metadata::{classfile::ClassFile, flags::AccessFlags},
    Result,
};

/// One structural rewriting pass.
///
/// All hooks have identity defaults, so a pass only implements the parts of the walk it
/// cares about. Member hooks return `None` to remove the member from the class; interface
/// hooks return `false` to remove the interface. Removal short-circuits: passes deeper in
/// the chain are not consulted for a removed member.
pub trait ClassPass {
    /// Observe (and possibly rewrite) the class's own access flags.
    fn class_access(&mut self, access: AccessFlags) -> AccessFlags {
        access
    }

    /// Decide whether the interface with the given internal name is kept.
    fn interface(&mut self, _name: &str) -> bool {
        true
    }

    /// Observe one field; return its (possibly rewritten) access flags, or `None` to
    /// remove the field.
    fn field(&mut self, _name: &str, _descriptor: &str, access: AccessFlags) -> Option<AccessFlags> {
        Some(access)
    }

    /// Observe one method; return its (possibly rewritten) access flags, or `None` to
    /// remove the method.
    fn method(
        &mut self,
        _name: &str,
        _descriptor: &str,
        access: AccessFlags,
    ) -> Option<AccessFlags> {
        Some(access)
    }
}

/// An ordered set of passes applied in one walk over a decoded class.
///
/// Built fresh per transform call; it is a local composition artifact with no lifetime
/// beyond the call.
#[derive(Default)]
pub struct PassChain {
    passes: Vec<Box<dyn ClassPass>>,
}

impl PassChain {
    /// Create an empty chain.
    #[must_use]
    pub fn new() -> Self {
        PassChain { passes: Vec::new() }
    }

    /// Register a pass around the chain built so far.
    ///
    /// The new pass wraps all previously registered passes and will observe the walk
    /// before them.
    pub fn wrap(&mut self, pass: Box<dyn ClassPass>) {
        self.passes.push(pass);
    }

    /// Returns `true` if no pass is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Number of registered passes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Drive the single shared walk over `class`, applying every registered pass.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if a member name, descriptor or interface
    /// reference does not resolve through the constant pool.
    pub fn run(&mut self, class: &mut ClassFile) -> Result<()> {
        let mut access = class.access;
        for pass in self.passes.iter_mut().rev() {
            access = pass.class_access(access);
        }
        class.access = access;

        let interfaces = std::mem::take(&mut class.interfaces);
        let mut kept_interfaces = Vec::with_capacity(interfaces.len());
        for index in interfaces {
            let name = class.pool.class_name(index)?;
            if self.passes.iter_mut().rev().all(|pass| pass.interface(name)) {
                kept_interfaces.push(index);
            }
        }
        class.interfaces = kept_interfaces;

        let fields = std::mem::take(&mut class.fields);
        let mut kept_fields = Vec::with_capacity(fields.len());
        for mut field in fields {
            let mut access = Some(field.access);
            let name = class.pool.utf8(field.name_index)?;
            let descriptor = class.pool.utf8(field.descriptor_index)?;
            for pass in self.passes.iter_mut().rev() {
                match access {
                    Some(current) => access = pass.field(name, descriptor, current),
                    None => break,
                }
            }
            if let Some(access) = access {
                field.access = access;
                kept_fields.push(field);
            }
        }
        class.fields = kept_fields;

        let methods = std::mem::take(&mut class.methods);
        let mut kept_methods = Vec::with_capacity(methods.len());
        for mut method in methods {
            let mut access = Some(method.access);
            let name = class.pool.utf8(method.name_index)?;
            let descriptor = class.pool.utf8(method.descriptor_index)?;
            for pass in self.passes.iter_mut().rev() {
                match access {
                    Some(current) => access = pass.method(name, descriptor, current),
                    None => break,
                }
            }
            if let Some(access) = access {
                method.access = access;
                kept_methods.push(method);
            }
        }
        class.methods = kept_methods;

        Ok(())
    }
}
