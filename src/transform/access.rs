//! Visibility rewriting: the package access fixer and the access widener seam.
//!
//! Two passes share this module because both only ever touch the visibility bits of
//! access words:
//!
//! - [`crate::transform::access::PackageAccessFixer`] raises every package-private
//!   class/field/method to public. Remapped game classes collapse into a single
//!   namespace at development time but load across classloader boundaries in
//!   production, where package-private access between them would fail.
//! - [`crate::transform::access::AccessWidener`] is the capability interface for the
//!   externally owned widen directive set: mod metadata nominates specific classes and
//!   members whose visibility must be relaxed. The orchestrator only asks whether a
//!   class is a target and for a pass to splice into the chain; the directive source
//!   itself lives with the host.

use std::collections::{HashMap, HashSet};

use crate::{
    metadata::flags::AccessFlags,
    transform::chain::ClassPass,
};

/// Raises package-private visibility to public during the shared walk.
///
/// Any class, field or method whose access word has no visibility bit set gains
/// `ACC_PUBLIC`; explicitly private, protected and public members are untouched.
pub struct PackageAccessFixer;

fn fix_access(access: AccessFlags) -> AccessFlags {
    if access.is_package_private() {
        access | AccessFlags::PUBLIC
    } else {
        access
    }
}

impl ClassPass for PackageAccessFixer {
    fn class_access(&mut self, access: AccessFlags) -> AccessFlags {
        fix_access(access)
    }

    fn field(&mut self, _name: &str, _descriptor: &str, access: AccessFlags) -> Option<AccessFlags> {
        Some(fix_access(access))
    }

    fn method(
        &mut self,
        _name: &str,
        _descriptor: &str,
        access: AccessFlags,
    ) -> Option<AccessFlags> {
        Some(fix_access(access))
    }
}

/// Capability interface over the externally owned widen directive set.
///
/// Injected into the orchestrator rather than reached through a global, so the pipeline
/// is testable without a host runtime. Two operations are all the pipeline consumes:
/// target membership, and a visitor factory for targeted classes.
pub trait AccessWidener {
    /// Returns `true` if the directive set nominates this class.
    fn is_target(&self, class_name: &str) -> bool;

    /// Build the widening pass for a targeted class, or `None` if the class has no
    /// directives after all.
    fn pass_for(&self, class_name: &str) -> Option<Box<dyn ClassPass>>;
}

#[derive(Debug, Clone, Default)]
struct ClassWidenRules {
    widen_class: bool,
    // Member keys are name + descriptor, concatenated.
    fields: HashSet<String>,
    methods: HashSet<String>,
}

/// A frozen, in-memory widen directive set.
///
/// Hosts populate the rules while loading mod metadata, then hand the value to the
/// transformer; after that it is only read, which makes unsynchronized sharing across
/// class-loading threads sound. Directive-file parsing is the host's concern.
#[derive(Debug, Clone, Default)]
pub struct WidenRules {
    targets: HashMap<String, ClassWidenRules>,
}

impl WidenRules {
    /// Create an empty directive set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Nominate a class itself for widening to public.
    ///
    /// Class names use the same spelling the transformer is called with.
    pub fn widen_class(&mut self, class: &str) {
        self.targets.entry(class.to_string()).or_default().widen_class = true;
    }

    /// Nominate a field for widening to public.
    pub fn widen_field(&mut self, class: &str, name: &str, descriptor: &str) {
        self.targets
            .entry(class.to_string())
            .or_default()
            .fields
            .insert(format!("{name}{descriptor}"));
    }

    /// Nominate a method for widening to public.
    pub fn widen_method(&mut self, class: &str, name: &str, descriptor: &str) {
        self.targets
            .entry(class.to_string())
            .or_default()
            .methods
            .insert(format!("{name}{descriptor}"));
    }

    /// The nominated class names.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }
}

impl AccessWidener for WidenRules {
    fn is_target(&self, class_name: &str) -> bool {
        self.targets.contains_key(class_name)
    }

    fn pass_for(&self, class_name: &str) -> Option<Box<dyn ClassPass>> {
        self.targets
            .get(class_name)
            .map(|rules| Box::new(WidenPass { rules: rules.clone() }) as Box<dyn ClassPass>)
    }
}

// The in-chain widening pass for one class, carrying a snapshot of its directives.
struct WidenPass {
    rules: ClassWidenRules,
}

impl ClassPass for WidenPass {
    fn class_access(&mut self, access: AccessFlags) -> AccessFlags {
        if self.rules.widen_class {
            access.to_public()
        } else {
            access
        }
    }

    fn field(&mut self, name: &str, descriptor: &str, access: AccessFlags) -> Option<AccessFlags> {
        if self.rules.fields.contains(&format!("{name}{descriptor}")) {
            Some(access.to_public())
        } else {
            Some(access)
        }
    }

    fn method(&mut self, name: &str, descriptor: &str, access: AccessFlags) -> Option<AccessFlags> {
        if self.rules.methods.contains(&format!("{name}{descriptor}")) {
            Some(access.to_public())
        } else {
            Some(access)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixer_raises_only_package_private() {
        let mut fixer = PackageAccessFixer;
        assert_eq!(
            fixer.field("a", "I", AccessFlags::STATIC),
            Some(AccessFlags::STATIC | AccessFlags::PUBLIC)
        );
        assert_eq!(
            fixer.field("b", "I", AccessFlags::PROTECTED),
            Some(AccessFlags::PROTECTED)
        );
        assert_eq!(
            fixer.method("c", "()V", AccessFlags::PRIVATE),
            Some(AccessFlags::PRIVATE)
        );
        assert_eq!(
            fixer.class_access(AccessFlags::SUPER),
            AccessFlags::SUPER | AccessFlags::PUBLIC
        );
    }

    #[test]
    fn widen_rules_track_targets() {
        let mut rules = WidenRules::new();
        rules.widen_method("net.minecraft.Foo", "tick", "()V");
        assert!(rules.is_target("net.minecraft.Foo"));
        assert!(!rules.is_target("net.minecraft.Bar"));
        assert_eq!(rules.targets().collect::<Vec<_>>(), vec!["net.minecraft.Foo"]);
    }

    #[test]
    fn widen_pass_touches_only_directed_members() {
        let mut rules = WidenRules::new();
        rules.widen_method("net.minecraft.Foo", "tick", "()V");
        rules.widen_field("net.minecraft.Foo", "level", "I");

        let mut pass = rules.pass_for("net.minecraft.Foo").unwrap();
        assert_eq!(
            pass.method("tick", "()V", AccessFlags::PRIVATE | AccessFlags::FINAL),
            Some(AccessFlags::PUBLIC | AccessFlags::FINAL)
        );
        assert_eq!(
            pass.method("tick", "(I)V", AccessFlags::PRIVATE),
            Some(AccessFlags::PRIVATE)
        );
        assert_eq!(
            pass.field("level", "I", AccessFlags::PROTECTED),
            Some(AccessFlags::PUBLIC)
        );
        assert_eq!(
            pass.field("level", "J", AccessFlags::PROTECTED),
            Some(AccessFlags::PROTECTED)
        );
    }

    #[test]
    fn widen_class_directive() {
        let mut rules = WidenRules::new();
        rules.widen_class("net.minecraft.Foo");
        let mut pass = rules.pass_for("net.minecraft.Foo").unwrap();
        assert_eq!(
            pass.class_access(AccessFlags::SUPER),
            AccessFlags::SUPER | AccessFlags::PUBLIC
        );
    }

    #[test]
    fn non_target_has_no_pass() {
        let rules = WidenRules::new();
        assert!(rules.pass_for("net.minecraft.Foo").is_none());
    }
}
