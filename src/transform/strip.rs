//! Environment stripping: scan phase and strip phase.
//!
//! Deciding whether a class may exist in the current environment must happen before any
//! byte is committed to an encoder, and the decision needs only metadata. The pass is
//! therefore split in two:
//!
//! - **Phase 1** ([`crate::transform::strip::StripScan`]) classifies the class itself,
//!   every implemented interface and every member by its environment tag, reading only
//!   annotation attributes — no instruction bytes. A class-level mismatch
//!   short-circuits the scan: the whole class is condemned and nothing else needs
//!   classifying.
//! - **Phase 2** ([`crate::transform::strip::ClassStripper`]) runs only when the class
//!   survives and the scan found something to remove. It drops exactly the marked
//!   interfaces, fields and methods during the shared structural walk. Member removal
//!   is complete — a dropped method's bytecode and attributes never reach the encoder —
//!   but references to removed members inside surviving code are left alone.

use std::collections::HashSet;

use crate::{
    metadata::{
        annotations::{parse_annotations, Annotation, ElementValue},
        attributes::is_annotation_attribute,
        classfile::ClassFile,
        flags::AccessFlags,
        member::Member,
        pool::ConstantPool,
    },
    transform::{
        chain::ClassPass,
        environment::{
            EnvironmentType, ENVIRONMENT_ANNOTATION, ENVIRONMENT_INTERFACES_ANNOTATION,
            ENVIRONMENT_INTERFACE_ANNOTATION,
        },
    },
    Result,
};

/// The result of classifying one class against the current environment.
///
/// Created fresh per transform call and discarded once the strip pass has run.
#[derive(Debug, Default)]
pub struct StripScan {
    strip_entire_class: bool,
    interfaces: HashSet<String>,
    // Member keys are name + descriptor, concatenated.
    fields: HashSet<String>,
    methods: HashSet<String>,
}

impl StripScan {
    /// Classify `class` against `environment`.
    ///
    /// Reads class-level and member-level annotation attributes only; instruction bytes
    /// are never touched. If the class's own tag disqualifies it the scan
    /// short-circuits with `strip_entire_class` set and no member classification.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if annotation metadata or the names it
    /// references cannot be decoded.
    pub fn scan(class: &ClassFile, environment: EnvironmentType) -> Result<Self> {
        let mut scan = StripScan::default();

        for attribute in &class.attributes {
            if !is_annotation_attribute(attribute, &class.pool)? {
                continue;
            }
            for annotation in parse_annotations(&attribute.info, &class.pool)? {
                scan.class_annotation(&annotation, environment);
                if scan.strip_entire_class {
                    return Ok(scan);
                }
            }
        }

        for field in &class.fields {
            if member_mismatch(field, &class.pool, environment)? {
                scan.fields.insert(member_key(field, &class.pool)?);
            }
        }
        for method in &class.methods {
            if member_mismatch(method, &class.pool, environment)? {
                scan.methods.insert(member_key(method, &class.pool)?);
            }
        }

        Ok(scan)
    }

    fn class_annotation(&mut self, annotation: &Annotation<'_>, environment: EnvironmentType) {
        if annotation.descriptor == ENVIRONMENT_ANNOTATION {
            if let Some(tag) = annotation.enum_constant("value") {
                if !environment.matches(tag) {
                    self.strip_entire_class = true;
                }
            }
        } else if annotation.descriptor == ENVIRONMENT_INTERFACE_ANNOTATION {
            self.interface_annotation(annotation, environment);
        } else if annotation.descriptor == ENVIRONMENT_INTERFACES_ANNOTATION {
            if let Some(values) = annotation.array("value") {
                for value in values {
                    if let ElementValue::Annotation(nested) = value {
                        self.interface_annotation(nested, environment);
                    }
                }
            }
        }
    }

    fn interface_annotation(&mut self, annotation: &Annotation<'_>, environment: EnvironmentType) {
        let Some(tag) = annotation.enum_constant("value") else {
            return;
        };
        if environment.matches(tag) {
            return;
        }
        if let Some(descriptor) = annotation.class_descriptor("itf") {
            if let Some(name) = class_name_of_descriptor(descriptor) {
                self.interfaces.insert(name.to_string());
            }
        }
    }

    /// Returns `true` if the class itself cannot exist in the scanned environment.
    #[must_use]
    pub fn strip_entire_class(&self) -> bool {
        self.strip_entire_class
    }

    /// Returns `true` if no interface, field or method was marked for removal.
    ///
    /// An empty scan contributes nothing and is excluded from the pass chain entirely.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty() && self.fields.is_empty() && self.methods.is_empty()
    }
}

fn member_key(member: &Member, pool: &ConstantPool) -> Result<String> {
    Ok(format!(
        "{}{}",
        member.name(pool)?,
        member.descriptor(pool)?
    ))
}

fn member_mismatch(
    member: &Member,
    pool: &ConstantPool,
    environment: EnvironmentType,
) -> Result<bool> {
    for attribute in &member.attributes {
        if !is_annotation_attribute(attribute, pool)? {
            continue;
        }
        for annotation in parse_annotations(&attribute.info, pool)? {
            if annotation.descriptor != ENVIRONMENT_ANNOTATION {
                continue;
            }
            if let Some(tag) = annotation.enum_constant("value") {
                if !environment.matches(tag) {
                    return Ok(true);
                }
            }
        }
    }
    Ok(false)
}

// "Lcom/example/Widget;" -> "com/example/Widget"
fn class_name_of_descriptor(descriptor: &str) -> Option<&str> {
    descriptor.strip_prefix('L')?.strip_suffix(';')
}

/// Removes the members a [`StripScan`] marked, during the shared structural walk.
///
/// Registered as the outermost pass of the chain: a member removed here is never
/// offered to visibility-rewriting passes deeper in.
pub struct ClassStripper {
    scan: StripScan,
}

impl ClassStripper {
    /// Build the strip pass from a completed scan.
    #[must_use]
    pub fn new(scan: StripScan) -> Self {
        ClassStripper { scan }
    }
}

impl ClassPass for ClassStripper {
    fn interface(&mut self, name: &str) -> bool {
        !self.scan.interfaces.contains(name)
    }

    fn field(&mut self, name: &str, descriptor: &str, access: AccessFlags) -> Option<AccessFlags> {
        if self.scan.fields.contains(&format!("{name}{descriptor}")) {
            None
        } else {
            Some(access)
        }
    }

    fn method(&mut self, name: &str, descriptor: &str, access: AccessFlags) -> Option<AccessFlags> {
        if self.scan.methods.contains(&format!("{name}{descriptor}")) {
            None
        } else {
            Some(access)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::builder::{
        AnnotationDef, ClassFileBuilder, FieldDef, MethodDef,
    };
    use crate::transform::chain::PassChain;

    const SIDE: &str = "Lnet/fabricmc/api/EnvType;";

    fn tag(constant: &str) -> AnnotationDef {
        AnnotationDef::new(ENVIRONMENT_ANNOTATION).enum_element("value", SIDE, constant)
    }

    #[test]
    fn class_level_mismatch_condemns_class() {
        let class = ClassFileBuilder::new("com/example/ClientOnly")
            .annotation(tag("CLIENT"))
            .method(MethodDef::new("tick", "()V").annotation(tag("CLIENT")))
            .build()
            .unwrap();

        let scan = StripScan::scan(&class, EnvironmentType::Server).unwrap();
        assert!(scan.strip_entire_class());
        // Short-circuit: member classification is skipped once the class is condemned.
        assert!(scan.is_empty());
    }

    #[test]
    fn class_level_match_keeps_class() {
        let class = ClassFileBuilder::new("com/example/ClientOnly")
            .annotation(tag("CLIENT"))
            .build()
            .unwrap();

        let scan = StripScan::scan(&class, EnvironmentType::Client).unwrap();
        assert!(!scan.strip_entire_class());
        assert!(scan.is_empty());
    }

    #[test]
    fn members_are_classified_per_tag() {
        let class = ClassFileBuilder::new("com/example/Mixed")
            .field(FieldDef::new("clientCache", "I").annotation(tag("CLIENT")))
            .field(FieldDef::new("shared", "I"))
            .method(MethodDef::new("render", "()V").annotation(tag("CLIENT")))
            .method(MethodDef::new("tick", "()V").annotation(tag("SERVER")))
            .build()
            .unwrap();

        let scan = StripScan::scan(&class, EnvironmentType::Server).unwrap();
        assert!(!scan.strip_entire_class());
        assert!(scan.fields.contains("clientCacheI"));
        assert!(!scan.fields.contains("sharedI"));
        assert!(scan.methods.contains("render()V"));
        assert!(!scan.methods.contains("tick()V"));
    }

    #[test]
    fn interface_tags_via_container_annotation() {
        let entry = AnnotationDef::new(ENVIRONMENT_INTERFACE_ANNOTATION)
            .enum_element("value", SIDE, "CLIENT")
            .class_element("itf", "Lcom/example/Renderable;");
        let class = ClassFileBuilder::new("com/example/Mixed")
            .interface("com/example/Renderable")
            .interface("com/example/Tickable")
            .annotation(
                AnnotationDef::new(ENVIRONMENT_INTERFACES_ANNOTATION)
                    .annotation_array_element("value", vec![entry]),
            )
            .build()
            .unwrap();

        let scan = StripScan::scan(&class, EnvironmentType::Server).unwrap();
        assert!(scan.interfaces.contains("com/example/Renderable"));
        assert!(!scan.interfaces.contains("com/example/Tickable"));
    }

    #[test]
    fn stripper_removes_exactly_marked_members() {
        let class = ClassFileBuilder::new("com/example/Mixed")
            .interface("com/example/Renderable")
            .annotation(
                AnnotationDef::new(ENVIRONMENT_INTERFACE_ANNOTATION)
                    .enum_element("value", SIDE, "CLIENT")
                    .class_element("itf", "Lcom/example/Renderable;"),
            )
            .field(FieldDef::new("clientCache", "I").annotation(tag("CLIENT")))
            .field(FieldDef::new("shared", "I"))
            .method(MethodDef::new("render", "()V").annotation(tag("CLIENT")))
            .method(MethodDef::new("tick", "()V"))
            .build()
            .unwrap();

        let scan = StripScan::scan(&class, EnvironmentType::Server).unwrap();
        let mut chain = PassChain::new();
        chain.wrap(Box::new(ClassStripper::new(scan)));

        let mut class = class;
        chain.run(&mut class).unwrap();

        assert!(class.interfaces.is_empty());
        assert_eq!(class.fields.len(), 1);
        assert_eq!(class.fields[0].name(&class.pool).unwrap(), "shared");
        assert_eq!(class.methods.len(), 1);
        assert_eq!(class.methods[0].name(&class.pool).unwrap(), "tick");
    }

    #[test]
    fn descriptor_name_extraction() {
        assert_eq!(
            class_name_of_descriptor("Lcom/example/Widget;"),
            Some("com/example/Widget")
        );
        assert_eq!(class_name_of_descriptor("I"), None);
    }
}
