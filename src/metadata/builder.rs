//! Programmatic class file construction.
//!
//! The builders assemble small, verifiable class files without a Java toolchain: a
//! [`crate::metadata::builder::ClassFileBuilder`] collects symbolic definitions and
//! `build()` interns every name into a fresh constant pool and produces a
//! [`crate::metadata::classfile::ClassFile`]. The integration tests use this to craft
//! classes with tagged members, call sites and annotation payloads; hosts can use it to
//! synthesize shim classes at load time.
//!
//! Bodies are assembled from a small symbolic instruction vocabulary (plain opcodes,
//! call sites, field accesses). Jump targets and stack map frames are out of scope —
//! bodies that need them should come out of a compiler, not this builder.
//!
//! # Usage Examples
//!
//! ```rust
//! use classweave::metadata::builder::{ClassFileBuilder, CodeDef, MethodDef};
//! use classweave::disassembler::opcodes;
//!
//! let class = ClassFileBuilder::new("com/example/Widget")
//!     .method(
//!         MethodDef::new("spin", "()V").code(
//!             CodeDef::new(1, 1)
//!                 .invoke(opcodes::INVOKESTATIC, "com/example/Hooks", "tick", "()V")
//!                 .simple(opcodes::RETURN),
//!         ),
//!     )
//!     .build()?;
//! assert_eq!(class.methods.len(), 1);
//! # Ok::<(), classweave::Error>(())
//! ```

use crate::{
    disassembler::opcodes,
    file::io::push_be,
    metadata::{
        attributes::{Attribute, CODE, RUNTIME_VISIBLE_ANNOTATIONS},
        classfile::ClassFile,
        flags::AccessFlags,
        member::Member,
        pool::ConstantPool,
    },
    Result,
};

/// A symbolic annotation definition.
///
/// Covers the element kinds the environment-tag model uses: enum constants, class
/// references and nested annotation arrays.
#[derive(Debug, Clone)]
pub struct AnnotationDef {
    descriptor: String,
    elements: Vec<(String, ElementDef)>,
}

#[derive(Debug, Clone)]
enum ElementDef {
    Enum {
        type_descriptor: String,
        constant: String,
    },
    Class {
        descriptor: String,
    },
    Annotations(Vec<AnnotationDef>),
}

impl AnnotationDef {
    /// Start an annotation of the given type descriptor (e.g. `Lcom/example/Tag;`).
    #[must_use]
    pub fn new(descriptor: &str) -> Self {
        AnnotationDef {
            descriptor: descriptor.to_string(),
            elements: Vec::new(),
        }
    }

    /// Add an enum constant element.
    #[must_use]
    pub fn enum_element(mut self, name: &str, type_descriptor: &str, constant: &str) -> Self {
        self.elements.push((
            name.to_string(),
            ElementDef::Enum {
                type_descriptor: type_descriptor.to_string(),
                constant: constant.to_string(),
            },
        ));
        self
    }

    /// Add a class reference element.
    #[must_use]
    pub fn class_element(mut self, name: &str, descriptor: &str) -> Self {
        self.elements.push((
            name.to_string(),
            ElementDef::Class {
                descriptor: descriptor.to_string(),
            },
        ));
        self
    }

    /// Add an array-of-annotations element (the container encoding used by
    /// repeatable annotations).
    #[must_use]
    pub fn annotation_array_element(mut self, name: &str, annotations: Vec<AnnotationDef>) -> Self {
        self.elements
            .push((name.to_string(), ElementDef::Annotations(annotations)));
        self
    }

    fn encode(&self, pool: &mut ConstantPool, out: &mut Vec<u8>) -> Result<()> {
        push_be(out, pool.add_utf8(&self.descriptor)?);
        push_be(out, self.elements.len() as u16);
        for (name, value) in &self.elements {
            push_be(out, pool.add_utf8(name)?);
            match value {
                ElementDef::Enum {
                    type_descriptor,
                    constant,
                } => {
                    out.push(b'e');
                    push_be(out, pool.add_utf8(type_descriptor)?);
                    push_be(out, pool.add_utf8(constant)?);
                }
                ElementDef::Class { descriptor } => {
                    out.push(b'c');
                    push_be(out, pool.add_utf8(descriptor)?);
                }
                ElementDef::Annotations(annotations) => {
                    out.push(b'[');
                    push_be(out, annotations.len() as u16);
                    for annotation in annotations {
                        out.push(b'@');
                        annotation.encode(pool, out)?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Ins {
    Simple(u8),
    Invoke {
        opcode: u8,
        owner: String,
        name: String,
        descriptor: String,
    },
    FieldAccess {
        opcode: u8,
        owner: String,
        name: String,
        descriptor: String,
    },
}

/// A symbolic method body.
#[derive(Debug, Clone)]
pub struct CodeDef {
    max_stack: u16,
    max_locals: u16,
    instructions: Vec<Ins>,
}

impl CodeDef {
    /// Start a body with the given operand stack and local variable sizes.
    #[must_use]
    pub fn new(max_stack: u16, max_locals: u16) -> Self {
        CodeDef {
            max_stack,
            max_locals,
            instructions: Vec::new(),
        }
    }

    /// Append an operand-less instruction.
    #[must_use]
    pub fn simple(mut self, opcode: u8) -> Self {
        self.instructions.push(Ins::Simple(opcode));
        self
    }

    /// Append a call instruction against a symbolic member reference.
    #[must_use]
    pub fn invoke(mut self, opcode: u8, owner: &str, name: &str, descriptor: &str) -> Self {
        self.instructions.push(Ins::Invoke {
            opcode,
            owner: owner.to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        });
        self
    }

    /// Append a field access instruction against a symbolic field reference.
    #[must_use]
    pub fn field_access(mut self, opcode: u8, owner: &str, name: &str, descriptor: &str) -> Self {
        self.instructions.push(Ins::FieldAccess {
            opcode,
            owner: owner.to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        });
        self
    }

    fn build_attribute(&self, pool: &mut ConstantPool) -> Result<Attribute> {
        let mut code = Vec::new();
        for instruction in &self.instructions {
            match instruction {
                Ins::Simple(opcode) => code.push(*opcode),
                Ins::Invoke {
                    opcode,
                    owner,
                    name,
                    descriptor,
                } => {
                    code.push(*opcode);
                    if *opcode == opcodes::INVOKEINTERFACE {
                        let index = pool.add_interface_method_ref(owner, name, descriptor)?;
                        push_be(&mut code, index);
                        code.push(invoke_interface_count(descriptor)?);
                        code.push(0);
                    } else {
                        let index = pool.add_method_ref(owner, name, descriptor)?;
                        push_be(&mut code, index);
                    }
                }
                Ins::FieldAccess {
                    opcode,
                    owner,
                    name,
                    descriptor,
                } => {
                    code.push(*opcode);
                    let index = pool.add_field_ref(owner, name, descriptor)?;
                    push_be(&mut code, index);
                }
            }
        }

        let name_index = pool.add_utf8(CODE)?;
        let mut info = Vec::new();
        push_be(&mut info, self.max_stack);
        push_be(&mut info, self.max_locals);
        push_be(&mut info, code.len() as u32);
        info.extend_from_slice(&code);
        push_be(&mut info, 0_u16); // exception table
        push_be(&mut info, 0_u16); // code attributes
        Ok(Attribute { name_index, info })
    }
}

// The count operand of invokeinterface: one slot for the receiver plus the argument
// slots, where long and double take two.
fn invoke_interface_count(descriptor: &str) -> Result<u8> {
    let args = descriptor
        .strip_prefix('(')
        .and_then(|rest| rest.split_once(')'))
        .map(|(args, _)| args)
        .ok_or_else(|| malformed_error!("Invalid method descriptor {}", descriptor))?;

    let bytes = args.as_bytes();
    let mut slots: usize = 1;
    let mut i = 0;
    while i < bytes.len() {
        let dims_start = i;
        while i < bytes.len() && bytes[i] == b'[' {
            i += 1;
        }
        let is_array = i > dims_start;
        let c = *bytes
            .get(i)
            .ok_or_else(|| malformed_error!("Invalid method descriptor {}", descriptor))?;
        i += 1;
        if c == b'L' {
            let end = args[i..]
                .find(';')
                .ok_or_else(|| malformed_error!("Invalid method descriptor {}", descriptor))?;
            i += end + 1;
        } else if !matches!(c, b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z') {
            return Err(malformed_error!(
                "Invalid method descriptor {}",
                descriptor
            ));
        }
        slots += if !is_array && matches!(c, b'J' | b'D') {
            2
        } else {
            1
        };
    }

    u8::try_from(slots)
        .map_err(|_| malformed_error!("Descriptor {} exceeds 255 argument slots", descriptor))
}

/// A symbolic field definition.
#[derive(Debug, Clone)]
pub struct FieldDef {
    access: AccessFlags,
    name: String,
    descriptor: String,
    annotations: Vec<AnnotationDef>,
}

impl FieldDef {
    /// Start a field with the given name and descriptor; access defaults to
    /// package-private.
    #[must_use]
    pub fn new(name: &str, descriptor: &str) -> Self {
        FieldDef {
            access: AccessFlags::empty(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            annotations: Vec::new(),
        }
    }

    /// Set the field's access flags.
    #[must_use]
    pub fn access(mut self, access: AccessFlags) -> Self {
        self.access = access;
        self
    }

    /// Attach an annotation to the field.
    #[must_use]
    pub fn annotation(mut self, annotation: AnnotationDef) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// A symbolic method definition.
#[derive(Debug, Clone)]
pub struct MethodDef {
    access: AccessFlags,
    name: String,
    descriptor: String,
    annotations: Vec<AnnotationDef>,
    code: Option<CodeDef>,
}

impl MethodDef {
    /// Start a method with the given name and descriptor; access defaults to
    /// package-private.
    #[must_use]
    pub fn new(name: &str, descriptor: &str) -> Self {
        MethodDef {
            access: AccessFlags::empty(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            annotations: Vec::new(),
            code: None,
        }
    }

    /// Set the method's access flags.
    #[must_use]
    pub fn access(mut self, access: AccessFlags) -> Self {
        self.access = access;
        self
    }

    /// Attach an annotation to the method.
    #[must_use]
    pub fn annotation(mut self, annotation: AnnotationDef) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Attach a body to the method.
    #[must_use]
    pub fn code(mut self, code: CodeDef) -> Self {
        self.code = Some(code);
        self
    }
}

/// Builder producing a [`ClassFile`] from symbolic definitions.
pub struct ClassFileBuilder {
    major_version: u16,
    access: AccessFlags,
    name: String,
    super_name: String,
    interfaces: Vec<String>,
    annotations: Vec<AnnotationDef>,
    fields: Vec<FieldDef>,
    methods: Vec<MethodDef>,
}

impl ClassFileBuilder {
    /// Start a class with the given internal name (e.g. `com/example/Widget`).
    ///
    /// Defaults: major version 52 (Java 8), `public` access, superclass
    /// `java/lang/Object`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        ClassFileBuilder {
            major_version: 52,
            access: AccessFlags::PUBLIC | AccessFlags::SUPER,
            name: name.to_string(),
            super_name: "java/lang/Object".to_string(),
            interfaces: Vec::new(),
            annotations: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Set the class file major version.
    #[must_use]
    pub fn major_version(mut self, version: u16) -> Self {
        self.major_version = version;
        self
    }

    /// Set the class access flags.
    #[must_use]
    pub fn access(mut self, access: AccessFlags) -> Self {
        self.access = access;
        self
    }

    /// Set the superclass by internal name.
    #[must_use]
    pub fn super_class(mut self, name: &str) -> Self {
        self.super_name = name.to_string();
        self
    }

    /// Add a directly implemented interface by internal name.
    #[must_use]
    pub fn interface(mut self, name: &str) -> Self {
        self.interfaces.push(name.to_string());
        self
    }

    /// Attach a class-level annotation.
    #[must_use]
    pub fn annotation(mut self, annotation: AnnotationDef) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Add a field.
    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a method.
    #[must_use]
    pub fn method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    /// Assemble the class, interning all symbolic names into a fresh constant pool.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if a descriptor is invalid or the constant
    /// pool limit is exceeded.
    pub fn build(self) -> Result<ClassFile> {
        let mut pool = ConstantPool::new();
        let this_class = pool.add_class(&self.name)?;
        let super_class = pool.add_class(&self.super_name)?;

        let mut interfaces = Vec::with_capacity(self.interfaces.len());
        for interface in &self.interfaces {
            interfaces.push(pool.add_class(interface)?);
        }

        let mut fields = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let name_index = pool.add_utf8(&field.name)?;
            let descriptor_index = pool.add_utf8(&field.descriptor)?;
            let mut attributes = Vec::new();
            if !field.annotations.is_empty() {
                attributes.push(annotations_attribute(&mut pool, &field.annotations)?);
            }
            fields.push(Member {
                access: field.access,
                name_index,
                descriptor_index,
                attributes,
            });
        }

        let mut methods = Vec::with_capacity(self.methods.len());
        for method in &self.methods {
            let name_index = pool.add_utf8(&method.name)?;
            let descriptor_index = pool.add_utf8(&method.descriptor)?;
            let mut attributes = Vec::new();
            if let Some(code) = &method.code {
                attributes.push(code.build_attribute(&mut pool)?);
            }
            if !method.annotations.is_empty() {
                attributes.push(annotations_attribute(&mut pool, &method.annotations)?);
            }
            methods.push(Member {
                access: method.access,
                name_index,
                descriptor_index,
                attributes,
            });
        }

        let mut attributes = Vec::new();
        if !self.annotations.is_empty() {
            attributes.push(annotations_attribute(&mut pool, &self.annotations)?);
        }

        Ok(ClassFile {
            minor_version: 0,
            major_version: self.major_version,
            pool,
            access: self.access,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    /// Assemble the class and encode it straight to bytes.
    ///
    /// # Errors
    /// Same failure modes as [`ClassFileBuilder::build`].
    pub fn build_bytes(self) -> Result<Vec<u8>> {
        Ok(self.build()?.encode())
    }
}

fn annotations_attribute(
    pool: &mut ConstantPool,
    annotations: &[AnnotationDef],
) -> Result<Attribute> {
    let name_index = pool.add_utf8(RUNTIME_VISIBLE_ANNOTATIONS)?;
    let mut info = Vec::new();
    push_be(&mut info, annotations.len() as u16);
    for annotation in annotations {
        annotation.encode(pool, &mut info)?;
    }
    Ok(Attribute { name_index, info })
}
