//! Structural reader for annotation attributes.
//!
//! Implements enough of the `Runtime{In,}VisibleAnnotations` element-value grammar to
//! extract what the environment stripper needs from class and member metadata: the
//! annotation type descriptor, enum constant elements, class reference elements and
//! nested annotation arrays (the encoding repeatable annotations use for their
//! container). Primitive and string elements are carried as opaque pool indices.
//!
//! The reader is allocation-light and touches only the attribute payload it is handed;
//! it is the reason the stripper's scan phase never needs to decode instruction bytes.

use crate::{file::parser::Parser, metadata::pool::ConstantPool, Result};

// Deeply nested element values do not occur in real class files; the bound exists to
// reject adversarial input without recursing.
const MAX_ELEMENT_DEPTH: usize = 16;

/// A single decoded annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation<'a> {
    /// The annotation interface, as a field descriptor (e.g. `Lcom/example/Tag;`)
    pub descriptor: &'a str,
    /// Named element values, in declaration order
    pub elements: Vec<(&'a str, ElementValue<'a>)>,
}

/// One annotation element value.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue<'a> {
    /// A primitive or string constant, carried as its pool index
    Const(u16),
    /// An enum constant
    EnumConst {
        /// Field descriptor of the enum type
        type_descriptor: &'a str,
        /// Name of the enum constant
        constant: &'a str,
    },
    /// A class reference, as a return descriptor
    Class(&'a str),
    /// A nested annotation
    Annotation(Annotation<'a>),
    /// An array of element values
    Array(Vec<ElementValue<'a>>),
}

impl<'a> Annotation<'a> {
    /// Look up an element by name.
    #[must_use]
    pub fn element(&self, name: &str) -> Option<&ElementValue<'a>> {
        self.elements
            .iter()
            .find(|(element, _)| *element == name)
            .map(|(_, value)| value)
    }

    /// The enum constant name of the named element, if it is an enum element.
    #[must_use]
    pub fn enum_constant(&self, name: &str) -> Option<&'a str> {
        match self.element(name) {
            Some(ElementValue::EnumConst { constant, .. }) => Some(constant),
            _ => None,
        }
    }

    /// The class descriptor of the named element, if it is a class element.
    #[must_use]
    pub fn class_descriptor(&self, name: &str) -> Option<&'a str> {
        match self.element(name) {
            Some(ElementValue::Class(descriptor)) => Some(descriptor),
            _ => None,
        }
    }

    /// The value array of the named element, if it is an array element.
    #[must_use]
    pub fn array(&self, name: &str) -> Option<&[ElementValue<'a>]> {
        match self.element(name) {
            Some(ElementValue::Array(values)) => Some(values),
            _ => None,
        }
    }
}

/// Parse the annotations of one `Runtime{In,}VisibleAnnotations` attribute payload.
///
/// # Arguments
/// * `info` - The raw attribute payload
/// * `pool` - The constant pool of the owning class
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for unknown element tags or indices that do not
/// resolve, and [`crate::Error::OutOfBounds`] for truncated payloads.
pub fn parse_annotations<'a>(
    info: &'a [u8],
    pool: &'a ConstantPool,
) -> Result<Vec<Annotation<'a>>> {
    let mut parser = Parser::new(info);
    let count = parser.read_be::<u16>()?;
    let mut annotations = Vec::with_capacity(count as usize);
    for _ in 0..count {
        annotations.push(parse_annotation(&mut parser, pool, 0)?);
    }
    Ok(annotations)
}

fn parse_annotation<'a>(
    parser: &mut Parser<'a>,
    pool: &'a ConstantPool,
    depth: usize,
) -> Result<Annotation<'a>> {
    let type_index = parser.read_be::<u16>()?;
    let descriptor = pool.utf8(type_index)?;

    let count = parser.read_be::<u16>()?;
    let mut elements = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name_index = parser.read_be::<u16>()?;
        let name = pool.utf8(name_index)?;
        let value = parse_element_value(parser, pool, depth + 1)?;
        elements.push((name, value));
    }

    Ok(Annotation {
        descriptor,
        elements,
    })
}

fn parse_element_value<'a>(
    parser: &mut Parser<'a>,
    pool: &'a ConstantPool,
    depth: usize,
) -> Result<ElementValue<'a>> {
    if depth > MAX_ELEMENT_DEPTH {
        return Err(malformed_error!(
            "Annotation element nesting exceeds {} levels",
            MAX_ELEMENT_DEPTH
        ));
    }

    let tag = parser.read_be::<u8>()?;
    match tag {
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' => {
            Ok(ElementValue::Const(parser.read_be::<u16>()?))
        }
        b'e' => {
            let type_index = parser.read_be::<u16>()?;
            let constant_index = parser.read_be::<u16>()?;
            Ok(ElementValue::EnumConst {
                type_descriptor: pool.utf8(type_index)?,
                constant: pool.utf8(constant_index)?,
            })
        }
        b'c' => {
            let class_index = parser.read_be::<u16>()?;
            Ok(ElementValue::Class(pool.utf8(class_index)?))
        }
        b'@' => Ok(ElementValue::Annotation(parse_annotation(
            parser,
            pool,
            depth + 1,
        )?)),
        b'[' => {
            let count = parser.read_be::<u16>()?;
            let mut values = Vec::with_capacity(count as usize);
            for _ in 0..count {
                values.push(parse_element_value(parser, pool, depth + 1)?);
            }
            Ok(ElementValue::Array(values))
        }
        _ => Err(malformed_error!(
            "Unknown annotation element tag {} at offset {}",
            tag,
            parser.pos()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::io::push_be;

    fn sample_pool() -> (ConstantPool, u16, u16, u16, u16, u16) {
        let mut pool = ConstantPool::new();
        let descriptor = pool.add_utf8("Lcom/example/Tag;").unwrap();
        let value_name = pool.add_utf8("value").unwrap();
        let enum_type = pool.add_utf8("Lcom/example/Side;").unwrap();
        let enum_constant = pool.add_utf8("LEFT").unwrap();
        let class_descriptor = pool.add_utf8("Lcom/example/Hook;").unwrap();
        (
            pool,
            descriptor,
            value_name,
            enum_type,
            enum_constant,
            class_descriptor,
        )
    }

    #[test]
    fn parses_enum_element() {
        let (pool, descriptor, value_name, enum_type, enum_constant, _) = sample_pool();

        let mut info = Vec::new();
        push_be(&mut info, 1_u16); // one annotation
        push_be(&mut info, descriptor);
        push_be(&mut info, 1_u16); // one element
        push_be(&mut info, value_name);
        info.push(b'e');
        push_be(&mut info, enum_type);
        push_be(&mut info, enum_constant);

        let annotations = parse_annotations(&info, &pool).unwrap();
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].descriptor, "Lcom/example/Tag;");
        assert_eq!(annotations[0].enum_constant("value"), Some("LEFT"));
    }

    #[test]
    fn parses_class_element_and_nested_array() {
        let (pool, descriptor, value_name, _, _, class_descriptor) = sample_pool();

        // @Tag(value = [@Tag(value = Hook.class)]) exercises '@', '[' and 'c'
        let mut inner = Vec::new();
        push_be(&mut inner, descriptor);
        push_be(&mut inner, 1_u16);
        push_be(&mut inner, value_name);
        inner.push(b'c');
        push_be(&mut inner, class_descriptor);

        let mut info = Vec::new();
        push_be(&mut info, 1_u16);
        push_be(&mut info, descriptor);
        push_be(&mut info, 1_u16);
        push_be(&mut info, value_name);
        info.push(b'[');
        push_be(&mut info, 1_u16);
        info.push(b'@');
        info.extend_from_slice(&inner);

        let annotations = parse_annotations(&info, &pool).unwrap();
        let array = annotations[0].array("value").unwrap();
        let ElementValue::Annotation(nested) = &array[0] else {
            panic!("expected nested annotation");
        };
        assert_eq!(
            nested.class_descriptor("value"),
            Some("Lcom/example/Hook;")
        );
    }

    #[test]
    fn rejects_unknown_tag() {
        let (pool, descriptor, value_name, ..) = sample_pool();

        let mut info = Vec::new();
        push_be(&mut info, 1_u16);
        push_be(&mut info, descriptor);
        push_be(&mut info, 1_u16);
        push_be(&mut info, value_name);
        info.push(b'?');

        assert!(parse_annotations(&info, &pool).is_err());
    }

    #[test]
    fn missing_element_is_none() {
        let (pool, descriptor, ..) = sample_pool();

        let mut info = Vec::new();
        push_be(&mut info, 1_u16);
        push_be(&mut info, descriptor);
        push_be(&mut info, 0_u16);

        let annotations = parse_annotations(&info, &pool).unwrap();
        assert!(annotations[0].element("value").is_none());
        assert!(annotations[0].enum_constant("value").is_none());
    }
}
