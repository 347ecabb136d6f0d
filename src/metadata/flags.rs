//! Access flag bitflags and visibility helpers for classes, fields and methods.
//!
//! The class file format encodes modifiers as a 16-bit word on the class header and on
//! every field and method entry. Some bits are reused between contexts (0x0020 is `super`
//! on classes but `synchronized` on methods, 0x0040 is `volatile` on fields but `bridge`
//! on methods); the flag names below follow the field/class reading, with the method
//! meaning noted where it differs.

use bitflags::bitflags;

/// Bitmask covering the three visibility bits (`public`, `private`, `protected`).
///
/// A member whose access word has none of these bits set is package-private.
pub const ACC_VISIBILITY_MASK: u16 = 0x0007;

bitflags! {
    /// The access and property modifiers of a class, field or method.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AccessFlags: u16 {
        /// Declared `public`; accessible from outside its package
        const PUBLIC = 0x0001;
        /// Declared `private`; accessible only within the defining class
        const PRIVATE = 0x0002;
        /// Declared `protected`; accessible within subclasses
        const PROTECTED = 0x0004;
        /// Declared `static`
        const STATIC = 0x0008;
        /// Declared `final`
        const FINAL = 0x0010;
        /// On classes: treat superclass methods specially in `invokespecial`.
        /// On methods: declared `synchronized`
        const SUPER = 0x0020;
        /// On fields: declared `volatile`. On methods: a compiler-generated bridge
        const VOLATILE = 0x0040;
        /// On fields: declared `transient`. On methods: declared with variable arity
        const TRANSIENT = 0x0080;
        /// Declared `native`
        const NATIVE = 0x0100;
        /// Is an interface, not a class
        const INTERFACE = 0x0200;
        /// Declared `abstract`
        const ABSTRACT = 0x0400;
        /// Declared `strictfp`
        const STRICT = 0x0800;
        /// Not present in the source code; generated by the compiler
        const SYNTHETIC = 0x1000;
        /// Declared as an annotation interface
        const ANNOTATION = 0x2000;
        /// Declared as an `enum` class or an element of one
        const ENUM = 0x4000;
        /// Is a module, or a mandated parameter/member
        const MODULE = 0x8000;
    }
}

impl AccessFlags {
    /// Decode an access word exactly as it appears in the class file.
    ///
    /// All 16 bits are retained so re-encoding a class never loses modifier
    /// information, even for bits this library does not interpret.
    #[must_use]
    pub fn from_raw(raw: u16) -> Self {
        Self::from_bits_retain(raw)
    }

    /// The visibility bits of this access word.
    #[must_use]
    pub fn visibility(self) -> u16 {
        self.bits() & ACC_VISIBILITY_MASK
    }

    /// Returns `true` if no visibility modifier is set (package-private access).
    #[must_use]
    pub fn is_package_private(self) -> bool {
        self.visibility() == 0
    }

    /// Replace the visibility bits with `public`, leaving all other bits intact.
    #[must_use]
    pub fn to_public(self) -> Self {
        Self::from_bits_retain((self.bits() & !ACC_VISIBILITY_MASK) | Self::PUBLIC.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_private_detection() {
        assert!(AccessFlags::from_raw(0).is_package_private());
        assert!((AccessFlags::STATIC | AccessFlags::FINAL).is_package_private());
        assert!(!AccessFlags::PUBLIC.is_package_private());
        assert!(!AccessFlags::PROTECTED.is_package_private());
    }

    #[test]
    fn to_public_replaces_visibility() {
        let private_final = AccessFlags::PRIVATE | AccessFlags::FINAL;
        let widened = private_final.to_public();
        assert_eq!(widened, AccessFlags::PUBLIC | AccessFlags::FINAL);
    }

    #[test]
    fn to_public_keeps_existing_public() {
        let access = AccessFlags::PUBLIC | AccessFlags::STATIC;
        assert_eq!(access.to_public(), access);
    }

    #[test]
    fn from_raw_retains_all_bits() {
        let raw = 0xFFFF;
        assert_eq!(AccessFlags::from_raw(raw).bits(), raw);
    }
}
