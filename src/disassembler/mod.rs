//! Instruction stream walking for the `Code` attribute.
//!
//! This module provides what the call-rewriting pass needs from a disassembler: finding
//! every instruction boundary in a bytecode array so that operand bytes can be read and
//! patched at known offsets. Instructions are not lifted into a node model — the rewrite
//! works by patching constant pool operands in place, which never changes instruction
//! lengths, so offsets, jump targets and stack map frames all stay valid without
//! recomputation.
//!
//! # Key Components
//!
//! - [`crate::disassembler::opcodes`] - Opcode constants
//! - [`crate::disassembler::insn_length`] - Length of the instruction at an offset,
//!   including the variable-length forms (`wide`, `tableswitch`, `lookupswitch`)
//! - [`crate::disassembler::CodeCursor`] - Bounds-checked walker over a bytecode array
//!
//! # Usage Examples
//!
//! ```rust
//! use classweave::disassembler::{opcodes, CodeCursor};
//!
//! let code = [opcodes::ALOAD_0, opcodes::INVOKEVIRTUAL, 0x00, 0x05, opcodes::RETURN];
//! let mut cursor = CodeCursor::new(&code);
//! let mut seen = Vec::new();
//! while let Some((offset, opcode)) = cursor.next_insn()? {
//!     seen.push((offset, opcode));
//! }
//! assert_eq!(seen, vec![(0, opcodes::ALOAD_0), (1, opcodes::INVOKEVIRTUAL), (4, opcodes::RETURN)]);
//! # Ok::<(), classweave::Error>(())
//! ```

use crate::{file::io::read_be_at, Result};

/// Opcode constants for the instructions this crate inspects or emits.
///
/// The set is not the full instruction listing — only the opcodes that appear in the
/// rewriting passes, the builder and their tests. Lengths for the full opcode space are
/// handled by [`crate::disassembler::insn_length`].
pub mod opcodes {
    /// Do nothing
    pub const NOP: u8 = 0x00;
    /// Push `null`
    pub const ACONST_NULL: u8 = 0x01;
    /// Push int constant 0
    pub const ICONST_0: u8 = 0x03;
    /// Push int constant 1
    pub const ICONST_1: u8 = 0x04;
    /// Push a byte as an int
    pub const BIPUSH: u8 = 0x10;
    /// Push a constant pool entry (narrow index)
    pub const LDC: u8 = 0x12;
    /// Load reference from local variable 0
    pub const ALOAD_0: u8 = 0x2A;
    /// Pop the top operand stack value
    pub const POP: u8 = 0x57;
    /// Duplicate the top operand stack value
    pub const DUP: u8 = 0x59;
    /// Increment local variable by constant
    pub const IINC: u8 = 0x84;
    /// Jump table by index
    pub const TABLESWITCH: u8 = 0xAA;
    /// Jump table by key lookup
    pub const LOOKUPSWITCH: u8 = 0xAB;
    /// Return int from method
    pub const IRETURN: u8 = 0xAC;
    /// Return reference from method
    pub const ARETURN: u8 = 0xB0;
    /// Return void from method
    pub const RETURN: u8 = 0xB1;
    /// Get static field
    pub const GETSTATIC: u8 = 0xB2;
    /// Put static field
    pub const PUTSTATIC: u8 = 0xB3;
    /// Get instance field
    pub const GETFIELD: u8 = 0xB4;
    /// Put instance field
    pub const PUTFIELD: u8 = 0xB5;
    /// Invoke instance method by class dispatch
    pub const INVOKEVIRTUAL: u8 = 0xB6;
    /// Invoke constructor, private or super method
    pub const INVOKESPECIAL: u8 = 0xB7;
    /// Invoke static method
    pub const INVOKESTATIC: u8 = 0xB8;
    /// Invoke interface method
    pub const INVOKEINTERFACE: u8 = 0xB9;
    /// Invoke a dynamically computed call site
    pub const INVOKEDYNAMIC: u8 = 0xBA;
    /// Widened-operand prefix
    pub const WIDE: u8 = 0xC4;
    /// Unconditional jump with 32-bit offset
    pub const GOTO_W: u8 = 0xC8;
}

/// Returns `true` for the four call opcodes that carry a member reference operand.
///
/// `invokedynamic` is deliberately excluded: its operand references a call site
/// specifier, not a member reference, and is never redirected.
#[must_use]
pub fn is_call(opcode: u8) -> bool {
    matches!(
        opcode,
        opcodes::INVOKEVIRTUAL
            | opcodes::INVOKESPECIAL
            | opcodes::INVOKESTATIC
            | opcodes::INVOKEINTERFACE
    )
}

// Fixed instruction lengths, opcode byte included. The three variable-length opcodes
// and the unassigned range return None.
fn fixed_length(opcode: u8) -> Option<usize> {
    Some(match opcode {
        0x00..=0x0F => 1,          // nop, constants
        0x10 => 2,                 // bipush
        0x11 => 3,                 // sipush
        0x12 => 2,                 // ldc
        0x13 | 0x14 => 3,          // ldc_w, ldc2_w
        0x15..=0x19 => 2,          // loads with index operand
        0x1A..=0x35 => 1,          // shorthand loads, array loads
        0x36..=0x3A => 2,          // stores with index operand
        0x3B..=0x83 => 1,          // shorthand stores, stack ops, arithmetic
        0x84 => 3,                 // iinc
        0x85..=0x98 => 1,          // conversions, comparisons
        0x99..=0xA8 => 3,          // conditional branches, goto, jsr
        0xA9 => 2,                 // ret
        0xAC..=0xB1 => 1,          // returns
        0xB2..=0xB8 => 3,          // field access, invokevirtual/special/static
        0xB9 | 0xBA => 5,          // invokeinterface, invokedynamic
        0xBB => 3,                 // new
        0xBC => 2,                 // newarray
        0xBD => 3,                 // anewarray
        0xBE | 0xBF => 1,          // arraylength, athrow
        0xC0 | 0xC1 => 3,          // checkcast, instanceof
        0xC2 | 0xC3 => 1,          // monitorenter, monitorexit
        0xC5 => 4,                 // multianewarray
        0xC6 | 0xC7 => 3,          // ifnull, ifnonnull
        0xC8 | 0xC9 => 5,          // goto_w, jsr_w
        0xCA | 0xFE | 0xFF => 1,   // breakpoint, impdep1, impdep2
        _ => return None,
    })
}

/// Compute the total length of the instruction starting at `offset`, opcode included.
///
/// Handles the three variable-length encodings: `wide` (4 or 6 bytes depending on the
/// modified opcode), and the two switch instructions with their alignment padding and
/// table operands.
///
/// # Arguments
/// * `code` - The full bytecode array of one method
/// * `offset` - Offset of the instruction's opcode byte
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for unassigned opcodes or switch tables that do
/// not fit the array, and [`crate::Error::OutOfBounds`] when operands are truncated.
pub fn insn_length(code: &[u8], offset: usize) -> Result<usize> {
    let opcode = *code
        .get(offset)
        .ok_or_else(|| malformed_error!("Instruction offset {} outside bytecode", offset))?;

    let length = match opcode {
        opcodes::WIDE => {
            let modified = *code.get(offset + 1).ok_or_else(|| {
                malformed_error!("Truncated wide instruction at offset {}", offset)
            })?;
            if modified == opcodes::IINC {
                6
            } else {
                4
            }
        }
        opcodes::TABLESWITCH => {
            let padding = switch_padding(offset);
            let mut cursor = offset + 1 + padding + 4; // skip padding and default
            let low = read_be_at::<i32>(code, &mut cursor)?;
            let high = read_be_at::<i32>(code, &mut cursor)?;
            let entries = i64::from(high) - i64::from(low) + 1;
            if entries < 0 || entries > code.len() as i64 {
                return Err(malformed_error!(
                    "tableswitch at offset {} declares {} entries",
                    offset,
                    entries
                ));
            }
            1 + padding + 12 + (entries as usize) * 4
        }
        opcodes::LOOKUPSWITCH => {
            let padding = switch_padding(offset);
            let mut cursor = offset + 1 + padding + 4; // skip padding and default
            let pairs = read_be_at::<i32>(code, &mut cursor)?;
            if pairs < 0 || i64::from(pairs) > code.len() as i64 {
                return Err(malformed_error!(
                    "lookupswitch at offset {} declares {} pairs",
                    offset,
                    pairs
                ));
            }
            1 + padding + 8 + (pairs as usize) * 8
        }
        _ => fixed_length(opcode)
            .ok_or_else(|| malformed_error!("Unassigned opcode 0x{:02x} at offset {}", opcode, offset))?,
    };

    if offset + length > code.len() {
        return Err(malformed_error!(
            "Instruction 0x{:02x} at offset {} overruns bytecode of {} bytes",
            opcode,
            offset,
            code.len()
        ));
    }

    Ok(length)
}

// Padding after a switch opcode so the default operand starts 4-byte aligned relative
// to the start of the code array.
fn switch_padding(offset: usize) -> usize {
    (4 - ((offset + 1) % 4)) % 4
}

/// A bounds-checked walker over one method's bytecode array.
///
/// Yields `(offset, opcode)` pairs in stream order. Every yielded instruction has been
/// length-validated, so operand bytes up to its full length may be read without further
/// bounds checks.
pub struct CodeCursor<'a> {
    code: &'a [u8],
    offset: usize,
}

impl<'a> CodeCursor<'a> {
    /// Create a cursor over a bytecode array.
    #[must_use]
    pub fn new(code: &'a [u8]) -> Self {
        CodeCursor { code, offset: 0 }
    }

    /// Advance to the next instruction.
    ///
    /// Returns `Ok(None)` at the end of the stream.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the stream contains an unassigned opcode
    /// or an instruction that overruns the array.
    pub fn next_insn(&mut self) -> Result<Option<(usize, u8)>> {
        if self.offset >= self.code.len() {
            return Ok(None);
        }

        let offset = self.offset;
        let opcode = self.code[offset];
        self.offset = offset + insn_length(self.code, offset)?;
        Ok(Some((offset, opcode)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(code: &[u8]) -> Vec<(usize, u8)> {
        let mut cursor = CodeCursor::new(code);
        let mut out = Vec::new();
        while let Some(insn) = cursor.next_insn().unwrap() {
            out.push(insn);
        }
        out
    }

    #[test]
    fn fixed_lengths() {
        assert_eq!(insn_length(&[opcodes::NOP], 0).unwrap(), 1);
        assert_eq!(insn_length(&[opcodes::BIPUSH, 0x07], 0).unwrap(), 2);
        assert_eq!(
            insn_length(&[opcodes::INVOKEVIRTUAL, 0x00, 0x01], 0).unwrap(),
            3
        );
        assert_eq!(
            insn_length(&[opcodes::INVOKEINTERFACE, 0x00, 0x01, 0x02, 0x00], 0).unwrap(),
            5
        );
    }

    #[test]
    fn wide_lengths() {
        // wide iload 0x0105
        assert_eq!(insn_length(&[opcodes::WIDE, 0x15, 0x01, 0x05], 0).unwrap(), 4);
        // wide iinc 0x0105 by 2
        assert_eq!(
            insn_length(&[opcodes::WIDE, opcodes::IINC, 0x01, 0x05, 0x00, 0x02], 0).unwrap(),
            6
        );
    }

    #[test]
    fn tableswitch_with_padding() {
        // tableswitch at offset 0: 3 bytes of padding, default, low = 1, high = 2,
        // two branch offsets
        let mut code = vec![opcodes::TABLESWITCH, 0, 0, 0];
        code.extend_from_slice(&20_i32.to_be_bytes());
        code.extend_from_slice(&1_i32.to_be_bytes());
        code.extend_from_slice(&2_i32.to_be_bytes());
        code.extend_from_slice(&8_i32.to_be_bytes());
        code.extend_from_slice(&12_i32.to_be_bytes());
        assert_eq!(insn_length(&code, 0).unwrap(), code.len());
    }

    #[test]
    fn lookupswitch_alignment_depends_on_offset() {
        // nop pushes the switch to offset 1: 2 bytes of padding keep the default
        // 4-byte aligned
        let mut code = vec![opcodes::NOP, opcodes::LOOKUPSWITCH, 0, 0];
        code.extend_from_slice(&16_i32.to_be_bytes());
        code.extend_from_slice(&1_i32.to_be_bytes());
        code.extend_from_slice(&7_i32.to_be_bytes());
        code.extend_from_slice(&12_i32.to_be_bytes());
        let walked = walk(&code);
        assert_eq!(
            walked,
            vec![(0, opcodes::NOP), (1, opcodes::LOOKUPSWITCH)]
        );
    }

    #[test]
    fn walks_call_sequence() {
        let code = [
            opcodes::ALOAD_0,
            opcodes::INVOKESPECIAL,
            0x00,
            0x08,
            opcodes::RETURN,
        ];
        assert_eq!(
            walk(&code),
            vec![
                (0, opcodes::ALOAD_0),
                (1, opcodes::INVOKESPECIAL),
                (4, opcodes::RETURN)
            ]
        );
    }

    #[test]
    fn rejects_unassigned_opcode() {
        assert!(insn_length(&[0xD0], 0).is_err());
    }

    #[test]
    fn rejects_truncated_operands() {
        assert!(insn_length(&[opcodes::INVOKESTATIC, 0x00], 0).is_err());
    }

    #[test]
    fn call_predicate() {
        assert!(is_call(opcodes::INVOKEVIRTUAL));
        assert!(is_call(opcodes::INVOKEINTERFACE));
        assert!(!is_call(opcodes::INVOKEDYNAMIC));
        assert!(!is_call(opcodes::GETSTATIC));
    }
}
