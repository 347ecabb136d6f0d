//! Call-site redirection for renamed and removed library APIs.
//!
//! The game ships compiled against an old release of the Guava utility library; newer
//! releases renamed or removed some of the static helpers it calls. Rather than pinning
//! the old library, every loaded class has its call sites checked against a redirect
//! table and patched to the surviving API surface.
//!
//! This pass runs as its own decode → walk → encode cycle, before and independently of
//! the conditional transformation chain, so the fix applies even to classes that no
//! conditional pass touches. Rewriting works by interning the redirected member
//! reference into the constant pool and patching the call's two-byte operand in place:
//! instruction lengths never change, so offsets, jump targets and stack map frames all
//! remain valid.
//!
//! The pass is idempotent — once rewritten, a call site's triple no longer matches any
//! table entry — and the absence of a match is not an error.

use crate::{
    disassembler::{is_call, CodeCursor},
    file::io::read_be,
    metadata::{
        attributes::CODE,
        classfile::ClassFile,
        pool::{ConstantPool, MemberRef, RefKind},
    },
    Result,
};

/// One entry of a call redirect table.
///
/// The match side is an (owner, name) pair with an optional descriptor constraint; the
/// redirect side replaces any subset of owner, name and descriptor, keeping the matched
/// values for components left `None`.
#[derive(Debug, Clone, Copy)]
pub struct CallRedirect {
    /// Internal name of the owner to match
    pub owner: &'static str,
    /// Member name to match
    pub name: &'static str,
    /// Descriptor to match, or `None` to match any descriptor
    pub descriptor: Option<&'static str>,
    /// Replacement owner, if the owner changes
    pub redirect_owner: Option<&'static str>,
    /// Replacement name, if the name changes
    pub redirect_name: Option<&'static str>,
    /// Replacement descriptor, if the descriptor changes
    pub redirect_descriptor: Option<&'static str>,
}

impl CallRedirect {
    /// Returns `true` if this entry matches the resolved call target.
    #[must_use]
    pub fn matches(&self, member: &MemberRef<'_>) -> bool {
        member.owner == self.owner
            && member.name == self.name
            && self
                .descriptor
                .map_or(true, |descriptor| member.descriptor == descriptor)
    }
}

/// The built-in redirect table for the Guava API surface the game was compiled against.
///
/// Compiled into the binary, read-only, and shared by all transform calls without
/// synchronization.
pub static GUAVA_REDIRECTS: &[CallRedirect] = &[
    CallRedirect {
        owner: "com/google/common/base/Objects",
        name: "firstNonNull",
        descriptor: Some("(Ljava/lang/Object;Ljava/lang/Object;)Ljava/lang/Object;"),
        redirect_owner: Some("com/google/common/base/MoreObjects"),
        redirect_name: None,
        redirect_descriptor: None,
    },
    CallRedirect {
        owner: "com/google/common/collect/Iterators",
        name: "emptyIterator",
        descriptor: None,
        redirect_owner: Some("net/fabricmc/loader/guava/IteratorsFix"),
        redirect_name: Some("emptyListIterator"),
        redirect_descriptor: Some("()Lcom/google/common/collect/UnmodifiableListIterator;"),
    },
    CallRedirect {
        owner: "com/google/common/base/Objects",
        name: "toStringHelper",
        descriptor: None,
        redirect_owner: Some("com/google/common/base/MoreObjects"),
        redirect_name: None,
        redirect_descriptor: None,
    },
];

/// Rewrite every matching call site in a class.
///
/// Performs one full decode → walk → encode cycle over `bytes`. Classes without any
/// matching call are still re-encoded; their structure is unchanged.
///
/// # Arguments
/// * `bytes` - The raw class bytes
/// * `table` - The redirect table to match call sites against
///
/// # Errors
/// Returns the codec's decode errors for malformed input; never fails on well-formed
/// input, whether or not anything matches.
pub fn rewrite_calls(bytes: &[u8], table: &[CallRedirect]) -> Result<Vec<u8>> {
    let mut class = ClassFile::decode(bytes)?;

    let mut methods = std::mem::take(&mut class.methods);
    for method in &mut methods {
        for attribute in &mut method.attributes {
            if class.pool.utf8(attribute.name_index)? != CODE {
                continue;
            }
            rewrite_code(&mut class.pool, &mut attribute.info, table)?;
        }
    }
    class.methods = methods;

    Ok(class.encode())
}

// Layout of a Code attribute payload: max_stack (u2), max_locals (u2),
// code_length (u4), code bytes, exception table, nested attributes.
const CODE_HEADER_LEN: usize = 8;

fn rewrite_code(
    pool: &mut ConstantPool,
    info: &mut [u8],
    table: &[CallRedirect],
) -> Result<()> {
    if info.len() < CODE_HEADER_LEN {
        return Err(malformed_error!(
            "Code attribute of {} bytes is shorter than its header",
            info.len()
        ));
    }

    let code_length = read_be::<u32>(&info[4..])? as usize;
    let code_end = CODE_HEADER_LEN
        .checked_add(code_length)
        .filter(|end| *end <= info.len())
        .ok_or_else(|| {
            malformed_error!("Code attribute declares {} code bytes", code_length)
        })?;

    let mut patches: Vec<(usize, u16)> = Vec::new();
    {
        let code = &info[CODE_HEADER_LEN..code_end];
        let mut cursor = CodeCursor::new(code);
        while let Some((offset, opcode)) = cursor.next_insn()? {
            if !is_call(opcode) {
                continue;
            }

            let index = u16::from_be_bytes([code[offset + 1], code[offset + 2]]);
            let target = {
                let member = pool.member_ref(index)?;
                if member.kind == RefKind::Field {
                    return Err(malformed_error!(
                        "Call instruction at offset {} references a field",
                        offset
                    ));
                }
                table.iter().find(|entry| entry.matches(&member)).map(|entry| {
                    (
                        member.kind,
                        entry.redirect_owner.unwrap_or(member.owner).to_string(),
                        entry.redirect_name.unwrap_or(member.name).to_string(),
                        entry
                            .redirect_descriptor
                            .unwrap_or(member.descriptor)
                            .to_string(),
                    )
                })
            };

            let Some((kind, owner, name, descriptor)) = target else {
                continue;
            };
            let redirected = match kind {
                RefKind::InterfaceMethod => {
                    pool.add_interface_method_ref(&owner, &name, &descriptor)?
                }
                _ => pool.add_method_ref(&owner, &name, &descriptor)?,
            };
            patches.push((CODE_HEADER_LEN + offset + 1, redirected));
        }
    }

    for (position, index) in patches {
        info[position..position + 2].copy_from_slice(&index.to_be_bytes());
    }

    Ok(())
}
