//! Integration tests for the call redirection pass.
//!
//! These tests verify the redirect cycle end to end over synthesized classes: exact
//! triple matching, operand-only patching, idempotence and the built-in Guava table.

use classweave::prelude::*;

fn caller_class() -> Vec<u8> {
    ClassFileBuilder::new("com/example/Caller")
        .method(
            MethodDef::new("run", "()V").access(AccessFlags::PUBLIC).code(
                CodeDef::new(2, 1)
                    .simple(opcodes::ACONST_NULL)
                    .simple(opcodes::ACONST_NULL)
                    .invoke(
                        opcodes::INVOKESTATIC,
                        "com/google/common/base/Objects",
                        "firstNonNull",
                        "(Ljava/lang/Object;Ljava/lang/Object;)Ljava/lang/Object;",
                    )
                    .simple(opcodes::POP)
                    .invoke(
                        opcodes::INVOKESTATIC,
                        "com/example/Caller",
                        "helper",
                        "()V",
                    )
                    .simple(opcodes::RETURN),
            ),
        )
        .method(
            MethodDef::new("helper", "()V")
                .access(AccessFlags::PUBLIC | AccessFlags::STATIC)
                .code(CodeDef::new(0, 0).simple(opcodes::RETURN)),
        )
        .build_bytes()
        .unwrap()
}

fn code_of(class: &ClassFile, method_index: usize) -> Vec<u8> {
    let attribute = &class.methods[method_index].attributes[0];
    let code_length = u32::from_be_bytes([
        attribute.info[4],
        attribute.info[5],
        attribute.info[6],
        attribute.info[7],
    ]) as usize;
    attribute.info[8..8 + code_length].to_vec()
}

fn call_target(class: &ClassFile, code: &[u8], call_offset: usize) -> (String, String, String) {
    let index = u16::from_be_bytes([code[call_offset + 1], code[call_offset + 2]]);
    let member = class.pool.member_ref(index).unwrap();
    (
        member.owner.to_string(),
        member.name.to_string(),
        member.descriptor.to_string(),
    )
}

#[test]
fn redirects_matching_call_and_leaves_everything_else() {
    let bytes = caller_class();
    let rewritten = rewrite_calls(&bytes, GUAVA_REDIRECTS).unwrap();

    let before = ClassFile::decode(&bytes).unwrap();
    let after = ClassFile::decode(&rewritten).unwrap();

    let code_before = code_of(&before, 0);
    let code_after = code_of(&after, 0);
    assert_eq!(code_before.len(), code_after.len());

    // Layout: aconst_null, aconst_null, invokestatic(2..5), pop, invokestatic(6..9),
    // return. Only the first call's two operand bytes may differ.
    let patched = 3..5;
    for (offset, (byte_before, byte_after)) in
        code_before.iter().zip(code_after.iter()).enumerate()
    {
        if patched.contains(&offset) {
            continue;
        }
        assert_eq!(
            byte_before, byte_after,
            "instruction byte at offset {offset} changed"
        );
    }

    let (owner, name, descriptor) = call_target(&after, &code_after, 2);
    assert_eq!(owner, "com/google/common/base/MoreObjects");
    assert_eq!(name, "firstNonNull");
    assert_eq!(
        descriptor,
        "(Ljava/lang/Object;Ljava/lang/Object;)Ljava/lang/Object;"
    );

    // The unrelated call is untouched.
    let (owner, name, _) = call_target(&after, &code_after, 6);
    assert_eq!(owner, "com/example/Caller");
    assert_eq!(name, "helper");

    // The untouched helper method is byte-identical.
    assert_eq!(code_of(&before, 1), code_of(&after, 1));
}

#[test]
fn rerunning_on_own_output_is_a_no_op() {
    let bytes = caller_class();
    let once = rewrite_calls(&bytes, GUAVA_REDIRECTS).unwrap();
    let twice = rewrite_calls(&once, GUAVA_REDIRECTS).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn class_without_matches_keeps_its_structure() {
    let bytes = ClassFileBuilder::new("com/example/Quiet")
        .method(
            MethodDef::new("run", "()V").access(AccessFlags::PUBLIC).code(
                CodeDef::new(1, 1)
                    .invoke(opcodes::INVOKESTATIC, "com/example/Quiet", "helper", "()V")
                    .simple(opcodes::RETURN),
            ),
        )
        .build_bytes()
        .unwrap();

    let rewritten = rewrite_calls(&bytes, GUAVA_REDIRECTS).unwrap();
    let before = ClassFile::decode(&bytes).unwrap();
    let after = ClassFile::decode(&rewritten).unwrap();
    assert_eq!(code_of(&before, 0), code_of(&after, 0));
    assert_eq!(before.pool.len(), after.pool.len());
}

#[test]
fn methods_without_code_are_skipped() {
    let bytes = ClassFileBuilder::new("com/example/Iface")
        .access(AccessFlags::PUBLIC | AccessFlags::INTERFACE | AccessFlags::ABSTRACT)
        .method(
            MethodDef::new("run", "()V").access(AccessFlags::PUBLIC | AccessFlags::ABSTRACT),
        )
        .build_bytes()
        .unwrap();

    let rewritten = rewrite_calls(&bytes, GUAVA_REDIRECTS).unwrap();
    let class = ClassFile::decode(&rewritten).unwrap();
    assert_eq!(class.methods.len(), 1);
    assert!(class.methods[0].attributes.is_empty());
}

#[test]
fn interface_calls_keep_their_reference_kind() {
    static TABLE: &[CallRedirect] = &[CallRedirect {
        owner: "legacy/Listener",
        name: "notify",
        descriptor: None,
        redirect_owner: Some("modern/Listener"),
        redirect_name: None,
        redirect_descriptor: None,
    }];

    let bytes = ClassFileBuilder::new("com/example/Caller")
        .method(
            MethodDef::new("run", "(Llegacy/Listener;)V")
                .access(AccessFlags::PUBLIC)
                .code(
                    CodeDef::new(1, 2)
                        .invoke(
                            opcodes::INVOKEINTERFACE,
                            "legacy/Listener",
                            "notify",
                            "(I)V",
                        )
                        .simple(opcodes::RETURN),
                ),
        )
        .build_bytes()
        .unwrap();

    let rewritten = rewrite_calls(&bytes, TABLE).unwrap();
    let class = ClassFile::decode(&rewritten).unwrap();
    let code = code_of(&class, 0);
    let index = u16::from_be_bytes([code[1], code[2]]);
    let member = class.pool.member_ref(index).unwrap();
    assert_eq!(member.kind, RefKind::InterfaceMethod);
    assert_eq!(member.owner, "modern/Listener");
}

#[test]
fn malformed_bytes_are_rejected() {
    assert!(rewrite_calls(&[0xCA, 0xFE], GUAVA_REDIRECTS).is_err());
    assert!(rewrite_calls(&[0x00, 0x01, 0x02, 0x03], GUAVA_REDIRECTS).is_err());
}
