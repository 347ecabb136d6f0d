use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use classweave::prelude::*;

const ENVIRONMENT_ANNOTATION: &str = "Lnet/fabricmc/api/Environment;";
const SIDE: &str = "Lnet/fabricmc/api/EnvType;";

fn sample_class() -> Vec<u8> {
    let mut builder = ClassFileBuilder::new("com/example/Mod");
    for index in 0..24 {
        let name = format!("field{index}");
        builder = builder.field(FieldDef::new(&name, "I"));
    }
    for index in 0..24 {
        let name = format!("method{index}");
        let mut method = MethodDef::new(&name, "()V").code(
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
                .simple(opcodes::RETURN),
        );
        if index % 4 == 0 {
            method = method.annotation(
                AnnotationDef::new(ENVIRONMENT_ANNOTATION).enum_element("value", SIDE, "CLIENT"),
            );
        }
        builder = builder.method(method);
    }
    builder.build_bytes().unwrap()
}

fn bench_transform(c: &mut Criterion) {
    let bytes = sample_class();
    let widener = WidenRules::new();
    let transformer = ClassTransformer::new(&widener);
    let ctx = LoadContext {
        is_development: false,
        environment: EnvironmentType::Server,
        requires_package_access_hack: false,
    };

    c.bench_function("transform_strip", |b| {
        b.iter(|| {
            transformer
                .transform(black_box(&ctx), "com.example.Mod", black_box(&bytes))
                .unwrap()
        })
    });

    c.bench_function("rewrite_calls", |b| {
        b.iter(|| rewrite_calls(black_box(&bytes), GUAVA_REDIRECTS).unwrap())
    });

    c.bench_function("decode_encode", |b| {
        b.iter(|| ClassFile::decode(black_box(&bytes)).unwrap().encode())
    });
}

criterion_group!(benches, bench_transform);
criterion_main!(benches);
