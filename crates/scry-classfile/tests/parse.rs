use scry_classfile::{
    ClassFile, ConstValue, ElementValue, Error, ParseOptions, ACC_ABSTRACT, ACC_INTERFACE,
    ACC_PUBLIC, ACC_SUPER, CLASS_FILE_MAGIC,
};
use scry_test_utils::{AnnotationSpec, ClassFileBuilder, ElementSpec, MemberSpec};

fn sample() -> ClassFileBuilder {
    ClassFileBuilder::class("com/example/Dog")
        .extends("com/example/Animal")
        .implements("java/lang/Comparable")
        .implements("java/io/Serializable")
        .signature("Lcom/example/Animal;Ljava/lang/Comparable<Lcom/example/Dog;>;")
        .annotate("Lcom/example/Pet;")
        .annotate_invisible("Lcom/example/Internal;")
        .field(
            MemberSpec::new("name", "Ljava/lang/String;").annotate("Ljavax/annotation/Nonnull;"),
        )
        .method(
            MemberSpec::new("compareTo", "(Lcom/example/Dog;)I")
                .signature("(Lcom/example/Dog;)I")
                .annotate("Lcom/example/Suspendable;")
                .code(vec![0x03, 0xAC]), // iconst_0; ireturn
        )
        .method(MemberSpec::new("bark", "()V").code(vec![0xB1])) // return
}

#[test]
fn parses_structural_metadata() {
    let class = ClassFile::parse(&sample().build()).unwrap();

    assert_eq!(class.major_version, 52);
    assert_eq!(class.this_class, "com/example/Dog");
    assert_eq!(class.super_class.as_deref(), Some("com/example/Animal"));
    assert_eq!(
        class.interfaces,
        vec!["java/lang/Comparable", "java/io/Serializable"]
    );
    assert!(!class.is_interface());
    assert_eq!(
        class.signature.as_deref(),
        Some("Lcom/example/Animal;Ljava/lang/Comparable<Lcom/example/Dog;>;")
    );

    let visible: Vec<_> = class
        .runtime_visible_annotations
        .iter()
        .map(|a| a.type_descriptor.as_str())
        .collect();
    assert_eq!(visible, vec!["Lcom/example/Pet;"]);
    assert_eq!(
        class.runtime_invisible_annotations[0].type_internal_name(),
        Some("com/example/Internal")
    );

    assert_eq!(class.fields.len(), 1);
    assert_eq!(class.fields[0].name, "name");
    assert_eq!(class.fields[0].descriptor, "Ljava/lang/String;");
    assert!(class.fields[0].body.is_none());

    let compare = &class.methods[0];
    assert_eq!(compare.name, "compareTo");
    assert_eq!(compare.signature.as_deref(), Some("(Lcom/example/Dog;)I"));
    assert_eq!(compare.runtime_visible_annotations.len(), 1);
    let body = compare.body.as_ref().unwrap();
    assert_eq!(body.code, vec![0x03, 0xAC]);
    assert_eq!(body.max_stack, 2);
    assert!(body.exception_handlers.is_empty());
}

#[test]
fn skipping_code_keeps_structure() {
    let bytes = sample().build();
    let full = ClassFile::parse(&bytes).unwrap();
    let skipped = ClassFile::parse_with(&bytes, ParseOptions::skip_code()).unwrap();

    assert!(full.methods.iter().all(|m| m.body.is_some()));
    assert!(skipped.methods.iter().all(|m| m.body.is_none()));

    assert_eq!(full.this_class, skipped.this_class);
    assert_eq!(full.super_class, skipped.super_class);
    assert_eq!(full.interfaces, skipped.interfaces);
    assert_eq!(
        full.runtime_visible_annotations,
        skipped.runtime_visible_annotations
    );
    for (a, b) in full.methods.iter().zip(&skipped.methods) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.descriptor, b.descriptor);
        assert_eq!(a.signature, b.signature);
        assert_eq!(a.runtime_visible_annotations, b.runtime_visible_annotations);
    }
}

#[test]
fn parses_annotation_elements() {
    let bytes = ClassFileBuilder::class("com/example/Job")
        .annotate(
            AnnotationSpec::new("Lcom/example/Schedule;")
                .element("every", ElementSpec::Int(30))
                .element("zone", ElementSpec::Str("UTC".to_string()))
                .element(
                    "unit",
                    ElementSpec::Enum {
                        type_descriptor: "Ljava/util/concurrent/TimeUnit;".to_string(),
                        const_name: "SECONDS".to_string(),
                    },
                )
                .element(
                    "tags",
                    ElementSpec::Array(vec![
                        ElementSpec::Class("Ljava/lang/String;".to_string()),
                        ElementSpec::Int(30),
                    ]),
                ),
        )
        .build();

    let class = ClassFile::parse(&bytes).unwrap();
    let ann = &class.runtime_visible_annotations[0];
    assert_eq!(
        ann.element("every"),
        Some(&ElementValue::Const(ConstValue::Int(30)))
    );
    assert_eq!(
        ann.element("zone"),
        Some(&ElementValue::Const(ConstValue::String("UTC".to_string())))
    );
    assert_eq!(
        ann.element("unit"),
        Some(&ElementValue::Enum {
            type_descriptor: "Ljava/util/concurrent/TimeUnit;".to_string(),
            const_name: "SECONDS".to_string(),
        })
    );
    assert_eq!(
        ann.element("tags"),
        Some(&ElementValue::Array(vec![
            ElementValue::Class("Ljava/lang/String;".to_string()),
            ElementValue::Const(ConstValue::Int(30)),
        ]))
    );
    assert_eq!(ann.element("missing"), None);
}

#[test]
fn root_class_has_no_super() {
    let class = ClassFile::parse(&ClassFileBuilder::root("java/lang/Object").build()).unwrap();
    assert_eq!(class.super_class, None);

    let iface = ClassFile::parse(&ClassFileBuilder::interface("java/lang/Runnable").build()).unwrap();
    assert!(iface.is_interface());
}

#[test]
fn rejects_bad_magic() {
    let mut bytes = sample().build();
    bytes[0] = 0xDE;
    assert!(matches!(
        ClassFile::parse(&bytes),
        Err(Error::InvalidMagic(0xDEFEBABE))
    ));
}

#[test]
fn rejects_truncated_input() {
    let bytes = sample().build();
    for len in [0, 3, 9, bytes.len() / 2, bytes.len() - 1] {
        assert!(
            ClassFile::parse(&bytes[..len]).is_err(),
            "prefix of {len} bytes parsed"
        );
    }
}

#[test]
fn rejects_trailing_bytes() {
    let mut bytes = sample().build();
    bytes.extend_from_slice(&[0, 0]);
    assert_eq!(ClassFile::parse(&bytes).unwrap_err(), Error::TrailingBytes(2));
}

#[test]
fn rejects_out_of_range_this_class() {
    let mut bytes = ClassFileBuilder::class("A").build();
    // With no interfaces, members or attributes the class ends with seven
    // u2 values: access_flags, this_class, super_class and four zero counts.
    let class = ClassFile::parse(&bytes).unwrap();
    assert_eq!(class.this_class, "A");

    let this_class_offset = bytes.len() - 2 * 6;
    bytes[this_class_offset] = 0xFF;
    bytes[this_class_offset + 1] = 0xFF;
    assert_eq!(
        ClassFile::parse(&bytes).unwrap_err(),
        Error::InvalidConstantPoolIndex(0xFFFF)
    );
}

/// A class whose only annotation has one element: `depth` arrays, each
/// holding the next, around an empty array.
fn nested_array_annotation(depth: usize) -> Vec<u8> {
    fn utf8(out: &mut Vec<u8>, text: &str) {
        out.push(1);
        out.extend_from_slice(&(text.len() as u16).to_be_bytes());
        out.extend_from_slice(text.as_bytes());
    }

    let mut value = Vec::with_capacity(3 * depth + 3);
    for _ in 0..depth {
        value.extend_from_slice(&[b'[', 0, 1]);
    }
    value.extend_from_slice(&[b'[', 0, 0]);

    let mut bytes = vec![0xCA, 0xFE, 0xBA, 0xBE, 0, 0, 0, 52];
    bytes.extend_from_slice(&6u16.to_be_bytes());
    utf8(&mut bytes, "T"); // #1
    bytes.extend_from_slice(&[7, 0, 1]); // #2 Class T
    utf8(&mut bytes, "RuntimeVisibleAnnotations"); // #3
    utf8(&mut bytes, "Lcom/example/Deep;"); // #4
    utf8(&mut bytes, "value"); // #5

    // access, this_class, super_class, then no interfaces, fields or methods.
    bytes.extend_from_slice(&[0x00, 0x21, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0]);
    bytes.extend_from_slice(&1u16.to_be_bytes());
    bytes.extend_from_slice(&3u16.to_be_bytes());
    bytes.extend_from_slice(&((8 + value.len()) as u32).to_be_bytes());
    bytes.extend_from_slice(&[0, 1, 0, 4, 0, 1, 0, 5]);
    bytes.extend_from_slice(&value);
    bytes
}

#[test]
fn shallow_nested_element_values_parse() {
    let class = ClassFile::parse(&nested_array_annotation(10)).unwrap();
    let annotation = &class.runtime_visible_annotations[0];
    assert_eq!(annotation.type_descriptor, "Lcom/example/Deep;");

    let mut value = annotation.element("value").unwrap();
    let mut depth = 0;
    while let ElementValue::Array(values) = value {
        match values.first() {
            Some(inner) => {
                value = inner;
                depth += 1;
            }
            None => break,
        }
    }
    assert_eq!(depth, 10);
}

#[test]
fn deeply_nested_element_values_are_rejected() {
    let bytes = nested_array_annotation(80_000);
    assert_eq!(
        ClassFile::parse(&bytes).unwrap_err(),
        Error::MalformedAttribute("annotation")
    );
    assert_eq!(
        ClassFile::parse_with(&bytes, ParseOptions::skip_code()).unwrap_err(),
        Error::MalformedAttribute("annotation")
    );
}

#[test]
fn access_flags_and_magic() {
    let class_bytes = ClassFileBuilder::class("com/example/Plain").build();
    assert_eq!(&class_bytes[..4], &CLASS_FILE_MAGIC.to_be_bytes());
    let class = ClassFile::parse(&class_bytes).unwrap();
    assert_eq!(class.access_flags, ACC_PUBLIC | ACC_SUPER);

    let iface = ClassFile::parse(&ClassFileBuilder::interface("com/example/Api").build()).unwrap();
    assert_eq!(iface.access_flags, ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT);
    assert!(iface.is_interface());
}
