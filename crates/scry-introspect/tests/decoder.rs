use scry_introspect::{
    classes_equal, declares_method, has_annotation, load_descriptor, read_class_file,
    ClassFileDecoder, DecodeError, Decoder, Error, MemorySource, MethodIdentity,
};
use scry_test_utils::{write_class_dir, ClassFileBuilder, MemberSpec};

fn suspendable_worker() -> Vec<u8> {
    ClassFileBuilder::class("com/example/Worker")
        .implements("java/lang/Runnable")
        .annotate("Lcom/example/Instrumented;")
        .field(MemberSpec::new("count", "I"))
        .method(
            MemberSpec::new("run", "()V")
                .annotate("Lcom/example/Suspendable;")
                .code(vec![0xB1]),
        )
        .method(
            MemberSpec::new("get", "(Ljava/lang/Object;)Ljava/lang/Object;")
                .signature("(TK;)TV;")
                .code(vec![0x01, 0xB0]), // aconst_null; areturn
        )
        .build()
}

#[test]
fn decodes_structure_and_annotations() {
    let class = ClassFileDecoder.decode(&suspendable_worker(), false).unwrap();

    assert_eq!(class.name, "com/example/Worker");
    assert_eq!(class.dotted_name(), "com.example.Worker");
    assert_eq!(class.super_name.as_deref(), Some("java/lang/Object"));
    assert_eq!(class.interfaces, vec!["java/lang/Runnable"]);
    assert_eq!(
        class.supertypes().collect::<Vec<_>>(),
        vec!["java/lang/Object", "java/lang/Runnable"]
    );
    assert!(!class.is_interface());
    assert!(has_annotation("Lcom/example/Instrumented;", &class));

    let run = class.method("run").unwrap();
    assert!(has_annotation("Lcom/example/Suspendable;", run));
    assert_eq!(run.body.as_ref().unwrap().code, vec![0xB1]);
    assert!(class.field("count").is_some());

    assert!(declares_method(&MethodIdentity::new("get", Some("(TK;)TV;")), &class));
    assert!(!declares_method(&MethodIdentity::new("get", None), &class));
}

#[test]
fn skipping_bodies_changes_nothing_else() {
    let bytes = suspendable_worker();
    let full = ClassFileDecoder.decode(&bytes, false).unwrap();
    let skipped = ClassFileDecoder.decode(&bytes, true).unwrap();

    assert!(skipped.methods.iter().all(|m| m.body.is_none()));
    assert!(full.methods.iter().all(|m| m.body.is_some()));

    let mut stripped = full.clone();
    for method in &mut stripped.methods {
        method.body = None;
    }
    assert_eq!(stripped, skipped);
    assert!(classes_equal(&full, &skipped));
}

#[test]
fn empty_class_name_is_rejected() {
    let bytes = ClassFileBuilder::class("").build();
    let err = ClassFileDecoder.decode(&bytes, true).unwrap_err();
    assert_eq!(err, DecodeError::EmptyName);
}

#[test]
fn garbage_is_a_class_file_error() {
    let err = ClassFileDecoder.decode(b"\xCA\xFE", true).unwrap_err();
    assert!(matches!(err, DecodeError::ClassFile(_)), "{err}");
}

#[test]
fn load_descriptor_names_the_failing_class() {
    let source = MemorySource::new()
        .with("com/example/Worker", suspendable_worker())
        .with("com/example/Broken", vec![0xCA, 0xFE, 0xBA, 0xBE]);

    let worker = load_descriptor("com.example.Worker", true, &source, &ClassFileDecoder).unwrap();
    assert_eq!(worker.name, "com/example/Worker");

    let err = load_descriptor("com.example.Broken", true, &source, &ClassFileDecoder).unwrap_err();
    assert!(
        matches!(err, Error::Malformed { ref name, .. } if name == "com.example.Broken"),
        "{err}"
    );

    let err = load_descriptor("com.example.Absent", true, &source, &ClassFileDecoder).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn read_class_file_returns_none_for_missing_paths() {
    let tmp = tempfile::TempDir::new().unwrap();
    write_class_dir(tmp.path(), &[("com/example/Worker", suspendable_worker())]).unwrap();

    let found = read_class_file(&tmp.path().join("com/example/Worker.class"), false)
        .unwrap()
        .unwrap();
    assert_eq!(found.name, "com/example/Worker");

    assert!(read_class_file(&tmp.path().join("com/example/Nope.class"), false)
        .unwrap()
        .is_none());

    std::fs::write(tmp.path().join("junk.class"), b"junk").unwrap();
    let err = read_class_file(&tmp.path().join("junk.class"), false).unwrap_err();
    assert!(err.is_malformed());
}
