//! Kept apart from `config.rs`, which installs a global subscriber.

use std::io;
use std::sync::{Arc, Mutex};

use scry_introspect::{
    ClassSource, DirectorySource, HierarchyResolver, LoggingConfig, MemorySource,
};
use scry_test_utils::ClassFileBuilder;
use tempfile::TempDir;

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn events_use_the_documented_targets() {
    let buf = SharedBuf::default();
    let writer = buf.clone();
    let filter = LoggingConfig {
        level: "warn,scry.hierarchy=trace,scry.classpath=trace".to_owned(),
        json: false,
    }
    .env_filter();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();

    let tmp = TempDir::new().unwrap();
    let source = MemorySource::new()
        .with("java/lang/Object", ClassFileBuilder::root("java/lang/Object").build())
        .with("com/example/Dog", ClassFileBuilder::class("com/example/Dog").build());

    tracing::subscriber::with_default(subscriber, || {
        let resolver = HierarchyResolver::new(&source);
        assert!(!resolver
            .is_assignable_from("java.lang.Runnable", Some("com.example.Dog"))
            .unwrap());
        assert!(DirectorySource::new(tmp.path())
            .fetch("com.example.Missing")
            .unwrap_err()
            .is_not_found());
    });

    let out = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
    assert!(out.contains("scry.hierarchy: visiting class"), "{out}");
    assert!(
        out.contains("scry.classpath: class file not present in directory"),
        "{out}"
    );
    assert!(!out.contains("scry_introspect::hierarchy"), "{out}");
}
