#![no_main]

use std::io::Write;

use libfuzzer_sys::fuzz_target;
use scry_classpath::{ArchiveSource, ClassSource, DirectorySource};

mod utils;

fn run_jar_mode(jar_bytes: &[u8]) {
    let mut tmp = tempfile::Builder::new()
        .prefix("fuzz_archive_read")
        .suffix(".jar")
        .tempfile()
        .expect("failed to create tempfile");

    // Only asserting that malformed archives never panic or hang.
    tmp.write_all(jar_bytes).expect("failed to write jar bytes");
    tmp.flush().expect("failed to flush jar bytes");

    let source = ArchiveSource::jar(tmp.path());
    let _ = source.fetch("A");
    let _ = source.fetch("com.example.Foo");
    let _ = source.binary_names();
}

fn run_dir_mode(name_bytes: &[u8]) {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    std::fs::write(dir.path().join("A.class"), b"\xCA\xFE\xBA\xBE")
        .expect("failed to write class file");

    // Arbitrary names must never escape the directory.
    let source = DirectorySource::new(dir.path());
    let name = String::from_utf8_lossy(name_bytes);
    let _ = source.fetch(&name);
    let _ = source.binary_names();
}

fuzz_target!(|data: &[u8]| {
    let data = &data[..data.len().min(utils::MAX_INPUT_SIZE)];
    match data.first() {
        Some(mode) if mode & 1 == 1 => run_dir_mode(&data[1..]),
        _ => run_jar_mode(data),
    }
});
