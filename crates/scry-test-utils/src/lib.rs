//! Utilities shared by Scry tests.
//!
//! [`ClassFileBuilder`] produces class-file bytes without a Java toolchain;
//! [`write_class_dir`] and [`write_jar`] lay those bytes out the way a
//! compiler output directory or a jar would.

mod classfile;

use std::fs;
use std::io::{self, Write};
use std::path::Path;

pub use classfile::{AnnotationSpec, ClassFileBuilder, ElementSpec, MemberSpec};

/// Writes each `(internal_name, bytes)` pair to `<root>/<internal_name>.class`.
pub fn write_class_dir(root: &Path, classes: &[(&str, Vec<u8>)]) -> io::Result<()> {
    for (name, bytes) in classes {
        let path = root.join(format!("{name}.class"));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)?;
    }
    Ok(())
}

/// Writes a stored (uncompressed) jar with a manifest and one
/// `<internal_name>.class` entry per class.
pub fn write_jar(path: &Path, classes: &[(&str, Vec<u8>)]) -> io::Result<()> {
    let file = fs::File::create(path)?;
    let mut zip = zip::ZipWriter::new(file);
    let options =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Stored);

    zip.add_directory("META-INF/", options).map_err(into_io)?;
    zip.start_file("META-INF/MANIFEST.MF", options)
        .map_err(into_io)?;
    zip.write_all(b"Manifest-Version: 1.0\r\n\r\n")?;

    for (name, bytes) in classes {
        zip.start_file(format!("{name}.class"), options)
            .map_err(into_io)?;
        zip.write_all(bytes)?;
    }
    zip.finish().map_err(into_io)?;
    Ok(())
}

fn into_io(err: zip::result::ZipError) -> io::Error {
    match err {
        zip::result::ZipError::Io(err) => err,
        other => io::Error::new(io::ErrorKind::Other, other),
    }
}
