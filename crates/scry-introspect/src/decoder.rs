use std::path::Path;

use scry_classfile::{ClassFile, ParseOptions};
use scry_classpath::ClassSource;

use crate::descriptor::ClassDescriptor;
use crate::error::{DecodeError, Error, Result};

/// Turns class-file bytes into a [`ClassDescriptor`].
pub trait Decoder: Send + Sync {
    /// With `skip_method_bodies` set, every method's `body` is `None`; all
    /// other fields are the same as a full decode.
    fn decode(&self, bytes: &[u8], skip_method_bodies: bool)
        -> Result<ClassDescriptor, DecodeError>;
}

/// The decoder backed by [`scry_classfile`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassFileDecoder;

impl Decoder for ClassFileDecoder {
    fn decode(
        &self,
        bytes: &[u8],
        skip_method_bodies: bool,
    ) -> Result<ClassDescriptor, DecodeError> {
        let options = ParseOptions {
            skip_code: skip_method_bodies,
        };
        let class = ClassFile::parse_with(bytes, options)?;
        ClassDescriptor::from_class_file(class)
    }
}

impl<D: Decoder + ?Sized> Decoder for &D {
    fn decode(
        &self,
        bytes: &[u8],
        skip_method_bodies: bool,
    ) -> Result<ClassDescriptor, DecodeError> {
        (**self).decode(bytes, skip_method_bodies)
    }
}

/// Fetches `name` from `source` and decodes it.
pub fn load_descriptor<S, D>(
    name: &str,
    skip_method_bodies: bool,
    source: &S,
    decoder: &D,
) -> Result<ClassDescriptor>
where
    S: ClassSource + ?Sized,
    D: Decoder + ?Sized,
{
    let bytes = source.fetch(name)?;
    decoder
        .decode(&bytes, skip_method_bodies)
        .map_err(|source| Error::Malformed {
            name: name.to_string(),
            source,
        })
}

/// Decodes a class file on disk. Returns `Ok(None)` if there is no file at
/// `path`.
pub fn read_class_file(path: &Path, skip_method_bodies: bool) -> Result<Option<ClassDescriptor>> {
    let name = path.display().to_string();
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(Error::Io { name, source }),
    };
    ClassFileDecoder
        .decode(&bytes, skip_method_bodies)
        .map(Some)
        .map_err(|source| Error::Malformed { name, source })
}
