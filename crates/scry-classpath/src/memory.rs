use std::collections::BTreeMap;

use scry_classfile::names::{to_dotted_name, to_slash_name};

use crate::{ClassSource, SourceError};

/// Class bytes the host already holds, e.g. from a `ClassFileTransformer`
/// callback.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    classes: BTreeMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `bytes` under `binary_name`, returning any bytes it replaces.
    pub fn insert(&mut self, binary_name: &str, bytes: impl Into<Vec<u8>>) -> Option<Vec<u8>> {
        self.classes
            .insert(to_slash_name(binary_name).into_owned(), bytes.into())
    }

    pub fn with(mut self, binary_name: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(binary_name, bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl<N: AsRef<str>, B: Into<Vec<u8>>> FromIterator<(N, B)> for MemorySource {
    fn from_iter<I: IntoIterator<Item = (N, B)>>(iter: I) -> Self {
        let mut source = MemorySource::new();
        for (name, bytes) in iter {
            source.insert(name.as_ref(), bytes);
        }
        source
    }
}

impl ClassSource for MemorySource {
    fn fetch(&self, binary_name: &str) -> Result<Vec<u8>, SourceError> {
        self.classes
            .get(to_slash_name(binary_name).as_ref())
            .cloned()
            .ok_or_else(|| SourceError::not_found(binary_name))
    }

    fn binary_names(&self) -> Result<Vec<String>, SourceError> {
        let mut names: Vec<String> = self.classes.keys().map(|k| to_dotted_name(k)).collect();
        names.sort();
        Ok(names)
    }
}
