//! Class-file introspection: decode compiled JVM classes into descriptors,
//! ask simple questions of them, and decide assignability between types by
//! walking the class files on a classpath.
//!
//! Nothing is loaded into a JVM and nothing is cached. A query fetches the
//! artifacts it needs from a [`ClassSource`] and discards them afterwards.

#![forbid(unsafe_code)]

mod config;
mod decoder;
mod descriptor;
mod error;
mod hierarchy;
mod queries;

pub use scry_classfile::names;
pub use scry_classfile::{Annotation, ConstValue, ElementValue, MethodBody};
pub use scry_classpath::{
    ArchiveSource, ClassSource, Classpath, ClasspathConfig, ClasspathEntry, DirectorySource,
    MemorySource, SourceError,
};

pub use crate::config::{init_tracing, ConfigError, HierarchyConfig, LoggingConfig, ScryConfig};
pub use crate::decoder::{load_descriptor, read_class_file, ClassFileDecoder, Decoder};
pub use crate::descriptor::{
    AnnotationBearer, ClassDescriptor, FieldIdentity, MethodIdentity, TypeHandle,
};
pub use crate::error::{DecodeError, Error, Result};
pub use crate::hierarchy::{
    is_assignable_from, is_assignable_from_type, HierarchyResolver, ResolverOptions,
    DEFAULT_MAX_DEPTH,
};
pub use crate::queries::{
    classes_equal, declares_method, has_annotation, has_annotation_in, has_annotation_type,
    has_method, methods_equal,
};
