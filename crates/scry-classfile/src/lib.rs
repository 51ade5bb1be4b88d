//! Decoder for JVM class files.
//!
//! Only the structural parts of a class are decoded: names, the super type,
//! interfaces, members, generic signatures, annotations and (optionally)
//! method bodies. Everything else is bounds-checked and skipped.

#![forbid(unsafe_code)]

mod annotation;
mod classfile;
mod constant_pool;
mod error;
pub mod names;
mod reader;

pub use crate::annotation::{Annotation, ConstValue, ElementValue};
pub use crate::classfile::{
    ClassFile, ClassMember, ExceptionHandler, MethodBody, ParseOptions, ACC_ABSTRACT,
    ACC_INTERFACE, ACC_PUBLIC, ACC_SUPER, CLASS_FILE_MAGIC,
};
pub use crate::error::{Error, Result};
