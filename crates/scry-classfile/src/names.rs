//! Conversions between the three spellings of a class name.
//!
//! * dotted binary names: `com.example.Outer$Inner`
//! * internal (slash) names: `com/example/Outer$Inner`
//! * class-file resource paths: `com/example/Outer$Inner.class`
//!
//! Every function here is total. None of them check that the input is a
//! well-formed name; that is the decoder's job.

use std::borrow::Cow;

pub const CLASS_FILE_SUFFIX: &str = ".class";

pub fn is_class_file_name(path: &str) -> bool {
    path.ends_with(CLASS_FILE_SUFFIX)
}

/// Strips a trailing `.class` and converts `/` separators to `.`.
pub fn to_dotted_name(name: &str) -> String {
    name.strip_suffix(CLASS_FILE_SUFFIX)
        .unwrap_or(name)
        .replace('/', ".")
}

/// Converts `.` separators to `/`. Does not touch a `.class` suffix.
pub fn to_slash_name(name: &str) -> Cow<'_, str> {
    if name.contains('.') {
        Cow::Owned(name.replace('.', "/"))
    } else {
        Cow::Borrowed(name)
    }
}

pub fn to_class_file_name(name: &str) -> String {
    format!("{}{CLASS_FILE_SUFFIX}", to_slash_name(name))
}

/// Field descriptor of a class type, e.g. `Ljava/lang/Deprecated;`.
///
/// Accepts either dotted or slash names.
pub fn object_descriptor(name: &str) -> String {
    format!("L{};", to_slash_name(name))
}

/// Internal name of an object descriptor; `None` for primitives and arrays.
pub fn descriptor_to_internal_name(desc: &str) -> Option<&str> {
    desc.strip_prefix('L').and_then(|rest| rest.strip_suffix(';'))
}
