use std::borrow::Cow;

use scry_classfile::names::{descriptor_to_internal_name, to_dotted_name};
use scry_classfile::{Annotation, ClassFile, ClassMember, MethodBody, ACC_INTERFACE};

use crate::error::DecodeError;

/// Structure of one class artifact, as far as introspection needs it.
///
/// All names are internal (slash) names. A descriptor is built once per
/// decode and never changes afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDescriptor {
    pub name: String,
    /// `None` for `java/lang/Object` (and for hand-built interfaces that omit
    /// it).
    pub super_name: Option<String>,
    pub interfaces: Vec<String>,
    pub access_flags: u16,
    pub major_version: u16,
    pub minor_version: u16,
    /// Generic class signature, if the class has one.
    pub signature: Option<String>,
    pub annotations: Vec<Annotation>,
    pub invisible_annotations: Vec<Annotation>,
    pub fields: Vec<FieldIdentity>,
    pub methods: Vec<MethodIdentity>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodIdentity {
    pub name: String,
    /// Raw JVM descriptor, e.g. `(Ljava/lang/Object;)I`.
    pub descriptor: String,
    /// Generic signature from the `Signature` attribute. This, not
    /// `descriptor`, is what method equality compares.
    pub signature: Option<String>,
    pub access_flags: u16,
    pub annotations: Vec<Annotation>,
    pub invisible_annotations: Vec<Annotation>,
    /// `None` when bodies were skipped or the method is abstract/native.
    pub body: Option<MethodBody>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldIdentity {
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub access_flags: u16,
    pub annotations: Vec<Annotation>,
    pub invisible_annotations: Vec<Annotation>,
}

impl MethodIdentity {
    /// A bare identity for lookups with [`crate::has_method`].
    pub fn new(name: impl Into<String>, signature: Option<&str>) -> Self {
        Self {
            name: name.into(),
            descriptor: String::new(),
            signature: signature.map(str::to_string),
            access_flags: 0,
            annotations: Vec::new(),
            invisible_annotations: Vec::new(),
            body: None,
        }
    }

    fn from_member(member: ClassMember) -> Self {
        Self {
            name: member.name,
            descriptor: member.descriptor,
            signature: member.signature,
            access_flags: member.access_flags,
            annotations: member.runtime_visible_annotations,
            invisible_annotations: member.runtime_invisible_annotations,
            body: member.body,
        }
    }
}

impl FieldIdentity {
    fn from_member(member: ClassMember) -> Self {
        Self {
            name: member.name,
            descriptor: member.descriptor,
            signature: member.signature,
            access_flags: member.access_flags,
            annotations: member.runtime_visible_annotations,
            invisible_annotations: member.runtime_invisible_annotations,
        }
    }
}

impl ClassDescriptor {
    /// Converts a parsed class file, enforcing the invariants the hierarchy
    /// walk relies on: a non-empty name that is not its own superclass.
    pub fn from_class_file(class: ClassFile) -> Result<Self, DecodeError> {
        if class.this_class.is_empty() {
            return Err(DecodeError::EmptyName);
        }
        if class.super_class.as_deref() == Some(class.this_class.as_str()) {
            return Err(DecodeError::SelfSuperclass(class.this_class));
        }

        Ok(Self {
            name: class.this_class,
            super_name: class.super_class,
            interfaces: class.interfaces,
            access_flags: class.access_flags,
            major_version: class.major_version,
            minor_version: class.minor_version,
            signature: class.signature,
            annotations: class.runtime_visible_annotations,
            invisible_annotations: class.runtime_invisible_annotations,
            fields: class
                .fields
                .into_iter()
                .map(FieldIdentity::from_member)
                .collect(),
            methods: class
                .methods
                .into_iter()
                .map(MethodIdentity::from_member)
                .collect(),
        })
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags & ACC_INTERFACE != 0
    }

    pub fn dotted_name(&self) -> String {
        to_dotted_name(&self.name)
    }

    /// Direct supertypes: the superclass (if any) followed by the interfaces.
    pub fn supertypes(&self) -> impl Iterator<Item = &str> {
        self.super_name
            .as_deref()
            .into_iter()
            .chain(self.interfaces.iter().map(String::as_str))
    }

    pub fn method(&self, name: &str) -> Option<&MethodIdentity> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldIdentity> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Anything that carries annotations: classes, methods and fields.
pub trait AnnotationBearer {
    /// Runtime-visible annotations. Presence checks look only at these.
    fn annotations(&self) -> &[Annotation];

    fn invisible_annotations(&self) -> &[Annotation] {
        &[]
    }
}

impl AnnotationBearer for ClassDescriptor {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    fn invisible_annotations(&self) -> &[Annotation] {
        &self.invisible_annotations
    }
}

impl AnnotationBearer for MethodIdentity {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    fn invisible_annotations(&self) -> &[Annotation] {
        &self.invisible_annotations
    }
}

impl AnnotationBearer for FieldIdentity {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    fn invisible_annotations(&self) -> &[Annotation] {
        &self.invisible_annotations
    }
}

impl AnnotationBearer for [Annotation] {
    fn annotations(&self) -> &[Annotation] {
        self
    }
}

impl AnnotationBearer for Vec<Annotation> {
    fn annotations(&self) -> &[Annotation] {
        self
    }
}

/// A host-side handle that knows the binary name of the JVM type it stands
/// for. Lets callers pass a decoded class or annotation where a name is
/// expected.
pub trait TypeHandle {
    /// Binary name in dotted or slash form.
    fn binary_name(&self) -> Cow<'_, str>;
}

impl TypeHandle for ClassDescriptor {
    fn binary_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }
}

impl TypeHandle for Annotation {
    fn binary_name(&self) -> Cow<'_, str> {
        match descriptor_to_internal_name(&self.type_descriptor) {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Borrowed(&self.type_descriptor),
        }
    }
}

impl<T: TypeHandle + ?Sized> TypeHandle for &T {
    fn binary_name(&self) -> Cow<'_, str> {
        (**self).binary_name()
    }
}
