//! Assembles class-file bytes for tests.
//!
//! The output is structurally valid but never verifiable: method bodies are
//! whatever bytes the test supplies.

use std::collections::HashMap;

use scry_classfile::{ACC_ABSTRACT, ACC_INTERFACE, ACC_PUBLIC, ACC_SUPER, CLASS_FILE_MAGIC};

const MAJOR_JAVA_8: u16 = 52;

const CONSTANT_UTF8: u8 = 1;
const CONSTANT_INTEGER: u8 = 3;
const CONSTANT_CLASS: u8 = 7;

#[derive(Clone, Debug)]
pub enum ElementSpec {
    Int(i32),
    Str(String),
    Enum { type_descriptor: String, const_name: String },
    Class(String),
    Array(Vec<ElementSpec>),
}

#[derive(Clone, Debug)]
pub struct AnnotationSpec {
    type_descriptor: String,
    elements: Vec<(String, ElementSpec)>,
}

impl AnnotationSpec {
    pub fn new(type_descriptor: impl Into<String>) -> Self {
        Self {
            type_descriptor: type_descriptor.into(),
            elements: Vec::new(),
        }
    }

    pub fn element(mut self, name: impl Into<String>, value: ElementSpec) -> Self {
        self.elements.push((name.into(), value));
        self
    }
}

impl From<&str> for AnnotationSpec {
    fn from(value: &str) -> Self {
        AnnotationSpec::new(value)
    }
}

#[derive(Clone, Debug)]
pub struct MemberSpec {
    name: String,
    descriptor: String,
    access_flags: u16,
    signature: Option<String>,
    visible: Vec<AnnotationSpec>,
    invisible: Vec<AnnotationSpec>,
    code: Option<Vec<u8>>,
}

impl MemberSpec {
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
            access_flags: ACC_PUBLIC,
            signature: None,
            visible: Vec::new(),
            invisible: Vec::new(),
            code: None,
        }
    }

    pub fn access(mut self, flags: u16) -> Self {
        self.access_flags = flags;
        self
    }

    pub fn signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn annotate(mut self, annotation: impl Into<AnnotationSpec>) -> Self {
        self.visible.push(annotation.into());
        self
    }

    pub fn annotate_invisible(mut self, annotation: impl Into<AnnotationSpec>) -> Self {
        self.invisible.push(annotation.into());
        self
    }

    /// Attaches a `Code` attribute with the given bytecode.
    pub fn code(mut self, bytecode: impl Into<Vec<u8>>) -> Self {
        self.code = Some(bytecode.into());
        self
    }
}

#[derive(Clone, Debug)]
pub struct ClassFileBuilder {
    name: String,
    super_name: Option<String>,
    interfaces: Vec<String>,
    access_flags: u16,
    major_version: u16,
    signature: Option<String>,
    visible: Vec<AnnotationSpec>,
    invisible: Vec<AnnotationSpec>,
    fields: Vec<MemberSpec>,
    methods: Vec<MemberSpec>,
}

impl ClassFileBuilder {
    /// A public class extending `java/lang/Object`. Names use slash form.
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            super_name: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            access_flags: ACC_PUBLIC | ACC_SUPER,
            major_version: MAJOR_JAVA_8,
            signature: None,
            visible: Vec::new(),
            invisible: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        let mut builder = Self::class(name);
        builder.access_flags = ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT;
        builder
    }

    /// `java/lang/Object` itself: no super class.
    pub fn root(name: impl Into<String>) -> Self {
        Self::class(name).no_super()
    }

    pub fn extends(mut self, super_name: impl Into<String>) -> Self {
        self.super_name = Some(super_name.into());
        self
    }

    pub fn no_super(mut self) -> Self {
        self.super_name = None;
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn access(mut self, flags: u16) -> Self {
        self.access_flags = flags;
        self
    }

    pub fn version(mut self, major: u16) -> Self {
        self.major_version = major;
        self
    }

    pub fn signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn annotate(mut self, annotation: impl Into<AnnotationSpec>) -> Self {
        self.visible.push(annotation.into());
        self
    }

    pub fn annotate_invisible(mut self, annotation: impl Into<AnnotationSpec>) -> Self {
        self.invisible.push(annotation.into());
        self
    }

    pub fn field(mut self, field: MemberSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn method(mut self, method: MemberSpec) -> Self {
        self.methods.push(method);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut pool = Pool::default();
        let mut body = Vec::new();

        push_u16(&mut body, self.access_flags);
        let this_class = pool.class(&self.name);
        push_u16(&mut body, this_class);
        let super_class = self.super_name.as_deref().map_or(0, |s| pool.class(s));
        push_u16(&mut body, super_class);

        push_u16(&mut body, self.interfaces.len() as u16);
        for interface in &self.interfaces {
            let idx = pool.class(interface);
            push_u16(&mut body, idx);
        }

        for members in [&self.fields, &self.methods] {
            push_u16(&mut body, members.len() as u16);
            for member in members {
                push_u16(&mut body, member.access_flags);
                push_u16(&mut body, pool.utf8(&member.name));
                push_u16(&mut body, pool.utf8(&member.descriptor));
                let mut attrs = Vec::new();
                if let Some(code) = &member.code {
                    attrs.push(("Code", code_attribute(code)));
                }
                common_attributes(
                    &mut pool,
                    &mut attrs,
                    member.signature.as_deref(),
                    &member.visible,
                    &member.invisible,
                );
                write_attributes(&mut pool, &mut body, attrs);
            }
        }

        let mut attrs = Vec::new();
        common_attributes(
            &mut pool,
            &mut attrs,
            self.signature.as_deref(),
            &self.visible,
            &self.invisible,
        );
        write_attributes(&mut pool, &mut body, attrs);

        let mut bytes = Vec::new();
        push_u32(&mut bytes, CLASS_FILE_MAGIC);
        push_u16(&mut bytes, 0); // minor
        push_u16(&mut bytes, self.major_version);
        push_u16(&mut bytes, pool.count);
        bytes.extend_from_slice(&pool.bytes);
        bytes.extend_from_slice(&body);
        bytes
    }
}

/// Constant pool under construction; entries are deduplicated.
struct Pool {
    bytes: Vec<u8>,
    count: u16,
    utf8: HashMap<String, u16>,
    classes: HashMap<String, u16>,
    ints: HashMap<i32, u16>,
}

impl Default for Pool {
    fn default() -> Self {
        Self {
            bytes: Vec::new(),
            count: 1,
            utf8: HashMap::new(),
            classes: HashMap::new(),
            ints: HashMap::new(),
        }
    }
}

impl Pool {
    fn next_index(&mut self) -> u16 {
        let idx = self.count;
        self.count += 1;
        idx
    }

    fn utf8(&mut self, s: &str) -> u16 {
        if let Some(&idx) = self.utf8.get(s) {
            return idx;
        }
        self.bytes.push(CONSTANT_UTF8);
        push_u16(&mut self.bytes, s.len() as u16);
        self.bytes.extend_from_slice(s.as_bytes());
        let idx = self.next_index();
        self.utf8.insert(s.to_string(), idx);
        idx
    }

    fn class(&mut self, name: &str) -> u16 {
        if let Some(&idx) = self.classes.get(name) {
            return idx;
        }
        let name_index = self.utf8(name);
        self.bytes.push(CONSTANT_CLASS);
        push_u16(&mut self.bytes, name_index);
        let idx = self.next_index();
        self.classes.insert(name.to_string(), idx);
        idx
    }

    fn int(&mut self, value: i32) -> u16 {
        if let Some(&idx) = self.ints.get(&value) {
            return idx;
        }
        self.bytes.push(CONSTANT_INTEGER);
        push_u32(&mut self.bytes, value as u32);
        let idx = self.next_index();
        self.ints.insert(value, idx);
        idx
    }
}

fn common_attributes(
    pool: &mut Pool,
    attrs: &mut Vec<(&'static str, Vec<u8>)>,
    signature: Option<&str>,
    visible: &[AnnotationSpec],
    invisible: &[AnnotationSpec],
) {
    if let Some(signature) = signature {
        let mut info = Vec::new();
        push_u16(&mut info, pool.utf8(signature));
        attrs.push(("Signature", info));
    }
    if !visible.is_empty() {
        attrs.push(("RuntimeVisibleAnnotations", annotations(pool, visible)));
    }
    if !invisible.is_empty() {
        attrs.push(("RuntimeInvisibleAnnotations", annotations(pool, invisible)));
    }
}

fn write_attributes(pool: &mut Pool, out: &mut Vec<u8>, attrs: Vec<(&'static str, Vec<u8>)>) {
    push_u16(out, attrs.len() as u16);
    for (name, info) in attrs {
        push_u16(out, pool.utf8(name));
        push_u32(out, info.len() as u32);
        out.extend_from_slice(&info);
    }
}

fn code_attribute(code: &[u8]) -> Vec<u8> {
    let mut info = Vec::new();
    push_u16(&mut info, 2); // max_stack
    push_u16(&mut info, 1); // max_locals
    push_u32(&mut info, code.len() as u32);
    info.extend_from_slice(code);
    push_u16(&mut info, 0); // exception_table_length
    push_u16(&mut info, 0); // attributes_count
    info
}

fn annotations(pool: &mut Pool, specs: &[AnnotationSpec]) -> Vec<u8> {
    let mut info = Vec::new();
    push_u16(&mut info, specs.len() as u16);
    for spec in specs {
        annotation(pool, &mut info, spec);
    }
    info
}

fn annotation(pool: &mut Pool, out: &mut Vec<u8>, spec: &AnnotationSpec) {
    push_u16(out, pool.utf8(&spec.type_descriptor));
    push_u16(out, spec.elements.len() as u16);
    for (name, value) in &spec.elements {
        push_u16(out, pool.utf8(name));
        element(pool, out, value);
    }
}

fn element(pool: &mut Pool, out: &mut Vec<u8>, value: &ElementSpec) {
    match value {
        ElementSpec::Int(v) => {
            out.push(b'I');
            push_u16(out, pool.int(*v));
        }
        ElementSpec::Str(s) => {
            out.push(b's');
            push_u16(out, pool.utf8(s));
        }
        ElementSpec::Enum {
            type_descriptor,
            const_name,
        } => {
            out.push(b'e');
            push_u16(out, pool.utf8(type_descriptor));
            push_u16(out, pool.utf8(const_name));
        }
        ElementSpec::Class(desc) => {
            out.push(b'c');
            push_u16(out, pool.utf8(desc));
        }
        ElementSpec::Array(values) => {
            out.push(b'[');
            push_u16(out, values.len() as u16);
            for value in values {
                element(pool, out, value);
            }
        }
    }
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}
