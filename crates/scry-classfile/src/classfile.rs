use crate::annotation::Annotation;
use crate::constant_pool::ConstantPool;
use crate::error::{Error, Result};
use crate::reader::Reader;

pub const CLASS_FILE_MAGIC: u32 = 0xCAFEBABE;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_SUPER: u16 = 0x0020;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;

/// Knobs for [`ClassFile::parse_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Leave every method's `body` empty. The `Code` attribute is still
    /// bounds-checked, it just isn't decoded.
    pub skip_code: bool,
}

impl ParseOptions {
    pub fn skip_code() -> Self {
        Self { skip_code: true }
    }
}

#[derive(Debug, Clone)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub access_flags: u16,
    pub this_class: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<ClassMember>,
    pub methods: Vec<ClassMember>,
    pub signature: Option<String>,
    pub runtime_visible_annotations: Vec<Annotation>,
    pub runtime_invisible_annotations: Vec<Annotation>,
}

#[derive(Debug, Clone)]
pub struct ClassMember {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub runtime_visible_annotations: Vec<Annotation>,
    pub runtime_invisible_annotations: Vec<Annotation>,
    /// Contents of the `Code` attribute. Always `None` for fields, for
    /// abstract and native methods, and when parsing with `skip_code`.
    pub body: Option<MethodBody>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodBody {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_handlers: Vec<ExceptionHandler>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionHandler {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    /// `None` for `finally` handlers that catch everything.
    pub catch_type: Option<String>,
}

impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Self::parse_with(bytes, ParseOptions::default())
    }

    pub fn parse_with(bytes: &[u8], options: ParseOptions) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let magic = reader.read_u4()?;
        if magic != CLASS_FILE_MAGIC {
            return Err(Error::InvalidMagic(magic));
        }

        let minor_version = reader.read_u2()?;
        let major_version = reader.read_u2()?;
        let cp = ConstantPool::parse(&mut reader)?;

        let access_flags = reader.read_u2()?;
        let this_class = cp.get_class_name(reader.read_u2()?)?;
        let super_class = match reader.read_u2()? {
            0 => None,
            idx => Some(cp.get_class_name(idx)?),
        };

        let interfaces_count = reader.read_u2()? as usize;
        let mut interfaces = Vec::with_capacity(interfaces_count);
        for _ in 0..interfaces_count {
            interfaces.push(cp.get_class_name(reader.read_u2()?)?);
        }

        let fields = parse_members(&mut reader, &cp, AttributeTarget::Field)?;
        let methods = parse_members(&mut reader, &cp, AttributeTarget::Method(options))?;
        let class_attrs = parse_attributes(&mut reader, &cp, AttributeTarget::Class)?;

        reader.ensure_empty()?;

        Ok(Self {
            minor_version,
            major_version,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            signature: class_attrs.signature,
            runtime_visible_annotations: class_attrs.runtime_visible_annotations,
            runtime_invisible_annotations: class_attrs.runtime_invisible_annotations,
        })
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags & ACC_INTERFACE != 0
    }
}

fn parse_members(
    reader: &mut Reader<'_>,
    cp: &ConstantPool,
    target: AttributeTarget,
) -> Result<Vec<ClassMember>> {
    let count = reader.read_u2()? as usize;
    let mut members = Vec::with_capacity(count);
    for _ in 0..count {
        let access_flags = reader.read_u2()?;
        let name = cp.get_utf8(reader.read_u2()?)?.to_string();
        let descriptor = cp.get_utf8(reader.read_u2()?)?.to_string();

        let attrs = parse_attributes(reader, cp, target)?;
        members.push(ClassMember {
            access_flags,
            name,
            descriptor,
            signature: attrs.signature,
            runtime_visible_annotations: attrs.runtime_visible_annotations,
            runtime_invisible_annotations: attrs.runtime_invisible_annotations,
            body: attrs.body,
        });
    }
    Ok(members)
}

#[derive(Default)]
struct ParsedAttributes {
    signature: Option<String>,
    runtime_visible_annotations: Vec<Annotation>,
    runtime_invisible_annotations: Vec<Annotation>,
    body: Option<MethodBody>,
}

#[derive(Clone, Copy)]
enum AttributeTarget {
    Class,
    Field,
    Method(ParseOptions),
}

fn parse_attributes(
    reader: &mut Reader<'_>,
    cp: &ConstantPool,
    target: AttributeTarget,
) -> Result<ParsedAttributes> {
    let attributes_count = reader.read_u2()? as usize;
    let mut parsed = ParsedAttributes::default();
    for _ in 0..attributes_count {
        let name = cp.get_utf8(reader.read_u2()?)?;
        let length = reader.read_u4()? as usize;
        let mut sub = Reader::new(reader.read_bytes(length)?);

        match (name, target) {
            ("Signature", _) => {
                parsed.signature = Some(cp.get_utf8(sub.read_u2()?)?.to_string());
            }
            ("RuntimeVisibleAnnotations", _) => {
                let anns = Annotation::parse_list(&mut sub, cp)?;
                parsed.runtime_visible_annotations.extend(anns);
            }
            ("RuntimeInvisibleAnnotations", _) => {
                let anns = Annotation::parse_list(&mut sub, cp)?;
                parsed.runtime_invisible_annotations.extend(anns);
            }
            ("Code", AttributeTarget::Method(options)) => {
                if options.skip_code {
                    continue;
                }
                parsed.body = Some(parse_code(&mut sub, cp)?);
            }
            // Debug info, stack maps, inner classes, etc.: not needed here.
            _ => continue,
        }
        if sub.remaining() != 0 {
            return Err(Error::MalformedAttribute(static_attribute_name(name)));
        }
    }

    Ok(parsed)
}

fn parse_code(reader: &mut Reader<'_>, cp: &ConstantPool) -> Result<MethodBody> {
    let max_stack = reader.read_u2()?;
    let max_locals = reader.read_u2()?;
    let code_length = reader.read_u4()? as usize;
    let code = reader.read_bytes(code_length)?.to_vec();

    let handler_count = reader.read_u2()? as usize;
    let mut exception_handlers = Vec::with_capacity(handler_count);
    for _ in 0..handler_count {
        let start_pc = reader.read_u2()?;
        let end_pc = reader.read_u2()?;
        let handler_pc = reader.read_u2()?;
        let catch_type = match reader.read_u2()? {
            0 => None,
            idx => Some(cp.get_class_name(idx)?),
        };
        exception_handlers.push(ExceptionHandler {
            start_pc,
            end_pc,
            handler_pc,
            catch_type,
        });
    }

    // Nested attributes (LineNumberTable, StackMapTable, ...) are debug or
    // verifier data; step over them without looking inside.
    let nested = reader.read_u2()?;
    for _ in 0..nested {
        reader.read_u2()?;
        let length = reader.read_u4()? as usize;
        reader.read_bytes(length)?;
    }

    Ok(MethodBody {
        max_stack,
        max_locals,
        code,
        exception_handlers,
    })
}

fn static_attribute_name(name: &str) -> &'static str {
    match name {
        "Signature" => "Signature",
        "RuntimeVisibleAnnotations" => "RuntimeVisibleAnnotations",
        "RuntimeInvisibleAnnotations" => "RuntimeInvisibleAnnotations",
        _ => "Code",
    }
}
