use crate::constant_pool::{ConstantPool, CpInfo};
use crate::error::{Error, Result};
use crate::names::descriptor_to_internal_name;
use crate::reader::Reader;

/// Deepest nesting of arrays and annotations inside one element value.
const MAX_ELEMENT_DEPTH: usize = 256;

/// One `annotation` structure from a `Runtime{Visible,Invisible}Annotations`
/// attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Field descriptor of the annotation type, e.g. `Ljava/lang/Deprecated;`.
    pub type_descriptor: String,
    pub elements: Vec<(String, ElementValue)>,
}

impl Annotation {
    pub fn new(type_descriptor: impl Into<String>) -> Self {
        Self {
            type_descriptor: type_descriptor.into(),
            elements: Vec::new(),
        }
    }

    pub fn type_internal_name(&self) -> Option<&str> {
        descriptor_to_internal_name(&self.type_descriptor)
    }

    pub fn element(&self, name: &str) -> Option<&ElementValue> {
        self.elements
            .iter()
            .find(|(element, _)| element == name)
            .map(|(_, value)| value)
    }

    pub(crate) fn parse(reader: &mut Reader<'_>, cp: &ConstantPool) -> Result<Self> {
        Self::parse_nested(reader, cp, 0)
    }

    fn parse_nested(reader: &mut Reader<'_>, cp: &ConstantPool, depth: usize) -> Result<Self> {
        let type_descriptor = cp.get_utf8(reader.read_u2()?)?.to_string();

        let pairs = reader.read_u2()? as usize;
        let mut elements = Vec::with_capacity(pairs);
        for _ in 0..pairs {
            let name = cp.get_utf8(reader.read_u2()?)?.to_string();
            elements.push((name, ElementValue::parse(reader, cp, depth)?));
        }

        Ok(Self {
            type_descriptor,
            elements,
        })
    }

    /// Parses the body of an annotations attribute: a count followed by that
    /// many annotations.
    pub(crate) fn parse_list(reader: &mut Reader<'_>, cp: &ConstantPool) -> Result<Vec<Self>> {
        let count = reader.read_u2()? as usize;
        (0..count).map(|_| Annotation::parse(reader, cp)).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Const(ConstValue),
    Enum {
        type_descriptor: String,
        const_name: String,
    },
    /// Return descriptor of a class literal, e.g. `Ljava/lang/String;` or `V`.
    Class(String),
    Annotation(Box<Annotation>),
    Array(Vec<ElementValue>),
}

impl ElementValue {
    fn parse(reader: &mut Reader<'_>, cp: &ConstantPool, depth: usize) -> Result<Self> {
        if depth >= MAX_ELEMENT_DEPTH {
            return Err(Error::MalformedAttribute("annotation"));
        }
        let tag = reader.read_u1()?;
        let value = match tag {
            b'B' | b'C' | b'I' | b'S' | b'Z' => {
                let v = match constant(reader, cp, "Integer")? {
                    CpInfo::Integer(v) => *v,
                    _ => unreachable!("checked by `constant`"),
                };
                ElementValue::Const(match tag {
                    b'B' => ConstValue::Byte(v as i8),
                    b'C' => ConstValue::Char(
                        char::from_u32(v as u32).ok_or(Error::MalformedAttribute("annotation"))?,
                    ),
                    b'S' => ConstValue::Short(v as i16),
                    b'Z' => ConstValue::Boolean(v != 0),
                    _ => ConstValue::Int(v),
                })
            }
            b'J' => match constant(reader, cp, "Long")? {
                CpInfo::Long(v) => ElementValue::Const(ConstValue::Long(*v)),
                _ => unreachable!("checked by `constant`"),
            },
            b'F' => match constant(reader, cp, "Float")? {
                CpInfo::Float(v) => ElementValue::Const(ConstValue::Float(*v)),
                _ => unreachable!("checked by `constant`"),
            },
            b'D' => match constant(reader, cp, "Double")? {
                CpInfo::Double(v) => ElementValue::Const(ConstValue::Double(*v)),
                _ => unreachable!("checked by `constant`"),
            },
            // Annotation string constants point straight at a Utf8 entry.
            b's' => ElementValue::Const(ConstValue::String(
                cp.get_utf8(reader.read_u2()?)?.to_string(),
            )),
            b'e' => ElementValue::Enum {
                type_descriptor: cp.get_utf8(reader.read_u2()?)?.to_string(),
                const_name: cp.get_utf8(reader.read_u2()?)?.to_string(),
            },
            b'c' => ElementValue::Class(cp.get_utf8(reader.read_u2()?)?.to_string()),
            b'@' => {
                let nested = Annotation::parse_nested(reader, cp, depth + 1)?;
                ElementValue::Annotation(Box::new(nested))
            }
            b'[' => {
                let len = reader.read_u2()? as usize;
                let values = (0..len)
                    .map(|_| ElementValue::parse(reader, cp, depth + 1))
                    .collect::<Result<Vec<_>>>()?;
                ElementValue::Array(values)
            }
            _ => return Err(Error::MalformedAttribute("annotation")),
        };
        Ok(value)
    }
}

/// Reads a constant pool index and checks the entry has the expected kind.
fn constant<'cp>(
    reader: &mut Reader<'_>,
    cp: &'cp ConstantPool,
    expected: &'static str,
) -> Result<&'cp CpInfo> {
    let index = reader.read_u2()?;
    let info = cp.get(index)?;
    if info.kind() != expected {
        return Err(Error::ConstantPoolTypeMismatch {
            index,
            expected,
            found: info.kind(),
        });
    }
    Ok(info)
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    String(String),
}
