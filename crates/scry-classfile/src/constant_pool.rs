use crate::error::{Error, Result};
use crate::reader::Reader;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CpInfo {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class { name_index: u16 },
    String { utf8_index: u16 },
    FieldRef { class_index: u16, name_and_type_index: u16 },
    MethodRef { class_index: u16, name_and_type_index: u16 },
    InterfaceMethodRef { class_index: u16, name_and_type_index: u16 },
    NameAndType { name_index: u16, descriptor_index: u16 },
    MethodHandle { reference_kind: u8, reference_index: u16 },
    MethodType { descriptor_index: u16 },
    Dynamic { bootstrap_index: u16, name_and_type_index: u16 },
    InvokeDynamic { bootstrap_index: u16, name_and_type_index: u16 },
    Module { name_index: u16 },
    Package { name_index: u16 },
}

impl CpInfo {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            CpInfo::Utf8(_) => "Utf8",
            CpInfo::Integer(_) => "Integer",
            CpInfo::Float(_) => "Float",
            CpInfo::Long(_) => "Long",
            CpInfo::Double(_) => "Double",
            CpInfo::Class { .. } => "Class",
            CpInfo::String { .. } => "String",
            CpInfo::FieldRef { .. } => "Fieldref",
            CpInfo::MethodRef { .. } => "Methodref",
            CpInfo::InterfaceMethodRef { .. } => "InterfaceMethodref",
            CpInfo::NameAndType { .. } => "NameAndType",
            CpInfo::MethodHandle { .. } => "MethodHandle",
            CpInfo::MethodType { .. } => "MethodType",
            CpInfo::Dynamic { .. } => "Dynamic",
            CpInfo::InvokeDynamic { .. } => "InvokeDynamic",
            CpInfo::Module { .. } => "Module",
            CpInfo::Package { .. } => "Package",
        }
    }
}

/// The constant pool of one class file.
///
/// Slot 0 and the second slot of every `Long`/`Double` entry are unusable and
/// stored as `None`.
#[derive(Debug, Clone, Default)]
pub(crate) struct ConstantPool {
    entries: Vec<Option<CpInfo>>,
}

impl ConstantPool {
    pub(crate) fn parse(reader: &mut Reader<'_>) -> Result<Self> {
        let count = reader.read_u2()? as usize;
        let mut entries = Vec::with_capacity(count.max(1));
        entries.push(None);

        while entries.len() < count {
            let tag = reader.read_u1()?;
            let info = match tag {
                1 => {
                    let len = reader.read_u2()? as usize;
                    CpInfo::Utf8(decode_modified_utf8(reader.read_bytes(len)?)?)
                }
                3 => CpInfo::Integer(reader.read_u4()? as i32),
                4 => CpInfo::Float(f32::from_bits(reader.read_u4()?)),
                5 => CpInfo::Long(reader.read_u8()? as i64),
                6 => CpInfo::Double(f64::from_bits(reader.read_u8()?)),
                7 => CpInfo::Class {
                    name_index: reader.read_u2()?,
                },
                8 => CpInfo::String {
                    utf8_index: reader.read_u2()?,
                },
                9 | 10 | 11 => {
                    let class_index = reader.read_u2()?;
                    let name_and_type_index = reader.read_u2()?;
                    match tag {
                        9 => CpInfo::FieldRef {
                            class_index,
                            name_and_type_index,
                        },
                        10 => CpInfo::MethodRef {
                            class_index,
                            name_and_type_index,
                        },
                        _ => CpInfo::InterfaceMethodRef {
                            class_index,
                            name_and_type_index,
                        },
                    }
                }
                12 => CpInfo::NameAndType {
                    name_index: reader.read_u2()?,
                    descriptor_index: reader.read_u2()?,
                },
                15 => CpInfo::MethodHandle {
                    reference_kind: reader.read_u1()?,
                    reference_index: reader.read_u2()?,
                },
                16 => CpInfo::MethodType {
                    descriptor_index: reader.read_u2()?,
                },
                17 => CpInfo::Dynamic {
                    bootstrap_index: reader.read_u2()?,
                    name_and_type_index: reader.read_u2()?,
                },
                18 => CpInfo::InvokeDynamic {
                    bootstrap_index: reader.read_u2()?,
                    name_and_type_index: reader.read_u2()?,
                },
                19 => CpInfo::Module {
                    name_index: reader.read_u2()?,
                },
                20 => CpInfo::Package {
                    name_index: reader.read_u2()?,
                },
                other => return Err(Error::InvalidConstantPoolTag(other)),
            };

            let wide = matches!(info, CpInfo::Long(_) | CpInfo::Double(_));
            entries.push(Some(info));
            if wide {
                entries.push(None);
            }
        }

        // A trailing wide entry may overshoot `count` by its phantom slot.
        entries.truncate(count.max(1));
        Ok(Self { entries })
    }

    pub(crate) fn get(&self, index: u16) -> Result<&CpInfo> {
        self.entries
            .get(index as usize)
            .and_then(Option::as_ref)
            .ok_or(Error::InvalidConstantPoolIndex(index))
    }

    pub(crate) fn get_utf8(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            CpInfo::Utf8(value) => Ok(value),
            other => Err(mismatch(index, "Utf8", other)),
        }
    }

    pub(crate) fn get_class_name(&self, index: u16) -> Result<String> {
        match self.get(index)? {
            CpInfo::Class { name_index } => Ok(self.get_utf8(*name_index)?.to_string()),
            other => Err(mismatch(index, "Class", other)),
        }
    }
}

fn mismatch(index: u16, expected: &'static str, found: &CpInfo) -> Error {
    Error::ConstantPoolTypeMismatch {
        index,
        expected,
        found: found.kind(),
    }
}

/// Decodes the JVM's "modified UTF-8": NUL is encoded as `C0 80` and
/// supplementary characters as a pair of three-byte surrogates.
fn decode_modified_utf8(bytes: &[u8]) -> Result<String> {
    if bytes.iter().all(|&b| b != 0 && b < 0x80) {
        // Plain ASCII; the overwhelmingly common case for class and member names.
        return String::from_utf8(bytes.to_vec()).map_err(|_| Error::InvalidModifiedUtf8);
    }

    let continuation = |b: Option<&u8>| match b {
        Some(&b) if b & 0xC0 == 0x80 => Ok((b & 0x3F) as u16),
        _ => Err(Error::InvalidModifiedUtf8),
    };

    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b != 0 && b < 0x80 {
            units.push(b as u16);
            i += 1;
        } else if b & 0xE0 == 0xC0 {
            let low = continuation(bytes.get(i + 1))?;
            units.push(((b & 0x1F) as u16) << 6 | low);
            i += 2;
        } else if b & 0xF0 == 0xE0 {
            let mid = continuation(bytes.get(i + 1))?;
            let low = continuation(bytes.get(i + 2))?;
            units.push(((b & 0x0F) as u16) << 12 | mid << 6 | low);
            i += 3;
        } else {
            return Err(Error::InvalidModifiedUtf8);
        }
    }

    String::from_utf16(&units).map_err(|_| Error::InvalidModifiedUtf8)
}
