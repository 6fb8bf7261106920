// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Layout descriptors: immutable descriptions of native memory shapes.

use crate::config::{
    CONTAINER_ALIGNMENT, CONTAINER_SLOT_SIZE, ENUM_SIZE, POINTER_ALIGNMENT, POINTER_SIZE,
    STRING_CONTAINER_NAME, VECTOR_PREFIX,
};
use crate::layout::EquivalenceHash;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Numeric leaf kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    Bool,
    /// C `char`: one signed byte; arrays of it are fixed strings.
    Char,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

impl NumericKind {
    /// Size in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::Bool | Self::Char | Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
        }
    }

    /// Natural alignment (equal to the size for every numeric kind).
    pub fn alignment(self) -> usize {
        self.size()
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Self::Char | Self::I8 | Self::I16 | Self::I32 | Self::I64 | Self::F32 | Self::F64
        )
    }

    /// Inclusive integer range representable by this kind (`None` for floats).
    pub fn integer_range(self) -> Option<(i128, i128)> {
        match self {
            Self::Bool => Some((0, 1)),
            Self::Char | Self::I8 => Some((i8::MIN as i128, i8::MAX as i128)),
            Self::U8 => Some((0, u8::MAX as i128)),
            Self::I16 => Some((i16::MIN as i128, i16::MAX as i128)),
            Self::U16 => Some((0, u16::MAX as i128)),
            Self::I32 => Some((i32::MIN as i128, i32::MAX as i128)),
            Self::U32 => Some((0, u32::MAX as i128)),
            Self::I64 => Some((i64::MIN as i128, i64::MAX as i128)),
            Self::U64 => Some((0, u64::MAX as i128)),
            Self::F32 | Self::F64 => None,
        }
    }

    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Bool => 0,
            Self::Char => 1,
            Self::I8 => 2,
            Self::U8 => 3,
            Self::I16 => 4,
            Self::U16 => 5,
            Self::I32 => 6,
            Self::U32 => 7,
            Self::I64 => 8,
            Self::U64 => 9,
            Self::F32 => 10,
            Self::F64 => 11,
        }
    }
}

/// Container flavours managed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// `/std/vector<T>`.
    Vector,
    /// `/std/string` (elements are `/char`).
    String,
}

/// Type kind enumeration.
#[derive(Debug, Clone)]
pub enum TypeKind {
    /// Integer, floating point or boolean leaf.
    Numeric(NumericKind),
    /// Bytes with a known size and no known structure.
    Opaque,
    /// Native pointer to `target`.
    Pointer(Arc<TypeDescriptor>),
    /// Fixed-length array.
    Array(ArrayDescriptor),
    /// Fixed-length array of `char`, read as a NUL-terminated string.
    FixedString(ArrayDescriptor),
    /// Struct with ordered, offset-carrying fields.
    Compound(Vec<FieldDescriptor>),
    /// C enumeration stored as a 4-byte signed integer.
    Enum(EnumDescriptor),
    /// Variable-length container whose elements live in engine-owned storage.
    Container(ContainerDescriptor),
}

/// A complete layout descriptor.
pub struct TypeDescriptor {
    name: String,
    size: usize,
    alignment: usize,
    kind: TypeKind,
    hash: OnceLock<EquivalenceHash>,
}

impl TypeDescriptor {
    fn new(name: impl Into<String>, size: usize, alignment: usize, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            size,
            alignment: alignment.max(1),
            kind,
            hash: OnceLock::new(),
        }
    }

    /// Create a numeric descriptor.
    pub fn numeric(name: impl Into<String>, kind: NumericKind) -> Self {
        Self::new(name, kind.size(), kind.alignment(), TypeKind::Numeric(kind))
    }

    /// Create an opaque descriptor.
    pub fn opaque(name: impl Into<String>, size: usize, alignment: usize) -> Self {
        Self::new(name, size, alignment, TypeKind::Opaque)
    }

    /// Create a pointer to `target`, named `<target>*`.
    pub fn pointer_to(target: &Arc<TypeDescriptor>) -> Self {
        Self::new(
            format!("{}*", target.name),
            POINTER_SIZE,
            POINTER_ALIGNMENT,
            TypeKind::Pointer(Arc::clone(target)),
        )
    }

    /// Create `<element>[length]`. Arrays of `char` become fixed strings.
    pub fn array_of(element: &Arc<TypeDescriptor>, length: usize) -> Self {
        let array = ArrayDescriptor::new(Arc::clone(element), length);
        let kind = if matches!(element.kind, TypeKind::Numeric(NumericKind::Char)) {
            TypeKind::FixedString(array)
        } else {
            TypeKind::Array(array)
        };
        Self::new(
            format!("{}[{}]", element.name, length),
            element.size * length,
            element.alignment,
            kind,
        )
    }

    /// Create `/std/vector<element>`.
    pub fn vector_of(element: &Arc<TypeDescriptor>) -> Self {
        Self::new(
            format!("{}{}>", VECTOR_PREFIX, element.name),
            CONTAINER_SLOT_SIZE,
            CONTAINER_ALIGNMENT,
            TypeKind::Container(ContainerDescriptor::new(
                ContainerKind::Vector,
                Arc::clone(element),
            )),
        )
    }

    /// Create `/std/string` over the given `char` descriptor.
    pub fn string_of(character: &Arc<TypeDescriptor>) -> Self {
        Self::new(
            STRING_CONTAINER_NAME,
            CONTAINER_SLOT_SIZE,
            CONTAINER_ALIGNMENT,
            TypeKind::Container(ContainerDescriptor::new(
                ContainerKind::String,
                Arc::clone(character),
            )),
        )
    }

    pub(crate) fn compound(
        name: impl Into<String>,
        size: usize,
        alignment: usize,
        fields: Vec<FieldDescriptor>,
    ) -> Self {
        Self::new(name, size, alignment, TypeKind::Compound(fields))
    }

    pub(crate) fn enumeration(name: impl Into<String>, values: EnumDescriptor) -> Self {
        Self::new(name, ENUM_SIZE, ENUM_SIZE, TypeKind::Enum(values))
    }

    /// Qualified type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes, padding included.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn alignment(&self) -> usize {
        self.alignment
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, TypeKind::Numeric(_))
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self.kind, TypeKind::Pointer(_))
    }

    pub fn is_compound(&self) -> bool {
        matches!(self.kind, TypeKind::Compound(_))
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, TypeKind::Container(_))
    }

    /// Numeric kind if this is a numeric leaf.
    pub fn numeric_kind(&self) -> Option<NumericKind> {
        match self.kind {
            TypeKind::Numeric(kind) => Some(kind),
            _ => None,
        }
    }

    /// Get fields if this is a compound.
    pub fn fields(&self) -> Option<&[FieldDescriptor]> {
        match &self.kind {
            TypeKind::Compound(fields) => Some(fields),
            _ => None,
        }
    }

    /// Get field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields()?.iter().find(|f| f.name == name)
    }

    /// Pointee descriptor of a pointer.
    pub fn pointer_target(&self) -> Option<&Arc<TypeDescriptor>> {
        match &self.kind {
            TypeKind::Pointer(target) => Some(target),
            _ => None,
        }
    }

    /// Element descriptor of arrays, fixed strings and containers.
    pub fn element(&self) -> Option<&Arc<TypeDescriptor>> {
        match &self.kind {
            TypeKind::Array(array) | TypeKind::FixedString(array) => Some(&array.element),
            TypeKind::Container(container) => Some(&container.element),
            _ => None,
        }
    }

    /// Declared length of arrays and fixed strings.
    pub fn array_length(&self) -> Option<usize> {
        match &self.kind {
            TypeKind::Array(array) | TypeKind::FixedString(array) => Some(array.length),
            _ => None,
        }
    }

    /// Enumeration symbols, if this is an enum.
    pub fn enum_values(&self) -> Option<&EnumDescriptor> {
        match &self.kind {
            TypeKind::Enum(values) => Some(values),
            _ => None,
        }
    }

    pub(crate) fn cached_hash(&self) -> &OnceLock<EquivalenceHash> {
        &self.hash
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("alignment", &self.alignment)
            .field("kind", &self.kind)
            .finish()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Structural equivalence, not instance identity.
impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.is_equivalent(other)
    }
}

impl Eq for TypeDescriptor {}

/// Field descriptor for compound members.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: String,
    /// Byte offset from the start of the compound.
    pub offset: usize,
    /// Field type.
    pub type_desc: Arc<TypeDescriptor>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, offset: usize, type_desc: Arc<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            offset,
            type_desc,
        }
    }

    /// First byte past the field.
    pub fn end(&self) -> usize {
        self.offset + self.type_desc.size()
    }
}

/// Array type descriptor.
#[derive(Debug, Clone)]
pub struct ArrayDescriptor {
    /// Element type.
    pub element: Arc<TypeDescriptor>,
    /// Fixed length.
    pub length: usize,
}

impl ArrayDescriptor {
    pub fn new(element: Arc<TypeDescriptor>, length: usize) -> Self {
        Self { element, length }
    }
}

/// Container type descriptor.
#[derive(Debug, Clone)]
pub struct ContainerDescriptor {
    pub kind: ContainerKind,
    pub element: Arc<TypeDescriptor>,
}

impl ContainerDescriptor {
    pub fn new(kind: ContainerKind, element: Arc<TypeDescriptor>) -> Self {
        Self { kind, element }
    }
}

/// Enumeration type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnumDescriptor {
    /// Symbols in declaration order.
    pub values: Vec<EnumValue>,
}

impl EnumDescriptor {
    pub fn new(values: Vec<EnumValue>) -> Self {
        Self { values }
    }

    /// Get value by symbol.
    pub fn value_of(&self, name: &str) -> Option<i32> {
        self.values.iter().find(|v| v.name == name).map(|v| v.value)
    }

    /// Get the first symbol carrying `value`.
    pub fn name_of(&self, value: i32) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.value == value)
            .map(|v| v.name.as_str())
    }
}

/// Enumeration symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub name: String,
    pub value: i32,
}

impl EnumValue {
    pub fn new(name: impl Into<String>, value: i32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}
