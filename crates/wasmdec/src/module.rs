//! Raw typed sections of a parsed Wasm v1 module.
//!
//! These types are the parser's output and the disassembler's input: a
//! direct, unvalidated image of the binary sections. Function indices
//! are global across imports and code-section entries; the boundary
//! between the two is the count of Function-kind imports.

use crate::error::{DecodeError, Result};

/// A Wasm value type, plus the synthetic `Void` used to mark no-return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    I32,
    I64,
    F32,
    F64,
    AnyFunc,
    Func,
    EmptyBlock,
    /// No wire form; marks the absence of a return value.
    Void,
}

impl ValueType {
    /// Decode a value type from its wire byte.
    pub fn from_wire(byte: u8) -> Result<Self> {
        match byte {
            0x7f => Ok(ValueType::I32),
            0x7e => Ok(ValueType::I64),
            0x7d => Ok(ValueType::F32),
            0x7c => Ok(ValueType::F64),
            0x70 => Ok(ValueType::AnyFunc),
            0x60 => Ok(ValueType::Func),
            0x40 => Ok(ValueType::EmptyBlock),
            _ => Err(DecodeError::InvalidModule),
        }
    }

    /// Lowercase type name, for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            ValueType::I32 => "i32",
            ValueType::I64 => "i64",
            ValueType::F32 => "f32",
            ValueType::F64 => "f64",
            ValueType::AnyFunc => "anyfunc",
            ValueType::Func => "func",
            ValueType::EmptyBlock => "empty",
            ValueType::Void => "void",
        }
    }

    /// The C-flavored type name used by the renderers.
    pub fn c_name(self) -> &'static str {
        match self {
            ValueType::I32 => "int",
            ValueType::I64 => "long long",
            ValueType::F32 => "float",
            ValueType::F64 => "double",
            _ => "void",
        }
    }

    /// Whether two value types share a numeric class. `EmptyBlock` and
    /// `Void` collapse into the same "no value" class; the renderers use
    /// this when matching stack entries against declared types.
    pub fn equivalent(self, other: ValueType) -> bool {
        self.numeric_class() == other.numeric_class()
    }

    fn numeric_class(self) -> u8 {
        match self {
            ValueType::I32 => 0,
            ValueType::I64 => 1,
            ValueType::F32 => 2,
            ValueType::F64 => 3,
            ValueType::AnyFunc | ValueType::Func => 4,
            ValueType::EmptyBlock | ValueType::Void => 5,
        }
    }
}

/// The twelve MVP section kinds, by standard numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionId {
    Custom = 0,
    Type = 1,
    Import = 2,
    Function = 3,
    Table = 4,
    Memory = 5,
    Global = 6,
    Export = 7,
    Start = 8,
    Element = 9,
    Code = 10,
    Data = 11,
}

impl SectionId {
    pub fn from_wire(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(SectionId::Custom),
            1 => Ok(SectionId::Type),
            2 => Ok(SectionId::Import),
            3 => Ok(SectionId::Function),
            4 => Ok(SectionId::Table),
            5 => Ok(SectionId::Memory),
            6 => Ok(SectionId::Global),
            7 => Ok(SectionId::Export),
            8 => Ok(SectionId::Start),
            9 => Ok(SectionId::Element),
            10 => Ok(SectionId::Code),
            11 => Ok(SectionId::Data),
            other => Err(DecodeError::InvalidSectionId(other)),
        }
    }
}

/// Import/export kind shared by both section decoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalKind {
    Function = 0,
    Table = 1,
    Memory = 2,
    Global = 3,
}

impl ExternalKind {
    pub fn name(self) -> &'static str {
        match self {
            ExternalKind::Function => "function",
            ExternalKind::Table => "table",
            ExternalKind::Memory => "memory",
            ExternalKind::Global => "global",
        }
    }
}

/// A function signature from the Type section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncType {
    pub params: Vec<ValueType>,
    pub has_return: bool,
    pub return_type: ValueType,
}

impl FuncType {
    /// The declared return type, collapsed to `Void` when absent.
    pub fn effective_return(&self) -> ValueType {
        if self.has_return {
            self.return_type
        } else {
            ValueType::Void
        }
    }
}

/// Table or memory size bounds. `maximum` is only meaningful when
/// `has_max` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizableLimits {
    pub has_max: bool,
    pub initial: u32,
    pub maximum: u32,
}

/// Table element type plus limits.
#[derive(Debug, Clone, Copy)]
pub struct TableType {
    pub element_type: ValueType,
    pub limits: ResizableLimits,
}

/// Global content type plus mutability.
#[derive(Debug, Clone, Copy)]
pub struct GlobalType {
    pub content_type: ValueType,
    pub mutable: bool,
}

/// The kind-specific payload of an import entry.
#[derive(Debug, Clone)]
pub enum ImportPayload {
    Function { type_index: u32 },
    Table(TableType),
    Memory(ResizableLimits),
    Global(GlobalType),
}

/// One Import section entry.
#[derive(Debug, Clone)]
pub struct Import {
    pub module: String,
    pub field: String,
    pub kind: ExternalKind,
    pub payload: ImportPayload,
}

/// One Global section entry: its type and the raw initializer
/// expression, terminated by (and including) `0x0b`.
#[derive(Debug, Clone)]
pub struct RawGlobal {
    pub ty: GlobalType,
    pub init: Vec<u8>,
}

/// One Code section entry: local groups plus the raw bytecode.
#[derive(Debug, Clone)]
pub struct FunctionBody {
    pub locals: Vec<(u32, ValueType)>,
    pub code: Vec<u8>,
}

/// One Export section entry.
#[derive(Debug, Clone)]
pub struct Export {
    pub name: String,
    pub kind: ExternalKind,
    pub index: u32,
}

/// One Element section entry.
#[derive(Debug, Clone)]
pub struct ElementSegment {
    pub table_index: u32,
    pub offset_expr: Vec<u8>,
    pub elems: Vec<u32>,
}

/// One Data section entry.
#[derive(Debug, Clone)]
pub struct DataSegment {
    pub memory_index: u32,
    pub offset_expr: Vec<u8>,
    pub payload: Vec<u8>,
}

/// Identity of a function by its global index (imports first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FunctionId(pub u32);

impl FunctionId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A parsed module: one vector per section, in wire order, plus the
/// order of non-custom section kinds actually seen. The kind record lets
/// the disassembler distinguish an absent Element section (valid, empty
/// table) from one that is present but empty (an error).
#[derive(Debug, Default)]
pub struct Module {
    pub section_kinds: Vec<SectionId>,
    pub types: Vec<FuncType>,
    pub imports: Vec<Import>,
    pub function_type_indices: Vec<u32>,
    pub tables: Vec<TableType>,
    pub memories: Vec<ResizableLimits>,
    pub globals: Vec<RawGlobal>,
    pub exports: Vec<Export>,
    pub start_function: Option<u32>,
    pub elements: Vec<ElementSegment>,
    pub bodies: Vec<FunctionBody>,
    pub data: Vec<DataSegment>,
}

impl Module {
    /// Count of Function-kind imports: the boundary between imported and
    /// code-section function indices.
    pub fn import_function_count(&self) -> usize {
        self.imports
            .iter()
            .filter(|i| i.kind == ExternalKind::Function)
            .count()
    }

    pub fn has_section(&self, id: SectionId) -> bool {
        self.section_kinds.contains(&id)
    }
}
