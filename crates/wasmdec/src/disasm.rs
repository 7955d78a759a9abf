//! Lowers raw sections into named, typed entities.
//!
//! Imported functions come first and keep their import order; their
//! count is the *real function offset*, the boundary every `call index`
//! is resolved against. Code-section functions follow with synthesized
//! `fun_XXXXXXXX` names. Globals are decoded from their initializer
//! expressions, the first element segment becomes the table image, and
//! data segments can be merged into one dense, probe-able byte image.

use std::io::SeekFrom;

use log::debug;

use crate::error::{DecodeError, Result};
use crate::module::{
    ExternalKind, FuncType, FunctionId, ImportPayload, Module, SectionId, ValueType,
};
use crate::reader::BinaryReader;
use crate::xref::{CrossReference, TwoWayCrossReference};

/// A parameter or true local of a lifted function.
#[derive(Debug, Clone)]
pub struct Local {
    pub name: String,
    pub ty: ValueType,
    pub is_parameter: bool,
}

/// A lifted function: imports carry no body.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub return_type: ValueType,
    pub index: FunctionId,
    pub locals: Vec<Local>,
    pub body: Option<Vec<u8>>,
    pub exported_name: Option<String>,
}

impl Function {
    /// Parameter locals, in declaration order.
    pub fn params(&self) -> impl Iterator<Item = &Local> {
        self.locals.iter().filter(|l| l.is_parameter)
    }

    pub fn param_count(&self) -> usize {
        self.params().count()
    }
}

/// A lifted global with its initializer rendered in decimal.
#[derive(Debug, Clone)]
pub struct Global {
    pub name: String,
    pub value: String,
    pub type_name: &'static str,
    pub is_const: bool,
}

/// Half-open `[start, end)` range in the merged data image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    pub start: u32,
    pub end: u32,
}

impl AddressRange {
    pub fn contains(&self, offset: u32) -> bool {
        offset >= self.start && offset < self.end
    }
}

/// The dense data image plus the segment ranges it was built from.
#[derive(Debug)]
struct DataImage {
    bytes: Vec<u8>,
    ranges: Vec<AddressRange>,
}

/// Disassembled view of a parsed module.
#[derive(Debug)]
pub struct Disassembler {
    module: Module,
    types: Vec<FuncType>,
    functions: Vec<Function>,
    globals: Vec<Global>,
    table: Vec<u32>,
    data: Option<DataImage>,
    real_function_offset: usize,
}

impl Disassembler {
    /// Lift the static parts of a module: imported functions, decoded
    /// globals, the collapsed table image, and the type list.
    pub fn new(module: Module) -> Result<Self> {
        let globals = decode_globals(&module)?;
        let table = collapse_elements(&module)?;
        let types = module.types.clone();
        let real_function_offset = module.import_function_count();

        let mut disasm = Self {
            module,
            types,
            functions: Vec::new(),
            globals,
            table,
            data: None,
            real_function_offset,
        };
        disasm.functions = disasm.import_functions()?;
        Ok(disasm)
    }

    /// Rebuild the full lifted function list: imports first, then one
    /// entry per code-section body. The first matching function export
    /// names a function; later duplicates are ignored.
    pub fn disassemble_all(&mut self) -> Result<()> {
        self.functions = self.import_functions()?;
        let offset = self.real_function_offset;

        for (n, body) in self.module.bodies.iter().enumerate() {
            let index = FunctionId((offset + n) as u32);
            let type_index = *self
                .module
                .function_type_indices
                .get(n)
                .ok_or(DecodeError::InvalidState(
                    "code entry without a function-section entry",
                ))?;
            let func_type = self
                .types
                .get(type_index as usize)
                .ok_or(DecodeError::InvalidState("function type index out of range"))?;

            let mut locals: Vec<Local> = func_type
                .params
                .iter()
                .enumerate()
                .map(|(i, ty)| Local {
                    name: format!("par{i}"),
                    ty: *ty,
                    is_parameter: true,
                })
                .collect();
            let mut counter = 0usize;
            for (count, ty) in &body.locals {
                for _ in 0..*count {
                    locals.push(Local {
                        name: format!("local{counter}"),
                        ty: *ty,
                        is_parameter: false,
                    });
                    counter += 1;
                }
            }

            let exported_name = self
                .module
                .exports
                .iter()
                .find(|e| e.kind == ExternalKind::Function && e.index == index.0)
                .map(|e| e.name.clone());

            self.functions.push(Function {
                name: format!("fun_{:08X}", index.0),
                return_type: func_type.effective_return(),
                index,
                locals,
                body: Some(body.code.clone()),
                exported_name,
            });
        }

        debug!(
            "lifted {} functions ({} imported)",
            self.functions.len(),
            offset
        );
        Ok(())
    }

    fn import_functions(&self) -> Result<Vec<Function>> {
        let mut functions = Vec::new();
        for import in &self.module.imports {
            let ImportPayload::Function { type_index } = import.payload else {
                continue;
            };
            let func_type = self
                .types
                .get(type_index as usize)
                .ok_or(DecodeError::InvalidState("import type index out of range"))?;
            let locals = func_type
                .params
                .iter()
                .enumerate()
                .map(|(i, ty)| Local {
                    name: format!("par{i}"),
                    ty: *ty,
                    is_parameter: true,
                })
                .collect();
            functions.push(Function {
                name: format!("$imp_{}.{}", import.module, import.field),
                return_type: func_type.effective_return(),
                index: FunctionId(functions.len() as u32),
                locals,
                body: None,
                exported_name: None,
            });
        }
        Ok(functions)
    }

    /// Merge all data segments into one dense image, zero-filling the
    /// gaps, and return the address range each segment landed in.
    pub fn create_data_stream(&mut self) -> Result<Vec<AddressRange>> {
        let mut bytes = Vec::new();
        let mut ranges = Vec::new();
        for segment in &self.module.data {
            let mut r = BinaryReader::new(&segment.offset_expr);
            let _const_opcode = r.read_u8()?;
            let offset = r.read_uleb128()?;

            let start = offset as usize;
            let end = start + segment.payload.len();
            if bytes.len() < end {
                bytes.resize(end, 0);
            }
            bytes[start..end].copy_from_slice(&segment.payload);
            ranges.push(AddressRange {
                start: offset,
                end: end as u32,
            });
        }
        debug!(
            "data image: {} bytes from {} segments",
            bytes.len(),
            ranges.len()
        );
        self.data = Some(DataImage {
            bytes,
            ranges: ranges.clone(),
        });
        Ok(ranges)
    }

    /// Release the merged data image.
    pub fn drop_data_stream(&mut self) {
        self.data = None;
    }

    /// The data range containing `offset`, if the image is active and
    /// any segment covers it.
    pub fn range_containing(&self, offset: u32) -> Option<AddressRange> {
        self.data
            .as_ref()?
            .ranges
            .iter()
            .find(|r| r.contains(offset))
            .copied()
    }

    /// Guess a human-readable rendering of the data at `offset`: an
    /// ANSI string, a wide string, or a hex integer fallback.
    pub fn make_readable_data_info(&self, offset: u32) -> Result<String> {
        let image = self
            .data
            .as_ref()
            .ok_or(DecodeError::InvalidState("no active data stream"))?;

        let mut r = BinaryReader::new(&image.bytes);
        r.seek(SeekFrom::Start(u64::from(offset)))?;
        if let Some(text) = read_printable_ansi(&mut r) {
            return Ok(text);
        }

        // Wide strings are probed as big-endian half-words, so ASCII
        // text encoded UTF-16BE (leading zero byte) is caught here after
        // the ANSI attempt comes back empty.
        let mut wide = BinaryReader::big_endian(&image.bytes);
        wide.seek(SeekFrom::Start(u64::from(offset)))?;
        if let Some(text) = read_printable_wide(&mut wide) {
            return Ok(text);
        }

        r.seek(SeekFrom::Start(u64::from(offset)))?;
        let mut raw = [0u8; 4];
        let available = r.remaining().min(4);
        if available == 0 {
            return Err(DecodeError::UnexpectedEndOfStream(offset as usize));
        }
        raw[..available].copy_from_slice(r.read_bytes(available)?);
        Ok(format!("{:x}h", u32::from_le_bytes(raw)))
    }

    /// Resolve a `call` into both halves of its cross-reference edge.
    /// An out-of-range callee is fatal.
    pub fn find_refs_from_call_fn(
        &self,
        caller: FunctionId,
        callee: u32,
        offset: u32,
    ) -> Result<TwoWayCrossReference> {
        if callee as usize >= self.functions.len() {
            return Err(DecodeError::InvalidState("call target out of range"));
        }
        let direction_down = callee > caller.0;
        Ok(TwoWayCrossReference {
            caller,
            callee: FunctionId(callee),
            outgoing: CrossReference {
                direction_down,
                is_destination: false,
                offset,
                target: FunctionId(callee),
            },
            incoming: CrossReference {
                direction_down,
                is_destination: true,
                offset,
                target: caller,
            },
        })
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn function(&self, id: FunctionId) -> Option<&Function> {
        self.functions.get(id.index())
    }

    pub fn globals(&self) -> &[Global] {
        &self.globals
    }

    pub fn types(&self) -> &[FuncType] {
        &self.types
    }

    pub fn table(&self) -> &[u32] {
        &self.table
    }

    /// Count of imported functions.
    pub fn real_function_offset(&self) -> usize {
        self.real_function_offset
    }

    pub fn module(&self) -> &Module {
        &self.module
    }
}

/// Decode each global's `<type>.const <imm> end` initializer into a
/// decimal rendering. Floats display as their raw bit patterns.
fn decode_globals(module: &Module) -> Result<Vec<Global>> {
    let mut globals = Vec::with_capacity(module.globals.len());
    for (i, raw) in module.globals.iter().enumerate() {
        let mut r = BinaryReader::new(&raw.init);
        let _const_opcode = r.read_u8()?;
        let value = match raw.ty.content_type {
            ValueType::I32 => r.read_uleb128()?.to_string(),
            ValueType::I64 => r.read_uleb128_64()?.to_string(),
            ValueType::F32 => r.read_u32()?.to_string(),
            ValueType::F64 => r.read_u64()?.to_string(),
            _ => return Err(DecodeError::InvalidModule),
        };
        globals.push(Global {
            name: format!("global_{i}"),
            value,
            type_name: raw.ty.content_type.c_name(),
            is_const: !raw.ty.mutable,
        });
    }
    Ok(globals)
}

/// The table image is the first element segment's function indices. A
/// present-but-empty Element section is inconsistent; a missing one
/// yields an empty table.
fn collapse_elements(module: &Module) -> Result<Vec<u32>> {
    match module.elements.first() {
        Some(segment) => Ok(segment.elems.clone()),
        None if module.has_section(SectionId::Element) => {
            Err(DecodeError::InvalidState("empty element section"))
        }
        None => Ok(Vec::new()),
    }
}

fn read_printable_ansi(r: &mut BinaryReader<'_>) -> Option<String> {
    let mut text = String::new();
    loop {
        let byte = r.read_u8().ok()?;
        if byte == 0 {
            return if text.is_empty() { None } else { Some(text) };
        }
        if !(32..=126).contains(&byte) {
            return None;
        }
        text.push(byte as char);
    }
}

fn read_printable_wide(r: &mut BinaryReader<'_>) -> Option<String> {
    let mut text = String::new();
    loop {
        let unit = r.read_u16().ok()?;
        if unit == 0 {
            return if text.is_empty() { None } else { Some(text) };
        }
        if !(32..=126).contains(&unit) {
            return None;
        }
        text.push(unit as u8 as char);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;
    use crate::testutil::*;

    fn disassemble(bytes: &[u8]) -> Disassembler {
        let module = parser::parse(bytes).unwrap();
        let mut disasm = Disassembler::new(module).unwrap();
        disasm.disassemble_all().unwrap();
        disasm
    }

    #[test]
    fn empty_module_lifts_nothing() {
        let disasm = disassemble(&module_bytes(&[]));
        assert!(disasm.functions().is_empty());
        assert!(disasm.globals().is_empty());
        assert!(disasm.table().is_empty());
        assert_eq!(disasm.real_function_offset(), 0);
    }

    #[test]
    fn function_count_is_imports_plus_bodies() {
        let bytes = module_bytes(&[
            type_section(&[(&[ValueType::I32], None), (&[], Some(ValueType::I32))]),
            import_section(&[import_func("env", "log", 0), import_func("env", "abort", 0)]),
            function_section(&[1]),
            export_section(&[export_entry("answer", 0, 2)]),
            code_section(&[body_entry(&[], &[0x41, 0x2a, 0x0b])]),
        ]);
        let disasm = disassemble(&bytes);

        assert_eq!(disasm.real_function_offset(), 2);
        assert_eq!(disasm.functions().len(), 3);
        assert_eq!(disasm.functions()[0].name, "$imp_env.log");
        assert!(disasm.functions()[0].body.is_none());
        assert_eq!(disasm.functions()[2].name, "fun_00000002");
        assert_eq!(disasm.functions()[2].index, FunctionId(2));
        assert_eq!(
            disasm.functions()[2].exported_name.as_deref(),
            Some("answer")
        );
        for export in &disasm.module().exports {
            assert!((export.index as usize) < disasm.functions().len());
        }
    }

    #[test]
    fn parameters_precede_locals_with_a_flat_counter() {
        let bytes = module_bytes(&[
            type_section(&[(&[ValueType::I32, ValueType::F64], Some(ValueType::I32))]),
            function_section(&[0]),
            code_section(&[body_entry(
                &[(2, ValueType::I32), (1, ValueType::F32)],
                &[0x0b],
            )]),
        ]);
        let disasm = disassemble(&bytes);
        let names: Vec<&str> = disasm.functions()[0]
            .locals
            .iter()
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(names, ["par0", "par1", "local0", "local1", "local2"]);
        assert_eq!(disasm.functions()[0].param_count(), 2);
        assert_eq!(disasm.functions()[0].locals[4].ty, ValueType::F32);
        assert!(!disasm.functions()[0].locals[2].is_parameter);
    }

    #[test]
    fn globals_decode_to_decimal_values() {
        let bytes = module_bytes(&[global_section(&[
            global_i32(1024, true),
            global_entry(ValueType::F32, false, &[0x43, 0x00, 0x00, 0x80, 0x3f, 0x0b]),
        ])]);
        let disasm = disassemble(&bytes);
        assert_eq!(disasm.globals().len(), 2);
        assert_eq!(disasm.globals()[0].name, "global_0");
        assert_eq!(disasm.globals()[0].value, "1024");
        assert_eq!(disasm.globals()[0].type_name, "int");
        assert!(!disasm.globals()[0].is_const);
        // 1.0f32 bit pattern.
        assert_eq!(disasm.globals()[1].value, "1065353216");
        assert!(disasm.globals()[1].is_const);
    }

    #[test]
    fn element_section_present_but_empty_is_invalid_state() {
        let bytes = module_bytes(&[element_section(&[])]);
        let module = parser::parse(&bytes).unwrap();
        assert!(matches!(
            Disassembler::new(module),
            Err(DecodeError::InvalidState(_))
        ));
    }

    #[test]
    fn first_element_segment_becomes_the_table() {
        let bytes = module_bytes(&[element_section(&[
            element_entry(0, 0, &[7, 8]),
            element_entry(0, 16, &[9]),
        ])]);
        let disasm = disassemble(&bytes);
        assert_eq!(disasm.table(), [7, 8]);
    }

    #[test]
    fn data_image_reproduces_each_segment() {
        let bytes = module_bytes(&[data_section(&[
            data_entry(0, 16, b"hello\0"),
            data_entry(0, 4, &[0xde, 0xad]),
        ])]);
        let mut disasm = disassemble(&bytes);
        let ranges = disasm.create_data_stream().unwrap();

        assert_eq!(
            ranges,
            [
                AddressRange { start: 16, end: 22 },
                AddressRange { start: 4, end: 6 }
            ]
        );
        let image = disasm.data.as_ref().unwrap();
        assert_eq!(&image.bytes[16..22], b"hello\0");
        assert_eq!(&image.bytes[4..6], [0xde, 0xad]);
        // Gap bytes are zero-filled.
        assert!(image.bytes[6..16].iter().all(|b| *b == 0));
    }

    #[test]
    fn data_probe_guesses_ansi_then_wide_then_hex() {
        let wide: Vec<u8> = [0, b'w', 0, b'i', 0, b'd', 0, b'e', 0, 0]
            .into_iter()
            .collect();
        let bytes = module_bytes(&[data_section(&[
            data_entry(0, 0, b"hello\0"),
            data_entry(0, 8, &wide),
            data_entry(0, 32, &[0xef, 0xbe, 0xad, 0xde, 0x00]),
        ])]);
        let mut disasm = disassemble(&bytes);
        disasm.create_data_stream().unwrap();

        assert_eq!(disasm.make_readable_data_info(0).unwrap(), "hello");
        assert_eq!(disasm.make_readable_data_info(8).unwrap(), "wide");
        assert_eq!(disasm.make_readable_data_info(32).unwrap(), "deadbeefh");
    }

    #[test]
    fn short_unprintable_data_still_renders_as_hex() {
        let bytes = module_bytes(&[data_section(&[data_entry(0, 0, &[0x01, 0x02])])]);
        let mut disasm = disassemble(&bytes);
        disasm.create_data_stream().unwrap();
        let info = disasm.make_readable_data_info(0).unwrap();
        assert!(info.ends_with('h'), "got {info}");
    }

    #[test]
    fn probe_without_a_stream_is_invalid_state() {
        let disasm = disassemble(&module_bytes(&[]));
        assert!(matches!(
            disasm.make_readable_data_info(0),
            Err(DecodeError::InvalidState(_))
        ));
    }

    #[test]
    fn call_edges_know_their_direction() {
        let bytes = module_bytes(&[
            type_section(&[(&[], None)]),
            function_section(&[0, 0]),
            code_section(&[body_entry(&[], &[0x0b]), body_entry(&[], &[0x0b])]),
        ]);
        let disasm = disassemble(&bytes);

        let down = disasm
            .find_refs_from_call_fn(FunctionId(0), 1, 3)
            .unwrap();
        assert!(down.outgoing.direction_down);
        assert!(!down.outgoing.is_destination);
        assert_eq!(down.outgoing.target, FunctionId(1));
        assert_eq!(down.incoming.target, FunctionId(0));
        assert!(down.incoming.is_destination);

        let up = disasm
            .find_refs_from_call_fn(FunctionId(1), 0, 9)
            .unwrap();
        assert!(!up.outgoing.direction_down);

        assert!(matches!(
            disasm.find_refs_from_call_fn(FunctionId(0), 99, 0),
            Err(DecodeError::InvalidState(_))
        ));
    }
}
