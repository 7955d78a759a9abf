//! Wasm binary → raw [`Module`] sections.
//!
//! The parser checks the magic/version header, then walks the section
//! stream decoding each entry per the MVP layout. Entry counts are
//! authoritative; only the Code section treats its per-body size field
//! as a byte allowance (the bytecode length is whatever the local
//! groups leave of it). Structural inconsistencies abort immediately.

use std::io::SeekFrom;

use log::debug;

use crate::error::{DecodeError, Result};
use crate::module::{
    DataSegment, ElementSegment, Export, ExternalKind, FuncType, FunctionBody, GlobalType, Import,
    ImportPayload, Module, RawGlobal, ResizableLimits, SectionId, TableType, ValueType,
};
use crate::reader::BinaryReader;

const WASM_MAGIC: u32 = 0x6d73_6100; // "\0asm", little-endian
const WASM_VERSION: u32 = 1;

/// Parse a Wasm v1 binary into its raw sections.
pub fn parse(bytes: &[u8]) -> Result<Module> {
    let mut r = BinaryReader::new(bytes);

    if r.read_u32().map_err(|_| DecodeError::InvalidModule)? != WASM_MAGIC {
        return Err(DecodeError::InvalidModule);
    }
    if r.read_u32().map_err(|_| DecodeError::InvalidModule)? != WASM_VERSION {
        return Err(DecodeError::InvalidModule);
    }

    let mut module = Module::default();
    while r.remaining() > 0 {
        let id_raw = r.read_uleb128()?;
        if id_raw > 11 {
            return Err(DecodeError::InvalidSectionId(id_raw as u8));
        }
        let id = SectionId::from_wire(id_raw as u8)?;
        let payload_len = r.read_uleb128()? as usize;
        debug!("section {id:?}, {payload_len} payload bytes");

        if id == SectionId::Custom {
            // Name and contents carry no decompilation signal; skip whole.
            r.seek(SeekFrom::Current(payload_len as i64))?;
            continue;
        }

        module.section_kinds.push(id);
        match id {
            SectionId::Type => read_type_section(&mut r, &mut module)?,
            SectionId::Import => read_import_section(&mut r, &mut module)?,
            SectionId::Function => read_function_section(&mut r, &mut module)?,
            SectionId::Table => read_table_section(&mut r, &mut module)?,
            SectionId::Memory => read_memory_section(&mut r, &mut module)?,
            SectionId::Global => read_global_section(&mut r, &mut module)?,
            SectionId::Export => read_export_section(&mut r, &mut module)?,
            SectionId::Start => module.start_function = Some(r.read_uleb128()?),
            SectionId::Element => read_element_section(&mut r, &mut module)?,
            SectionId::Code => read_code_section(&mut r, &mut module)?,
            SectionId::Data => read_data_section(&mut r, &mut module)?,
            SectionId::Custom => unreachable!("custom sections are skipped above"),
        }
    }

    Ok(module)
}

fn read_value_type(r: &mut BinaryReader<'_>) -> Result<ValueType> {
    ValueType::from_wire(r.read_uleb128()? as u8)
}

fn read_limits(r: &mut BinaryReader<'_>) -> Result<ResizableLimits> {
    let has_max = r.read_uleb128()? == 1;
    let initial = r.read_uleb128()?;
    let maximum = if has_max { r.read_uleb128()? } else { 0 };
    Ok(ResizableLimits {
        has_max,
        initial,
        maximum,
    })
}

fn read_global_type(r: &mut BinaryReader<'_>) -> Result<GlobalType> {
    let content_type = read_value_type(r)?;
    let mutable = r.read_uleb128()? == 1;
    Ok(GlobalType {
        content_type,
        mutable,
    })
}

fn read_name(r: &mut BinaryReader<'_>) -> Result<String> {
    let len = r.read_uleb128()? as usize;
    let bytes = r.read_bytes(len)?;
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

/// Raw bytes of an initializer expression, up to and including the
/// terminating `end` byte.
fn read_init_expr(r: &mut BinaryReader<'_>) -> Result<Vec<u8>> {
    let mut expr = Vec::new();
    loop {
        let byte = r.read_u8()?;
        expr.push(byte);
        if byte == 0x0b {
            return Ok(expr);
        }
    }
}

fn read_type_section(r: &mut BinaryReader<'_>, module: &mut Module) -> Result<()> {
    let count = r.read_uleb128()?;
    for _ in 0..count {
        let _form = r.read_uleb128()?;
        let param_count = r.read_uleb128()?;
        let mut params = Vec::with_capacity(param_count as usize);
        for _ in 0..param_count {
            params.push(read_value_type(r)?);
        }
        let has_return = r.read_uleb128()? == 1;
        let return_type = if has_return {
            read_value_type(r)?
        } else {
            ValueType::Void
        };
        module.types.push(FuncType {
            params,
            has_return,
            return_type,
        });
    }
    Ok(())
}

fn read_import_section(r: &mut BinaryReader<'_>, module: &mut Module) -> Result<()> {
    let count = r.read_uleb128()?;
    for _ in 0..count {
        let module_name = read_name(r)?;
        let field = read_name(r)?;
        let kind_byte = r.read_u8()?;
        let (kind, payload) = match kind_byte {
            0 => (
                ExternalKind::Function,
                ImportPayload::Function {
                    type_index: r.read_uleb128()?,
                },
            ),
            1 => (
                ExternalKind::Table,
                ImportPayload::Table(TableType {
                    element_type: read_value_type(r)?,
                    limits: read_limits(r)?,
                }),
            ),
            2 => (ExternalKind::Memory, ImportPayload::Memory(read_limits(r)?)),
            3 => (
                ExternalKind::Global,
                ImportPayload::Global(read_global_type(r)?),
            ),
            other => return Err(DecodeError::InvalidImportKind(other)),
        };
        module.imports.push(Import {
            module: module_name,
            field,
            kind,
            payload,
        });
    }
    Ok(())
}

fn read_function_section(r: &mut BinaryReader<'_>, module: &mut Module) -> Result<()> {
    let count = r.read_uleb128()?;
    for _ in 0..count {
        module.function_type_indices.push(r.read_uleb128()?);
    }
    Ok(())
}

fn read_table_section(r: &mut BinaryReader<'_>, module: &mut Module) -> Result<()> {
    let count = r.read_uleb128()?;
    for _ in 0..count {
        module.tables.push(TableType {
            element_type: read_value_type(r)?,
            limits: read_limits(r)?,
        });
    }
    Ok(())
}

fn read_memory_section(r: &mut BinaryReader<'_>, module: &mut Module) -> Result<()> {
    let count = r.read_uleb128()?;
    for _ in 0..count {
        module.memories.push(read_limits(r)?);
    }
    Ok(())
}

fn read_global_section(r: &mut BinaryReader<'_>, module: &mut Module) -> Result<()> {
    let count = r.read_uleb128()?;
    for _ in 0..count {
        let ty = read_global_type(r)?;
        let init = read_init_expr(r)?;
        module.globals.push(RawGlobal { ty, init });
    }
    Ok(())
}

fn read_export_section(r: &mut BinaryReader<'_>, module: &mut Module) -> Result<()> {
    let count = r.read_uleb128()?;
    for _ in 0..count {
        let name = read_name(r)?;
        let kind = match r.read_u8()? {
            0 => ExternalKind::Function,
            1 => ExternalKind::Table,
            2 => ExternalKind::Memory,
            3 => ExternalKind::Global,
            other => return Err(DecodeError::InvalidExportKind(other)),
        };
        let index = r.read_uleb128()?;
        module.exports.push(Export { name, kind, index });
    }
    Ok(())
}

fn read_element_section(r: &mut BinaryReader<'_>, module: &mut Module) -> Result<()> {
    let count = r.read_uleb128()?;
    for _ in 0..count {
        let table_index = r.read_uleb128()?;
        let offset_expr = read_init_expr(r)?;
        let num_elems = r.read_uleb128()?;
        let mut elems = Vec::with_capacity(num_elems as usize);
        for _ in 0..num_elems {
            elems.push(r.read_uleb128()?);
        }
        module.elements.push(ElementSegment {
            table_index,
            offset_expr,
            elems,
        });
    }
    Ok(())
}

fn read_code_section(r: &mut BinaryReader<'_>, module: &mut Module) -> Result<()> {
    let count = r.read_uleb128()?;
    for _ in 0..count {
        let body_size = r.read_uleb128()? as usize;
        let before_locals = r.position();

        let group_count = r.read_uleb128()?;
        let mut locals = Vec::with_capacity(group_count as usize);
        for _ in 0..group_count {
            let n = r.read_uleb128()?;
            let ty = read_value_type(r)?;
            locals.push((n, ty));
        }

        let locals_size = r.position() - before_locals;
        let code_len = body_size
            .checked_sub(locals_size)
            .ok_or(DecodeError::InvalidModule)?;
        let code = r.read_bytes(code_len)?.to_vec();
        module.bodies.push(FunctionBody { locals, code });
    }
    Ok(())
}

fn read_data_section(r: &mut BinaryReader<'_>, module: &mut Module) -> Result<()> {
    let count = r.read_uleb128()?;
    for _ in 0..count {
        let memory_index = r.read_uleb128()?;
        let offset_expr = read_init_expr(r)?;
        let size = r.read_uleb128()? as usize;
        let payload = r.read_bytes(size)?.to_vec();
        module.data.push(DataSegment {
            memory_index,
            offset_expr,
            payload,
        });
    }
    Ok(())
}
