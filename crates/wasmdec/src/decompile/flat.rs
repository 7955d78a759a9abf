//! Opcode-per-line listing with resolved operands.
//!
//! Each function body is walked opcode by opcode; the line prefix is a
//! module-wide program counter advanced by the body length after each
//! function. `block` opcodes anchor a `label_XXXXXXXX:` in place of the
//! PC so branch targets can be found by eye. Every direct call is
//! recorded in the cross-reference tracker.

use crate::disasm::{Disassembler, Function};
use crate::error::{DecodeError, Result};
use crate::module::{ExternalKind, ValueType};
use crate::opcode::{trunc_sat_mnemonic, Opcode};
use crate::reader::BinaryReader;
use crate::xref::XrefTracker;

use super::Render;

/// The flat renderer. Owns its output buffer, the module-wide PC, and
/// the call-edge tracker filled while listing.
#[derive(Debug)]
pub struct FlatDecompiler {
    output: String,
    pc: u32,
    tracker: XrefTracker,
}

impl FlatDecompiler {
    pub fn new(function_count: usize) -> Self {
        Self {
            output: String::new(),
            pc: 0,
            tracker: XrefTracker::with_function_count(function_count),
        }
    }

    /// Call edges recorded so far.
    pub fn tracker(&self) -> &XrefTracker {
        &self.tracker
    }

    pub fn into_tracker(self) -> XrefTracker {
        self.tracker
    }

    fn signature(func: &Function) -> String {
        let params: Vec<String> = func
            .params()
            .map(|p| format!("{} {}", p.ty.c_name(), p.name))
            .collect();
        format!(
            "{} {}({})",
            func.return_type.c_name(),
            func.name,
            params.join(", ")
        )
    }

    fn list_body(&mut self, disasm: &Disassembler, func: &Function, body: &[u8]) -> Result<()> {
        let mut r = BinaryReader::new(body);
        while r.remaining() > 0 {
            let at = r.position();
            let op = Opcode::from_byte(r.read_u8()?)?;

            if op == Opcode::End && r.remaining() == 0 {
                break; // the closing brace stands in for the final end
            }

            let pc = self.pc + at as u32;
            let mut mnemonic = op.mnemonic();
            let operands = match op {
                Opcode::Block | Opcode::Loop | Opcode::If => {
                    let ty = ValueType::from_wire(r.read_u8()?)?;
                    if ty == ValueType::EmptyBlock {
                        String::new()
                    } else {
                        format!(" {}", ty.c_name())
                    }
                }
                Opcode::Br | Opcode::BrIf => {
                    format!(" {}", r.read_uleb128()?)
                }
                Opcode::BrTable => {
                    let count = r.read_uleb128()?;
                    let mut targets = Vec::with_capacity(count as usize + 1);
                    for _ in 0..count {
                        targets.push(r.read_uleb128()?.to_string());
                    }
                    targets.push(r.read_uleb128()?.to_string());
                    format!(" {}", targets.join(" "))
                }
                Opcode::Call => {
                    let index = r.read_uleb128()?;
                    let edge = disasm.find_refs_from_call_fn(func.index, index, at as u32)?;
                    self.tracker.record(&edge);
                    let callee = disasm
                        .function(edge.callee)
                        .ok_or(DecodeError::InvalidState("call target out of range"))?;
                    format!(" {}", callee.name)
                }
                Opcode::CallIndirect => {
                    let type_index = r.read_uleb128()?;
                    let _reserved = r.read_u8()?;
                    if type_index as usize >= disasm.types().len() {
                        return Err(DecodeError::InvalidState("type index out of range"));
                    }
                    format!(" {type_index}")
                }
                Opcode::GetLocal | Opcode::SetLocal | Opcode::TeeLocal => {
                    let index = r.read_uleb128()? as usize;
                    let local = func
                        .locals
                        .get(index)
                        .ok_or(DecodeError::InvalidState("local index out of range"))?;
                    format!(" {}", local.name)
                }
                Opcode::GetGlobal | Opcode::SetGlobal => {
                    let index = r.read_uleb128()? as usize;
                    let global = disasm
                        .globals()
                        .get(index)
                        .ok_or(DecodeError::InvalidState("global index out of range"))?;
                    format!(" {}", global.name)
                }
                op if is_memory_access(op) => {
                    let flags = r.read_uleb128()?;
                    let offset = r.read_uleb128()?;
                    let mut text = format!(" {offset:08X}h [align={flags}]");
                    if disasm.range_containing(offset).is_some() {
                        let info = disasm.make_readable_data_info(offset)?;
                        text.push_str(&format!(" \"{info}\""));
                    }
                    text
                }
                Opcode::CurrentMemory | Opcode::GrowMemory => {
                    let _reserved = r.read_u8()?;
                    String::new()
                }
                Opcode::I32Const => format!(" {}", r.read_sleb128()?),
                Opcode::I64Const => format!(" {}", r.read_sleb128_64()?),
                Opcode::F32Const => format!(" {}", r.read_u32()? as i32),
                Opcode::F64Const => format!(" {}", r.read_u64()? as i64),
                Opcode::TruncSatPrefix => {
                    mnemonic = trunc_sat_mnemonic(r.read_u8()?)?;
                    String::new()
                }
                _ => String::new(),
            };

            if op == Opcode::Block {
                self.output
                    .push_str(&format!("label_{at:08X}:\t{mnemonic}{operands}\n"));
            } else {
                self.output
                    .push_str(&format!("{pc:08X}\t{mnemonic}{operands}\n"));
            }
        }

        self.pc += body.len() as u32;
        Ok(())
    }
}

impl Render for FlatDecompiler {
    fn prepare(&mut self, disasm: &Disassembler) -> Result<()> {
        for global in disasm.globals() {
            self.output
                .push_str(&format!("static {} = {};\n", global.name, global.value));
        }
        let mut any_export = false;
        for export in &disasm.module().exports {
            if export.kind == ExternalKind::Function {
                continue;
            }
            any_export = true;
            self.output.push_str(&format!(
                "export \"{}\" ({} {})\n",
                export.name,
                export.kind.name(),
                export.index
            ));
        }
        if !disasm.globals().is_empty() || any_export {
            self.output.push('\n');
        }
        Ok(())
    }

    fn decompile_function(&mut self, disasm: &Disassembler, func: &Function) -> Result<()> {
        let Some(body) = func.body.clone() else {
            self.output
                .push_str(&format!("{};\n\n", Self::signature(func)));
            return Ok(());
        };

        self.output
            .push_str(&format!("{:08X}\t{}", self.pc, Self::signature(func)));
        if let Some(exported) = &func.exported_name {
            self.output.push_str(&format!(" export \"{exported}\""));
        }
        self.output.push_str("\n{\n");

        for local in func.locals.iter().filter(|l| !l.is_parameter) {
            self.output
                .push_str(&format!("{} {};\n", local.ty.c_name(), local.name));
        }
        self.output.push('\n');

        self.list_body(disasm, func, &body)?;

        self.output.push_str("}\n\n");
        Ok(())
    }

    fn build_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}

fn is_memory_access(op: Opcode) -> bool {
    (op.byte() >= Opcode::I32Load.byte()) && (op.byte() <= Opcode::I64Store32.byte())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompile::{decompile, RenderStyle};
    use crate::disasm::Disassembler;
    use crate::module::FunctionId;
    use crate::parser;
    use crate::testutil::*;

    fn flat(bytes: &[u8]) -> String {
        let module = parser::parse(bytes).unwrap();
        let mut disasm = Disassembler::new(module).unwrap();
        disasm.disassemble_all().unwrap();
        decompile(&mut disasm, RenderStyle::Flat).unwrap()
    }

    #[test]
    fn empty_module_renders_empty() {
        assert_eq!(flat(&module_bytes(&[])), "");
    }

    #[test]
    fn exported_add_lists_three_opcodes_and_suppresses_end() {
        let bytes = module_bytes(&[
            type_section(&[(&[ValueType::I32, ValueType::I32], Some(ValueType::I32))]),
            function_section(&[0]),
            export_section(&[export_entry("add", 0, 0)]),
            code_section(&[body_entry(&[], &[0x20, 0x00, 0x20, 0x01, 0x6a, 0x0b])]),
        ]);
        let out = flat(&bytes);

        assert!(out.contains("int fun_00000000(int par0, int par1) export \"add\""));
        assert!(out.contains("get_local par0"));
        assert!(out.contains("get_local par1"));
        assert!(out.contains("i32_add"));
        assert!(!out.contains("\tend"));
        let opcode_lines = out
            .lines()
            .filter(|l| l.contains('\t') && !l.contains("fun_"))
            .count();
        assert_eq!(opcode_lines, 3);
    }

    #[test]
    fn global_load_renders_offset_and_align() {
        let bytes = module_bytes(&[
            type_section(&[(&[], Some(ValueType::I32))]),
            function_section(&[0]),
            global_section(&[global_i32(1024, true)]),
            code_section(&[body_entry(&[], &[0x23, 0x00, 0x28, 0x02, 0x00, 0x0b])]),
        ]);
        let out = flat(&bytes);
        assert!(out.contains("static global_0 = 1024;"));
        assert!(out.contains("get_global global_0"));
        assert!(out.contains("i32_load 00000000h [align=2]"));
    }

    #[test]
    fn memory_operand_in_a_data_range_carries_string_info() {
        let bytes = module_bytes(&[
            type_section(&[(&[ValueType::I32], Some(ValueType::I32))]),
            function_section(&[0]),
            data_section(&[data_entry(0, 1024, b"hello\0")]),
            // get_local 0; i32.load align=2 offset=1024; end
            code_section(&[body_entry(&[], &[0x20, 0x00, 0x28, 0x02, 0x80, 0x08, 0x0b])]),
        ]);
        let out = flat(&bytes);
        assert!(
            out.contains("i32_load 00000400h [align=2] \"hello\""),
            "got:\n{out}"
        );
    }

    #[test]
    fn pc_counter_spans_functions_monotonically() {
        let body = body_entry(&[], &[0x41, 0x01, 0x1a, 0x0b]); // i32.const 1; drop; end
        let bytes = module_bytes(&[
            type_section(&[(&[], None)]),
            function_section(&[0, 0]),
            code_section(&[body.clone(), body]),
        ]);
        let out = flat(&bytes);

        let pcs: Vec<u32> = out
            .lines()
            .filter_map(|l| l.split('\t').next())
            .filter(|p| p.len() == 8 && !p.ends_with(':'))
            .filter_map(|p| u32::from_str_radix(p, 16).ok())
            .collect();
        assert!(pcs.len() >= 6, "expected headers plus opcodes: {out}");
        assert!(pcs.windows(2).all(|w| w[0] <= w[1]), "PCs not sorted: {pcs:?}");
        // Second function's header PC equals the first body's length.
        assert!(out.contains("00000004\tvoid fun_00000001()"));
    }

    #[test]
    fn block_opcode_anchors_a_label() {
        let bytes = module_bytes(&[
            type_section(&[(&[], None)]),
            function_section(&[0]),
            // block (empty); end; end
            code_section(&[body_entry(&[], &[0x02, 0x40, 0x0b, 0x0b])]),
        ]);
        let out = flat(&bytes);
        assert!(out.contains("label_00000000:\tblock\n"), "got:\n{out}");
        assert!(out.contains("\tend\n"));
    }

    #[test]
    fn imports_render_as_extern_declarations() {
        let bytes = module_bytes(&[
            type_section(&[(&[ValueType::I32], None)]),
            import_section(&[import_func("env", "log", 0)]),
        ]);
        let out = flat(&bytes);
        assert!(out.contains("void $imp_env.log(int par0);"));
    }

    #[test]
    fn calls_resolve_names_and_record_xrefs() {
        let bytes = module_bytes(&[
            type_section(&[(&[], None)]),
            function_section(&[0, 0]),
            code_section(&[
                body_entry(&[], &[0x10, 0x01, 0x0b]), // call 1; end
                body_entry(&[], &[0x0b]),
            ]),
        ]);
        let module = parser::parse(&bytes).unwrap();
        let mut disasm = Disassembler::new(module).unwrap();
        disasm.disassemble_all().unwrap();
        disasm.create_data_stream().unwrap();

        let mut renderer = FlatDecompiler::new(disasm.functions().len());
        crate::decompile::render_all(&mut renderer, &disasm).unwrap();
        let out = renderer.build_output();
        assert!(out.contains("call fun_00000001"));

        let refs = renderer.tracker().refs_of(FunctionId(0));
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].target, FunctionId(1));
        assert!(refs[0].direction_down);
        assert_eq!(renderer.tracker().refs_of(FunctionId(1)).len(), 1);
    }

    #[test]
    fn non_function_exports_form_the_preamble() {
        let bytes = module_bytes(&[export_section(&[export_entry("mem", 2, 0)])]);
        let out = flat(&bytes);
        assert!(out.contains("export \"mem\" (memory 0)"), "got:\n{out}");
    }

    #[test]
    fn branch_opcodes_render_their_depths() {
        // loop (empty); get_local 0; br_if 0; br 1; end; end
        let bytes = module_bytes(&[
            type_section(&[(&[ValueType::I32], None)]),
            function_section(&[0]),
            code_section(&[body_entry(
                &[],
                &[0x03, 0x40, 0x20, 0x00, 0x0d, 0x00, 0x0c, 0x01, 0x0b, 0x0b],
            )]),
        ]);
        let out = flat(&bytes);
        assert!(out.contains("\tloop\n"));
        assert!(out.contains("br_if 0"));
        assert!(out.contains("br 1"));
    }

    #[test]
    fn saturating_truncation_selects_a_mnemonic() {
        let bytes = module_bytes(&[
            type_section(&[(&[ValueType::F32], Some(ValueType::I32))]),
            function_section(&[0]),
            // get_local 0; i32.trunc_sat_f32_s; end
            code_section(&[body_entry(&[], &[0x20, 0x00, 0xfc, 0x00, 0x0b])]),
        ]);
        let out = flat(&bytes);
        assert!(out.contains("i32_trunc_sat_f32_s"));
    }

    #[test]
    fn signed_const_immediates() {
        let mut code = vec![0x41];
        code.extend(sleb(-2));
        code.push(0x1a); // drop
        code.push(0x0b);
        let bytes = module_bytes(&[
            type_section(&[(&[], None)]),
            function_section(&[0]),
            code_section(&[body_entry(&[], &code)]),
        ]);
        let out = flat(&bytes);
        assert!(out.contains("i32_const -2"), "got:\n{out}");
    }

    #[test]
    fn reserved_opcode_byte_is_invalid() {
        let bytes = module_bytes(&[
            type_section(&[(&[], None)]),
            function_section(&[0]),
            code_section(&[body_entry(&[], &[0x06, 0x0b])]),
        ]);
        let module = parser::parse(&bytes).unwrap();
        let mut disasm = Disassembler::new(module).unwrap();
        disasm.disassemble_all().unwrap();
        assert!(matches!(
            decompile(&mut disasm, RenderStyle::Flat),
            Err(DecodeError::InvalidOpcode(0x06))
        ));
    }
}
