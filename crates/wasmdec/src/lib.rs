//! Interactive WebAssembly decompiler.
//!
//! Turns a Wasm v1 binary into a human-readable rendering a
//! reverse-engineer can work with: either a flat assembly-like listing
//! or structured C-flavored pseudocode.
//!
//! # Architecture
//!
//! The decompilation pipeline has three stages:
//!
//! 1. **Parsing** ([`parser`], on top of [`reader`]) — checks the
//!    module header and decodes the twelve MVP sections into a raw
//!    [`module::Module`].
//! 2. **Disassembly** ([`disasm`]) — lifts raw sections into named,
//!    typed entities: functions with imports prepended, globals with
//!    decoded initializers, the collapsed table image, and a dense data
//!    image that memory operands are probed against.
//! 3. **Decompilation** ([`decompile`]) — renders every lifted function
//!    with one of two renderers behind a shared contract: a flat
//!    opcode-per-line listing, or a structured renderer that runs a
//!    symbolic operand stack over the bytecode and re-emits Wasm's
//!    implicit control flow as nested constructs.
//!
//! # Public Modules
//!
//! - [`reader`] — byte cursor with LEB128 and string primitives.
//! - [`module`] — raw section data model.
//! - [`opcode`] — the MVP opcode table.
//! - [`disasm`] — the lifted view plus the readable-data probe.
//! - [`decompile`] — the renderers and the [`decompile::Render`] trait.
//! - [`xref`] — the call-edge side table filled by the flat renderer.

pub mod decompile;
pub mod disasm;
pub mod error;
pub mod module;
pub mod opcode;
pub mod parser;
pub mod reader;
pub mod xref;

#[cfg(test)]
pub(crate) mod testutil;

pub use decompile::RenderStyle;
pub use error::{DecodeError, Result};

/// Options controlling the decompilation process.
pub struct DecompileOptions {
    /// Which of the two renderers produces the output.
    pub style: RenderStyle,
}

/// Parse a Wasm binary into its raw sections.
pub fn parse(wasm: &[u8]) -> Result<module::Module> {
    parser::parse(wasm)
}

/// Parse and lift a Wasm binary into its disassembled view.
pub fn disassemble(wasm: &[u8]) -> Result<disasm::Disassembler> {
    let module = parser::parse(wasm)?;
    let mut disasm = disasm::Disassembler::new(module)?;
    disasm.disassemble_all()?;
    Ok(disasm)
}

/// Decompile a Wasm binary into readable text.
pub fn decompile(wasm: &[u8], options: &DecompileOptions) -> Result<String> {
    let mut disasm = disassemble(wasm)?;
    decompile::decompile(&mut disasm, options.style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ValueType;
    use crate::testutil::*;

    #[test]
    fn empty_module_decompiles_to_empty_output_in_both_styles() {
        let wasm = module_bytes(&[]);
        for style in [RenderStyle::Flat, RenderStyle::Structured] {
            let out = decompile(&wasm, &DecompileOptions { style }).unwrap();
            assert_eq!(out, "", "style {style:?}");
        }
    }

    #[test]
    fn header_corruption_only_ever_surfaces_invalid_module() {
        let wasm = module_bytes(&[]);
        for i in 0..8 {
            for bit in 0..8 {
                let mut bad = wasm.clone();
                bad[i] ^= 1 << bit;
                let err = decompile(
                    &bad,
                    &DecompileOptions {
                        style: RenderStyle::Flat,
                    },
                )
                .unwrap_err();
                assert!(
                    matches!(err, DecodeError::InvalidModule),
                    "byte {i} bit {bit} gave {err:?}"
                );
            }
        }
    }

    #[test]
    fn both_renderers_share_the_lifting_pipeline() {
        let wasm = module_bytes(&[
            type_section(&[(&[ValueType::I32, ValueType::I32], Some(ValueType::I32))]),
            function_section(&[0]),
            export_section(&[export_entry("add", 0, 0)]),
            code_section(&[body_entry(&[], &[0x20, 0x00, 0x20, 0x01, 0x6a, 0x0b])]),
        ]);
        let flat = decompile(
            &wasm,
            &DecompileOptions {
                style: RenderStyle::Flat,
            },
        )
        .unwrap();
        let structured = decompile(
            &wasm,
            &DecompileOptions {
                style: RenderStyle::Structured,
            },
        )
        .unwrap();

        assert!(flat.contains("export \"add\""));
        assert!(flat.contains("i32_add"));
        assert!(structured.contains("/* export: \"add\" */"));
        assert!(structured.contains("return par0 + par1;"));
    }
}
