//! The two renderers and their shared contract.
//!
//! Both renderers accumulate text into per-instance buffers and share
//! one lifecycle: `prepare` emits the module preamble, then every
//! lifted function goes through `decompile_function`, and
//! `build_output` hands back (and clears) the buffer. The merged data
//! image is acquired for the duration of a [`decompile`] run and
//! released before it returns, error or not.

pub mod expr;
pub mod flat;
pub mod structured;

use log::debug;

use crate::disasm::{Disassembler, Function};
use crate::error::Result;

pub use flat::FlatDecompiler;
pub use structured::StructuredDecompiler;

/// Renderer contract shared by the flat and structured variants.
pub trait Render {
    /// Emit the module preamble (globals, exports).
    fn prepare(&mut self, disasm: &Disassembler) -> Result<()>;

    /// Emit one function.
    fn decompile_function(&mut self, disasm: &Disassembler, func: &Function) -> Result<()>;

    /// Return the accumulated text, clearing the buffer.
    fn build_output(&mut self) -> String;
}

/// Which rendering a caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStyle {
    /// Opcode-per-line assembly-like listing.
    Flat,
    /// C-flavored pseudocode with reconstructed control flow.
    Structured,
}

/// Run a renderer over every lifted function.
pub fn render_all<R: Render>(renderer: &mut R, disasm: &Disassembler) -> Result<()> {
    renderer.prepare(disasm)?;
    for func in disasm.functions() {
        renderer.decompile_function(disasm, func)?;
    }
    Ok(())
}

/// Decompile an already-lifted module with the chosen renderer.
///
/// The data image is built at entry and dropped at exit so memory-access
/// operands can be annotated against the module's data segments.
pub fn decompile(disasm: &mut Disassembler, style: RenderStyle) -> Result<String> {
    disasm.create_data_stream()?;
    debug!("rendering with {style:?}");

    let outcome = match style {
        RenderStyle::Flat => {
            let mut renderer = FlatDecompiler::new(disasm.functions().len());
            render_all(&mut renderer, disasm).map(|()| renderer.build_output())
        }
        RenderStyle::Structured => {
            let mut renderer = StructuredDecompiler::new();
            render_all(&mut renderer, disasm).map(|()| renderer.build_output())
        }
    };

    disasm.drop_data_stream();
    outcome
}
