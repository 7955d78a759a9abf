use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use wasmdec::decompile::{render_all, FlatDecompiler};
use wasmdec::disasm::Disassembler;
use wasmdec::xref::XrefTracker;
use wasmdec::{DecompileOptions, RenderStyle};

#[derive(Parser)]
#[command(name = "wasmdec")]
#[command(about = "Decompile WebAssembly binaries into flat listings or structured pseudocode")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decompile a .wasm file (structured pseudocode by default)
    Decompile {
        /// Path to the input .wasm file
        #[arg(short, long)]
        input: PathBuf,

        /// Path to write the output (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit the flat opcode-per-line listing instead of pseudocode
        #[arg(long)]
        flat: bool,
    },
    /// Inspect the lifted module (functions, globals, exports) as JSON
    Inspect {
        /// Path to the input .wasm file
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Record call edges with a flat pass and dump the call graph as JSON
    Xrefs {
        /// Path to the input .wasm file
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Probe the merged data image at an offset
    Data {
        /// Path to the input .wasm file
        #[arg(short, long)]
        input: PathBuf,

        /// Offset into the merged data image
        #[arg(short, long)]
        offset: u32,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Decompile {
            input,
            output,
            flat,
        } => {
            let wasm = read_wasm(&input)?;
            let options = DecompileOptions {
                style: if flat {
                    RenderStyle::Flat
                } else {
                    RenderStyle::Structured
                },
            };
            let text = wasmdec::decompile(&wasm, &options)?;

            match output {
                Some(path) => {
                    fs::write(&path, &text)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Decompiled output written to {}", path.display());
                }
                None => {
                    print!("{text}");
                }
            }
        }
        Commands::Inspect { input } => {
            let wasm = read_wasm(&input)?;
            let disasm = wasmdec::disassemble(&wasm)?;
            println!("{}", module_to_json(&disasm, wasm.len())?);
        }
        Commands::Xrefs { input } => {
            let wasm = read_wasm(&input)?;
            let mut disasm = wasmdec::disassemble(&wasm)?;
            disasm.create_data_stream()?;

            let mut renderer = FlatDecompiler::new(disasm.functions().len());
            render_all(&mut renderer, &disasm)?;
            let tracker = renderer.into_tracker();
            println!("{}", xrefs_to_json(&disasm, &tracker)?);
        }
        Commands::Data { input, offset } => {
            let wasm = read_wasm(&input)?;
            let mut disasm = wasmdec::disassemble(&wasm)?;
            disasm.create_data_stream()?;
            println!("{}", disasm.make_readable_data_info(offset)?);
        }
    }

    Ok(())
}

fn read_wasm(path: &PathBuf) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

// -- JSON serialization (CLI-only concern) --

fn module_to_json(disasm: &Disassembler, wasm_size: usize) -> Result<String> {
    let functions = disasm
        .functions()
        .iter()
        .map(|f| FunctionJson {
            name: &f.name,
            index: f.index.0,
            imported: f.body.is_none(),
            params: f.params().map(|p| p.ty.c_name()).collect(),
            return_type: f.return_type.c_name(),
            export: f.exported_name.as_deref(),
        })
        .collect();

    let globals = disasm
        .globals()
        .iter()
        .map(|g| GlobalJson {
            name: &g.name,
            value: &g.value,
            r#type: g.type_name,
            r#const: g.is_const,
        })
        .collect();

    let exports = disasm
        .module()
        .exports
        .iter()
        .map(|e| ExportJson {
            name: &e.name,
            kind: e.kind.name(),
            index: e.index,
        })
        .collect();

    let output = ModuleJson {
        wasm_size,
        import_function_count: disasm.real_function_offset(),
        type_count: disasm.types().len(),
        table_elements: disasm.table().len(),
        data_segments: disasm.module().data.len(),
        start_function: disasm.module().start_function,
        functions,
        globals,
        exports,
    };
    serde_json::to_string_pretty(&output).context("failed to serialize")
}

fn xrefs_to_json(disasm: &Disassembler, tracker: &XrefTracker) -> Result<String> {
    let items: Vec<FunctionXrefsJson> = disasm
        .functions()
        .iter()
        .map(|f| FunctionXrefsJson {
            function: &f.name,
            refs: tracker
                .refs_of(f.index)
                .iter()
                .map(|r| XrefJson {
                    direction: if r.direction_down { "down" } else { "up" },
                    kind: if r.is_destination { "in" } else { "out" },
                    offset: r.offset,
                    target: disasm
                        .function(r.target)
                        .map(|t| t.name.as_str())
                        .unwrap_or("?"),
                })
                .collect(),
        })
        .filter(|f| !f.refs.is_empty())
        .collect();

    serde_json::to_string_pretty(&items).context("failed to serialize")
}

// -- JSON types --

#[derive(Serialize)]
struct ModuleJson<'a> {
    wasm_size: usize,
    import_function_count: usize,
    type_count: usize,
    table_elements: usize,
    data_segments: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_function: Option<u32>,
    functions: Vec<FunctionJson<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    globals: Vec<GlobalJson<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    exports: Vec<ExportJson<'a>>,
}

#[derive(Serialize)]
struct FunctionJson<'a> {
    name: &'a str,
    index: u32,
    imported: bool,
    params: Vec<&'a str>,
    return_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    export: Option<&'a str>,
}

#[derive(Serialize)]
struct GlobalJson<'a> {
    name: &'a str,
    value: &'a str,
    r#type: &'a str,
    r#const: bool,
}

#[derive(Serialize)]
struct ExportJson<'a> {
    name: &'a str,
    kind: &'a str,
    index: u32,
}

#[derive(Serialize)]
struct FunctionXrefsJson<'a> {
    function: &'a str,
    refs: Vec<XrefJson<'a>>,
}

#[derive(Serialize)]
struct XrefJson<'a> {
    direction: &'static str,
    kind: &'static str,
    offset: u32,
    target: &'a str,
}
