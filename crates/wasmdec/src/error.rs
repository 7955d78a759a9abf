//! Error kinds surfaced at the crate boundary.
//!
//! Every stage of the pipeline fails fast: the first structural
//! inconsistency aborts the current module with one of these kinds.
//! Nothing is retried and no partial output is produced.

use thiserror::Error;

/// All failure modes of the decompilation pipeline.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Magic or version mismatch in the module header.
    #[error("not a WebAssembly v1 module")]
    InvalidModule,

    /// A read would cross the end of the byte stream, or a seek landed
    /// outside the stream bounds.
    #[error("unexpected end of stream at offset {0}")]
    UnexpectedEndOfStream(usize),

    /// A LEB128 encoding exceeded the width of the target integer.
    #[error("LEB128 encoding exceeds {0}-bit range")]
    InvalidLeb128(u32),

    /// An opcode byte outside the MVP set (plus the 0xFC prefix).
    #[error("invalid opcode 0x{0:02x}")]
    InvalidOpcode(u8),

    /// A section id outside 0..=11.
    #[error("invalid section id {0}")]
    InvalidSectionId(u8),

    /// An import kind byte outside 0..=3.
    #[error("invalid import kind {0}")]
    InvalidImportKind(u8),

    /// An export kind byte outside 0..=3.
    #[error("invalid export kind {0}")]
    InvalidExportKind(u8),

    /// A local declared with a type the renderers cannot zero-initialize.
    #[error("unexpected local type '{0}'")]
    UnexpectedLocalType(&'static str),

    /// An operation was attempted against missing or inconsistent
    /// pipeline state (no active data image, out-of-range call target,
    /// operand stack underflow).
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
}

pub type Result<T> = std::result::Result<T, DecodeError>;
