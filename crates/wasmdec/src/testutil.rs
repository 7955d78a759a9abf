//! Hand-rolled Wasm section builders for tests.
//!
//! Every builder returns raw section bytes (id, payload length, payload)
//! so tests can assemble exactly the byte streams they mean to exercise.

use crate::module::ValueType;

pub(crate) fn uleb(mut value: u64) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            return out;
        }
    }
}

pub(crate) fn sleb(mut value: i64) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        let done = (value == 0 && byte & 0x40 == 0) || (value == -1 && byte & 0x40 != 0);
        out.push(if done { byte } else { byte | 0x80 });
        if done {
            return out;
        }
    }
}

pub(crate) fn wire(ty: ValueType) -> u8 {
    match ty {
        ValueType::I32 => 0x7f,
        ValueType::I64 => 0x7e,
        ValueType::F32 => 0x7d,
        ValueType::F64 => 0x7c,
        ValueType::AnyFunc => 0x70,
        ValueType::Func => 0x60,
        ValueType::EmptyBlock => 0x40,
        ValueType::Void => panic!("Void has no wire form"),
    }
}

pub(crate) fn name_bytes(name: &str) -> Vec<u8> {
    let mut out = uleb(name.len() as u64);
    out.extend(name.as_bytes());
    out
}

fn section(id: u8, payload: Vec<u8>) -> Vec<u8> {
    let mut out = vec![id];
    out.extend(uleb(payload.len() as u64));
    out.extend(payload);
    out
}

fn counted(entries: &[Vec<u8>]) -> Vec<u8> {
    let mut payload = uleb(entries.len() as u64);
    for entry in entries {
        payload.extend(entry);
    }
    payload
}

/// Magic + version + the given sections, in order.
pub(crate) fn module_bytes(sections: &[Vec<u8>]) -> Vec<u8> {
    let mut out = vec![0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00];
    for s in sections {
        out.extend(s);
    }
    out
}

pub(crate) fn type_section(types: &[(&[ValueType], Option<ValueType>)]) -> Vec<u8> {
    let entries: Vec<Vec<u8>> = types
        .iter()
        .map(|(params, ret)| {
            let mut e = vec![0x60];
            e.extend(uleb(params.len() as u64));
            e.extend(params.iter().map(|p| wire(*p)));
            match ret {
                Some(ty) => e.extend([1, wire(*ty)]),
                None => e.push(0),
            }
            e
        })
        .collect();
    section(1, counted(&entries))
}

pub(crate) fn import_section(entries: &[Vec<u8>]) -> Vec<u8> {
    section(2, counted(entries))
}

pub(crate) fn import_func(module: &str, field: &str, type_index: u32) -> Vec<u8> {
    let mut e = name_bytes(module);
    e.extend(name_bytes(field));
    e.push(0);
    e.extend(uleb(u64::from(type_index)));
    e
}

pub(crate) fn import_global(module: &str, field: &str, ty: ValueType, mutable: bool) -> Vec<u8> {
    let mut e = name_bytes(module);
    e.extend(name_bytes(field));
    e.extend([3, wire(ty), u8::from(mutable)]);
    e
}

pub(crate) fn function_section(type_indices: &[u32]) -> Vec<u8> {
    let entries: Vec<Vec<u8>> = type_indices
        .iter()
        .map(|i| uleb(u64::from(*i)))
        .collect();
    section(3, counted(&entries))
}

pub(crate) fn global_section(entries: &[Vec<u8>]) -> Vec<u8> {
    section(6, counted(entries))
}

pub(crate) fn global_entry(ty: ValueType, mutable: bool, init: &[u8]) -> Vec<u8> {
    let mut e = vec![wire(ty), u8::from(mutable)];
    e.extend(init);
    e
}

/// A mutable i32 global initialized with `i32.const <value>`.
pub(crate) fn global_i32(value: u32, mutable: bool) -> Vec<u8> {
    let mut init = vec![0x41];
    init.extend(uleb(u64::from(value)));
    init.push(0x0b);
    global_entry(ValueType::I32, mutable, &init)
}

pub(crate) fn export_section(entries: &[Vec<u8>]) -> Vec<u8> {
    section(7, counted(entries))
}

pub(crate) fn export_entry(name: &str, kind: u8, index: u32) -> Vec<u8> {
    let mut e = name_bytes(name);
    e.push(kind);
    e.extend(uleb(u64::from(index)));
    e
}

pub(crate) fn element_section(entries: &[Vec<u8>]) -> Vec<u8> {
    section(9, counted(entries))
}

pub(crate) fn element_entry(table_index: u32, offset: u32, elems: &[u32]) -> Vec<u8> {
    let mut e = uleb(u64::from(table_index));
    e.push(0x41);
    e.extend(uleb(u64::from(offset)));
    e.push(0x0b);
    e.extend(uleb(elems.len() as u64));
    for elem in elems {
        e.extend(uleb(u64::from(*elem)));
    }
    e
}

pub(crate) fn code_section(entries: &[Vec<u8>]) -> Vec<u8> {
    section(10, counted(entries))
}

pub(crate) fn body_entry(locals: &[(u32, ValueType)], code: &[u8]) -> Vec<u8> {
    let mut body = uleb(locals.len() as u64);
    for (n, ty) in locals {
        body.extend(uleb(u64::from(*n)));
        body.push(wire(*ty));
    }
    body.extend(code);

    let mut e = uleb(body.len() as u64);
    e.extend(body);
    e
}

pub(crate) fn data_section(entries: &[Vec<u8>]) -> Vec<u8> {
    section(11, counted(entries))
}

pub(crate) fn data_entry(memory_index: u32, offset: u32, payload: &[u8]) -> Vec<u8> {
    let mut e = uleb(u64::from(memory_index));
    e.push(0x41);
    e.extend(uleb(u64::from(offset)));
    e.push(0x0b);
    e.extend(uleb(payload.len() as u64));
    e.extend(payload);
    e
}
