/**
 * Copyright 2022 - Jahred Love
 *
 * Redistribution and use in source and binary forms, with or without modification,
 * are permitted provided that the following conditions are met:
 *
 * 1. Redistributions of source code must retain the above copyright notice, this
 * list of conditions and the following disclaimer.
 *
 * 2. Redistributions in binary form must reproduce the above copyright notice, this
 * list of conditions and the following disclaimer in the documentation and/or other
 * materials provided with the distribution.
 *
 * 3. Neither the name of the copyright holder nor the names of its contributors may
 * be used to endorse or promote products derived from this software without specific
 * prior written permission.
 *
 * THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS “AS IS” AND
 * ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE IMPLIED
 * WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE DISCLAIMED.
 * IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT,
 * INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT
 * NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR
 * PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
 * WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE)
 * ARISING IN ANY WAY OUT OF THE USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE
 * POSSIBILITY OF SUCH DAMAGE.
 */

// WebAssembly module layout. The emitter fills a `Module`; `encode` hands it
// to `wasm_encoder` for framing.

use wasm_encoder::{
    CodeSection, ExportSection, Function, FunctionSection, Instruction, MemorySection, MemoryType,
    TypeSection,
};

pub use wasm_encoder::{ExportKind, ValType};

use crate::semantic::Type;

/// Block type byte of an `if`/`loop` that yields nothing.
pub const BLOCK_EMPTY: u8 = 0x40;

pub const MEMORY_EXPORT: &str = "memory";
pub const MEMORY_MIN_PAGES: u32 = 1;
pub const MEMORY_MAX_PAGES: u32 = 10;

/// Storage type of a source type; `void` has none and `bool` is an `i32`.
pub fn val_type(ty: Type) -> Option<ValType> {
    match ty {
        Type::I32 | Type::Bool => Some(ValType::I32),
        Type::I64 => Some(ValType::I64),
        Type::F32 => Some(ValType::F32),
        Type::F64 => Some(ValType::F64),
        Type::Void => None,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuncType {
    pub params: Vec<ValType>,
    pub results: Vec<ValType>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    pub min: u32,
    pub max: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Export {
    pub name: String,
    pub kind: ExportKind,
    pub index: u32,
}

/// `code` is the instruction stream without the closing `end`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FuncBody {
    pub locals: Vec<ValType>,
    pub code: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Module {
    pub types: Vec<FuncType>,
    /// Type index of each function, in function index order.
    pub funcs: Vec<u32>,
    pub memory: Limits,
    pub exports: Vec<Export>,
    pub code: Vec<FuncBody>,
}

impl Module {
    /// All five sections are written, even when empty.
    pub fn encode(&self) -> Vec<u8> {
        let mut types = TypeSection::new();
        for t in &self.types {
            types
                .ty()
                .function(t.params.iter().copied(), t.results.iter().copied());
        }

        let mut funcs = FunctionSection::new();
        for &ti in &self.funcs {
            funcs.function(ti);
        }

        let mut memory = MemorySection::new();
        memory.memory(MemoryType {
            minimum: u64::from(self.memory.min),
            maximum: self.memory.max.map(u64::from),
            memory64: false,
            shared: false,
            page_size_log2: None,
        });

        let mut exports = ExportSection::new();
        for e in &self.exports {
            exports.export(&e.name, e.kind, e.index);
        }

        let mut code = CodeSection::new();
        for body in &self.code {
            // One single-variable group per local.
            let mut f = Function::new(body.locals.iter().map(|&t| (1, t)));
            f.raw(body.code.iter().copied());
            f.instruction(&Instruction::End);
            code.function(&f);
        }

        let mut module = wasm_encoder::Module::new();
        module
            .section(&types)
            .section(&funcs)
            .section(&memory)
            .section(&exports)
            .section(&code);
        module.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_module() -> Module {
        Module {
            types: vec![],
            funcs: vec![],
            memory: Limits {
                min: MEMORY_MIN_PAGES,
                max: Some(MEMORY_MAX_PAGES),
            },
            exports: vec![Export {
                name: MEMORY_EXPORT.to_string(),
                kind: ExportKind::Memory,
                index: 0,
            }],
            code: vec![],
        }
    }

    #[test]
    fn empty_module_layout() {
        let bytes = empty_module().encode();
        let expected: Vec<u8> = vec![
            0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00,
            0x01, 0x01, 0x00,
            0x03, 0x01, 0x00,
            0x05, 0x04, 0x01, 0x01, 0x01, 0x0A,
            0x07, 0x0A, 0x01, 0x06, b'm', b'e', b'm', b'o', b'r', b'y', 0x02, 0x00,
            0x0A, 0x01, 0x00,
        ];
        assert_eq!(bytes, expected);
        wasmparser::Validator::new().validate_all(&bytes).unwrap();
    }

    #[test]
    fn body_declares_one_group_per_local() {
        let mut m = empty_module();
        m.types.push(FuncType {
            params: vec![],
            results: vec![],
        });
        m.funcs.push(0);
        m.code.push(FuncBody {
            locals: vec![ValType::I64, ValType::F32, ValType::F32],
            code: vec![],
        });
        let bytes = m.encode();
        // section id, size, 1 body, body size, 3 groups, (1 x i64), (1 x f32), (1 x f32), end
        assert!(bytes.ends_with(&[
            0x0A, 0x0A, 0x01, 0x08, 0x03, 0x01, 0x7E, 0x01, 0x7D, 0x01, 0x7D, 0x0B
        ]));
        wasmparser::Validator::new().validate_all(&bytes).unwrap();
    }

    #[test]
    fn bool_is_stored_as_i32() {
        assert_eq!(val_type(Type::Bool), Some(ValType::I32));
        assert_eq!(val_type(Type::F64), Some(ValType::F64));
        assert_eq!(val_type(Type::Void), None);
    }
}
