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

// WebAssembly instruction opcodes used by the emitter and the `_wasm` escape.

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    // Control
    Unreachable = 0x00,
    Nop = 0x01,
    Block = 0x02,
    Loop = 0x03,
    If = 0x04,
    Else = 0x05,
    End = 0x0B,
    Br = 0x0C,
    BrIf = 0x0D,
    Return = 0x0F,
    Call = 0x10,
    Drop = 0x1A,
    Select = 0x1B,

    // Locals
    LocalGet = 0x20,
    LocalSet = 0x21,
    LocalTee = 0x22,

    // Memory
    I32Load = 0x28,
    I64Load = 0x29,
    F32Load = 0x2A,
    F64Load = 0x2B,
    I32Load8S = 0x2C,
    I32Load8U = 0x2D,
    I32Load16S = 0x2E,
    I32Load16U = 0x2F,
    I32Store = 0x36,
    I64Store = 0x37,
    F32Store = 0x38,
    F64Store = 0x39,
    I32Store8 = 0x3A,
    I32Store16 = 0x3B,
    MemorySize = 0x3F,
    MemoryGrow = 0x40,

    // Constants
    I32Const = 0x41,
    I64Const = 0x42,
    F32Const = 0x43,
    F64Const = 0x44,

    // Comparisons
    I32Eqz = 0x45,
    I32Eq = 0x46,
    I32Ne = 0x47,
    I32LtS = 0x48,
    I32LtU = 0x49,
    I32GtS = 0x4A,
    I32GtU = 0x4B,
    I32LeS = 0x4C,
    I32LeU = 0x4D,
    I32GeS = 0x4E,
    I32GeU = 0x4F,
    I64Eqz = 0x50,
    I64Eq = 0x51,
    I64Ne = 0x52,
    I64LtS = 0x53,
    I64LtU = 0x54,
    I64GtS = 0x55,
    I64GtU = 0x56,
    I64LeS = 0x57,
    I64LeU = 0x58,
    I64GeS = 0x59,
    I64GeU = 0x5A,
    F32Eq = 0x5B,
    F32Ne = 0x5C,
    F32Lt = 0x5D,
    F32Gt = 0x5E,
    F32Le = 0x5F,
    F32Ge = 0x60,
    F64Eq = 0x61,
    F64Ne = 0x62,
    F64Lt = 0x63,
    F64Gt = 0x64,
    F64Le = 0x65,
    F64Ge = 0x66,

    // Arithmetic / bitwise
    I32Add = 0x6A,
    I32Sub = 0x6B,
    I32Mul = 0x6C,
    I32DivS = 0x6D,
    I32DivU = 0x6E,
    I32RemS = 0x6F,
    I32RemU = 0x70,
    I32And = 0x71,
    I32Or = 0x72,
    I32Xor = 0x73,
    I32Shl = 0x74,
    I32ShrS = 0x75,
    I32ShrU = 0x76,
    I64Add = 0x7C,
    I64Sub = 0x7D,
    I64Mul = 0x7E,
    I64DivS = 0x7F,
    I64DivU = 0x80,
    I64RemS = 0x81,
    I64RemU = 0x82,
    I64And = 0x83,
    I64Or = 0x84,
    I64Xor = 0x85,
    I64Shl = 0x86,
    I64ShrS = 0x87,
    I64ShrU = 0x88,
    F32Abs = 0x8B,
    F32Neg = 0x8C,
    F32Sqrt = 0x91,
    F32Add = 0x92,
    F32Sub = 0x93,
    F32Mul = 0x94,
    F32Div = 0x95,
    F64Abs = 0x99,
    F64Neg = 0x9A,
    F64Sqrt = 0x9F,
    F64Add = 0xA0,
    F64Sub = 0xA1,
    F64Mul = 0xA2,
    F64Div = 0xA3,

    // Conversions
    I32WrapI64 = 0xA7,
    I32TruncF32S = 0xA8,
    I32TruncF64S = 0xAA,
    I64ExtendI32S = 0xAC,
    I64ExtendI32U = 0xAD,
    I64TruncF32S = 0xAE,
    I64TruncF64S = 0xB0,
    F32ConvertI32S = 0xB2,
    F32ConvertI64S = 0xB4,
    F32DemoteF64 = 0xB6,
    F64ConvertI32S = 0xB7,
    F64ConvertI64S = 0xB9,
    F64PromoteF32 = 0xBB,
}

/// Text names accepted by `_wasm "..."`. Every `Op` appears exactly once.
const MNEMONICS: &[(&str, Op)] = &[
    ("unreachable", Op::Unreachable),
    ("nop", Op::Nop),
    ("block", Op::Block),
    ("loop", Op::Loop),
    ("if", Op::If),
    ("else", Op::Else),
    ("end", Op::End),
    ("br", Op::Br),
    ("br_if", Op::BrIf),
    ("return", Op::Return),
    ("call", Op::Call),
    ("drop", Op::Drop),
    ("select", Op::Select),
    ("local.get", Op::LocalGet),
    ("local.set", Op::LocalSet),
    ("local.tee", Op::LocalTee),
    ("i32.load", Op::I32Load),
    ("i64.load", Op::I64Load),
    ("f32.load", Op::F32Load),
    ("f64.load", Op::F64Load),
    ("i32.load8_s", Op::I32Load8S),
    ("i32.load8_u", Op::I32Load8U),
    ("i32.load16_s", Op::I32Load16S),
    ("i32.load16_u", Op::I32Load16U),
    ("i32.store", Op::I32Store),
    ("i64.store", Op::I64Store),
    ("f32.store", Op::F32Store),
    ("f64.store", Op::F64Store),
    ("i32.store8", Op::I32Store8),
    ("i32.store16", Op::I32Store16),
    ("memory.size", Op::MemorySize),
    ("memory.grow", Op::MemoryGrow),
    ("i32.const", Op::I32Const),
    ("i64.const", Op::I64Const),
    ("f32.const", Op::F32Const),
    ("f64.const", Op::F64Const),
    ("i32.eqz", Op::I32Eqz),
    ("i32.eq", Op::I32Eq),
    ("i32.ne", Op::I32Ne),
    ("i32.lt_s", Op::I32LtS),
    ("i32.lt_u", Op::I32LtU),
    ("i32.gt_s", Op::I32GtS),
    ("i32.gt_u", Op::I32GtU),
    ("i32.le_s", Op::I32LeS),
    ("i32.le_u", Op::I32LeU),
    ("i32.ge_s", Op::I32GeS),
    ("i32.ge_u", Op::I32GeU),
    ("i64.eqz", Op::I64Eqz),
    ("i64.eq", Op::I64Eq),
    ("i64.ne", Op::I64Ne),
    ("i64.lt_s", Op::I64LtS),
    ("i64.lt_u", Op::I64LtU),
    ("i64.gt_s", Op::I64GtS),
    ("i64.gt_u", Op::I64GtU),
    ("i64.le_s", Op::I64LeS),
    ("i64.le_u", Op::I64LeU),
    ("i64.ge_s", Op::I64GeS),
    ("i64.ge_u", Op::I64GeU),
    ("f32.eq", Op::F32Eq),
    ("f32.ne", Op::F32Ne),
    ("f32.lt", Op::F32Lt),
    ("f32.gt", Op::F32Gt),
    ("f32.le", Op::F32Le),
    ("f32.ge", Op::F32Ge),
    ("f64.eq", Op::F64Eq),
    ("f64.ne", Op::F64Ne),
    ("f64.lt", Op::F64Lt),
    ("f64.gt", Op::F64Gt),
    ("f64.le", Op::F64Le),
    ("f64.ge", Op::F64Ge),
    ("i32.add", Op::I32Add),
    ("i32.sub", Op::I32Sub),
    ("i32.mul", Op::I32Mul),
    ("i32.div_s", Op::I32DivS),
    ("i32.div_u", Op::I32DivU),
    ("i32.rem_s", Op::I32RemS),
    ("i32.rem_u", Op::I32RemU),
    ("i32.and", Op::I32And),
    ("i32.or", Op::I32Or),
    ("i32.xor", Op::I32Xor),
    ("i32.shl", Op::I32Shl),
    ("i32.shr_s", Op::I32ShrS),
    ("i32.shr_u", Op::I32ShrU),
    ("i64.add", Op::I64Add),
    ("i64.sub", Op::I64Sub),
    ("i64.mul", Op::I64Mul),
    ("i64.div_s", Op::I64DivS),
    ("i64.div_u", Op::I64DivU),
    ("i64.rem_s", Op::I64RemS),
    ("i64.rem_u", Op::I64RemU),
    ("i64.and", Op::I64And),
    ("i64.or", Op::I64Or),
    ("i64.xor", Op::I64Xor),
    ("i64.shl", Op::I64Shl),
    ("i64.shr_s", Op::I64ShrS),
    ("i64.shr_u", Op::I64ShrU),
    ("f32.abs", Op::F32Abs),
    ("f32.neg", Op::F32Neg),
    ("f32.sqrt", Op::F32Sqrt),
    ("f32.add", Op::F32Add),
    ("f32.sub", Op::F32Sub),
    ("f32.mul", Op::F32Mul),
    ("f32.div", Op::F32Div),
    ("f64.abs", Op::F64Abs),
    ("f64.neg", Op::F64Neg),
    ("f64.sqrt", Op::F64Sqrt),
    ("f64.add", Op::F64Add),
    ("f64.sub", Op::F64Sub),
    ("f64.mul", Op::F64Mul),
    ("f64.div", Op::F64Div),
    ("i32.wrap_i64", Op::I32WrapI64),
    ("i32.trunc_f32_s", Op::I32TruncF32S),
    ("i32.trunc_f64_s", Op::I32TruncF64S),
    ("i64.extend_i32_s", Op::I64ExtendI32S),
    ("i64.extend_i32_u", Op::I64ExtendI32U),
    ("i64.trunc_f32_s", Op::I64TruncF32S),
    ("i64.trunc_f64_s", Op::I64TruncF64S),
    ("f32.convert_i32_s", Op::F32ConvertI32S),
    ("f32.convert_i64_s", Op::F32ConvertI64S),
    ("f32.demote_f64", Op::F32DemoteF64),
    ("f64.convert_i32_s", Op::F64ConvertI32S),
    ("f64.convert_i64_s", Op::F64ConvertI64S),
    ("f64.promote_f32", Op::F64PromoteF32),
];

impl Op {
    pub fn byte(self) -> u8 {
        self as u8
    }

    pub fn from_mnemonic(name: &str) -> Option<Op> {
        MNEMONICS.iter().find(|(m, _)| *m == name).map(|(_, op)| *op)
    }

    pub fn from_byte(byte: u8) -> Option<Op> {
        MNEMONICS.iter().find(|(_, op)| op.byte() == byte).map(|(_, op)| *op)
    }

    pub fn mnemonic(self) -> &'static str {
        MNEMONICS
            .iter()
            .find(|(_, op)| *op == self)
            .map(|(m, _)| *m)
            .unwrap_or("?")
    }

    /// Shape of the operands that follow the opcode byte.
    pub fn immediate(self) -> Immediate {
        use Op::*;
        match self {
            Block | Loop | If => Immediate::BlockType,
            Br | BrIf | Call | LocalGet | LocalSet | LocalTee => Immediate::Index,
            I32Load | I64Load | F32Load | F64Load | I32Load8S | I32Load8U | I32Load16S
            | I32Load16U | I32Store | I64Store | F32Store | F64Store | I32Store8 | I32Store16 => {
                Immediate::MemArg
            }
            MemorySize | MemoryGrow => Immediate::MemoryIndex,
            I32Const | I64Const => Immediate::Int,
            F32Const => Immediate::F32,
            F64Const => Immediate::F64,
            _ => Immediate::None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Immediate {
    None,
    BlockType,
    /// One unsigned LEB128 index (local, function or branch depth).
    Index,
    /// Alignment then offset, both unsigned LEB128.
    MemArg,
    /// Reserved memory index byte.
    MemoryIndex,
    Int,
    F32,
    F64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn mnemonics_are_unique_in_both_directions() {
        let names: HashSet<&str> = MNEMONICS.iter().map(|(m, _)| *m).collect();
        let bytes: HashSet<u8> = MNEMONICS.iter().map(|(_, op)| op.byte()).collect();
        assert_eq!(names.len(), MNEMONICS.len());
        assert_eq!(bytes.len(), MNEMONICS.len());
    }

    #[test]
    fn lookup_by_text() {
        assert_eq!(Op::from_mnemonic("i32.add"), Some(Op::I32Add));
        assert_eq!(Op::from_mnemonic("f32.convert_i32_s").map(Op::byte), Some(0xB2));
        assert_eq!(Op::from_mnemonic("i64.extend_i32_s").map(Op::byte), Some(0xAC));
        assert_eq!(Op::from_mnemonic("i32.frobnicate"), None);
        assert_eq!(Op::LocalGet.mnemonic(), "local.get");
    }

    #[test]
    fn lookup_by_byte() {
        assert_eq!(Op::from_byte(0x6A), Some(Op::I32Add));
        assert_eq!(Op::from_byte(0xB2), Some(Op::F32ConvertI32S));
        assert_eq!(Op::from_byte(0xFF), None);
        assert_eq!(Op::I32Store.immediate(), Immediate::MemArg);
        assert_eq!(Op::Loop.immediate(), Immediate::BlockType);
        assert_eq!(Op::I32Add.immediate(), Immediate::None);
    }
}
