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

// Lowering of `_wasm "<mnemonic> <operand>..."` statements.

use wasm_encoder::Encode;

use crate::semantic::LocalTable;

use super::error::{EmitError, EmitResult};
use super::opcode::Op;

/// Append one instruction. `$name` operands become local slots; other operands
/// are signed integers, or floats for `f32.const`/`f64.const`. `i32.const`
/// accepts `i32::MIN..=u32::MAX` and keeps the i32 bit pattern, like integer
/// literals.
pub fn encode_raw(text: &str, locals: &LocalTable, out: &mut Vec<u8>) -> EmitResult<()> {
    let mut words = text.split_whitespace();
    let mnemonic = words.next().ok_or(EmitError::EmptyRaw)?;
    let op = Op::from_mnemonic(mnemonic)
        .ok_or_else(|| EmitError::UnknownMnemonic(mnemonic.to_string()))?;
    out.push(op.byte());

    for word in words {
        let bad = || EmitError::BadOperand {
            mnemonic: op.mnemonic().to_string(),
            operand: word.to_string(),
        };
        if let Some(name) = word.strip_prefix('$') {
            let slot = locals
                .slot_of(name)
                .ok_or_else(|| EmitError::UnknownRawLocal(name.to_string()))?;
            slot.encode(out);
            continue;
        }
        match op {
            Op::F32Const => word.parse::<f32>().map_err(|_| bad())?.encode(out),
            Op::F64Const => word.parse::<f64>().map_err(|_| bad())?.encode(out),
            Op::I32Const => {
                let v: i64 = word.parse().map_err(|_| bad())?;
                if !(i64::from(i32::MIN)..=i64::from(u32::MAX)).contains(&v) {
                    return Err(bad());
                }
                (v as i32).encode(out);
            }
            _ => word.parse::<i64>().map_err(|_| bad())?.encode(out),
        }
    }
    Ok(())
}
