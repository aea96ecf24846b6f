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

// Text-format rendering of a built module (`-wat`).

use std::fmt::Write;

use wasmparser::BinaryReader;

use super::error::{EmitError, EmitResult};
use super::format::{ExportKind, FuncBody, FuncType, Module, ValType, BLOCK_EMPTY};
use super::opcode::{Immediate, Op};

fn val_name(ty: ValType) -> &'static str {
    match ty {
        ValType::I32 => "i32",
        ValType::I64 => "i64",
        ValType::F32 => "f32",
        ValType::F64 => "f64",
        ValType::V128 => "v128",
        _ => "ref",
    }
}

fn val_list(out: &mut String, keyword: &str, tys: &[ValType]) {
    if tys.is_empty() {
        return;
    }
    let _ = write!(out, " ({}", keyword);
    for &t in tys {
        let _ = write!(out, " {}", val_name(t));
    }
    out.push(')');
}

fn signature(out: &mut String, ty: &FuncType) {
    val_list(out, "param", &ty.params);
    val_list(out, "result", &ty.results);
}

fn float_text(v: f64) -> String {
    if v.is_nan() {
        "nan".to_string()
    } else {
        v.to_string()
    }
}

/// Render `m` as a `.wat` module. Fails only if a body holds bytes that do not
/// decode as instructions, which a raw escape with stray operands can cause.
pub fn render_wat(m: &Module) -> EmitResult<String> {
    let mut out = String::from("(module\n");
    for (i, ty) in m.types.iter().enumerate() {
        let _ = write!(out, "  (type (;{};) (func", i);
        signature(&mut out, ty);
        out.push_str("))\n");
    }
    for (i, (&ti, body)) in m.funcs.iter().zip(&m.code).enumerate() {
        let name = m
            .exports
            .iter()
            .find(|e| e.kind == ExportKind::Func && e.index as usize == i)
            .map(|e| e.name.as_str());
        out.push_str("  (func");
        if let Some(name) = name {
            let _ = write!(out, " ${}", name);
        }
        let _ = write!(out, " (;{};) (type {})", i, ti);
        if let Some(ty) = m.types.get(ti as usize) {
            signature(&mut out, ty);
        }
        out.push('\n');
        render_body(&mut out, body)?;
        out.push_str("  )\n");
    }
    let _ = write!(out, "  (memory (;0;) {}", m.memory.min);
    if let Some(max) = m.memory.max {
        let _ = write!(out, " {}", max);
    }
    out.push_str(")\n");
    for e in &m.exports {
        let kind = match e.kind {
            ExportKind::Func => "func",
            ExportKind::Memory => "memory",
            ExportKind::Table => "table",
            ExportKind::Global => "global",
            _ => "tag",
        };
        let _ = writeln!(out, "  (export \"{}\" ({} {}))", e.name, kind, e.index);
    }
    out.push_str(")\n");
    Ok(out)
}

fn render_body(out: &mut String, body: &FuncBody) -> EmitResult<()> {
    for &t in &body.locals {
        let _ = writeln!(out, "    (local {})", val_name(t));
    }
    let mut reader = BinaryReader::new(&body.code, 0);
    let mut depth = 0usize;
    while !reader.eof() {
        let at = reader.original_position();
        let bad = || EmitError::Invariant(format!("cannot decode instruction at byte {}", at));
        let op = reader.read_u8().ok().and_then(Op::from_byte).ok_or_else(bad)?;
        if matches!(op, Op::End | Op::Else) {
            depth = depth.checked_sub(1).ok_or_else(bad)?;
        }
        let mut line = "    ".to_string() + &"  ".repeat(depth) + op.mnemonic();
        match op.immediate() {
            Immediate::None => {}
            Immediate::BlockType => {
                if reader.clone().read_u8().map_err(|_| bad())? == BLOCK_EMPTY {
                    reader.read_u8().map_err(|_| bad())?;
                } else {
                    let ty: wasmparser::ValType = reader.read().map_err(|_| bad())?;
                    let _ = write!(line, " (result {})", ty);
                }
            }
            Immediate::Index => {
                let v = reader.read_var_u32().map_err(|_| bad())?;
                let _ = write!(line, " {}", v);
            }
            Immediate::MemArg => {
                let align = reader.read_var_u32().map_err(|_| bad())?;
                let offset = reader.read_var_u64().map_err(|_| bad())?;
                let _ = write!(line, " offset={} align={}", offset, 1u64 << align.min(63));
            }
            Immediate::MemoryIndex => {
                reader.read_u8().map_err(|_| bad())?;
            }
            Immediate::Int => {
                let v = match op {
                    Op::I32Const => i64::from(reader.read_var_i32().map_err(|_| bad())?),
                    _ => reader.read_var_i64().map_err(|_| bad())?,
                };
                let _ = write!(line, " {}", v);
            }
            Immediate::F32 => {
                let v = f32::from_bits(reader.read_f32().map_err(|_| bad())?.bits());
                let _ = write!(line, " {}", float_text(f64::from(v)));
            }
            Immediate::F64 => {
                let v = f64::from_bits(reader.read_f64().map_err(|_| bad())?.bits());
                let _ = write!(line, " {}", float_text(v));
            }
        }
        if matches!(op, Op::Block | Op::Loop | Op::If | Op::Else) {
            depth += 1;
        }
        out.push_str(&line);
        out.push('\n');
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_program;
    use crate::semantic::analyze;
    use crate::wasm::build_module;

    fn wat(src: &str) -> String {
        let program = parse_program(src).unwrap();
        let symbols = analyze(&program).unwrap();
        render_wat(&build_module(&program, &symbols).unwrap()).unwrap()
    }

    #[test]
    fn add_function_text() {
        assert_eq!(
            wat("i32 add(i32 a, i32 b) { return a + b; }"),
            "(module
  (type (;0;) (func (param i32 i32) (result i32)))
  (func $add (;0;) (type 0) (param i32 i32) (result i32)
    local.get 0
    local.get 1
    i32.add
    return
  )
  (memory (;0;) 1 10)
  (export \"add\" (func 0))
  (export \"memory\" (memory 0))
)
"
        );
    }

    #[test]
    fn blocks_indent_their_bodies() {
        let text = wat("void f(i32 n) { f32 x = 1.5; while (n > 0) { n = n - 1; } }");
        let body: Vec<&str> = text
            .lines()
            .skip_while(|l| !l.starts_with("  (func"))
            .skip(1)
            .take_while(|l| *l != "  )")
            .collect();
        assert_eq!(
            body,
            vec![
                "    (local f32)",
                "    f32.const 1.5",
                "    local.set 1",
                "    loop",
                "      local.get 0",
                "      i32.const 0",
                "      i32.gt_s",
                "      if",
                "        local.get 0",
                "        i32.const 1",
                "        i32.sub",
                "        local.set 0",
                "        br 1",
                "      end",
                "    end",
            ]
        );
    }

    #[test]
    fn trailing_trap_is_rendered() {
        let text = wat("i32 f(bool c) { if (c) { return 1; } else { return 2; } }");
        assert!(text.contains("      i32.const 2\n      return\n    end\n    unreachable\n  )\n"), "{text}");
    }

    #[test]
    fn raw_memory_access_shows_its_memarg() {
        let text = wat("void f(i32 p) { _wasm \"local.get $p\"; _wasm \"i32.const -3\"; _wasm \"i32.store 2 8\"; }");
        assert!(text.contains("    i32.const -3\n"), "{text}");
        assert!(text.contains("    i32.store offset=8 align=4\n"), "{text}");
    }

    #[test]
    fn stray_raw_operands_are_reported() {
        let program = parse_program("void f() { _wasm \"nop 255\"; }").unwrap();
        let symbols = analyze(&program).unwrap();
        let err = render_wat(&build_module(&program, &symbols).unwrap()).unwrap_err();
        assert!(matches!(err, EmitError::Invariant(_)));
    }
}
