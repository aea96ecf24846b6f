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

// AST + symbol tables -> wasm module.

use wasm_encoder::{BlockType, Encode, Instruction};

use crate::ast::{Block, BinaryOp, Expr, ExprKind, FunctionDecl, NumberLit, Program, Span, Stmt, StmtKind, UnaryOp};
use crate::error::CompileError;
use crate::semantic::{FuncTable, LocalTable, SymbolTables, Type};

use super::error::EmitError;
use super::format::{
    val_type, Export, ExportKind, FuncBody, FuncType, Limits, Module, ValType, MEMORY_EXPORT,
    MEMORY_MAX_PAGES, MEMORY_MIN_PAGES,
};
use super::raw;

/// Serialize a checked program.
pub fn emit_module(program: &Program, symbols: &SymbolTables) -> Result<Vec<u8>, CompileError> {
    Ok(build_module(program, symbols)?.encode())
}

fn storage_type(ty: Type, span: Span) -> Result<ValType, CompileError> {
    val_type(ty).ok_or_else(|| EmitError::Invariant(format!("{} has no storage type", ty)).at(span))
}

/// Lay out sections. Function `i` in the function table gets type `i`, body `i`
/// and export `i`.
pub fn build_module(program: &Program, symbols: &SymbolTables) -> Result<Module, CompileError> {
    let mut types = Vec::with_capacity(symbols.funcs.len());
    let mut exports = Vec::with_capacity(symbols.funcs.len() + 1);
    for (i, sig) in symbols.funcs.iter().enumerate() {
        let params = sig
            .params
            .iter()
            .map(|&t| storage_type(t, sig.span))
            .collect::<Result<Vec<_>, _>>()?;
        types.push(FuncType {
            params,
            results: val_type(sig.ret).into_iter().collect(),
        });
        exports.push(Export {
            name: sig.name.clone(),
            kind: ExportKind::Func,
            index: i as u32,
        });
    }
    exports.push(Export {
        name: MEMORY_EXPORT.to_string(),
        kind: ExportKind::Memory,
        index: 0,
    });

    let mut code = Vec::with_capacity(symbols.funcs.len());
    for s in &program.stmts {
        let StmtKind::FunctionDecl(f) = &s.node else {
            return Err(EmitError::Invariant("statement outside of a function".into()).at(s.span));
        };
        if symbols.funcs.index_of(&f.name) != Some(code.len() as u32) {
            return Err(EmitError::UnresolvedFunction(f.name.clone()).at(s.span));
        }
        code.push(emit_function(f, s.span, symbols)?);
    }
    if code.len() != symbols.funcs.len() {
        return Err(EmitError::Invariant("function table and program disagree".into()).at(Span::default()));
    }

    Ok(Module {
        funcs: (0..types.len() as u32).collect(),
        types,
        memory: Limits {
            min: MEMORY_MIN_PAGES,
            max: Some(MEMORY_MAX_PAGES),
        },
        exports,
        code,
    })
}

fn emit_function(f: &FunctionDecl, span: Span, symbols: &SymbolTables) -> Result<FuncBody, CompileError> {
    let unresolved = || EmitError::UnresolvedFunction(f.name.clone()).at(span);
    let sig = symbols.funcs.get(&f.name).ok_or_else(unresolved)?;
    let locals = symbols.locals_of(&f.name).ok_or_else(unresolved)?;
    let mut e = FnEmitter {
        funcs: &symbols.funcs,
        locals,
        code: Vec::new(),
    };
    e.emit_block(&f.body)?;
    // Falling off the end of a result-typed body traps.
    let ends_in_return = matches!(f.body.stmts.last().map(|s| &s.node), Some(StmtKind::Return { .. }));
    if sig.ret != Type::Void && !ends_in_return {
        e.ins(Instruction::Unreachable);
    }
    let local_types = locals
        .locals()
        .map(|v| storage_type(v.ty, span))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(FuncBody {
        locals: local_types,
        code: e.code,
    })
}

struct FnEmitter<'a> {
    funcs: &'a FuncTable,
    locals: &'a LocalTable,
    code: Vec<u8>,
}

impl FnEmitter<'_> {
    fn ins(&mut self, ins: Instruction<'_>) {
        ins.encode(&mut self.code);
    }

    fn slot(&self, name: &str, span: Span) -> Result<(u32, Type), CompileError> {
        match (self.locals.slot_of(name), self.locals.get(name)) {
            (Some(slot), Some(var)) => Ok((slot, var.ty)),
            _ => Err(EmitError::UnresolvedLocal(name.to_string()).at(span)),
        }
    }

    fn emit_block(&mut self, b: &Block) -> Result<(), CompileError> {
        for s in &b.stmts {
            self.emit_stmt(s)?;
        }
        Ok(())
    }

    fn emit_stmt(&mut self, s: &Stmt) -> Result<(), CompileError> {
        match &s.node {
            StmtKind::FunctionDecl(f) => {
                Err(EmitError::Invariant(format!("nested function '{}'", f.name)).at(s.span))
            }
            StmtKind::VarDecl(v) => {
                // Locals start zeroed; only an initializer needs code.
                if let Some(init) = &v.init {
                    self.emit_expr(init)?;
                    let (slot, _) = self.slot(&v.name, s.span)?;
                    self.ins(Instruction::LocalSet(slot));
                }
                Ok(())
            }
            StmtKind::If { conds, blocks } => {
                for (i, (cond, block)) in conds.iter().zip(blocks).enumerate() {
                    if i > 0 {
                        self.ins(Instruction::Else);
                    }
                    self.emit_expr(cond)?;
                    self.ins(Instruction::If(BlockType::Empty));
                    self.emit_block(block)?;
                }
                if let Some(else_block) = blocks.get(conds.len()) {
                    self.ins(Instruction::Else);
                    self.emit_block(else_block)?;
                }
                for _ in conds {
                    self.ins(Instruction::End);
                }
                Ok(())
            }
            StmtKind::While { cond, body } => {
                self.ins(Instruction::Loop(BlockType::Empty));
                self.emit_expr(cond)?;
                self.ins(Instruction::If(BlockType::Empty));
                self.emit_block(body)?;
                self.ins(Instruction::Br(1)); // back to the loop head
                self.ins(Instruction::End);
                self.ins(Instruction::End);
                Ok(())
            }
            StmtKind::Return { expr } => {
                self.emit_expr(expr)?;
                self.ins(Instruction::Return);
                Ok(())
            }
            StmtKind::Raw { text } => {
                raw::encode_raw(text, self.locals, &mut self.code).map_err(|e| e.at(s.span))
            }
            StmtKind::Expr { expr } => {
                let ty = self.emit_expr(expr)?;
                if val_type(ty).is_some() {
                    self.ins(Instruction::Drop);
                }
                Ok(())
            }
        }
    }

    /// Emit `e` and return its source type.
    fn emit_expr(&mut self, e: &Expr) -> Result<Type, CompileError> {
        match &e.node {
            ExprKind::Ident(name) => {
                let (slot, ty) = self.slot(name, e.span)?;
                self.ins(Instruction::LocalGet(slot));
                Ok(ty)
            }
            ExprKind::Number(NumberLit::Int(v)) => {
                // Literals above i32::MAX are bit patterns (e.g. 0xFFFFFFFF).
                self.ins(Instruction::I32Const(*v as i32));
                Ok(Type::I32)
            }
            ExprKind::Number(NumberLit::Float(v)) => {
                self.ins(Instruction::F32Const((*v as f32).into()));
                Ok(Type::F32)
            }
            ExprKind::Bool(b) => {
                self.ins(Instruction::I32Const(*b as i32));
                Ok(Type::Bool)
            }
            ExprKind::Str(_) => Err(EmitError::StringLiteral.at(e.span)),
            ExprKind::Assign { target, value } => {
                self.emit_expr(value)?;
                let (slot, _) = self.slot(target, e.span)?;
                self.ins(Instruction::LocalSet(slot));
                Ok(Type::Void)
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let ty = self.emit_expr(lhs)?;
                self.emit_expr(rhs)?;
                let ins = binary_instruction(*op, ty)
                    .ok_or(EmitError::UnsupportedOperator { op: op.symbol(), ty })
                    .map_err(|err| err.at(e.span))?;
                self.ins(ins);
                if op.is_relational() || op.is_equality() || op.is_logical() {
                    Ok(Type::Bool)
                } else {
                    Ok(ty)
                }
            }
            ExprKind::Unary { op, operand } => {
                let ty = self.emit_expr(operand)?;
                let unsupported = || EmitError::UnsupportedOperator { op: op.symbol(), ty }.at(e.span);
                match op {
                    UnaryOp::Plus => {}
                    UnaryOp::Neg => {
                        if !ty.is_numeric() {
                            return Err(unsupported());
                        }
                        let vt = storage_type(ty, e.span)?;
                        self.ins(minus_one(vt).ok_or_else(unsupported)?);
                        let mul = binary_instruction(BinaryOp::Mul, ty).ok_or_else(unsupported)?;
                        self.ins(mul);
                    }
                    UnaryOp::Not => {
                        if ty != Type::Bool {
                            return Err(unsupported());
                        }
                        self.ins(Instruction::I32Const(1));
                        self.ins(Instruction::I32Xor);
                    }
                }
                Ok(ty)
            }
            ExprKind::Cast { ty, operand } => {
                let from = self.emit_expr(operand)?;
                let to = Type::from_name(ty)
                    .ok_or_else(|| EmitError::Invariant(format!("unknown type '{}'", ty)).at(e.span))?;
                let (Some(from_vt), Some(to_vt)) = (val_type(from), val_type(to)) else {
                    return Err(EmitError::UnsupportedCast { from, to }.at(e.span));
                };
                if let Some(conv) = conversion(from_vt, to_vt) {
                    self.ins(conv);
                }
                Ok(to)
            }
            ExprKind::Call { callee, args } => {
                for a in args {
                    self.emit_expr(a)?;
                }
                let (Some(index), Some(sig)) = (self.funcs.index_of(callee), self.funcs.get(callee)) else {
                    return Err(EmitError::UnresolvedFunction(callee.clone()).at(e.span));
                };
                self.ins(Instruction::Call(index));
                Ok(sig.ret)
            }
        }
    }
}

/// `-1` of the given type, the multiplier for unary minus.
fn minus_one(vt: ValType) -> Option<Instruction<'static>> {
    match vt {
        ValType::I32 => Some(Instruction::I32Const(-1)),
        ValType::I64 => Some(Instruction::I64Const(-1)),
        ValType::F32 => Some(Instruction::F32Const((-1.0f32).into())),
        ValType::F64 => Some(Instruction::F64Const((-1.0f64).into())),
        _ => None,
    }
}

/// Instruction for `lhs op rhs` with operands of type `ty`. Integer comparisons
/// are signed; `&&`/`||` are the bitwise ops on 0/1 values.
fn binary_instruction(op: BinaryOp, ty: Type) -> Option<Instruction<'static>> {
    use ValType::{F32, F64, I32, I64};
    let vt = val_type(ty)?;
    let ins = match (op, vt) {
        (BinaryOp::Add, I32) => Instruction::I32Add,
        (BinaryOp::Add, I64) => Instruction::I64Add,
        (BinaryOp::Add, F32) => Instruction::F32Add,
        (BinaryOp::Add, F64) => Instruction::F64Add,
        (BinaryOp::Sub, I32) => Instruction::I32Sub,
        (BinaryOp::Sub, I64) => Instruction::I64Sub,
        (BinaryOp::Sub, F32) => Instruction::F32Sub,
        (BinaryOp::Sub, F64) => Instruction::F64Sub,
        (BinaryOp::Mul, I32) => Instruction::I32Mul,
        (BinaryOp::Mul, I64) => Instruction::I64Mul,
        (BinaryOp::Mul, F32) => Instruction::F32Mul,
        (BinaryOp::Mul, F64) => Instruction::F64Mul,
        (BinaryOp::Div, I32) => Instruction::I32DivS,
        (BinaryOp::Div, I64) => Instruction::I64DivS,
        (BinaryOp::Div, F32) => Instruction::F32Div,
        (BinaryOp::Div, F64) => Instruction::F64Div,
        (BinaryOp::Lt, I32) => Instruction::I32LtS,
        (BinaryOp::Lt, I64) => Instruction::I64LtS,
        (BinaryOp::Lt, F32) => Instruction::F32Lt,
        (BinaryOp::Lt, F64) => Instruction::F64Lt,
        (BinaryOp::Le, I32) => Instruction::I32LeS,
        (BinaryOp::Le, I64) => Instruction::I64LeS,
        (BinaryOp::Le, F32) => Instruction::F32Le,
        (BinaryOp::Le, F64) => Instruction::F64Le,
        (BinaryOp::Gt, I32) => Instruction::I32GtS,
        (BinaryOp::Gt, I64) => Instruction::I64GtS,
        (BinaryOp::Gt, F32) => Instruction::F32Gt,
        (BinaryOp::Gt, F64) => Instruction::F64Gt,
        (BinaryOp::Ge, I32) => Instruction::I32GeS,
        (BinaryOp::Ge, I64) => Instruction::I64GeS,
        (BinaryOp::Ge, F32) => Instruction::F32Ge,
        (BinaryOp::Ge, F64) => Instruction::F64Ge,
        (BinaryOp::Eq, I32) => Instruction::I32Eq,
        (BinaryOp::Eq, I64) => Instruction::I64Eq,
        (BinaryOp::Eq, F32) => Instruction::F32Eq,
        (BinaryOp::Eq, F64) => Instruction::F64Eq,
        (BinaryOp::Ne, I32) => Instruction::I32Ne,
        (BinaryOp::Ne, I64) => Instruction::I64Ne,
        (BinaryOp::Ne, F32) => Instruction::F32Ne,
        (BinaryOp::Ne, F64) => Instruction::F64Ne,
        (BinaryOp::BitAnd | BinaryOp::And, I32) => Instruction::I32And,
        (BinaryOp::BitAnd | BinaryOp::And, I64) => Instruction::I64And,
        (BinaryOp::BitOr | BinaryOp::Or, I32) => Instruction::I32Or,
        (BinaryOp::BitOr | BinaryOp::Or, I64) => Instruction::I64Or,
        _ => return None,
    };
    Some(ins)
}

/// Numeric conversion between storage types, `None` when they already match.
fn conversion(from: ValType, to: ValType) -> Option<Instruction<'static>> {
    use ValType::{F32, F64, I32, I64};
    let ins = match (from, to) {
        (I32, I64) => Instruction::I64ExtendI32S,
        (I64, I32) => Instruction::I32WrapI64,
        (I32, F32) => Instruction::F32ConvertI32S,
        (F32, I32) => Instruction::I32TruncF32S,
        (I32, F64) => Instruction::F64ConvertI32S,
        (F64, I32) => Instruction::I32TruncF64S,
        (I64, F32) => Instruction::F32ConvertI64S,
        (F32, I64) => Instruction::I64TruncF32S,
        (I64, F64) => Instruction::F64ConvertI64S,
        (F64, I64) => Instruction::I64TruncF64S,
        (F32, F64) => Instruction::F64PromoteF32,
        (F64, F32) => Instruction::F32DemoteF64,
        _ => return None,
    };
    Some(ins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::parse::parse_program;
    use crate::semantic::analyze;

    fn build(src: &str) -> Result<Module, CompileError> {
        let program = parse_program(src).unwrap();
        let symbols = analyze(&program).unwrap();
        build_module(&program, &symbols)
    }

    /// Body of the only function, without the trailing `end`.
    fn body(src: &str) -> Vec<u8> {
        let m = build(src).unwrap();
        wasmparser::Validator::new().validate_all(&m.encode()).unwrap();
        m.code[0].code.clone()
    }

    #[test]
    fn add_function_module_bytes() {
        let program = parse_program("i32 add(i32 a, i32 b) { return a + b; }").unwrap();
        let symbols = analyze(&program).unwrap();
        let bytes = emit_module(&program, &symbols).unwrap();
        let expected: Vec<u8> = vec![
            0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00, // header
            0x01, 0x07, 0x01, 0x60, 0x02, 0x7F, 0x7F, 0x01, 0x7F, // (i32, i32) -> i32
            0x03, 0x02, 0x01, 0x00, // func 0 : type 0
            0x05, 0x04, 0x01, 0x01, 0x01, 0x0A, // memory 1..10
            0x07, 0x10, 0x02, 0x03, b'a', b'd', b'd', 0x00, 0x00, 0x06, b'm', b'e', b'm', b'o',
            b'r', b'y', 0x02, 0x00, // exports
            0x0A, 0x0A, 0x01, 0x08, 0x00, 0x20, 0x00, 0x20, 0x01, 0x6A, 0x0F, 0x0B, // code
        ];
        assert_eq!(bytes, expected);
        wasmparser::Validator::new().validate_all(&bytes).unwrap();
    }

    #[test]
    fn signed_comparison_for_integers() {
        assert_eq!(
            body("bool isPos(i32 x) { return x > 0; }"),
            vec![0x20, 0x00, 0x41, 0x00, 0x4A, 0x0F]
        );
        assert_eq!(
            body("bool lt(f32 a, f32 b) { return a < b; }"),
            vec![0x20, 0x00, 0x20, 0x01, 0x5D, 0x0F]
        );
        assert_eq!(
            body("bool le(i64 a, i64 b) { return a <= b; }"),
            vec![0x20, 0x00, 0x20, 0x01, 0x57, 0x0F]
        );
    }

    #[test]
    fn while_wraps_if_in_loop() {
        let src = "i32 f(i32 n) { while (n > 0) { n = n - 1; } return n; }";
        assert_eq!(
            body(src),
            vec![
                0x03, 0x40, // loop
                0x20, 0x00, 0x41, 0x00, 0x4A, // n > 0
                0x04, 0x40, // if
                0x20, 0x00, 0x41, 0x01, 0x6B, 0x21, 0x00, // n = n - 1
                0x0C, 0x01, // br 1
                0x0B, 0x0B, // end end
                0x20, 0x00, 0x0F,
            ]
        );
    }

    #[test]
    fn return_inside_loop_validates() {
        let src = "i32 f(i32 n) { while (n > 0) { if (n == 3) { return n; } n = n - 1; } return 0; }";
        body(src);
    }

    #[test]
    fn body_ending_without_return_traps() {
        assert_eq!(
            body("i32 f(bool c) { if (c) { return 1; } else { return 2; } }"),
            vec![
                0x20, 0x00, 0x04, 0x40, // if c
                0x41, 0x01, 0x0F, // return 1
                0x05, // else
                0x41, 0x02, 0x0F, // return 2
                0x0B, // end
                0x00, // unreachable
            ]
        );
        let looped = body("i32 f(i32 n) { while (n > 0) { return n; } }");
        assert_eq!(looped.last(), Some(&0x00));
        // void bodies and bodies ending in `return` are left alone
        assert_eq!(body("void f(i32 n) { n = 1; }"), vec![0x41, 0x01, 0x21, 0x00]);
    }

    #[test]
    fn if_chain_nests_and_closes_once_per_condition() {
        let src = "i32 f(i32 x) { i32 r; if (x > 1) { r = 1; } else if (x > 0) { r = 2; } else { r = 3; } return r; }";
        assert_eq!(
            body(src),
            vec![
                0x20, 0x00, 0x41, 0x01, 0x4A, 0x04, 0x40, // if x > 1
                0x41, 0x01, 0x21, 0x01, // r = 1
                0x05, // else
                0x20, 0x00, 0x41, 0x00, 0x4A, 0x04, 0x40, // if x > 0
                0x41, 0x02, 0x21, 0x01, // r = 2
                0x05, // else
                0x41, 0x03, 0x21, 0x01, // r = 3
                0x0B, 0x0B, // end end
                0x20, 0x01, 0x0F,
            ]
        );
    }

    #[test]
    fn unary_operators() {
        assert_eq!(
            body("i32 f(i32 x) { return -x; }"),
            vec![0x20, 0x00, 0x41, 0x7F, 0x6C, 0x0F]
        );
        assert_eq!(
            body("bool f(bool x) { return !x; }"),
            vec![0x20, 0x00, 0x41, 0x01, 0x73, 0x0F]
        );
        assert_eq!(body("i32 f(i32 x) { return +x; }"), vec![0x20, 0x00, 0x0F]);
        let neg_f32 = body("f32 f(f32 x) { return -x; }");
        assert_eq!(&neg_f32[2..], &[0x43, 0x00, 0x00, 0x80, 0xBF, 0x94, 0x0F]);
    }

    #[test]
    fn float_constants_are_little_endian() {
        assert_eq!(
            body("f32 f() { return 1.5; }"),
            vec![0x43, 0x00, 0x00, 0xC0, 0x3F, 0x0F]
        );
    }

    #[test]
    fn casts_pick_conversions() {
        assert_eq!(body("i64 f(i32 x) { return (i64) x; }"), vec![0x20, 0x00, 0xAC, 0x0F]);
        assert_eq!(body("i32 f(i64 x) { return (i32) x; }"), vec![0x20, 0x00, 0xA7, 0x0F]);
        assert_eq!(body("f32 f(i32 x) { return (f32) x; }"), vec![0x20, 0x00, 0xB2, 0x0F]);
        assert_eq!(body("i32 f(f32 x) { return (i32) x; }"), vec![0x20, 0x00, 0xA8, 0x0F]);
        assert_eq!(body("f64 f(f32 x) { return (f64) x; }"), vec![0x20, 0x00, 0xBB, 0x0F]);
        assert_eq!(body("i32 f(i32 x) { return (i32) x; }"), vec![0x20, 0x00, 0x0F]);
        assert_eq!(body("i32 f(bool x) { return (i32) x; }"), vec![0x20, 0x00, 0x0F]);
    }

    #[test]
    fn locals_are_declared_after_parameters() {
        let m = build("void f(f64 p) { i64 a; f32 b = 2.0; bool c; }").unwrap();
        assert_eq!(m.code[0].locals, vec![ValType::I64, ValType::F32, ValType::I32]);
        assert_eq!(m.code[0].code, vec![0x43, 0x00, 0x00, 0x00, 0x40, 0x21, 0x02]);
        assert_eq!(m.types[0].params, vec![ValType::F64]);
        assert!(m.types[0].results.is_empty());
    }

    #[test]
    fn calls_use_declaration_order_and_drop_unused_results() {
        let src = "i32 one() { return 1; } void run() { one(); } i32 two() { return one() + one(); }";
        let m = build(src).unwrap();
        wasmparser::Validator::new().validate_all(&m.encode()).unwrap();
        assert_eq!(m.code[1].code, vec![0x10, 0x00, 0x1A]);
        assert_eq!(m.code[2].code, vec![0x10, 0x00, 0x10, 0x00, 0x6A, 0x0F]);
        let names: Vec<&str> = m.exports.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["one", "run", "two", "memory"]);
    }

    #[test]
    fn raw_instructions() {
        assert_eq!(
            body("i32 f(i32 a) { i32 b; _wasm \"local.get $a\"; _wasm \"i32.const -2\"; _wasm \"i32.mul\"; _wasm \"local.set $b\"; return b; }"),
            vec![0x20, 0x00, 0x41, 0x7E, 0x6C, 0x21, 0x01, 0x20, 0x01, 0x0F]
        );
        assert_eq!(
            body("f32 f() { _wasm \"f32.const 1.5\"; _wasm \"return\"; return 0.0; }")[..6],
            [0x43, 0x00, 0x00, 0xC0, 0x3F, 0x0F]
        );
    }

    #[test]
    fn raw_errors() {
        let err = build("void f() { _wasm \"i32.frob\"; }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Emit);
        assert_eq!(err.message, "unknown instruction 'i32.frob'");
        let err = build("void f() { _wasm \"local.get $q\"; }").unwrap_err();
        assert_eq!(err.message, "unknown local '$q' in raw instruction");
        let err = build("void f() { _wasm \"br x\"; }").unwrap_err();
        assert_eq!(err.message, "invalid operand 'x' for 'br'");
        let err = build("void f() { _wasm \"  \"; }").unwrap_err();
        assert_eq!(err.message, "empty raw instruction");
    }

    #[test]
    fn raw_i32_const_keeps_the_i32_bit_pattern() {
        assert_eq!(
            body("i32 f() { _wasm \"i32.const 4294967295\"; _wasm \"return\"; return 0; }")[..3],
            [0x41, 0x7F, 0x0F]
        );
        assert_eq!(
            body("i32 f() { _wasm \"i32.const -2147483648\"; _wasm \"return\"; return 0; }")[..7],
            [0x41, 0x80, 0x80, 0x80, 0x80, 0x78, 0x0F]
        );
        let err = build("void f() { _wasm \"i32.const 4294967296\"; }").unwrap_err();
        assert_eq!(err.message, "invalid operand '4294967296' for 'i32.const'");
        let err = build("void f() { _wasm \"i32.const -2147483649\"; }").unwrap_err();
        assert_eq!(err.message, "invalid operand '-2147483649' for 'i32.const'");
    }

    #[test]
    fn unsupported_lowerings() {
        let err = build("i32 f() { return (i32) \"abc\"; }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Emit);
        assert_eq!(err.message, "string literals cannot be lowered");
        let err = build("f32 f(f32 a) { return a & a; }").unwrap_err();
        assert_eq!(err.message, "no instruction for operator '&' on f32");
    }

    #[test]
    fn integer_literals_wrap_to_i32() {
        assert_eq!(
            body("i32 f() { return 0xFFFFFFFF; }"),
            vec![0x41, 0x7F, 0x0F]
        );
        assert_eq!(
            body("i32 f() { return 300; }"),
            vec![0x41, 0xAC, 0x02, 0x0F]
        );
    }
}
