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

use std::collections::HashMap;

use crate::ast::Span;

use super::Type;

#[derive(Clone, Debug, PartialEq)]
pub struct FuncSig {
    pub name: String,
    pub ret: Type,
    pub params: Vec<Type>,
    pub span: Span,
}

/// Functions in declaration order. A function's position is its wasm index.
#[derive(Clone, Debug, Default)]
pub struct FuncTable {
    funcs: Vec<FuncSig>,
    by_name: HashMap<String, u32>,
}

impl FuncTable {
    /// Returns false if the name is already taken.
    pub(super) fn declare(&mut self, sig: FuncSig) -> bool {
        if self.by_name.contains_key(&sig.name) {
            return false;
        }
        self.by_name.insert(sig.name.clone(), self.funcs.len() as u32);
        self.funcs.push(sig);
        true
    }

    pub fn get(&self, name: &str) -> Option<&FuncSig> {
        self.index_of(name).map(|i| &self.funcs[i as usize])
    }

    pub fn index_of(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FuncSig> {
        self.funcs.iter()
    }

    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LocalVar {
    pub name: String,
    pub ty: Type,
    pub is_param: bool,
}

/// One function's variables. Insertion order is slot order: parameters
/// first, then locals, each in declaration order.
#[derive(Clone, Debug, Default)]
pub struct LocalTable {
    vars: Vec<LocalVar>,
    by_name: HashMap<String, u32>,
}

impl LocalTable {
    /// Returns false if the name is already taken. Parameters must all be
    /// declared before the first local.
    pub(super) fn declare(&mut self, var: LocalVar) -> bool {
        if self.by_name.contains_key(&var.name) {
            return false;
        }
        debug_assert!(
            !var.is_param || self.vars.iter().all(|v| v.is_param),
            "parameter declared after a local"
        );
        self.by_name.insert(var.name.clone(), self.vars.len() as u32);
        self.vars.push(var);
        true
    }

    pub fn get(&self, name: &str) -> Option<&LocalVar> {
        self.slot_of(name).map(|i| &self.vars[i as usize])
    }

    pub fn slot_of(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LocalVar> {
        self.vars.iter()
    }

    /// Non-parameter variables, in slot order.
    pub fn locals(&self) -> impl Iterator<Item = &LocalVar> {
        self.vars.iter().filter(|v| !v.is_param)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Analyzer output. Read-only from here on.
#[derive(Clone, Debug, Default)]
pub struct SymbolTables {
    pub funcs: FuncTable,
    locals: HashMap<String, LocalTable>,
}

impl SymbolTables {
    pub(super) fn new(funcs: FuncTable, locals: HashMap<String, LocalTable>) -> Self {
        Self { funcs, locals }
    }

    pub fn locals_of(&self, func: &str) -> Option<&LocalTable> {
        self.locals.get(func)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str, ty: Type, is_param: bool) -> LocalVar {
        LocalVar {
            name: name.to_string(),
            ty,
            is_param,
        }
    }

    #[test]
    fn slots_follow_insertion_order() {
        let mut t = LocalTable::default();
        assert!(t.declare(var("b", Type::I32, true)));
        assert!(t.declare(var("a", Type::F32, true)));
        assert!(t.declare(var("z", Type::I64, false)));
        assert!(t.declare(var("c", Type::Bool, false)));
        assert_eq!(t.slot_of("b"), Some(0));
        assert_eq!(t.slot_of("a"), Some(1));
        assert_eq!(t.slot_of("z"), Some(2));
        assert_eq!(t.slot_of("c"), Some(3));
        let locals: Vec<&str> = t.locals().map(|v| v.name.as_str()).collect();
        assert_eq!(locals, vec!["z", "c"]);
    }

    #[test]
    fn redeclaration_is_refused() {
        let mut t = LocalTable::default();
        assert!(t.declare(var("x", Type::I32, false)));
        assert!(!t.declare(var("x", Type::F64, false)));
        assert_eq!(t.get("x").map(|v| v.ty), Some(Type::I32));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn function_indices_follow_declaration_order() {
        let mut f = FuncTable::default();
        for name in ["zeta", "alpha", "mid"] {
            assert!(f.declare(FuncSig {
                name: name.to_string(),
                ret: Type::Void,
                params: vec![],
                span: Span::default(),
            }));
        }
        assert_eq!(f.index_of("zeta"), Some(0));
        assert_eq!(f.index_of("alpha"), Some(1));
        assert_eq!(f.index_of("mid"), Some(2));
        let names: Vec<&str> = f.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }
}
