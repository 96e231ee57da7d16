//! Two-tier variable binding table.

use inkwell::values::BasicValueEnum;
use kscope_parser::ast::Type;
use std::collections::HashMap;

/// Index of a function in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuncId(pub usize);

/// Owner of a set of bindings. There are no nested scopes: a name is either local to one function or global.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Global constants. Bound to their constant value.
    Global,
    /// Locals of one function. Bound to the stack slot holding the variable.
    Local(FuncId),
}

/// What a name is bound to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binding<'ctx> {
    /// The constant itself for globals, a pointer to the stack slot for locals.
    pub value: BasicValueEnum<'ctx>,
    /// Language type of the variable (not of the slot).
    pub ty: Type,
}

/// Maps a [`Scope`] to its variables.
#[derive(Debug, Default)]
pub struct ScopeTable<'ctx> {
    tables: HashMap<Scope, HashMap<String, Binding<'ctx>>>,
}

impl<'ctx> ScopeTable<'ctx> {
    pub fn new() -> Self {
        let mut tables = HashMap::new();
        tables.insert(Scope::Global, HashMap::new());
        Self { tables }
    }

    /// Creates an empty local scope for `func`, discarding any previous one.
    pub fn enter_function(&mut self, func: FuncId) {
        self.tables.insert(Scope::Local(func), HashMap::new());
    }

    /// Discards the local scope of `func`.
    pub fn exit_function(&mut self, func: FuncId) {
        self.tables.remove(&Scope::Local(func));
    }

    pub fn get(&self, scope: Scope, name: &str) -> Option<Binding<'ctx>> {
        self.tables
            .get(&scope)
            .and_then(|table| table.get(name))
            .copied()
    }

    pub fn bind(&mut self, scope: Scope, name: impl Into<String>, binding: Binding<'ctx>) {
        self.tables
            .entry(scope)
            .or_default()
            .insert(name.into(), binding);
    }

    /// Looks `name` up in the local scope of `func` first, then in the global scope. Never the reverse.
    pub fn resolve(&self, func: Option<FuncId>, name: &str) -> Option<(Scope, Binding<'ctx>)> {
        func.map(Scope::Local)
            .into_iter()
            .chain(std::iter::once(Scope::Global))
            .find_map(|scope| self.get(scope, name).map(|binding| (scope, binding)))
    }
}
