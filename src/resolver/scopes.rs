use drop_bomb::DropBomb;
use std::collections::HashMap;

/// A binding that has been declared but not yet defined is in the middle of
/// resolving its own initializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(in crate::resolver) enum BindingStatus {
    Declared,
    Defined,
}

/// The resolver's static mirror of the runtime environment chain: one scope
/// per block/function/class construct, innermost last. The global scope is
/// deliberately not represented - a name found in no scope is a global.
#[derive(Debug, Default)]
pub(in crate::resolver) struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_scope(&mut self) -> ScopeGuard {
        self.scopes.push(Scope::default());
        ScopeGuard(DropBomb::new("You forgot to close a scope"))
    }

    pub fn exit_scope(&mut self, mut guard: ScopeGuard) {
        guard.0.defuse();
        self.scopes.pop();
    }

    /// Reserve `name` in the innermost scope without marking it usable.
    /// Returns `false` when the scope already has a binding with this name.
    pub fn declare(&mut self, name: &str) -> bool {
        match self.scopes.last_mut() {
            // Top-level declarations land in the global environment, which
            // tolerates redeclaration.
            None => true,
            Some(scope) => scope
                .bindings
                .insert(name.to_string(), BindingStatus::Declared)
                .is_none(),
        }
    }

    /// Mark `name` as fully initialised and usable.
    pub fn define(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope
                .bindings
                .insert(name.to_string(), BindingStatus::Defined);
        }
    }

    /// The number of scopes to hop outwards from the innermost one to reach
    /// the scope declaring `name`, together with the binding's status.
    /// `None` means the name can only be a global.
    pub fn depth_of(&self, name: &str) -> Option<(usize, BindingStatus)> {
        self.scopes
            .iter()
            .rev()
            .enumerate()
            .find_map(|(depth, scope)| scope.bindings.get(name).map(|status| (depth, *status)))
    }
}

#[derive(Debug, Default)]
struct Scope {
    bindings: HashMap<String, BindingStatus>,
}

/// `ScopeGuard` ensures, at runtime, that we never leave a scope unclosed.
/// The resolver code has no way to defuse the drop bomb (the field is private
/// outside of this module) - it is forced to call [`ScopeStack::exit_scope`],
/// which gives us a chance to pop the scope it opened.
#[must_use = "Nested scopes must be closed!"]
pub(in crate::resolver) struct ScopeGuard(DropBomb);
