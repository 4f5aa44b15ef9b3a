// ABOUTME: Lexically nested variable environment with sigil-directed resolution

use crate::config::LoopBudget;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// A lexically nested scope. Owns its own bindings, a pointer to its outer
/// scope, and a pointer to the program's single global scope.
///
/// Resolution of a raw identifier (sigil prefix included, `$` already
/// stripped) follows three rules:
///
/// 1. `!name` — target is this scope itself.
/// 2. `:name` — target is the global scope.
/// 3. `name`  — walk outward to the nearest scope that already defines it
///    (read: Nil if none does; write: define in this scope if none does).
#[derive(Debug)]
pub struct Scope {
    bindings: RefCell<HashMap<String, Value>>,
    outer: Option<Rc<Scope>>,
    global: Weak<Scope>,
    loop_budget: LoopBudget,
}

impl Scope {
    /// Creates the program's single global scope.
    pub fn new_global(loop_budget: LoopBudget) -> Rc<Scope> {
        Rc::new_cyclic(|weak| Scope {
            bindings: RefCell::new(HashMap::new()),
            outer: None,
            global: weak.clone(),
            loop_budget,
        })
    }

    /// Creates a child scope entering a function body, if/else branch,
    /// while iteration, or for iteration.
    pub fn child(self: &Rc<Scope>) -> Rc<Scope> {
        Rc::new(Scope {
            bindings: RefCell::new(HashMap::new()),
            outer: Some(self.clone()),
            global: self.global.clone(),
            loop_budget: self.loop_budget,
        })
    }

    pub fn loop_budget(&self) -> LoopBudget {
        self.loop_budget
    }

    fn global_scope(self: &Rc<Scope>) -> Rc<Scope> {
        self.global
            .upgrade()
            .expect("global scope dropped while a descendant scope is alive")
    }

    /// Reads `raw_name` (sigil prefix included). Never fails: an
    /// unresolved name returns Nil.
    pub fn get(self: &Rc<Scope>, raw_name: &str) -> Value {
        if let Some(rest) = raw_name.strip_prefix('!') {
            return self
                .bindings
                .borrow()
                .get(rest)
                .cloned()
                .unwrap_or(Value::Nil);
        }
        if let Some(rest) = raw_name.strip_prefix(':') {
            return self.global_scope().get(rest);
        }

        let mut scope = self.clone();
        loop {
            if let Some(v) = scope.bindings.borrow().get(raw_name) {
                return v.clone();
            }
            let next = match &scope.outer {
                Some(o) => o.clone(),
                None => return Value::Nil,
            };
            scope = next;
        }
    }

    /// Unconditionally defines `name` (no sigil prefix) in this scope's own
    /// bindings, regardless of whether an outer scope already defines it.
    ///
    /// Used for parameter binding: entering a call always creates a fresh
    /// local for each parameter, even when a same-named variable exists
    /// further out — it never mutates that outer binding. This is the one
    /// place binding differs from `set`'s default-sigil search (§4.7).
    pub fn declare(self: &Rc<Scope>, name: &str, value: Value) {
        Self::assign_in(self, name, value);
    }

    /// Writes `raw_name` (sigil prefix included). Assigning `Value::Nil`
    /// deletes the binding from the resolved target scope.
    pub fn set(self: &Rc<Scope>, raw_name: &str, value: Value) {
        if let Some(rest) = raw_name.strip_prefix('!') {
            Self::assign_in(self, rest, value);
            return;
        }
        if let Some(rest) = raw_name.strip_prefix(':') {
            let global = self.global_scope();
            Self::assign_in(&global, rest, value);
            return;
        }

        let mut scope = self.clone();
        loop {
            if scope.bindings.borrow().contains_key(raw_name) {
                Self::assign_in(&scope, raw_name, value);
                return;
            }
            let next = match &scope.outer {
                Some(o) => o.clone(),
                None => {
                    Self::assign_in(self, raw_name, value);
                    return;
                }
            };
            scope = next;
        }
    }

    fn assign_in(scope: &Rc<Scope>, name: &str, value: Value) {
        if matches!(value, Value::Nil) {
            scope.bindings.borrow_mut().remove(name);
        } else {
            scope.bindings.borrow_mut().insert(name.to_string(), value);
        }
    }
}
