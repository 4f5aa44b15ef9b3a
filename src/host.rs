// ABOUTME: ABI for registering native functions in the scope (host-callable interface)

use crate::ast::Param;
use crate::error::InterpreterError;
use crate::scope::Scope;
use crate::value::{Function, Value};
use std::fmt;
use std::rc::Rc;

/// A host callable: a canonical parameter list (used for `Function`
/// equality and `Display`, mirroring a user function's signature) and an
/// action receiving already-evaluated argument values.
///
/// Unlike user functions, a host callable validates its own argument count
/// and kinds rather than going through the evaluator's generic arity/kind
/// check against a single fixed `Param` list — `range`'s 1/2/3-argument
/// forms need that flexibility (see DESIGN.md).
pub trait HostCallable {
    fn name(&self) -> &str;
    fn params(&self) -> &[Param];
    fn call(&self, args: Vec<Value>) -> Result<Value, InterpreterError>;
}

impl fmt::Debug for dyn HostCallable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<host fn {}>", self.name())
    }
}

/// A `HostCallable` built from a plain Rust closure.
pub struct NativeFunction {
    name: String,
    params: Vec<Param>,
    action: Box<dyn Fn(&[Value]) -> Result<Value, InterpreterError>>,
}

impl NativeFunction {
    pub fn new(
        name: impl Into<String>,
        params: Vec<Param>,
        action: impl Fn(&[Value]) -> Result<Value, InterpreterError> + 'static,
    ) -> Self {
        NativeFunction {
            name: name.into(),
            params,
            action: Box::new(action),
        }
    }
}

impl HostCallable for NativeFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn params(&self) -> &[Param] {
        &self.params
    }

    fn call(&self, args: Vec<Value>) -> Result<Value, InterpreterError> {
        (self.action)(&args)
    }
}

/// Registers a native function into `global` under `name`. `params` is the
/// canonical signature shown by `Display`/equality; `action` is free to
/// accept a different argument count (see `HostCallable`).
pub fn register(
    global: &Rc<Scope>,
    name: &str,
    params: Vec<Param>,
    action: impl Fn(&[Value]) -> Result<Value, InterpreterError> + 'static,
) {
    let func = NativeFunction::new(name, params, action);
    global.set(name, Value::Function(Function::Host(Rc::new(func))));
}
