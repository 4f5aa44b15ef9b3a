// ABOUTME: Tree-walking evaluator — interprets the AST against a root scope

use crate::ast::{BinOp, Expr, IndexStep, Param, Sigil, Stmt, UnOp, Variable};
use crate::config::LoopBudget;
use crate::error::InterpreterError;
use crate::scope::Scope;
use crate::value::{Function, UserFunction, Value};
use std::collections::HashMap;
use std::rc::Rc;

/// How a statement (or block of statements) finished: fell off the end, or
/// hit a `return`. Return unwinds the *call*, not the whole interpreter, so
/// this is threaded explicitly rather than modeled as a Rust error.
enum Outcome {
    Normal,
    Returned(Value),
}

/// Runs a whole program as one top-level block; a `return` at the top
/// level ends evaluation early and supplies the program's exit value.
pub fn eval_program(global: &Rc<Scope>, program: &[Stmt]) -> Result<Value, InterpreterError> {
    match eval_block(global, program)? {
        Outcome::Returned(v) => Ok(v),
        Outcome::Normal => Ok(Value::Nil),
    }
}

fn eval_block(scope: &Rc<Scope>, stmts: &[Stmt]) -> Result<Outcome, InterpreterError> {
    for stmt in stmts {
        match eval_stmt(scope, stmt)? {
            Outcome::Normal => continue,
            returned => return Ok(returned),
        }
    }
    Ok(Outcome::Normal)
}

fn eval_stmt(scope: &Rc<Scope>, stmt: &Stmt) -> Result<Outcome, InterpreterError> {
    match stmt {
        Stmt::Assign { target, value } => {
            let v = eval_expr(scope, value)?;
            assign_variable(scope, target, v)?;
            Ok(Outcome::Normal)
        }
        Stmt::Expression(expr) => {
            eval_expr(scope, expr)?;
            Ok(Outcome::Normal)
        }
        Stmt::If {
            cond,
            then_block,
            else_block,
        } => {
            if eval_expr(scope, cond)?.is_truthy() {
                eval_block(&scope.child(), then_block)
            } else if let Some(else_block) = else_block {
                eval_block(&scope.child(), else_block)
            } else {
                Ok(Outcome::Normal)
            }
        }
        Stmt::While { cond, body } => eval_while(scope, cond, body),
        Stmt::ForIn {
            target,
            iterable,
            body,
        } => eval_for_in(scope, target, iterable, body),
        Stmt::Return(expr) => {
            let v = match expr {
                Some(e) => eval_expr(scope, e)?,
                None => Value::Nil,
            };
            Ok(Outcome::Returned(v))
        }
    }
}

fn eval_while(scope: &Rc<Scope>, cond: &Expr, body: &[Stmt]) -> Result<Outcome, InterpreterError> {
    let mut iterations = 0usize;
    while eval_expr(scope, cond)?.is_truthy() {
        if let Outcome::Returned(v) = eval_block(&scope.child(), body)? {
            return Ok(Outcome::Returned(v));
        }
        iterations += 1;
        if let LoopBudget::Bounded(max) = scope.loop_budget() {
            if iterations > max {
                return Err(InterpreterError::LoopOverflow(max));
            }
        }
    }
    Ok(Outcome::Normal)
}

fn eval_for_in(
    scope: &Rc<Scope>,
    target: &Variable,
    iterable: &Expr,
    body: &[Stmt],
) -> Result<Outcome, InterpreterError> {
    let iterable_val = eval_expr(scope, iterable)?;
    let len = iterable_val.array_len().ok_or_else(|| {
        InterpreterError::type_error(format!(
            "cannot iterate over {} value",
            iterable_val.type_name()
        ))
    })?;
    for i in 0..len {
        let item = iterable_val.get_key(&i.to_string());
        let iter_scope = scope.child();
        assign_variable(&iter_scope, target, item)?;
        if let Outcome::Returned(v) = eval_block(&iter_scope, body)? {
            return Ok(Outcome::Returned(v));
        }
    }
    Ok(Outcome::Normal)
}

fn eval_expr(scope: &Rc<Scope>, expr: &Expr) -> Result<Value, InterpreterError> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Str(s) => Ok(Value::String(s.clone())),
        Expr::Nil => Ok(Value::Nil),
        Expr::EmptyObject => Ok(Value::new_object(HashMap::new())),
        Expr::Variable(var) => read_variable(scope, var),
        Expr::FunctionLiteral { params, body } => Ok(Value::Function(Function::User(Rc::new(
            UserFunction {
                params: params.clone(),
                body: body.clone(),
            },
        )))),
        Expr::Call { callee, args } => eval_call(scope, callee, args),
        Expr::Binary { op, lhs, rhs } => eval_binary(scope, *op, lhs, rhs),
        Expr::Unary { op, operand } => eval_unary(scope, *op, operand),
    }
}

fn eval_call(
    scope: &Rc<Scope>,
    callee: &Variable,
    args: &[Expr],
) -> Result<Value, InterpreterError> {
    let callee_val = read_variable(scope, callee)?;
    let func = match callee_val {
        Value::Function(f) => f,
        other => {
            return Err(InterpreterError::type_error(format!(
                "cannot call a {} value",
                other.type_name()
            )))
        }
    };

    let mut arg_values = Vec::with_capacity(args.len());
    for arg in args {
        arg_values.push(eval_expr(scope, arg)?);
    }

    match func {
        Function::User(user_fn) => {
            if user_fn.params.len() != arg_values.len() {
                return Err(InterpreterError::arity(
                    &callee.base,
                    user_fn.params.len(),
                    arg_values.len(),
                ));
            }
            for (param, value) in user_fn.params.iter().zip(&arg_values) {
                if let Some(kind) = param.kind {
                    if value.kind() != kind {
                        return Err(InterpreterError::type_error(format!(
                            "argument '{}' to '{}' must be {}, got {}",
                            param.target.base,
                            callee.base,
                            kind.name(),
                            value.type_name()
                        )));
                    }
                }
            }

            // Intentional dynamic scoping (§9): the call's scope is a
            // child of the *caller's* current scope, not of wherever the
            // function was defined.
            let call_scope = scope.child();
            for (param, value) in user_fn.params.iter().zip(arg_values) {
                bind_param(&call_scope, param, value);
            }
            match eval_block(&call_scope, &user_fn.body)? {
                Outcome::Returned(v) => Ok(v),
                Outcome::Normal => Ok(Value::Nil),
            }
        }
        Function::Host(host_fn) => host_fn.call(arg_values),
    }
}

/// Binds one call argument into the call's own scope. Unlike an ordinary
/// assignment, binding a default-sigil parameter always creates a fresh
/// local — it never walks outward to mutate a same-named outer binding,
/// even though the new call scope starts out empty (§4.7). `!`/`:` sigils
/// on a parameter keep their usual meaning, which already targets a fixed
/// scope directly.
fn bind_param(call_scope: &Rc<Scope>, param: &Param, value: Value) {
    match param.target.sigil {
        Sigil::Default => call_scope.declare(&param.target.base, value),
        Sigil::ForceLocal | Sigil::Global => {
            call_scope.set(&param.target.raw_base_name(), value)
        }
    }
}

fn eval_binary(
    scope: &Rc<Scope>,
    op: BinOp,
    lhs: &Expr,
    rhs: &Expr,
) -> Result<Value, InterpreterError> {
    let l = eval_expr(scope, lhs)?;
    let r = eval_expr(scope, rhs)?;
    match op {
        BinOp::Add => match (&l, &r) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            _ => Ok(Value::String(format!("{l}{r}"))),
        },
        BinOp::Sub => {
            let (a, b) = numeric_pair(l, r)?;
            Ok(Value::Number(a - b))
        }
        BinOp::Mul => {
            let (a, b) = numeric_pair(l, r)?;
            Ok(Value::Number(a * b))
        }
        BinOp::Div => {
            let (a, b) = numeric_pair(l, r)?;
            Ok(Value::Number(a / b))
        }
        BinOp::Mod => {
            let (a, b) = numeric_pair(l, r)?;
            Ok(Value::Number(modulo(a, b)?))
        }
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => compare(l, r, op),
        BinOp::Eq => Ok(Value::Number(if l == r { 1.0 } else { 0.0 })),
        BinOp::Ne => Ok(Value::Number(if l != r { 1.0 } else { 0.0 })),
    }
}

fn numeric_pair(l: Value, r: Value) -> Result<(f64, f64), InterpreterError> {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => Ok((a, b)),
        (l, r) => Err(InterpreterError::type_error(format!(
            "expected two numbers, got {} and {}",
            l.type_name(),
            r.type_name()
        ))),
    }
}

fn modulo(a: f64, b: f64) -> Result<f64, InterpreterError> {
    if b <= 0.0 {
        return Err(InterpreterError::type_error(
            "modulo divisor must be a positive number",
        ));
    }
    let mut r = a;
    while r < 0.0 {
        r += b;
    }
    while r >= b {
        r -= b;
    }
    Ok(r)
}

fn compare(l: Value, r: Value, op: BinOp) -> Result<Value, InterpreterError> {
    let result = match (&l, &r) {
        (Value::Number(a), Value::Number(b)) => match op {
            BinOp::Lt => a < b,
            BinOp::Le => a <= b,
            BinOp::Gt => a > b,
            BinOp::Ge => a >= b,
            _ => unreachable!(),
        },
        (Value::String(a), Value::String(b)) => match op {
            BinOp::Lt => a < b,
            BinOp::Le => a <= b,
            BinOp::Gt => a > b,
            BinOp::Ge => a >= b,
            _ => unreachable!(),
        },
        _ => {
            return Err(InterpreterError::type_error(format!(
                "cannot compare {} and {}",
                l.type_name(),
                r.type_name()
            )))
        }
    };
    Ok(Value::Number(if result { 1.0 } else { 0.0 }))
}

fn eval_unary(scope: &Rc<Scope>, op: UnOp, operand: &Expr) -> Result<Value, InterpreterError> {
    let v = eval_expr(scope, operand)?;
    match op {
        UnOp::Plus => match v {
            Value::String(s) => s
                .parse::<f64>()
                .map(Value::Number)
                .map_err(|_| InterpreterError::type_error(format!("cannot parse '{s}' as a number"))),
            other => Err(InterpreterError::type_error(format!(
                "unary '+' requires a string, got {}",
                other.type_name()
            ))),
        },
        UnOp::Neg => match v {
            Value::Number(n) => Ok(Value::Number(-n)),
            other => Err(InterpreterError::type_error(format!(
                "unary '-' requires a number, got {}",
                other.type_name()
            ))),
        },
        UnOp::Not => Ok(Value::Number(if v.is_truthy() { 0.0 } else { 1.0 })),
    }
}

/// Converts an index value to the string key Object access expects.
fn index_key(v: Value) -> Result<String, InterpreterError> {
    match v {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(crate::value::format_number(n)),
        other => Err(InterpreterError::type_error(format!(
            "cannot use a {} value as an index",
            other.type_name()
        ))),
    }
}

fn step_key(scope: &Rc<Scope>, step: &IndexStep) -> Result<String, InterpreterError> {
    match step {
        IndexStep::Static(s) => Ok(s.clone()),
        IndexStep::Dynamic(expr) => index_key(eval_expr(scope, expr)?),
    }
}

/// Resolves a left-value for reading. Object access never fails — absent
/// keys and non-Object intermediates simply read as Nil (§4.3).
fn read_variable(scope: &Rc<Scope>, var: &Variable) -> Result<Value, InterpreterError> {
    let mut current = scope.get(&var.raw_base_name());
    for step in &var.steps {
        let key = step_key(scope, step)?;
        current = current.get_key(&key);
    }
    Ok(current)
}

/// Resolves a left-value for assignment. Unlike reads, assigning through an
/// index chain requires every intermediate to already be an Object.
fn assign_variable(scope: &Rc<Scope>, var: &Variable, value: Value) -> Result<(), InterpreterError> {
    if var.steps.is_empty() {
        scope.set(&var.raw_base_name(), value);
        return Ok(());
    }

    let mut target = scope.get(&var.raw_base_name());
    for step in &var.steps[..var.steps.len() - 1] {
        let key = step_key(scope, step)?;
        if !matches!(target, Value::Object(_)) {
            return Err(InterpreterError::type_error(format!(
                "cannot index into a {} value",
                target.type_name()
            )));
        }
        target = target.get_key(&key);
    }
    let last_key = step_key(scope, var.steps.last().expect("checked non-empty"))?;
    if !matches!(target, Value::Object(_)) {
        return Err(InterpreterError::type_error(format!(
            "cannot index into a {} value",
            target.type_name()
        )));
    }
    target.set_key(&last_key, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn run(src: &str) -> Result<Value, InterpreterError> {
        let global = Scope::new_global(LoopBudget::default());
        let program = parse(tokenize(src)?)?;
        eval_program(&global, &program)
    }

    #[test]
    fn arithmetic_and_precedence() {
        // "-1 % 3" => 2, per the unusual precedence order (scenario S4).
        assert_eq!(run("return -1 % 3\n").unwrap(), Value::Number(2.0));
    }

    #[test]
    fn string_concatenation_via_plus() {
        assert_eq!(
            run(r#"return "a" + "b"
"#)
            .unwrap(),
            Value::String("ab".into())
        );
    }

    #[test]
    fn mixed_plus_stringifies_and_concatenates() {
        assert_eq!(
            run(r#"return "x" + 1
"#)
            .unwrap(),
            Value::String("x1".into())
        );
    }

    #[test]
    fn comparison_and_equality() {
        assert_eq!(run("return 1 < 2\n").unwrap(), Value::Number(1.0));
        assert_eq!(run("return 2 < 1\n").unwrap(), Value::Number(0.0));
        assert_eq!(run("return 1 == 1\n").unwrap(), Value::Number(1.0));
    }

    #[test]
    fn unary_not_and_neg() {
        assert_eq!(run("return !0\n").unwrap(), Value::Number(1.0));
        assert_eq!(run("return !1\n").unwrap(), Value::Number(0.0));
        assert_eq!(run("return -5\n").unwrap(), Value::Number(-5.0));
    }

    #[test]
    fn unary_plus_parses_string_to_number() {
        assert_eq!(
            run(r#"return +"42"
"#)
            .unwrap(),
            Value::Number(42.0)
        );
        assert!(run(r#"return +"nope"
"#)
        .is_err());
    }

    #[test]
    fn if_else_branches() {
        assert_eq!(
            run("$x = 1\nif $x\nreturn \"yes\"\nel\nreturn \"no\"\nfi\n").unwrap(),
            Value::String("yes".into())
        );
    }

    #[test]
    fn while_loop_overflow_is_reported() {
        let result = run("$x = 1\nwhile $x\n$x = 1\newhil\n");
        assert!(matches!(result, Err(InterpreterError::LoopOverflow(_))));
    }

    #[test]
    fn for_in_iterates_array_convention_object() {
        let src = "$total = 0\nfor $item $:range(3)\n$total = $total + $item\nrfo\nreturn $total\n";
        assert_eq!(run(src).unwrap(), Value::Number(3.0));
    }

    #[test]
    fn function_call_uses_caller_scope_dynamic_scoping() {
        // Scenario S1/S2 family: a function body reads a plain variable
        // from whatever scope called it, not from its definition site.
        let src = "$make = fun()\nreturn fun()\nreturn $x\nnfu\nnfu\n$inner = $make()\n$x = 99\nreturn $inner()\n";
        assert_eq!(run(src).unwrap(), Value::Number(99.0));
    }

    #[test]
    fn parameter_shadows_a_same_named_global_without_mutating_it() {
        // Scenario S2: binding `$a` as a parameter must not find and mutate
        // the already-existing global `a` — it declares its own local.
        let src = "$a = \"Hello\"\n$greet = fun($a)\n$a = \"World!\"\nreturn $a\nnfu\n$result = $greet(\"Hi\")\nreturn $a + \",\" + $result\n";
        assert_eq!(run(src).unwrap(), Value::String("Hello,World!".into()));
    }

    #[test]
    fn arity_mismatch_is_an_error() {
        let src = "$f = fun($a)\nreturn $a\nnfu\n$f()\n";
        assert!(matches!(run(src), Err(InterpreterError::Arity { .. })));
    }

    #[test]
    fn declared_kind_mismatch_is_a_type_error() {
        let src = "$f = fun($a number)\nreturn $a\nnfu\n$f(\"x\")\n";
        assert!(matches!(run(src), Err(InterpreterError::Type(_))));
    }

    #[test]
    fn nested_index_assignment_requires_object_targets() {
        let src = "$x = 1\n$x:y = 2\n";
        assert!(matches!(run(src), Err(InterpreterError::Type(_))));
    }

    #[test]
    fn reading_through_missing_key_is_nil_not_error() {
        assert_eq!(run("$o = {}\nreturn $o:missing\n").unwrap(), Value::Nil);
    }

    #[test]
    fn assigning_nil_into_object_removes_key() {
        let src = "$o = {}\n$o:a = 1\n$o:a = nil\nreturn $o:a\n";
        assert_eq!(run(src).unwrap(), Value::Nil);
    }

    #[test]
    fn empty_program_returns_nil() {
        assert_eq!(run("$x = 1\n").unwrap(), Value::Nil);
    }
}
