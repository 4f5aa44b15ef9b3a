//! `pow`, `range` — numeric helpers.

use crate::ast::Param;
use crate::error::InterpreterError;
use crate::host;
use crate::scope::Scope;
use crate::value::{Value, ValueKind};
use std::collections::HashMap;
use std::rc::Rc;

/// Registers `pow(a, b)` and the three `range` forms.
pub fn register(global: &Rc<Scope>) {
    host::register(
        global,
        "pow",
        vec![Param::typed("a", ValueKind::Number), Param::typed("b", ValueKind::Number)],
        |args| match args {
            [Value::Number(a), Value::Number(b)] => Ok(Value::Number(a.powf(*b))),
            [a, b] => Err(InterpreterError::type_error(format!(
                "pow expects two numbers, got {} and {}",
                a.type_name(),
                b.type_name()
            ))),
            _ => Err(InterpreterError::arity("pow", 2, args.len())),
        },
    );

    host::register(
        global,
        "range",
        vec![Param::typed("stop", ValueKind::Number)],
        range,
    );
}

/// `range(stop)`, `range(start, stop)`, `range(start, stop, step)` — an
/// array-convention Object of the numbers from `start` (default 0) up to
/// (excluding) `stop`, stepping by `step` (default 1). A step that can
/// never reach `stop` from `start` (zero, or the wrong sign) yields an
/// empty array rather than looping forever.
fn range(args: &[Value]) -> Result<Value, InterpreterError> {
    let numbers = |args: &[Value]| -> Result<Vec<f64>, InterpreterError> {
        args.iter()
            .map(|v| match v {
                Value::Number(n) => Ok(*n),
                other => Err(InterpreterError::type_error(format!(
                    "range expects numbers, got {}",
                    other.type_name()
                ))),
            })
            .collect()
    };

    let (start, stop, step) = match args.len() {
        1 => {
            let values = numbers(args)?;
            (0.0, values[0], 1.0)
        }
        2 => {
            let values = numbers(args)?;
            (values[0], values[1], 1.0)
        }
        3 => {
            let values = numbers(args)?;
            (values[0], values[1], values[2])
        }
        n => return Err(InterpreterError::arity("range", 3, n)),
    };

    let mut items = Vec::new();
    if step > 0.0 {
        let mut x = start;
        while x < stop {
            items.push(x);
            x += step;
        }
    } else if step < 0.0 {
        let mut x = start;
        while x > stop {
            items.push(x);
            x += step;
        }
    }
    // step == 0.0 (or the wrong sign for start/stop) falls through as empty.

    let mut map = HashMap::with_capacity(items.len() + 1);
    map.insert("length".to_string(), Value::Number(items.len() as f64));
    for (i, x) in items.into_iter().enumerate() {
        map.insert(i.to_string(), Value::Number(x));
    }
    Ok(Value::new_object(map))
}
