//! `typeof`, `ascii`, `isarray` — type introspection helpers.

use crate::ast::Param;
use crate::error::InterpreterError;
use crate::host;
use crate::scope::Scope;
use crate::value::Value;
use std::rc::Rc;

pub fn register(global: &Rc<Scope>) {
    host::register(global, "typeof", vec![Param::any("value")], |args| match args {
        [value] => Ok(Value::String(value.type_name().to_string())),
        _ => Err(InterpreterError::arity("typeof", 1, args.len())),
    });

    // A single host callable dispatching on the argument's runtime kind:
    // the ABI has no notion of overloading by declared kind (§4.9).
    host::register(global, "ascii", vec![Param::any("value")], |args| match args {
        [Value::Number(n)] => {
            if (0.0..=255.0).contains(n) && n.fract() == 0.0 {
                Ok(Value::String(((*n as u8) as char).to_string()))
            } else {
                Ok(Value::Nil)
            }
        }
        [Value::String(s)] => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Number(c as u32 as f64)),
                _ => Ok(Value::Nil),
            }
        }
        [other] => Err(InterpreterError::type_error(format!(
            "ascii expects a number or string, got {}",
            other.type_name()
        ))),
        _ => Err(InterpreterError::arity("ascii", 1, args.len())),
    });

    host::register(global, "isarray", vec![Param::any("value")], |args| match args {
        [value] => Ok(Value::Number(if value.is_array() { 1.0 } else { 0.0 })),
        _ => Err(InterpreterError::arity("isarray", 1, args.len())),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoopBudget;
    use crate::value::Function;
    use std::collections::HashMap;

    fn call(global: &Rc<Scope>, name: &str, args: Vec<Value>) -> Result<Value, InterpreterError> {
        match global.get(name) {
            Value::Function(Function::Host(f)) => f.call(args),
            other => panic!("expected {name} to be a host function, got {other:?}"),
        }
    }

    #[test]
    fn typeof_reports_each_kind() {
        let global = Scope::new_global(LoopBudget::default());
        register(&global);
        assert_eq!(
            call(&global, "typeof", vec![Value::Number(1.0)]).unwrap(),
            Value::String("number".into())
        );
        assert_eq!(
            call(&global, "typeof", vec![Value::Nil]).unwrap(),
            Value::String("nil".into())
        );
    }

    #[test]
    fn ascii_dispatches_on_argument_kind() {
        let global = Scope::new_global(LoopBudget::default());
        register(&global);
        assert_eq!(
            call(&global, "ascii", vec![Value::Number(65.0)]).unwrap(),
            Value::String("A".into())
        );
        assert_eq!(
            call(&global, "ascii", vec![Value::String("A".into())]).unwrap(),
            Value::Number(65.0)
        );
    }

    #[test]
    fn ascii_out_of_range_number_is_nil() {
        let global = Scope::new_global(LoopBudget::default());
        register(&global);
        assert_eq!(
            call(&global, "ascii", vec![Value::Number(999.0)]).unwrap(),
            Value::Nil
        );
    }

    #[test]
    fn ascii_multi_char_string_is_nil() {
        let global = Scope::new_global(LoopBudget::default());
        register(&global);
        assert_eq!(
            call(&global, "ascii", vec![Value::String("ab".into())]).unwrap(),
            Value::Nil
        );
    }

    #[test]
    fn isarray_predicate() {
        let global = Scope::new_global(LoopBudget::default());
        register(&global);
        let mut m = HashMap::new();
        m.insert("length".to_string(), Value::Number(0.0));
        assert_eq!(
            call(&global, "isarray", vec![Value::new_object(m)]).unwrap(),
            Value::Number(1.0)
        );
        assert_eq!(
            call(&global, "isarray", vec![Value::Number(1.0)]).unwrap(),
            Value::Number(0.0)
        );
    }
}
