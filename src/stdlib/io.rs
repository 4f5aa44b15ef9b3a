//! `print` — the language's only direct console output.

use crate::ast::Param;
use crate::host;
use crate::scope::Scope;
use crate::value::Value;
use std::io::Write;
use std::rc::Rc;

/// Writes `value`'s stringification to `w` with no added separator or
/// newline. Split out from the registered closure so the exact bytes
/// `print` emits can be asserted against a `Vec<u8>` in tests.
fn write_value(w: &mut impl Write, value: &Value) -> std::io::Result<()> {
    write!(w, "{value}")
}

/// Registers `print(value)`: writes the stringification of its one
/// argument to standard output with no added separator or newline,
/// returns Nil.
pub fn register(global: &Rc<Scope>) {
    host::register(global, "print", vec![Param::any("value")], |args| {
        let [value] = args else {
            return Err(crate::error::InterpreterError::arity("print", 1, args.len()));
        };
        let mut stdout = std::io::stdout();
        write_value(&mut stdout, value).expect("write to stdout");
        stdout.flush().expect("flush stdout");
        Ok(Value::Nil)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoopBudget;
    use crate::value::Function;

    #[test]
    fn print_is_registered_and_returns_nil() {
        let global = Scope::new_global(LoopBudget::default());
        register(&global);
        match global.get("print") {
            Value::Function(Function::Host(f)) => assert_eq!(f.params().len(), 1),
            other => panic!("expected a host function, got {other:?}"),
        }
    }

    #[test]
    fn write_value_emits_no_newline_or_separator() {
        // Scenario S3: printing 0, 1, 2 back to back produces "012", not
        // "0\n1\n2\n" — print adds nothing beyond the value itself.
        let mut out = Vec::new();
        for n in [0.0, 1.0, 2.0] {
            write_value(&mut out, &Value::Number(n)).unwrap();
        }
        assert_eq!(String::from_utf8(out).unwrap(), "012");
    }

    #[test]
    fn write_value_does_not_split_a_string_argument() {
        // Scenario S5: a single string argument is written verbatim.
        let mut out = Vec::new();
        write_value(&mut out, &Value::String("hello, world!".into())).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "hello, world!");
    }

    #[test]
    fn write_value_back_to_back_concatenates_strings() {
        // Scenario S1: printing "b" then "a" produces "ba".
        let mut out = Vec::new();
        write_value(&mut out, &Value::String("b".into())).unwrap();
        write_value(&mut out, &Value::String("a".into())).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "ba");
    }
}
