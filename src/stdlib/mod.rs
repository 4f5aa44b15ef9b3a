//! Standard library: host functions pre-registered into the global scope
//! before evaluation (§4.9), organized one category per file the way the
//! teacher splits its builtins.
//!
//! - [`io`] (1): `print`
//! - [`math`] (2): `pow`, `range`
//! - [`types`] (3): `typeof`, `ascii`, `isarray`

use crate::scope::Scope;
use std::rc::Rc;

pub mod io;
pub mod math;
pub mod types;

/// Registers every standard-library function into `global`.
pub fn register_all(global: &Rc<Scope>) {
    io::register(global);
    math::register(global);
    types::register(global);
}
