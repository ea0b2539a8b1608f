//! A desk calculator: `let`/`const`/`set` variables, math functions and an environment that
//! can be saved to and loaded from plain text files.
//!
//! ```
//! use deskcalc::{Outcome, Session, Store};
//!
//! let mut session = Session::from_text("let r = 2; pow(r, 10);", Store::new("."));
//! assert_eq!(session.next().unwrap(), Outcome::Value(2.0));
//! assert_eq!(session.next().unwrap(), Outcome::Value(1024.0));
//! ```

#[macro_use]
mod util;

pub mod env;
pub mod error;
pub mod eval;
pub mod funcs;
pub mod lexer;
pub mod parser;
pub mod session;
pub mod store;

pub use env::{Environment, Variable};
pub use error::{CalcError, Result};
pub use eval::format_value;
pub use funcs::FunctionTable;
pub use lexer::{BufSource, Lexer, LineSource, Token};
pub use session::{Outcome, Session};
pub use store::Store;
