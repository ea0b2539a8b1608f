use crate::env::Environment;
use crate::error::{CalcError, Result};
use crate::funcs::FunctionTable;
use crate::lexer::{BufSource, Lexer, LineSource, Token};
use crate::parser;
use crate::store::Store;
use std::io::Cursor;
use std::rc::Rc;

/// What one call to [`Session::next`] produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Value(f64),
    Help,
    Quit,
    Saved { name: String, count: usize },
    Loaded { name: String, count: usize },
    Shown(Vec<String>),
}

/// One calculator session: an input stream, its variables and where they are saved.
pub struct Session {
    lexer: Lexer,
    env: Environment,
    funcs: Rc<FunctionTable>,
    store: Store,
    pending: bool,
}

impl Session {
    pub fn new(source: Box<dyn LineSource>, store: Store) -> Session {
        let funcs = Rc::new(FunctionTable::create());

        Session {
            lexer: Lexer::new(source, funcs.clone()),
            env: Environment::with_constants(),
            funcs,
            store,
            pending: false,
        }
    }

    pub fn from_text(input: &str, store: Store) -> Session {
        let source = BufSource::new(Cursor::new(input.to_string()));
        Session::new(Box::new(source), store)
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.funcs
    }

    /// Read and run the next statement or command.
    ///
    /// Empty statements (`;`) are skipped. The end of input counts as `quit`.
    pub fn next(&mut self) -> Result<Outcome> {
        self.pending = true;

        let mut tok = self.lexer.get()?;
        while tok == Token::Print {
            tok = self.lexer.get()?;
        }

        let outcome = match tok {
            Token::End | Token::Quit => Outcome::Quit,
            Token::Help => Outcome::Help,
            Token::Save => {
                let name = self.store_name()?;
                let count = self.store.save(&name, &self.env)?;
                Outcome::Saved { name, count }
            }
            Token::Load => {
                let name = self.store_name()?;
                let count = self.store.load(&name, &mut self.env)?;
                Outcome::Loaded { name, count }
            }
            Token::Show => {
                let name = self.store_name()?;
                Outcome::Shown(self.store.show(&name)?)
            }
            tok => {
                self.lexer.unget(tok);
                let val = parser::parse(&mut self.lexer, &mut self.env)?;
                self.expect_terminator()?;
                Outcome::Value(val)
            }
        };

        self.pending = false;
        Ok(outcome)
    }

    /// Skip the rest of a failed statement, up to and including its `;`.
    ///
    /// Commands end with their store name, so a command that failed after reading it leaves
    /// nothing to skip.
    pub fn recover(&mut self) -> Result<()> {
        if self.pending {
            self.pending = false;
            self.lexer.ignore(';')?;
        }

        Ok(())
    }

    fn store_name(&mut self) -> Result<String> {
        let name = self.lexer.read_word()?;
        if name.is_empty() {
            raise!(CalcError::Syntax, "store name expected");
        }

        self.pending = false;
        Ok(name)
    }

    fn expect_terminator(&mut self) -> Result<()> {
        match self.lexer.get()? {
            Token::Print | Token::End => Ok(()),
            tok => {
                self.lexer.unget(tok);
                raise!(CalcError::Syntax, "';' expected");
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Outcome, Session};
    use crate::error::CalcError;
    use crate::store::Store;

    fn session(input: &str) -> Session {
        Session::from_text(input, Store::new("."))
    }

    #[test]
    fn test_values() {
        let mut s = session(";; 1+2; ;\n let a = 4; a*a;");
        assert_eq!(s.next().unwrap(), Outcome::Value(3.0));
        assert_eq!(s.next().unwrap(), Outcome::Value(4.0));
        assert_eq!(s.next().unwrap(), Outcome::Value(16.0));
        assert_eq!(s.next().unwrap(), Outcome::Quit);
        assert_eq!(s.next().unwrap(), Outcome::Quit);
    }

    #[test]
    fn test_commands() {
        let mut s = session("help\n2; quit\n3;");
        assert_eq!(s.next().unwrap(), Outcome::Help);
        assert_eq!(s.next().unwrap(), Outcome::Value(2.0));
        assert_eq!(s.next().unwrap(), Outcome::Quit);
    }

    #[test]
    fn test_missing_terminator() {
        let mut s = session("1 2; 3;");
        match s.next() {
            Err(CalcError::Syntax(m)) => assert_eq!(m, "';' expected"),
            other => panic!("{:?}", other),
        }
        s.recover().unwrap();
        assert_eq!(s.next().unwrap(), Outcome::Value(3.0));
    }

    #[test]
    fn test_last_statement_without_terminator() {
        let mut s = session("5*5");
        assert_eq!(s.next().unwrap(), Outcome::Value(25.0));
        assert_eq!(s.next().unwrap(), Outcome::Quit);
    }

    #[test]
    fn test_recover() {
        let mut s = session("1/0; 2; (1+2; 3; 4 ? 5; 6; set pi = 1; pi - pi;");

        for &expected in &[2.0, 3.0, 6.0, 0.0] {
            assert!(s.next().is_err());
            s.recover().unwrap();
            assert_eq!(s.next().unwrap(), Outcome::Value(expected));
        }
    }

    #[test]
    fn test_missing_store_name() {
        let mut s = session("save ; 1;");
        match s.next() {
            Err(CalcError::Syntax(m)) => assert_eq!(m, "store name expected"),
            other => panic!("{:?}", other),
        }
        s.recover().unwrap();
        assert_eq!(s.next().unwrap(), Outcome::Value(1.0));
    }

    #[test]
    fn test_failed_command_keeps_next_statement() {
        let mut s = session("load /nonexistent/deskcalc/store\n7;");
        match s.next() {
            Err(CalcError::Io { path, .. }) => assert_eq!(path, "/nonexistent/deskcalc/store"),
            other => panic!("{:?}", other),
        }
        s.recover().unwrap();
        assert_eq!(s.next().unwrap(), Outcome::Value(7.0));
    }
}
