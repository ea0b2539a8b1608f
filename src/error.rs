use std::io;
use thiserror::Error;

/// Everything that can go wrong while reading or evaluating a statement.
///
/// All variants except [`CalcError::Input`] abort only the current statement; the session
/// discards input up to the next `;` and carries on.
#[derive(Debug, Error)]
pub enum CalcError {
    #[error("{0}")]
    Lexical(String),
    #[error("{0}")]
    Syntax(String),
    #[error("{0}")]
    Name(String),
    #[error("{0}")]
    Mutability(String),
    #[error("{0}")]
    Arithmetic(String),
    #[error("cannot open '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to read input: {0}")]
    Input(#[from] io::Error),
}

impl CalcError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            CalcError::Input(_) => false,
            _ => true,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            CalcError::Lexical(_) => "lexical error",
            CalcError::Syntax(_) => "syntax error",
            CalcError::Name(_) => "name error",
            CalcError::Mutability(_) => "mutability error",
            CalcError::Arithmetic(_) => "arithmetic error",
            CalcError::Io { .. } => "i/o error",
            CalcError::Input(_) => "input error",
        }
    }
}

pub type Result<T> = ::std::result::Result<T, CalcError>;

#[cfg(test)]
mod test {
    use super::CalcError;
    use std::io;

    #[test]
    fn test_recoverable() {
        assert!(CalcError::Syntax("')' expected".into()).is_recoverable());
        assert!(CalcError::Io {
            path: "x".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        }
        .is_recoverable());

        let err = CalcError::from(io::Error::new(io::ErrorKind::Other, "closed"));
        assert!(!err.is_recoverable());
        assert_eq!(err.kind_name(), "input error");
    }

    #[test]
    fn test_message() {
        let err = CalcError::Arithmetic("divide by zero".into());
        assert_eq!(err.to_string(), "divide by zero");
    }
}
