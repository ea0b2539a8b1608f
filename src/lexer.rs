use crate::error::{CalcError, Result};
use crate::funcs::{Arity, FunctionTable};
use std::io::{self, BufRead, Cursor};
use std::rc::Rc;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    Print,
    Quit,
    Help,
    Let,
    Const,
    Set,
    Save,
    Load,
    Show,
    LeftParen,
    RightParen,
    Comma,
    Assign,
    Number(f64),
    Name(String),
    Unary(String),
    Binary(String),
    Operator(Op),
    End,
}

impl Op {
    pub fn name(self) -> String {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Mod => "%",
        }
        .into()
    }
}

impl Token {
    pub fn name(&self) -> String {
        match self {
            Token::Print => ";",
            Token::Quit => "quit",
            Token::Help => "help",
            Token::Let => "let",
            Token::Const => "const",
            Token::Set => "set",
            Token::Save => "save",
            Token::Load => "load",
            Token::Show => "show",
            Token::LeftParen => "(",
            Token::RightParen => ")",
            Token::Comma => ",",
            Token::Assign => "=",
            Token::Number(x) => return x.to_string(),
            Token::Name(x) | Token::Unary(x) | Token::Binary(x) => return x.clone(),
            Token::Operator(x) => return x.name(),
            Token::End => "<end>",
        }
        .into()
    }

    /// The single character this token was lexed from, if any.
    pub fn symbol(&self) -> Option<char> {
        let c = match self {
            Token::Print => ';',
            Token::LeftParen => '(',
            Token::RightParen => ')',
            Token::Comma => ',',
            Token::Assign => '=',
            Token::Operator(Op::Add) => '+',
            Token::Operator(Op::Sub) => '-',
            Token::Operator(Op::Mul) => '*',
            Token::Operator(Op::Div) => '/',
            Token::Operator(Op::Mod) => '%',
            _ => return None,
        };

        Some(c)
    }
}

/// Where the lexer pulls its characters from, one line at a time.
pub trait LineSource {
    /// The next line, or `None` once the input is exhausted.
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// A [`LineSource`] over anything buffered: stdin, a file, a string.
pub struct BufSource<R> {
    reader: R,
}

impl<R: BufRead> BufSource<R> {
    pub fn new(reader: R) -> Self {
        BufSource { reader }
    }
}

impl<R: BufRead> LineSource for BufSource<R> {
    // Bytes that are not UTF-8 become U+FFFD and fail later as a bad token, not as an
    // unreadable stream.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = vec![];

        match self.reader.read_until(b'\n', &mut line)? {
            0 => Ok(None),
            _ => Ok(Some(String::from_utf8_lossy(&line).into_owned())),
        }
    }
}

struct CharStream {
    source: Box<dyn LineSource>,
    line: Vec<char>,
    index: usize,
    exhausted: bool,
}

impl CharStream {
    fn new(source: Box<dyn LineSource>) -> CharStream {
        CharStream {
            source,
            line: vec![],
            index: 0,
            exhausted: false,
        }
    }

    fn fill(&mut self) -> Result<()> {
        while self.index >= self.line.len() && !self.exhausted {
            match self.source.read_line()? {
                Some(line) => {
                    self.line = line.chars().collect();
                    if self.line.last() != Some(&'\n') {
                        self.line.push('\n');
                    }
                    self.index = 0;
                }
                None => self.exhausted = true,
            }
        }

        Ok(())
    }

    fn peek(&mut self) -> Result<Option<char>> {
        self.fill()?;
        Ok(self.line.get(self.index).cloned())
    }

    // Looks ahead within the current line only; never pulls a new one.
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.line.get(self.index + offset).cloned()
    }

    fn next(&mut self) -> Result<Option<char>> {
        let c = self.peek()?;
        if c.is_some() {
            self.index += 1;
        }

        Ok(c)
    }
}

/// Streaming tokenizer with room for exactly one pushed-back token.
pub struct Lexer {
    stream: CharStream,
    buffer: Option<Token>,
    funcs: Rc<FunctionTable>,
}

impl Lexer {
    pub fn new(source: Box<dyn LineSource>, funcs: Rc<FunctionTable>) -> Lexer {
        Lexer {
            stream: CharStream::new(source),
            buffer: None,
            funcs,
        }
    }

    pub fn from_text(input: &str, funcs: Rc<FunctionTable>) -> Lexer {
        let source = BufSource::new(Cursor::new(input.to_string()));
        Lexer::new(Box::new(source), funcs)
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.funcs
    }

    pub fn get(&mut self) -> Result<Token> {
        if let Some(tok) = self.buffer.take() {
            return Ok(tok);
        }

        self.skip_whitespace()?;

        let c = match self.stream.peek()? {
            Some(c) => c,
            None => return Ok(Token::End),
        };

        if c.is_ascii_digit() || c == '.' {
            return self.parse_number();
        }

        if c.is_ascii_alphabetic() {
            let mut buffer = String::new();

            while let Some(c) = self.stream.peek()? {
                if !c.is_ascii_alphanumeric() {
                    break;
                }

                buffer.push(c);
                self.stream.next()?;
            }

            return Ok(self.classify(buffer));
        }

        self.stream.next()?;

        let tok = match c {
            ';' => Token::Print,
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            ',' => Token::Comma,
            '=' => Token::Assign,
            '+' => Token::Operator(Op::Add),
            '-' => Token::Operator(Op::Sub),
            '*' => Token::Operator(Op::Mul),
            '/' => Token::Operator(Op::Div),
            '%' => Token::Operator(Op::Mod),
            c => raise!(CalcError::Lexical, "bad token '{}'", c.escape_default()),
        };

        Ok(tok)
    }

    /// Push `tok` back so the next [`Lexer::get`] returns it.
    ///
    /// Only one token fits. Pushing back twice without a `get` in between is a bug in the
    /// caller: debug builds panic, release builds keep the last token.
    pub fn unget(&mut self, tok: Token) {
        debug_assert!(
            self.buffer.is_none(),
            "second unget of {:?} while {:?} is buffered",
            tok,
            self.buffer
        );

        self.buffer = Some(tok);
    }

    /// Discard input up to and including the next `terminator`, or to the end of input.
    ///
    /// Works on raw characters so that garbage which does not even lex is skipped as well.
    pub fn ignore(&mut self, terminator: char) -> Result<()> {
        if let Some(tok) = self.buffer.take() {
            if tok.symbol() == Some(terminator) {
                return Ok(());
            }
        }

        while let Some(c) = self.stream.next()? {
            if c == terminator {
                break;
            }
        }

        Ok(())
    }

    /// Read a raw whitespace-delimited word, stopping before any `;`.
    pub fn read_word(&mut self) -> Result<String> {
        if let Some(tok) = self.buffer.take() {
            match tok {
                Token::Name(x) => return Ok(x),
                tok => {
                    self.buffer = Some(tok);
                    return Ok(String::new());
                }
            }
        }

        self.skip_whitespace()?;

        let mut word = String::new();
        while let Some(c) = self.stream.peek()? {
            if c.is_whitespace() || c == ';' {
                break;
            }

            word.push(c);
            self.stream.next()?;
        }

        Ok(word)
    }

    fn skip_whitespace(&mut self) -> Result<()> {
        while let Some(c) = self.stream.peek()? {
            if !c.is_whitespace() {
                break;
            }

            self.stream.next()?;
        }

        Ok(())
    }

    fn classify(&self, word: String) -> Token {
        match word.as_ref() {
            "let" => Token::Let,
            "const" => Token::Const,
            "set" => Token::Set,
            "quit" => Token::Quit,
            "help" => Token::Help,
            "save" => Token::Save,
            "load" => Token::Load,
            "show" => Token::Show,
            _ => match self.funcs.arity(&word) {
                Some(Arity::Unary) => Token::Unary(word),
                Some(Arity::Binary) => Token::Binary(word),
                None => Token::Name(word),
            },
        }
    }

    // Accepts what a stream float extractor would: digits, an optional fraction and an
    // optional exponent that is only taken when a digit follows it.
    fn parse_number(&mut self) -> Result<Token> {
        let mut buffer = String::new();
        let mut digits = self.take_digits(&mut buffer)?;

        if self.stream.peek()? == Some('.') {
            buffer.push('.');
            self.stream.next()?;
            digits += self.take_digits(&mut buffer)?;
        }

        if digits == 0 {
            raise!(CalcError::Lexical, "bad number '{}'", buffer);
        }

        if let Some(e) = self.stream.peek()? {
            if e == 'e' || e == 'E' {
                let exponent = match (self.stream.peek_at(1), self.stream.peek_at(2)) {
                    (Some(d), _) if d.is_ascii_digit() => 1,
                    (Some(s), Some(d)) if (s == '+' || s == '-') && d.is_ascii_digit() => 2,
                    _ => 0,
                };

                for _ in 0..exponent {
                    if let Some(c) = self.stream.next()? {
                        buffer.push(c);
                    }
                }

                if exponent > 0 {
                    self.take_digits(&mut buffer)?;
                }
            }
        }

        match buffer.parse::<f64>() {
            Ok(x) => Ok(Token::Number(x)),
            Err(_) => raise!(CalcError::Lexical, "bad number '{}'", buffer),
        }
    }

    fn take_digits(&mut self, buffer: &mut String) -> Result<usize> {
        let mut n = 0;

        while let Some(c) = self.stream.peek()? {
            if !c.is_ascii_digit() {
                break;
            }

            buffer.push(c);
            self.stream.next()?;
            n += 1;
        }

        Ok(n)
    }
}

#[cfg(test)]
mod test {
    use super::{BufSource, Lexer, LineSource, Op, Token};
    use crate::error::CalcError;
    use crate::funcs::FunctionTable;
    use std::io::{self, Cursor};
    use std::rc::Rc;

    fn tokenize(line: &str) -> Lexer {
        Lexer::from_text(line, Rc::new(FunctionTable::create()))
    }

    fn test_match(string: &str, tokens: impl IntoIterator<Item = Token>) {
        let mut lexer = tokenize(string);

        for tok in tokens {
            assert_eq!(lexer.get().unwrap(), tok);
        }

        assert_eq!(lexer.get().unwrap(), Token::End);
    }

    #[test]
    fn test_operators() {
        let string = "+ - * / %";
        let tokens = vec![Op::Add, Op::Sub, Op::Mul, Op::Div, Op::Mod]
            .into_iter()
            .map(|x| Token::Operator(x));

        test_match(string, tokens);
    }

    #[test]
    fn test_tokens() {
        let string = "( ) , = ;";
        let tokens = vec![
            Token::LeftParen,
            Token::RightParen,
            Token::Comma,
            Token::Assign,
            Token::Print,
        ];

        test_match(string, tokens);
    }

    #[test]
    fn test_idents() {
        let string = "let const set quit help save load show foo x1 sin pow Let";
        let tokens = vec![
            Token::Let,
            Token::Const,
            Token::Set,
            Token::Quit,
            Token::Help,
            Token::Save,
            Token::Load,
            Token::Show,
            Token::Name("foo".into()),
            Token::Name("x1".into()),
            Token::Unary("sin".into()),
            Token::Binary("pow".into()),
            Token::Name("Let".into()),
        ];

        test_match(string, tokens);
    }

    #[test]
    fn test_numbers() {
        let string = "1 .2 3. 4.5 1e3 2.5E-1 7e";
        let tokens = vec![
            Token::Number(1.0),
            Token::Number(0.2),
            Token::Number(3.0),
            Token::Number(4.5),
            Token::Number(1000.0),
            Token::Number(0.25),
            Token::Number(7.0),
            Token::Name("e".into()),
        ];

        test_match(string, tokens);
    }

    #[test]
    fn test_number_followed_by_name() {
        test_match(
            "2x",
            vec![Token::Number(2.0), Token::Name("x".into())],
        );
    }

    #[test]
    fn test_bad_tokens() {
        let mut lexer = tokenize("?");
        match lexer.get() {
            Err(CalcError::Lexical(_)) => (),
            other => panic!("expected lexical error, got {:?}", other),
        }

        let mut lexer = tokenize(". 1");
        match lexer.get() {
            Err(CalcError::Lexical(_)) => (),
            other => panic!("expected lexical error, got {:?}", other),
        }
    }

    #[test]
    fn test_multiline() {
        test_match(
            "1 +\n  2;\n\nx",
            vec![
                Token::Number(1.0),
                Token::Operator(Op::Add),
                Token::Number(2.0),
                Token::Print,
                Token::Name("x".into()),
            ],
        );
    }

    #[test]
    fn test_unget_get() {
        let mut lexer = tokenize("a b");

        let a = Token::Name("a".into());
        let b = Token::Name("b".into());

        assert_eq!(lexer.get().unwrap(), a);
        lexer.unget(a.clone());
        assert_eq!(lexer.get().unwrap(), a);
        assert_eq!(lexer.get().unwrap(), b);
        lexer.unget(b.clone());
        assert_eq!(lexer.get().unwrap(), b);
        assert_eq!(lexer.get().unwrap(), Token::End);
        assert_eq!(lexer.get().unwrap(), Token::End);
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn test_double_unget() {
        let mut lexer = tokenize("");
        lexer.unget(Token::Print);
        lexer.unget(Token::Comma);
    }

    #[test]
    fn test_ignore() {
        let mut lexer = tokenize("1 ? # ) ; 2;");
        assert_eq!(lexer.get().unwrap(), Token::Number(1.0));
        lexer.ignore(';').unwrap();
        assert_eq!(lexer.get().unwrap(), Token::Number(2.0));

        // a buffered terminator is enough
        let mut lexer = tokenize("3;");
        lexer.unget(Token::Print);
        lexer.ignore(';').unwrap();
        assert_eq!(lexer.get().unwrap(), Token::Number(3.0));

        // a buffered non-terminator is dropped
        let mut lexer = tokenize("4; 5");
        lexer.unget(Token::Comma);
        lexer.ignore(';').unwrap();
        assert_eq!(lexer.get().unwrap(), Token::Number(5.0));

        let mut lexer = tokenize("no terminator");
        lexer.ignore(';').unwrap();
        assert_eq!(lexer.get().unwrap(), Token::End);
    }

    #[test]
    fn test_read_word() {
        let mut lexer = tokenize("save  vars.txt;\nload other");
        assert_eq!(lexer.get().unwrap(), Token::Save);
        assert_eq!(lexer.read_word().unwrap(), "vars.txt");
        assert_eq!(lexer.get().unwrap(), Token::Print);
        assert_eq!(lexer.get().unwrap(), Token::Load);
        assert_eq!(lexer.read_word().unwrap(), "other");
        assert_eq!(lexer.read_word().unwrap(), "");
    }

    #[test]
    fn test_invalid_utf8_is_a_bad_token() {
        let source = BufSource::new(Cursor::new(b"1 \xff 2".to_vec()));
        let mut lexer = Lexer::new(Box::new(source), Rc::new(FunctionTable::create()));

        assert_eq!(lexer.get().unwrap(), Token::Number(1.0));
        match lexer.get() {
            Err(err @ CalcError::Lexical(_)) => assert!(err.is_recoverable()),
            other => panic!("expected lexical error, got {:?}", other),
        }
        assert_eq!(lexer.get().unwrap(), Token::Number(2.0));
    }

    struct Broken;

    impl LineSource for Broken {
        fn read_line(&mut self) -> io::Result<Option<String>> {
            Err(io::Error::new(io::ErrorKind::Other, "broken pipe"))
        }
    }

    #[test]
    fn test_input_failure() {
        let mut lexer = Lexer::new(Box::new(Broken), Rc::new(FunctionTable::create()));

        match lexer.get() {
            Err(err @ CalcError::Input(_)) => assert!(!err.is_recoverable()),
            other => panic!("expected input error, got {:?}", other),
        }
    }
}
