use crate::ast::Operator;
use logos::{Filter, Lexer, Logos};
use std::fmt;

#[derive(Debug, Logos, Clone, PartialEq)]
pub enum Token {
    // literals
    #[regex(r"[0-9]+(\.[0-9]*)?", |lex| lex.slice().parse())]
    NumberLit(f64),
    #[regex(r#""[^"]*""#, |lex| lex.slice()[1..lex.slice().len() - 1].to_string())]
    StringLit(String),

    // identifiers
    #[regex("[a-zA-Z][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // keywords
    #[token("def")]
    Def,
    #[token("extern")]
    Extern,
    #[token("set")]
    Set,
    #[token("const")]
    Const,
    #[token("return")]
    Return,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,

    // type keywords
    #[token("double")]
    TypeDouble,
    #[token("string")]
    TypeString,
    #[token("void")]
    TypeVoid,

    // binary operators
    #[token("=")]
    Equals,
    #[token("!")]
    Bang,
    #[token("<")]
    LessThan,
    #[token(">")]
    GreaterThan,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Asterisk,

    // punctuation
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,

    /// A string literal missing its closing `"`. Never leaves [`Tokenizer`].
    #[regex(r#""[^"]*"#)]
    UnterminatedString,
    /// A `/*` comment missing its closing `*/`. Never leaves [`Tokenizer`].
    #[token("/*", block_comment)]
    UnterminatedComment,

    // misc
    #[regex(r"[ \t\n\r\x0b\f]+", logos::skip)]
    #[error]
    Error,

    /// Any other single character. Only generated by [`Tokenizer`].
    Char(char),
    /// Only generated by [`Tokenizer`] when the input is exhausted.
    Eof,
}

/// Skips a (non-nesting) block comment. Emits [`Token::UnterminatedComment`] if the input ends first.
fn block_comment(lex: &mut Lexer<Token>) -> Filter<()> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            Filter::Skip
        }
        None => {
            lex.bump(lex.remainder().len());
            Filter::Emit(())
        }
    }
}

impl Token {
    /// Returns the binary operator for this token or `None` if it is not one.
    pub fn as_operator(&self) -> Option<Operator> {
        match self {
            Token::Equals => Some(Operator::Equal),
            Token::Bang => Some(Operator::NotEqual),
            Token::LessThan => Some(Operator::Less),
            Token::GreaterThan => Some(Operator::Greater),
            Token::Plus => Some(Operator::Add),
            Token::Minus => Some(Operator::Sub),
            Token::Asterisk => Some(Operator::Mul),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::NumberLit(val) => return write!(f, "{}", val),
            Token::StringLit(val) => return write!(f, "\"{}\"", val),
            Token::Identifier(ident) => return write!(f, "{}", ident),
            Token::Char(c) => return write!(f, "{}", c),
            Token::Def => "def",
            Token::Extern => "extern",
            Token::Set => "set",
            Token::Const => "const",
            Token::Return => "return",
            Token::If => "if",
            Token::Else => "else",
            Token::While => "while",
            Token::TypeDouble => "double",
            Token::TypeString => "string",
            Token::TypeVoid => "void",
            Token::Equals => "=",
            Token::Bang => "!",
            Token::LessThan => "<",
            Token::GreaterThan => ">",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Asterisk => "*",
            Token::OpenParen => "(",
            Token::CloseParen => ")",
            Token::OpenBrace => "{",
            Token::CloseBrace => "}",
            Token::Comma => ",",
            Token::Semi => ";",
            Token::UnterminatedString | Token::UnterminatedComment | Token::Eof => "end of input",
            Token::Error => "<error>",
        };
        f.write_str(text)
    }
}

/// Lazily classifies source text into [`Token`]s.
///
/// Once the input is exhausted (including inside an unterminated comment or string literal), every call to
/// [`Tokenizer::next_token`] returns [`Token::Eof`].
pub struct Tokenizer<'a> {
    lexer: Lexer<'a, Token>,
    finished: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(content: &'a str) -> Self {
        Self {
            lexer: Token::lexer(content),
            finished: false,
        }
    }

    /// Advances and returns the next token.
    pub fn next_token(&mut self) -> Token {
        if self.finished {
            return Token::Eof;
        }

        let token = match self.lexer.next() {
            None | Some(Token::UnterminatedString) | Some(Token::UnterminatedComment) => Token::Eof,
            Some(Token::Error) => match self.lexer.slice().chars().next() {
                Some(c) => Token::Char(c),
                None => Token::Eof,
            },
            Some(token) => token,
        };

        if token == Token::Eof {
            self.finished = true;
        }
        token
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token;

    /// Yields tokens up to (not including) [`Token::Eof`].
    fn next(&mut self) -> Option<Token> {
        match self.next_token() {
            Token::Eof => None,
            token => Some(token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        Tokenizer::new(source).collect()
    }

    #[test]
    fn test_keywords() {
        let keywords = [
            ("def", Token::Def),
            ("extern", Token::Extern),
            ("set", Token::Set),
            ("const", Token::Const),
            ("return", Token::Return),
            ("if", Token::If),
            ("else", Token::Else),
            ("while", Token::While),
            ("double", Token::TypeDouble),
            ("string", Token::TypeString),
            ("void", Token::TypeVoid),
        ];
        for (text, token) in keywords.iter() {
            assert_eq!(tokens(text), vec![token.clone()], "keyword {}", text);
        }
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(
            tokens("whiles define _x x_1 While"),
            vec![
                Token::Identifier("whiles".to_string()),
                Token::Identifier("define".to_string()),
                Token::Char('_'),
                Token::Identifier("x".to_string()),
                Token::Identifier("x_1".to_string()),
                Token::Identifier("While".to_string()),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        for text in ["0", "1", "42", "3.14", "10.0", "0.001", "123456789.5"].iter() {
            let value = match tokens(text).as_slice() {
                [Token::NumberLit(val)] => *val,
                other => panic!("unexpected tokens {:?} for {}", other, text),
            };
            let reparsed: f64 = value.to_string().parse().unwrap();
            assert_eq!(value, reparsed);
            assert_eq!(value, text.parse::<f64>().unwrap());
        }
        assert_eq!(tokens("12."), vec![Token::NumberLit(12.0)]);
    }

    #[test]
    fn test_no_negative_literals() {
        assert_eq!(tokens("-1"), vec![Token::Minus, Token::NumberLit(1.0)]);
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(
            tokens(r#""hello world" "" x"#),
            vec![
                Token::StringLit("hello world".to_string()),
                Token::StringLit(String::new()),
                Token::Identifier("x".to_string()),
            ]
        );
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            tokens("(){},;=!<>+-* / %"),
            vec![
                Token::OpenParen,
                Token::CloseParen,
                Token::OpenBrace,
                Token::CloseBrace,
                Token::Comma,
                Token::Semi,
                Token::Equals,
                Token::Bang,
                Token::LessThan,
                Token::GreaterThan,
                Token::Plus,
                Token::Minus,
                Token::Asterisk,
                Token::Char('/'),
                Token::Char('%'),
            ]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            tokens("set /* a * comment / */ x /**/ ;"),
            vec![
                Token::Set,
                Token::Identifier("x".to_string()),
                Token::Semi
            ]
        );
    }

    #[test]
    fn test_whitespace() {
        assert_eq!(
            tokens("def\t\x0b\x0c\r\n x"),
            vec![Token::Def, Token::Identifier("x".to_string())]
        );
    }

    #[test]
    fn test_unterminated_comment_is_eof() {
        let mut tokenizer = Tokenizer::new("x /* never closed");
        assert_eq!(tokenizer.next_token(), Token::Identifier("x".to_string()));
        assert_eq!(tokenizer.next_token(), Token::Eof);
        assert_eq!(tokenizer.next_token(), Token::Eof);
    }

    #[test]
    fn test_unterminated_string_is_eof() {
        let mut tokenizer = Tokenizer::new("return \"abc ; x");
        assert_eq!(tokenizer.next_token(), Token::Return);
        assert_eq!(tokenizer.next_token(), Token::Eof);
        assert_eq!(tokenizer.next_token(), Token::Eof);
    }

    #[test]
    fn test_operators() {
        assert_eq!(Token::Plus.as_operator(), Some(Operator::Add));
        assert_eq!(Token::Bang.as_operator(), Some(Operator::NotEqual));
        assert_eq!(Token::Semi.as_operator(), None);
    }
}
