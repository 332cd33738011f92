use multipeek::{multipeek, MultiPeek};
use std::collections::HashMap;
use std::fmt::Formatter;
use std::str::{Chars, FromStr};

pub struct Scanner<'a> {
    source: MultiPeek<Chars<'a>>,
    current_token_buffer: Vec<char>,
    current_line: u64,
    keywords: HashMap<String, TokenType>,
    emitted_eof: bool,
}

impl<'a> std::iter::Iterator for Scanner<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        match self.scan_token() {
            Some(token) => Some(token),
            None if !self.emitted_eof => {
                self.emitted_eof = true;
                Some(Token {
                    ty: TokenType::Eof,
                    lexeme: String::new(),
                    line: self.current_line,
                })
            }
            None => None,
        }
    }
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        let keywords = HashMap::from_iter([
            ("and".into(), TokenType::And),
            ("class".into(), TokenType::Class),
            ("else".into(), TokenType::Else),
            ("false".into(), TokenType::False),
            ("for".into(), TokenType::For),
            ("fun".into(), TokenType::Fun),
            ("if".into(), TokenType::If),
            ("nil".into(), TokenType::Nil),
            ("or".into(), TokenType::Or),
            ("print".into(), TokenType::Print),
            ("return".into(), TokenType::Return),
            ("super".into(), TokenType::Super),
            ("this".into(), TokenType::This),
            ("true".into(), TokenType::True),
            ("var".into(), TokenType::Var),
            ("while".into(), TokenType::While),
        ]);
        Self {
            source: multipeek(source.chars()),
            current_token_buffer: Vec::new(),
            current_line: 1,
            keywords,
            emitted_eof: false,
        }
    }

    fn scan_token(&mut self) -> Option<Token> {
        let c = self.advance()?;
        let token = match c {
            '(' => self.finalize_current_token(TokenType::LeftParen),
            ')' => self.finalize_current_token(TokenType::RightParen),
            '{' => self.finalize_current_token(TokenType::LeftBrace),
            '}' => self.finalize_current_token(TokenType::RightBrace),
            ',' => self.finalize_current_token(TokenType::Comma),
            '.' => self.finalize_current_token(TokenType::Dot),
            '-' => self.finalize_current_token(TokenType::Minus),
            '+' => self.finalize_current_token(TokenType::Plus),
            ';' => self.finalize_current_token(TokenType::Semicolon),
            '*' => self.finalize_current_token(TokenType::Star),
            '!' => {
                if self.advance_on_match('=') {
                    self.finalize_current_token(TokenType::BangEqual)
                } else {
                    self.finalize_current_token(TokenType::Bang)
                }
            }
            '=' => {
                if self.advance_on_match('=') {
                    self.finalize_current_token(TokenType::EqualEqual)
                } else {
                    self.finalize_current_token(TokenType::Equal)
                }
            }
            '<' => {
                if self.advance_on_match('=') {
                    self.finalize_current_token(TokenType::LessEqual)
                } else {
                    self.finalize_current_token(TokenType::Less)
                }
            }
            '>' => {
                if self.advance_on_match('=') {
                    self.finalize_current_token(TokenType::GreaterEqual)
                } else {
                    self.finalize_current_token(TokenType::Greater)
                }
            }
            '/' => {
                if self.advance_on_match('/') {
                    // Eat the entire comment, up to (not including) the line break.
                    self.advance_until('\n');
                    self.finalize_current_token(TokenType::Trivia)
                } else {
                    self.finalize_current_token(TokenType::Slash)
                }
            }
            '"' => {
                self.advance_until('"');
                if self.is_at_end() {
                    return Some(self.finalize_error_token("Unterminated string.".into()));
                }
                // Eat the closing `"`
                self.advance();
                let lexeme = self.finalize_buffer_into_lexeme();
                let literal = lexeme.trim_matches('"').to_string();
                Token {
                    ty: TokenType::String(literal),
                    lexeme,
                    line: self.current_line,
                }
            }
            d if d.is_ascii_digit() => {
                self.advance_while_true(|c| c.is_ascii_digit());
                if self.peek() == Some(&'.')
                    && self
                        .peek_next()
                        .map(|c| c.is_ascii_digit())
                        .unwrap_or(false)
                {
                    // Consume the `.`, then the fractional part.
                    self.advance();
                    self.advance_while_true(|c| c.is_ascii_digit());
                }
                let lexeme = self.finalize_buffer_into_lexeme();
                match f64::from_str(&lexeme) {
                    Ok(f) => Token {
                        ty: TokenType::Number(f),
                        lexeme,
                        line: self.current_line,
                    },
                    Err(_) => self.finalize_error_token("Invalid number literal.".into()),
                }
            }
            c => {
                if Self::is_alpha(&c) {
                    self.advance_while_true(|c| Self::is_alpha(c) || c.is_ascii_digit());
                    let lexeme = self.finalize_buffer_into_lexeme();
                    let ty = self
                        .keywords
                        .get(&lexeme)
                        .cloned()
                        .unwrap_or(TokenType::Identifier);
                    Token {
                        ty,
                        lexeme,
                        line: self.current_line,
                    }
                } else if Self::is_trivia(&c) {
                    self.advance_while_true(Self::is_trivia);
                    self.finalize_current_token(TokenType::Trivia)
                } else {
                    self.finalize_error_token(format!("Unexpected character: {c}"))
                }
            }
        };
        Some(token)
    }

    fn is_alpha(c: &char) -> bool {
        c.is_ascii_alphabetic() || c == &'_'
    }

    // "Trivia" tokens are tokens that do not alter the functional interpretation
    // of the code we are scanning.
    // For lox, we are talking about whitespace, tabs, new lines and comments.
    fn is_trivia(c: &char) -> bool {
        matches!(c, ' ' | '\r' | '\t' | '\n')
    }

    fn finalize_error_token(&mut self, message: String) -> Token {
        let mut token = self.finalize_current_token(TokenType::SyntaxError { message });
        // The message carries the offending lexeme where it matters.
        token.lexeme.clear();
        token
    }

    fn finalize_current_token(&mut self, ty: TokenType) -> Token {
        let lexeme = self.finalize_buffer_into_lexeme();
        Token {
            ty,
            lexeme,
            line: self.current_line,
        }
    }

    fn finalize_buffer_into_lexeme(&mut self) -> String {
        String::from_iter(self.current_token_buffer.drain(..))
    }

    fn advance(&mut self) -> Option<char> {
        let char = self.source.next()?;
        if char == '\n' {
            self.current_line += 1;
        }
        self.current_token_buffer.push(char);
        Some(char)
    }

    fn advance_on_match(&mut self, c: char) -> bool {
        if self.peek() == Some(&c) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn advance_until(&mut self, c: char) {
        self.advance_while_true(|ch| ch != &c)
    }

    fn advance_while_true<F>(&mut self, f: F)
    where
        F: Fn(&char) -> bool,
    {
        while self.peek().map(&f).unwrap_or(false) {
            self.advance();
        }
    }

    fn peek(&mut self) -> Option<&char> {
        self.source.peek()
    }

    fn peek_next(&mut self) -> Option<&char> {
        self.source.peek_nth(1)
    }

    fn is_at_end(&mut self) -> bool {
        self.peek().is_none()
    }
}

/// A newline in the middle of a string literal bumps the line counter, so
/// `line` is the line a token *ends* on.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    ty: TokenType,
    lexeme: String,
    line: u64,
}

impl Token {
    pub fn ty(&self) -> &TokenType {
        &self.ty
    }

    pub fn into_ty(self) -> TokenType {
        self.ty
    }

    pub fn discriminant(&self) -> TokenDiscriminant {
        TokenDiscriminant::from(&self.ty)
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    pub fn line(&self) -> u64 {
        self.line
    }
}

/// The `KIND LEXEME LITERAL` form used by the `tokenize` command, where
/// `null` stands for "this token kind carries no literal".
impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.ty {
            TokenType::String(s) => write!(f, "{} {} {}", self.discriminant(), self.lexeme, s),
            TokenType::Number(n) => write!(
                f,
                "{} {} {}",
                self.discriminant(),
                self.lexeme,
                format_number_literal(*n)
            ),
            _ => write!(f, "{} {} null", self.discriminant(), self.lexeme),
        }
    }
}

/// Number literals keep one decimal digit when they are integer-valued
/// (`42` scans as `42.0`); everything else round-trips through `f64`'s
/// shortest representation.
pub fn format_number_literal(n: f64) -> String {
    if n.is_finite() && n == n.trunc() {
        format!("{n:.1}")
    } else {
        format!("{n}")
    }
}

#[derive(Debug, Clone, PartialEq, strum_macros::EnumDiscriminants)]
#[strum_discriminants(name(TokenDiscriminant))]
#[strum_discriminants(derive(strum_macros::Display, Hash))]
#[strum_discriminants(strum(serialize_all = "SCREAMING_SNAKE_CASE"))]
pub enum TokenType {
    // Single-character tokens
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,

    // One or two character tokens
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals
    Identifier,
    String(String),
    Number(f64),

    // Keywords
    And,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,

    Eof,

    // Tokens that do not affect the functional meaning of
    // the scanned code - whitespace, new lines, comments.
    Trivia,

    // Special token to signal that we encountered a lexeme we couldn't
    // successfully scan. The message is what the diagnostics sink
    // reports for it.
    SyntaxError { message: String },
}
