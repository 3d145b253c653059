//! Selector tokenizer.
//!
//! Follows the XPath 1.0 lexical disambiguation rules: `*` and the names
//! `and`/`or`/`div`/`mod` are operators only when the previous token can end
//! an operand; a name followed by `(` is a function or node type; a name
//! followed by `::` is an axis.

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Slash,
    DoubleSlash,
    LBracket,
    RBracket,
    LParen,
    RParen,
    At,
    Comma,
    DoubleColon,
    Dot,
    DotDot,
    Pipe,
    Plus,
    Minus,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Multiply,
    And,
    Or,
    Div,
    Mod,
    Literal(String),
    Number(f64),
    /// `*` or `prefix:*` in name-test position
    Wildcard,
    /// Name test; the prefix is dropped
    Name(String),
    /// Name directly followed by `(`
    FunctionName(String),
    /// Name directly followed by `::`
    AxisName(String),
}

impl Token {
    /// Tokens after which `*` and operator names keep their operand meaning.
    fn opens_operand(&self) -> bool {
        matches!(
            self,
            Self::At
                | Self::DoubleColon
                | Self::LParen
                | Self::LBracket
                | Self::Comma
                | Self::Slash
                | Self::DoubleSlash
                | Self::Pipe
                | Self::Plus
                | Self::Minus
                | Self::Eq
                | Self::NotEq
                | Self::Lt
                | Self::LtEq
                | Self::Gt
                | Self::GtEq
                | Self::Multiply
                | Self::And
                | Self::Or
                | Self::Div
                | Self::Mod
        )
    }
}

pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    Lexer::new(input).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn operator_position(&self) -> bool {
        self.tokens.last().is_some_and(|t| !t.opens_operand())
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(is_xml_space) {
            self.pos += 1;
        }
    }

    fn run(mut self) -> Result<Vec<Token>, String> {
        loop {
            self.skip_whitespace();
            let Some(c) = self.peek() else {
                break;
            };

            let token = match c {
                '/' if self.peek_at(1) == Some('/') => self.advance(2, Token::DoubleSlash),
                '/' => self.advance(1, Token::Slash),
                '[' => self.advance(1, Token::LBracket),
                ']' => self.advance(1, Token::RBracket),
                '(' => self.advance(1, Token::LParen),
                ')' => self.advance(1, Token::RParen),
                '@' => self.advance(1, Token::At),
                ',' => self.advance(1, Token::Comma),
                ':' if self.peek_at(1) == Some(':') => self.advance(2, Token::DoubleColon),
                '|' => self.advance(1, Token::Pipe),
                '+' => self.advance(1, Token::Plus),
                '-' => self.advance(1, Token::Minus),
                '=' => self.advance(1, Token::Eq),
                '!' if self.peek_at(1) == Some('=') => self.advance(2, Token::NotEq),
                '<' if self.peek_at(1) == Some('=') => self.advance(2, Token::LtEq),
                '<' => self.advance(1, Token::Lt),
                '>' if self.peek_at(1) == Some('=') => self.advance(2, Token::GtEq),
                '>' => self.advance(1, Token::Gt),
                '.' if self.peek_at(1) == Some('.') => self.advance(2, Token::DotDot),
                '.' if self.peek_at(1).is_some_and(|d| d.is_ascii_digit()) => self.number()?,
                '.' => self.advance(1, Token::Dot),
                '"' | '\'' => self.literal(c)?,
                '*' if self.operator_position() => self.advance(1, Token::Multiply),
                '*' => self.advance(1, Token::Wildcard),
                '$' => return Err("variable references are not supported".to_string()),
                c if c.is_ascii_digit() => self.number()?,
                c if is_name_start(c) => self.name()?,
                c => return Err(format!("unexpected character '{c}' at offset {}", self.pos)),
            };
            self.tokens.push(token);
        }
        Ok(self.tokens)
    }

    fn advance(&mut self, len: usize, token: Token) -> Token {
        self.pos += len;
        token
    }

    fn literal(&mut self, quote: char) -> Result<Token, String> {
        let start = self.pos + 1;
        let Some(len) = self.chars[start..].iter().position(|&c| c == quote) else {
            return Err(format!("unterminated string literal at offset {}", self.pos));
        };
        let value: String = self.chars[start..start + len].iter().collect();
        self.pos = start + len + 1;
        Ok(Token::Literal(value))
    }

    fn number(&mut self) -> Result<Token, String> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.peek() == Some('.') {
            self.pos += 1;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>()
            .map(Token::Number)
            .map_err(|e| format!("invalid number '{text}': {e}"))
    }

    fn ncname(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_name_char) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn name(&mut self) -> Result<Token, String> {
        let first = self.ncname();

        if self.operator_position() {
            let op = match first.as_str() {
                "and" => Some(Token::And),
                "or" => Some(Token::Or),
                "div" => Some(Token::Div),
                "mod" => Some(Token::Mod),
                _ => None,
            };
            return op.ok_or_else(|| format!("expected an operator, found '{first}'"));
        }

        // prefix:local or prefix:*
        let mut local = first;
        if self.peek() == Some(':') && self.peek_at(1) != Some(':') {
            match self.peek_at(1) {
                Some('*') => {
                    self.pos += 2;
                    return Ok(Token::Wildcard);
                }
                Some(c) if is_name_start(c) => {
                    self.pos += 1;
                    local = self.ncname();
                }
                _ => return Err(format!("malformed qualified name '{local}:'")),
            }
        }

        let save = self.pos;
        self.skip_whitespace();
        let token = match (self.peek(), self.peek_at(1)) {
            (Some('('), _) => Token::FunctionName(local),
            (Some(':'), Some(':')) => Token::AxisName(local),
            _ => {
                self.pos = save;
                Token::Name(local)
            }
        };
        Ok(token)
    }
}

const fn is_xml_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// True if `name` is an unprefixed XML name (`artifactId`, `maven.compiler`)
pub(crate) fn is_ncname(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_name_start) && chars.all(is_name_char)
}

fn is_name_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit() || matches!(c, '-' | '.' | '\u{B7}')
}
