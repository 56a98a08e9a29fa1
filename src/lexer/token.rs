use std::fmt;

use phf::phf_map;

/// Keywords are matched case-insensitively; keys are upper case.
pub(super) static KEYWORDS: phf::Map<&str, TokenKind> = phf_map! {
    "VAR" => TokenKind::Var,
    "PROCEDURE" => TokenKind::Procedure,
    "BEGIN" => TokenKind::Begin,
    "END" => TokenKind::End,
    "IF" => TokenKind::If,
    "THEN" => TokenKind::Then,
    "WHILE" => TokenKind::While,
    "DO" => TokenKind::Do,
    "WRITELN" => TokenKind::Writeln,
};

pub(super) static TWO_SYMBOLS_TOKENS: phf::Map<&str, TokenKind> = phf_map! {
    ":=" => TokenKind::ColonEqual,
    "<>" => TokenKind::NotEqual,
    "<=" => TokenKind::LessEqual,
    ">=" => TokenKind::GreaterEqual,
};

pub(super) static ONE_SYMBOL_TOKENS: phf::Map<char, TokenKind> = phf_map! {
    '+' => TokenKind::Plus,
    '-' => TokenKind::Minus,
    '*' => TokenKind::Star,
    '/' => TokenKind::Slash,
    '%' => TokenKind::Percent,
    '(' => TokenKind::OpenParen,
    ')' => TokenKind::CloseParen,
    ',' => TokenKind::Comma,
    ';' => TokenKind::SemiColon,
    '.' => TokenKind::Period,
    '=' => TokenKind::Equal,
    '<' => TokenKind::LessThan,
    '>' => TokenKind::GreaterThan,
};

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Num(i32),
    Ident(String),

    Var,
    Procedure,
    Begin,
    End,
    If,
    Then,
    While,
    Do,
    Writeln,

    ColonEqual,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    OpenParen,
    CloseParen,
    Comma,
    SemiColon,
    Period,

    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,

    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Num(n) => return write!(f, "number `{n}`"),
            TokenKind::Ident(name) => return write!(f, "identifier `{name}`"),
            TokenKind::Eof => return write!(f, "end of input"),

            TokenKind::Var => "VAR",
            TokenKind::Procedure => "PROCEDURE",
            TokenKind::Begin => "BEGIN",
            TokenKind::End => "END",
            TokenKind::If => "IF",
            TokenKind::Then => "THEN",
            TokenKind::While => "WHILE",
            TokenKind::Do => "DO",
            TokenKind::Writeln => "WRITELN",

            TokenKind::ColonEqual => ":=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::Comma => ",",
            TokenKind::SemiColon => ";",
            TokenKind::Period => ".",

            TokenKind::Equal => "=",
            TokenKind::NotEqual => "<>",
            TokenKind::LessThan => "<",
            TokenKind::LessEqual => "<=",
            TokenKind::GreaterThan => ">",
            TokenKind::GreaterEqual => ">=",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Character offset of the first character of the lexeme.
    pub position: usize,
}
