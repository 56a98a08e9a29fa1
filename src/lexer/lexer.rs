use crate::error::{Error, Result};

use super::{
    token::{KEYWORDS, ONE_SYMBOL_TOKENS, TWO_SYMBOLS_TOKENS},
    Token, TokenKind,
};

#[derive(Debug)]
pub struct Lexer {
    tokens: Vec<Token>,
    index: usize,
}

impl Lexer {
    fn new() -> Self {
        Self {
            tokens: vec![],
            index: 0,
        }
    }

    fn new_token(&mut self, kind: TokenKind, len: usize) {
        self.tokens.push(Token {
            kind,
            position: self.index,
        });
        self.index += len;
    }

    fn parse_number(&mut self, chars: &[char]) -> Result<()> {
        let s: String = chars.iter().take_while(|c| c.is_ascii_digit()).collect();
        let value = s.parse().map_err(|_| Error::Lexical {
            position: self.index,
            text: s.clone(),
        })?;
        self.new_token(TokenKind::Num(value), s.len());
        Ok(())
    }

    fn parse_identifier(&mut self, chars: &[char]) {
        let s: String = chars
            .iter()
            .take_while(|&&c| c.is_ascii_alphanumeric() || c == '_')
            .collect();

        if let Some(kind) = KEYWORDS.get(s.to_ascii_uppercase().as_str()) {
            self.new_token(kind.clone(), s.len());
        } else {
            let len = s.len();
            self.new_token(TokenKind::Ident(s), len);
        }
    }

    fn skip_comment(&mut self, chars: &[char]) {
        self.index += chars.iter().take_while(|&&c| c != '\n').count();
    }

    fn _tokenize(&mut self, s: &str) -> Result<()> {
        let chars: Vec<_> = s.chars().collect();

        while self.index < chars.len() {
            let c = chars[self.index];
            let c2 = chars[self.index..].iter().take(2).collect::<String>();

            if c.is_whitespace() {
                self.index += 1;
            } else if c2 == "//" {
                self.skip_comment(&chars[self.index..]);
            } else if c.is_ascii_digit() {
                self.parse_number(&chars[self.index..])?;
            } else if c.is_ascii_alphabetic() || c == '_' {
                self.parse_identifier(&chars[self.index..]);
            } else if let Some(kind) = TWO_SYMBOLS_TOKENS.get(c2.as_str()) {
                self.new_token(kind.clone(), 2);
            } else if let Some(kind) = ONE_SYMBOL_TOKENS.get(&c) {
                self.new_token(kind.clone(), 1);
            } else {
                return Err(Error::Lexical {
                    position: self.index,
                    text: c.to_string(),
                });
            }
        }

        self.tokens.push(Token {
            kind: TokenKind::Eof,
            position: self.index,
        });
        Ok(())
    }

    /// Lex the whole input. The returned tokens always end with
    /// [`TokenKind::Eof`].
    pub fn tokenize(s: &str) -> Result<Vec<Token>> {
        let mut lexer = Lexer::new();
        lexer._tokenize(s)?;

        Ok(lexer.tokens)
    }
}
