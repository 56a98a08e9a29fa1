use super::{Token, TokenKind};

/// A pull-based token stream with one token of lookahead.
pub trait TokenSource {
    /// The token under the cursor. Once the input is exhausted this is the
    /// trailing [`TokenKind::Eof`] token.
    fn current(&self) -> &Token;

    /// Move past the current token and return it.
    fn advance(&mut self) -> Token;

    fn has_more(&self) -> bool;
}

/// Cursor over a token vector produced by [`super::Lexer::tokenize`].
#[derive(Debug)]
pub struct Tokens {
    tokens: Vec<Token>,
    index: usize,
}

impl Tokens {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
            let position = tokens.last().map(|t| t.position + 1).unwrap_or(0);
            tokens.push(Token {
                kind: TokenKind::Eof,
                position,
            });
        }
        Self { tokens, index: 0 }
    }
}

impl TokenSource for Tokens {
    fn current(&self) -> &Token {
        &self.tokens[self.index]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.index].clone();
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
        token
    }

    fn has_more(&self) -> bool {
        self.tokens[self.index].kind != TokenKind::Eof
    }
}
