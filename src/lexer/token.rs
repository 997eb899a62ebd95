use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,           // Command name, argument or file name
    Pipe,           // |
    RedirectIn,     // <
    RedirectOut,    // >
    RedirectAppend, // >>
}

impl TokenKind {
    /// Wire text of an operator. Words have no fixed text.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Word => "",
            TokenKind::Pipe => "|",
            TokenKind::RedirectIn => "<",
            TokenKind::RedirectOut => ">",
            TokenKind::RedirectAppend => ">>",
        }
    }

    pub fn is_redirect(self) -> bool {
        matches!(
            self,
            TokenKind::RedirectIn | TokenKind::RedirectOut | TokenKind::RedirectAppend
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Word => write!(f, "word"),
            op => write!(f, "{}", op.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    text: Vec<u8>,
    is_operator: bool,
}

impl Token {
    pub fn word(text: impl Into<Vec<u8>>) -> Self {
        Token {
            text: text.into(),
            is_operator: false,
        }
    }

    /// Builds an operator token. `TokenKind::Word` yields an empty word.
    pub fn operator(kind: TokenKind) -> Self {
        Token {
            text: kind.as_str().as_bytes().to_vec(),
            is_operator: kind != TokenKind::Word,
        }
    }

    pub fn text(&self) -> &[u8] {
        &self.text
    }

    pub fn is_operator(&self) -> bool {
        self.is_operator
    }

    pub fn kind(&self) -> TokenKind {
        if !self.is_operator {
            return TokenKind::Word;
        }
        match self.text.as_slice() {
            b"|" => TokenKind::Pipe,
            b"<" => TokenKind::RedirectIn,
            b">" => TokenKind::RedirectOut,
            b">>" => TokenKind::RedirectAppend,
            _ => TokenKind::Word,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.text))
    }
}

/// Ordered token sequence handed from the lexer to the executor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenList {
    tokens: Vec<Token>,
}

impl TokenList {
    pub fn new() -> Self {
        TokenList { tokens: Vec::new() }
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn first(&self) -> Option<&Token> {
        self.tokens.first()
    }

    pub fn last(&self) -> Option<&Token> {
        self.tokens.last()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    pub fn pipe_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| t.kind() == TokenKind::Pipe)
            .count()
    }
}

impl FromIterator<Token> for TokenList {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        TokenList {
            tokens: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for TokenList {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

impl<'a> IntoIterator for &'a TokenList {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_tokens_round_trip_kind() {
        for kind in [
            TokenKind::Pipe,
            TokenKind::RedirectIn,
            TokenKind::RedirectOut,
            TokenKind::RedirectAppend,
        ] {
            let token = Token::operator(kind);
            assert!(token.is_operator());
            assert_eq!(token.kind(), kind);
            assert_eq!(token.text(), kind.as_str().as_bytes());
        }
    }

    #[test]
    fn test_word_that_looks_like_operator_stays_word() {
        // A quoted '|' is an argument, not a pipe
        let token = Token::word("|");
        assert!(!token.is_operator());
        assert_eq!(token.kind(), TokenKind::Word);
    }

    #[test]
    fn test_list_first_last_len() {
        let mut list = TokenList::new();
        assert!(list.first().is_none());
        assert!(list.last().is_none());

        list.push(Token::word("ls"));
        list.push(Token::operator(TokenKind::Pipe));
        list.push(Token::word("wc"));

        assert_eq!(list.len(), 3);
        assert_eq!(list.first(), Some(&Token::word("ls")));
        assert_eq!(list.last(), Some(&Token::word("wc")));
        assert_eq!(list.pipe_count(), 1);
    }

    #[test]
    fn test_display_is_lossy_text() {
        assert_eq!(Token::word("hello").to_string(), "hello");
        assert_eq!(Token::operator(TokenKind::RedirectAppend).to_string(), ">>");
        assert_eq!(TokenKind::Word.to_string(), "word");
    }
}
