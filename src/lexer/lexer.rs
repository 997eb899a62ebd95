use log::trace;
use thiserror::Error;

use super::token::{Token, TokenKind, TokenList};

/// Every variant rejects the whole line; no tokens survive.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum LexError {
    #[error("input didn't end in a newline")]
    MissingTerminator,
    #[error("need input before '{0}'")]
    OperatorWithoutInput(TokenKind),
    #[error("'{found}' not valid after '{pending}'")]
    InvalidAfterOperator { found: TokenKind, pending: TokenKind },
    #[error("cannot have spaces between '>' in '>>'")]
    SpacedAppend,
    #[error("too many '>' in a row")]
    TooManyRedirects,
    #[error("cannot end on '{0}'")]
    TrailingOperator(TokenKind),
    #[error("quote never closed {0}")]
    UnclosedQuote(char),
    #[error("unrecognized character 0x{byte:02x} at position {pos}")]
    UnrecognizedChar { byte: u8, pos: usize },
    #[error("unexpected input after newline at position {pos}")]
    TrailingInput { pos: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Single,
    Double,
}

impl Quote {
    pub fn delimiter(self) -> u8 {
        match self {
            Quote::Single => b'\'',
            Quote::Double => b'"',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Initial,
    InWord,
    AfterBlank,
    /// `spaced` records a blank since `pending` was buffered; `>>` must be contiguous.
    AfterOperator { pending: TokenKind, spaced: bool },
    InQuote(Quote),
    Done,
}

/// Byte classes outside of quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Blank,
    Terminator,
    Quote(Quote),
    Operator(TokenKind),
    Printable(u8),
    Control(u8),
}

impl CharClass {
    pub fn of(byte: u8) -> Self {
        match byte {
            b' ' => CharClass::Blank,
            b'\n' => CharClass::Terminator,
            b'\'' => CharClass::Quote(Quote::Single),
            b'"' => CharClass::Quote(Quote::Double),
            b'|' => CharClass::Operator(TokenKind::Pipe),
            b'<' => CharClass::Operator(TokenKind::RedirectIn),
            b'>' => CharClass::Operator(TokenKind::RedirectOut),
            32..=127 => CharClass::Printable(byte),
            _ => CharClass::Control(byte),
        }
    }
}

pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    word: Vec<u8>,
    tokens: TokenList,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Lexer {
            input,
            pos: 0,
            word: Vec::new(),
            tokens: TokenList::new(),
        }
    }

    /// Splits one newline-terminated line into words and operators.
    pub fn tokenize(line: impl AsRef<[u8]>) -> Result<TokenList, LexError> {
        Lexer::new(line.as_ref()).run()
    }

    pub fn run(mut self) -> Result<TokenList, LexError> {
        if self.input.last() != Some(&b'\n') {
            return Err(LexError::MissingTerminator);
        }

        let mut state = State::Initial;
        while state != State::Done {
            let Some(byte) = self.bump() else {
                return Err(LexError::MissingTerminator);
            };
            state = match state {
                State::InQuote(quote) => self.quoted(quote, byte)?,
                _ => self.transition(state, CharClass::of(byte))?,
            };
        }

        if self.pos < self.input.len() {
            return Err(LexError::TrailingInput { pos: self.pos });
        }

        trace!("lexed {} token(s)", self.tokens.len());
        Ok(self.tokens)
    }

    /// Unquoted transition table. Quoted input goes through `quoted`.
    pub fn transition(&mut self, state: State, class: CharClass) -> Result<State, LexError> {
        let next = match (state, class) {
            (_, CharClass::Control(byte)) => {
                return Err(LexError::UnrecognizedChar {
                    byte,
                    pos: self.pos.saturating_sub(1),
                });
            }

            (State::Initial | State::AfterBlank, CharClass::Blank) => state,
            (State::Initial | State::AfterBlank, CharClass::Terminator) => State::Done,
            (State::Initial | State::AfterBlank | State::InWord, CharClass::Quote(quote)) => {
                State::InQuote(quote)
            }
            (State::Initial | State::AfterBlank | State::InWord, CharClass::Printable(byte)) => {
                self.word.push(byte);
                State::InWord
            }
            (State::Initial, CharClass::Operator(kind)) => {
                return Err(LexError::OperatorWithoutInput(kind));
            }
            (State::AfterBlank, CharClass::Operator(kind)) => State::AfterOperator {
                pending: kind,
                spaced: false,
            },

            (State::InWord, CharClass::Blank) => {
                self.flush_word();
                State::AfterBlank
            }
            (State::InWord, CharClass::Operator(kind)) => {
                self.flush_word();
                State::AfterOperator {
                    pending: kind,
                    spaced: false,
                }
            }
            (State::InWord, CharClass::Terminator) => {
                self.flush_word();
                State::Done
            }

            (State::AfterOperator { pending, .. }, CharClass::Blank) => State::AfterOperator {
                pending,
                spaced: true,
            },
            (State::AfterOperator { pending, spaced }, CharClass::Operator(found)) => {
                extend_operator(pending, spaced, found)?
            }
            (State::AfterOperator { pending, .. }, CharClass::Printable(byte)) => {
                self.tokens.push(Token::operator(pending));
                self.word.push(byte);
                State::InWord
            }
            (State::AfterOperator { pending, .. }, CharClass::Quote(quote)) => {
                self.tokens.push(Token::operator(pending));
                State::InQuote(quote)
            }
            (State::AfterOperator { pending, .. }, CharClass::Terminator) => {
                return Err(LexError::TrailingOperator(pending));
            }

            (State::InQuote(_) | State::Done, _) => state,
        };
        Ok(next)
    }

    fn quoted(&mut self, quote: Quote, byte: u8) -> Result<State, LexError> {
        let unclosed = LexError::UnclosedQuote(quote.delimiter() as char);

        if byte == b'\n' {
            return Err(unclosed);
        }
        if byte == b'\\' {
            match self.bump() {
                Some(b'\n') | None => return Err(unclosed),
                Some(escaped) => self.push_escape(escaped),
            }
            return Ok(State::InQuote(quote));
        }
        if byte == quote.delimiter() {
            // The byte after a closing quote continues the word, as in InWord.
            let next = self.bump().ok_or(LexError::MissingTerminator)?;
            return self.transition(State::InWord, CharClass::of(next));
        }

        self.word.push(byte);
        Ok(State::InQuote(quote))
    }

    fn push_escape(&mut self, escaped: u8) {
        let byte = match escaped {
            b'n' => b'\n',
            b'b' => 0x08,
            b'r' => b'\r',
            b't' => b'\t',
            b'v' => 0x0b,
            b'0' => 0,
            other => {
                self.word.extend_from_slice(&[b'\\', other]);
                return;
            }
        };
        self.word.push(byte);
    }

    fn flush_word(&mut self) {
        let text = std::mem::take(&mut self.word);
        self.tokens.push(Token::word(text));
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.input.get(self.pos).copied()?;
        self.pos += 1;
        Some(byte)
    }
}

fn extend_operator(pending: TokenKind, spaced: bool, found: TokenKind) -> Result<State, LexError> {
    match (pending, found) {
        (TokenKind::RedirectOut, TokenKind::RedirectOut) if spaced => Err(LexError::SpacedAppend),
        (TokenKind::RedirectOut, TokenKind::RedirectOut) => Ok(State::AfterOperator {
            pending: TokenKind::RedirectAppend,
            spaced: false,
        }),
        (TokenKind::RedirectAppend, TokenKind::RedirectOut) if !spaced => {
            Err(LexError::TooManyRedirects)
        }
        _ => Err(LexError::InvalidAfterOperator { found, pending }),
    }
}
