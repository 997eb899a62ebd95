mod lexer;
mod token;

pub use lexer::{CharClass, LexError, Lexer, Quote, State};
pub use token::{Token, TokenKind, TokenList};
