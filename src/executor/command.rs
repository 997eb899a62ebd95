use std::os::fd::RawFd;

use log::debug;
use nix::fcntl::OFlag;

use super::executor::ExecError;
use crate::lexer::{Token, TokenKind, TokenList};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    Input,
    Output,
    Append,
}

impl RedirectKind {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::RedirectIn => Some(RedirectKind::Input),
            TokenKind::RedirectOut => Some(RedirectKind::Output),
            TokenKind::RedirectAppend => Some(RedirectKind::Append),
            TokenKind::Word | TokenKind::Pipe => None,
        }
    }

    /// Standard stream slot this redirect replaces.
    pub fn target_fd(self) -> RawFd {
        match self {
            RedirectKind::Input => libc::STDIN_FILENO,
            RedirectKind::Output | RedirectKind::Append => libc::STDOUT_FILENO,
        }
    }

    pub fn open_flags(self) -> OFlag {
        match self {
            RedirectKind::Input => OFlag::O_RDONLY,
            RedirectKind::Output => OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
            RedirectKind::Append => OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_APPEND,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redirect<'a> {
    pub kind: RedirectKind,
    pub target: &'a [u8],
}

/// Tokens of one command between pipe operators. Borrows, never copies.
#[derive(Debug, Clone, Copy)]
pub struct Segment<'a> {
    index: usize,
    tokens: &'a [Token],
}

impl<'a> Segment<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn tokens(&self) -> &'a [Token] {
        self.tokens
    }

    /// Leading words up to the first operator.
    pub fn argv(&self) -> Vec<&'a [u8]> {
        self.tokens
            .iter()
            .take_while(|t| !t.is_operator())
            .map(Token::text)
            .collect()
    }

    /// Redirections in the order written; each operator takes the next word.
    pub fn redirects(&self) -> Result<Vec<Redirect<'a>>, ExecError> {
        let mut redirects = Vec::new();
        let mut ignored = 0;
        let mut iter = self.tokens.iter().skip(self.argv().len());

        while let Some(token) = iter.next() {
            let Some(kind) = RedirectKind::from_token(token.kind()) else {
                ignored += 1;
                continue;
            };
            match iter.next() {
                Some(target) if !target.is_operator() => redirects.push(Redirect {
                    kind,
                    target: target.text(),
                }),
                _ => {
                    return Err(ExecError::MissingRedirectTarget {
                        segment: self.index,
                        operator: token.kind(),
                    });
                }
            }
        }

        if ignored > 0 {
            debug!(
                "segment {}: ignoring {} word(s) after redirections",
                self.index, ignored
            );
        }
        Ok(redirects)
    }
}

#[derive(Debug)]
pub struct Pipeline<'a> {
    segments: Vec<Segment<'a>>,
}

impl<'a> Pipeline<'a> {
    /// Splits at every pipe operator; the pipe tokens belong to no segment.
    pub fn from_tokens(tokens: &'a TokenList) -> Self {
        let segments = tokens
            .as_slice()
            .split(|t| t.kind() == TokenKind::Pipe)
            .enumerate()
            .map(|(index, tokens)| Segment { index, tokens })
            .collect();
        Pipeline { segments }
    }

    pub fn segments(&self) -> &[Segment<'a>] {
        &self.segments
    }

    pub fn pipe_count(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn argv_strings(segment: &Segment<'_>) -> Vec<String> {
        segment
            .argv()
            .iter()
            .map(|a| String::from_utf8_lossy(a).into_owned())
            .collect()
    }

    #[test]
    fn test_split_two_segments() {
        let tokens = Lexer::tokenize("echo hello | wc -l\n").unwrap();
        let pipeline = Pipeline::from_tokens(&tokens);

        assert_eq!(pipeline.segments().len(), 2);
        assert_eq!(pipeline.pipe_count(), 1);
        assert_eq!(argv_strings(&pipeline.segments()[0]), vec!["echo", "hello"]);
        assert_eq!(argv_strings(&pipeline.segments()[1]), vec!["wc", "-l"]);
    }

    #[test]
    fn test_segments_partition_tokens() {
        let tokens = Lexer::tokenize("cat < in | sort -r | uniq -c > out\n").unwrap();
        let pipeline = Pipeline::from_tokens(&tokens);

        assert_eq!(pipeline.segments().len(), tokens.pipe_count() + 1);
        let covered: usize = pipeline.segments().iter().map(|s| s.tokens().len()).sum();
        assert_eq!(covered + tokens.pipe_count(), tokens.len());
        for (i, segment) in pipeline.segments().iter().enumerate() {
            assert_eq!(segment.index(), i);
        }
    }

    #[test]
    fn test_single_segment_without_pipe() {
        let tokens = Lexer::tokenize("ls -la\n").unwrap();
        let pipeline = Pipeline::from_tokens(&tokens);
        assert_eq!(pipeline.segments().len(), 1);
        assert_eq!(pipeline.pipe_count(), 0);
    }

    #[test]
    fn test_redirects_in_written_order() {
        let tokens = Lexer::tokenize("sort < in > first >> second\n").unwrap();
        let pipeline = Pipeline::from_tokens(&tokens);
        let segment = pipeline.segments()[0];

        assert_eq!(argv_strings(&segment), vec!["sort"]);
        assert_eq!(
            segment.redirects().unwrap(),
            vec![
                Redirect { kind: RedirectKind::Input, target: b"in" },
                Redirect { kind: RedirectKind::Output, target: b"first" },
                Redirect { kind: RedirectKind::Append, target: b"second" },
            ]
        );
    }

    #[test]
    fn test_words_after_redirect_are_not_arguments() {
        let tokens = Lexer::tokenize("echo a > out b\n").unwrap();
        let pipeline = Pipeline::from_tokens(&tokens);
        let segment = pipeline.segments()[0];

        assert_eq!(argv_strings(&segment), vec!["echo", "a"]);
        assert_eq!(
            segment.redirects().unwrap(),
            vec![Redirect { kind: RedirectKind::Output, target: b"out" }]
        );
    }

    #[test]
    fn test_dangling_redirect_is_rejected() {
        let tokens: TokenList = vec![
            Token::word("cat"),
            Token::operator(TokenKind::RedirectIn),
        ]
        .into_iter()
        .collect();
        let pipeline = Pipeline::from_tokens(&tokens);

        assert!(matches!(
            pipeline.segments()[0].redirects(),
            Err(ExecError::MissingRedirectTarget {
                segment: 0,
                operator: TokenKind::RedirectIn,
            })
        ));
    }

    #[test]
    fn test_redirect_flags() {
        assert_eq!(RedirectKind::Input.target_fd(), libc::STDIN_FILENO);
        assert_eq!(RedirectKind::Append.target_fd(), libc::STDOUT_FILENO);
        assert!(RedirectKind::Output.open_flags().contains(OFlag::O_TRUNC));
        assert!(RedirectKind::Append.open_flags().contains(OFlag::O_APPEND));
        assert!(!RedirectKind::Append.open_flags().contains(OFlag::O_TRUNC));
    }
}
