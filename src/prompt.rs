use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::os::unix::ffi::OsStringExt;

/// Prompt text comes from `PS1`, re-read at every prompt.
pub struct ShellPrompt {
    default: Vec<u8>,
    fixed: bool,
}

impl ShellPrompt {
    pub fn new(default: impl Into<Vec<u8>>) -> Self {
        ShellPrompt {
            default: default.into(),
            fixed: false,
        }
    }

    /// Ignores `PS1`.
    pub fn fixed(text: impl Into<Vec<u8>>) -> Self {
        ShellPrompt {
            default: text.into(),
            fixed: true,
        }
    }

    pub fn render(&self) -> Vec<u8> {
        if self.fixed {
            return self.default.clone();
        }
        env::var_os("PS1")
            .map(OsString::into_vec)
            .unwrap_or_else(|| self.default.clone())
    }

    pub fn show<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(&self.render())?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_fixed_prompt() {
        let prompt = ShellPrompt::fixed("> ");
        let mut out = Vec::new();
        prompt.show(&mut out).unwrap();
        assert_eq!(out, b"> ");
    }

    #[test]
    #[serial]
    fn test_ps1_read_each_time() {
        let old = env::var_os("PS1");
        let prompt = ShellPrompt::new("$ ");

        unsafe { env::remove_var("PS1") };
        let before = prompt.render();
        unsafe { env::set_var("PS1", "pipesh% ") };
        let after = prompt.render();

        match old {
            Some(v) => unsafe { env::set_var("PS1", v) },
            None => unsafe { env::remove_var("PS1") },
        }
        assert_eq!(before, b"$ ");
        assert_eq!(after, b"pipesh% ");
    }
}
