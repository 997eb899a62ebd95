use std::ffi::{CString, OsStr};
use std::os::fd::{AsRawFd, OwnedFd};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use log::{debug, warn};
use nix::errno::Errno;
use nix::fcntl::{FcntlArg, FdFlag, fcntl, open};
use nix::sys::signal::{SigHandler, Signal, signal};
use nix::sys::stat::Mode;
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, close, dup2, execv, execvp, fork, pipe};

use super::command::{Pipeline, RedirectKind, Segment};
use super::executor::{
    EXIT_CANNOT_EXECUTE, EXIT_INTERNAL, EXIT_NOT_FOUND, EXIT_REDIRECT_FAILED, ExecError,
    ExecStatus, Executor,
};
use super::path_resolver::PathResolver;
use crate::lexer::TokenList;

const DIAGNOSTIC_PREFIX: &[u8] = b"pipesh: ";

enum Program {
    /// Replace the image with this exact path.
    Path(CString),
    /// Found on PATH; let execvp search again.
    Search(CString),
    Missing,
}

struct PreparedRedirect {
    kind: RedirectKind,
    path: CString,
    label: Vec<u8>,
}

/// Everything a child needs, built before fork so the child never allocates.
struct Launch {
    argv: Vec<CString>,
    program: Program,
    redirects: Vec<PreparedRedirect>,
    label: Vec<u8>,
}

struct Pipe {
    read: OwnedFd,
    write: OwnedFd,
}

impl Pipe {
    fn open() -> Result<Self, ExecError> {
        let (read, write) = pipe().map_err(ExecError::Pipe)?;
        // Keeps unrelated children of this process from inheriting the ends.
        for fd in [&read, &write] {
            fcntl(fd.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC)).map_err(ExecError::Pipe)?;
        }
        Ok(Pipe { read, write })
    }
}

/// Runs a token list as one process per segment, connected by pipes.
pub struct PipelineExecutor {
    resolver: PathResolver,
}

impl Default for PipelineExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineExecutor {
    pub fn new() -> Self {
        Self::with_resolver(PathResolver::new())
    }

    pub fn with_resolver(resolver: PathResolver) -> Self {
        PipelineExecutor { resolver }
    }

    fn prepare(&self, segment: &Segment<'_>) -> Result<Launch, ExecError> {
        let argv = segment.argv();
        let Some(name) = argv.first().copied() else {
            return Err(ExecError::EmptyCommand {
                segment: segment.index(),
            });
        };

        let redirects = segment
            .redirects()?
            .into_iter()
            .map(|r| PreparedRedirect {
                kind: r.kind,
                path: c_string(r.target),
                label: diagnostic_label(r.target),
            })
            .collect();

        let program = self.resolve_program(name);
        if let Program::Missing = program {
            debug!(
                "segment {}: {} not found on PATH",
                segment.index(),
                String::from_utf8_lossy(name)
            );
        }

        Ok(Launch {
            argv: argv.iter().map(|arg| c_string(arg)).collect(),
            program,
            redirects,
            label: diagnostic_label(name),
        })
    }

    fn resolve_program(&self, name: &[u8]) -> Program {
        if let Some(rest) = name.strip_prefix(b"/") {
            let path = Path::new("/").join(OsStr::from_bytes(rest));
            Program::Path(c_string(path.as_os_str().as_bytes()))
        } else if name.starts_with(b"./") {
            Program::Path(c_string(name))
        } else if self.resolver.resolve(name) {
            Program::Search(c_string(name))
        } else {
            Program::Missing
        }
    }
}

impl Executor for PipelineExecutor {
    fn execute(&mut self, tokens: TokenList) -> ExecStatus {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let pipeline = Pipeline::from_tokens(&tokens);
        let launches = pipeline
            .segments()
            .iter()
            .map(|segment| self.prepare(segment))
            .collect::<Result<Vec<_>, _>>()?;

        // All pipes exist before the first fork.
        let mut pipes = (0..pipeline.pipe_count())
            .map(|_| Pipe::open().map(Some))
            .collect::<Result<Vec<_>, _>>()?;
        let mut children = Vec::with_capacity(launches.len());

        for (index, launch) in launches.iter().enumerate() {
            // SAFETY: the child only makes async-signal-safe calls before exec or _exit.
            match unsafe { fork() } {
                Ok(ForkResult::Child) => run_child(index, launch, &pipes),
                Ok(ForkResult::Parent { child }) => {
                    debug!("segment {} started as pid {}", index, child);
                    children.push(child);
                    if index > 0 {
                        pipes[index - 1] = None;
                    }
                }
                Err(errno) => {
                    drop(pipes);
                    if let Err(e) = reap(&children) {
                        warn!("reaping after failed fork: {}", e);
                    }
                    return Err(ExecError::Fork(errno));
                }
            }
        }

        drop(pipes);
        reap(&children)
    }
}

/// Waits for every child. A wait failure is reported after all others are reaped.
fn reap(children: &[Pid]) -> ExecStatus {
    let mut statuses = Vec::with_capacity(children.len());
    let mut failure = None;

    for &pid in children {
        match wait_for(pid) {
            Ok(code) => {
                debug!("pid {} finished with status {}", pid, code);
                statuses.push(code);
            }
            Err(errno) => {
                warn!("waiting for pid {}: {}", pid, errno);
                failure.get_or_insert(errno);
                statuses.push(EXIT_INTERNAL);
            }
        }
    }

    match failure {
        Some(errno) => Err(ExecError::Wait(errno)),
        None => Ok(statuses),
    }
}

fn wait_for(pid: Pid) -> Result<i32, Errno> {
    loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => return Ok(code),
            Ok(WaitStatus::Signaled(_, signal, _)) => return Ok(128 + signal as i32),
            Ok(_) | Err(Errno::EINTR) => continue,
            Err(errno) => return Err(errno),
        }
    }
}

fn run_child(index: usize, launch: &Launch, pipes: &[Option<Pipe>]) -> ! {
    // SAFETY: resetting a disposition is async-signal-safe.
    let _ = unsafe { signal(Signal::SIGINT, SigHandler::SigDfl) };

    if index > 0 {
        if let Some(pipe) = &pipes[index - 1] {
            if let Err(errno) = dup2(pipe.read.as_raw_fd(), libc::STDIN_FILENO) {
                fail(&launch.label, errno, EXIT_INTERNAL);
            }
        }
    }
    if let Some(Some(pipe)) = pipes.get(index) {
        if let Err(errno) = dup2(pipe.write.as_raw_fd(), libc::STDOUT_FILENO) {
            fail(&launch.label, errno, EXIT_INTERNAL);
        }
    }
    for pipe in pipes.iter().flatten() {
        let _ = close(pipe.read.as_raw_fd());
        let _ = close(pipe.write.as_raw_fd());
    }

    // After the pipe wiring, so explicit redirects win.
    for redirect in &launch.redirects {
        if let Err(errno) = apply_redirect(redirect) {
            fail(&redirect.label, errno, EXIT_REDIRECT_FAILED);
        }
    }

    let result = match &launch.program {
        Program::Path(path) => execv(path, &launch.argv),
        Program::Search(name) => execvp(name, &launch.argv),
        Program::Missing => {
            write_diagnostic(&[&launch.label, b"command not found\n"]);
            exit_child(EXIT_NOT_FOUND)
        }
    };
    let errno = match result {
        Ok(never) => match never {},
        Err(errno) => errno,
    };
    let code = if errno == Errno::ENOENT {
        EXIT_NOT_FOUND
    } else {
        EXIT_CANNOT_EXECUTE
    };
    fail(&launch.label, errno, code)
}

fn apply_redirect(redirect: &PreparedRedirect) -> Result<(), Errno> {
    let fd = open(
        redirect.path.as_c_str(),
        redirect.kind.open_flags(),
        Mode::S_IRUSR | Mode::S_IWUSR,
    )?;
    let result = dup2(fd, redirect.kind.target_fd());
    let _ = close(fd);
    result.map(drop)
}

fn fail(label: &[u8], errno: Errno, code: i32) -> ! {
    write_diagnostic(&[label, errno.desc().as_bytes(), b"\n"]);
    exit_child(code)
}

fn write_diagnostic(parts: &[&[u8]]) {
    for part in parts {
        // SAFETY: the buffer is valid for `part.len()` bytes.
        unsafe {
            libc::write(libc::STDERR_FILENO, part.as_ptr().cast(), part.len());
        }
    }
}

fn exit_child(code: i32) -> ! {
    // SAFETY: _exit skips atexit handlers and stdio buffers inherited from the parent.
    unsafe { libc::_exit(code) }
}

fn diagnostic_label(name: &[u8]) -> Vec<u8> {
    let mut label = DIAGNOSTIC_PREFIX.to_vec();
    label.extend_from_slice(name);
    label.extend_from_slice(b": ");
    label
}

/// C strings end at the first NUL, so anything after an escaped `\0` is dropped.
fn c_string(bytes: &[u8]) -> CString {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    CString::new(&bytes[..end]).unwrap_or_default()
}
