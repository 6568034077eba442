use std::ffi::{CStr, CString};
use std::ptr::null;

use libc::{
    _exit, c_char, c_int, c_uint, close, dup2, execvp, fork, open, perror, pid_t, pipe, waitpid,
    EINTR, EXIT_FAILURE, O_CREAT, O_RDONLY, O_TRUNC, O_WRONLY, STDIN_FILENO, STDOUT_FILENO,
    WUNTRACED,
};
use thiserror::Error;

use crate::errno::{describe, last_errno};

const OUTPUT_MODE: c_uint = 0o644;

// perror() prefixes, only used inside forked children
const EXEC_ERROR: &[u8] = b"minsh: exec error\0";
const OPEN_ERROR: &[u8] = b"minsh: open error\0";
const DUP_ERROR: &[u8] = b"minsh: dup2 error\0";

#[derive(Debug, PartialEq, Error)]
pub(crate) enum ExecutionError {
    #[error("fork error: {}", describe(*.0))]
    Fork(c_int),
    #[error("pipe error: {}", describe(*.0))]
    Pipe(c_int),
    #[error("wait error: {}", describe(*.0))]
    Wait(c_int),
    #[error("empty command")]
    EmptyCommand,
    #[error("argument contains a nul byte: {0:?}")]
    NulByte(String),
}

/// How a waited-for child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExitStatus {
    Exited(c_int),
    Signaled(c_int),
}

fn c_string(arg: &str) -> Result<CString, ExecutionError> {
    CString::new(arg).map_err(|_| ExecutionError::NulByte(arg.to_owned()))
}

/// A null terminated argument vector for `execvp`, built before forking.
struct Argv {
    _args: Vec<CString>,
    pointers: Vec<*const c_char>,
}

impl Argv {
    fn new(args: &[String]) -> Result<Self, ExecutionError> {
        if args.is_empty() {
            return Err(ExecutionError::EmptyCommand);
        }

        let args = args
            .iter()
            .map(|arg| c_string(arg))
            .collect::<Result<Vec<_>, _>>()?;
        let mut pointers: Vec<*const c_char> = args.iter().map(|arg| arg.as_ptr()).collect();
        pointers.push(null());

        Ok(Self {
            _args: args,
            pointers,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct PipeEnds {
    read: c_int,
    write: c_int,
}

impl PipeEnds {
    fn open() -> Result<Self, ExecutionError> {
        let mut filedes: [c_int; 2] = [-1, -1];

        match unsafe { pipe(filedes.as_mut_ptr()) } {
            -1 => Err(ExecutionError::Pipe(last_errno())),
            _ => Ok(Self {
                read: filedes[0],
                write: filedes[1],
            }),
        }
    }

    fn close(self) {
        unsafe {
            close(self.read);
            close(self.write);
        }
    }
}

/// Stream rewiring applied in the child between `fork` and `execvp`.
#[derive(Clone, Copy)]
enum Wiring<'a> {
    Inherit,
    OutputFile(&'a CStr),
    InputFile(&'a CStr),
    PipeWriter(PipeEnds),
    PipeReader(PipeEnds),
}

unsafe fn fail(context: &[u8]) -> ! {
    perror(context.as_ptr().cast());
    _exit(EXIT_FAILURE)
}

unsafe fn redirect(path: &CStr, flags: c_int, target: c_int) {
    let fd = open(path.as_ptr(), flags, OUTPUT_MODE);
    if fd < 0 {
        fail(OPEN_ERROR);
    }

    if fd != target {
        if dup2(fd, target) == -1 {
            fail(DUP_ERROR);
        }
        close(fd);
    }
}

unsafe fn attach(ends: PipeEnds, end: c_int, target: c_int) {
    if dup2(end, target) == -1 {
        fail(DUP_ERROR);
    }
    ends.close();
}

/// Runs in the forked child and never returns.
unsafe fn exec_child(argv: &Argv, wiring: Wiring<'_>) -> ! {
    match wiring {
        Wiring::Inherit => {}
        Wiring::OutputFile(path) => redirect(path, O_WRONLY | O_CREAT | O_TRUNC, STDOUT_FILENO),
        Wiring::InputFile(path) => redirect(path, O_RDONLY, STDIN_FILENO),
        Wiring::PipeWriter(ends) => attach(ends, ends.write, STDOUT_FILENO),
        Wiring::PipeReader(ends) => attach(ends, ends.read, STDIN_FILENO),
    }

    execvp(argv.pointers[0], argv.pointers.as_ptr());
    fail(EXEC_ERROR)
}

fn spawn(argv: &Argv, wiring: Wiring<'_>) -> Result<pid_t, ExecutionError> {
    match unsafe { fork() } {
        -1 => Err(ExecutionError::Fork(last_errno())),
        0 => unsafe { exec_child(argv, wiring) },
        pid => Ok(pid),
    }
}

/// Blocks until `pid` exits or is killed by a signal.
fn wait_foreground(pid: pid_t) -> Result<ExitStatus, ExecutionError> {
    let mut status: c_int = 0;

    loop {
        if unsafe { waitpid(pid, &mut status, WUNTRACED) } == -1 {
            match last_errno() {
                EINTR => continue,
                errno => return Err(ExecutionError::Wait(errno)),
            }
        }

        if libc::WIFEXITED(status) {
            return Ok(ExitStatus::Exited(libc::WEXITSTATUS(status)));
        }

        if libc::WIFSIGNALED(status) {
            return Ok(ExitStatus::Signaled(libc::WTERMSIG(status)));
        }
    }
}

/// Runs `args[0]`, found through `PATH`, with the remaining arguments.
pub(crate) fn launch(args: &[String]) -> Result<ExitStatus, ExecutionError> {
    let argv = Argv::new(args)?;
    let pid = spawn(&argv, Wiring::Inherit)?;

    wait_foreground(pid)
}

/// Like [`launch`], with stdout truncated into `target` (created as 0644).
pub(crate) fn launch_with_output_redirection(
    args: &[String],
    target: &str,
) -> Result<ExitStatus, ExecutionError> {
    let argv = Argv::new(args)?;
    let target = c_string(target)?;
    let pid = spawn(&argv, Wiring::OutputFile(&target))?;

    wait_foreground(pid)
}

/// Like [`launch`], with stdin read from `source`.
pub(crate) fn launch_with_input_redirection(
    args: &[String],
    source: &str,
) -> Result<ExitStatus, ExecutionError> {
    let argv = Argv::new(args)?;
    let source = c_string(source)?;
    let pid = spawn(&argv, Wiring::InputFile(&source))?;

    wait_foreground(pid)
}

/// Runs `left | right` and waits for both sides.
///
/// If the second fork fails the first child is not killed; it is still waited
/// for, and sees a pipe without readers.
pub(crate) fn launch_pipe(
    left: &[String],
    right: &[String],
) -> Result<(ExitStatus, ExitStatus), ExecutionError> {
    let left = Argv::new(left)?;
    let right = Argv::new(right)?;
    let ends = PipeEnds::open()?;

    let writer = match spawn(&left, Wiring::PipeWriter(ends)) {
        Ok(pid) => pid,
        Err(err) => {
            ends.close();
            return Err(err);
        }
    };
    let reader = spawn(&right, Wiring::PipeReader(ends));
    ends.close();

    let reader = match reader {
        Ok(pid) => pid,
        Err(err) => {
            let _ = wait_foreground(writer);
            return Err(err);
        }
    };

    let writer_status = wait_foreground(writer);
    let reader_status = wait_foreground(reader);

    Ok((writer_status?, reader_status?))
}
