/// Writes a diagnostic line to stderr, prefixed with the shell's name.
macro_rules! report {
    ($($args:tt)*) => {
        eprintln!("{}: {}", $crate::config::SHELL_NAME, format_args!($($args)*))
    };
}
