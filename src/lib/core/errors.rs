use anyhow::Error;
use std::io;

use super::error::PileconsError;

/// Returns `true` if any error in the chain is a broken pipe.
///
/// Library I/O failures arrive wrapped in [`PileconsError::Io`], so both the
/// bare and the wrapped form are checked.
pub fn is_broken_pipe(err: &Error) -> bool {
    err.chain().any(|cause| {
        let io_err = cause.downcast_ref::<io::Error>().or_else(|| {
            match cause.downcast_ref::<PileconsError>() {
                Some(PileconsError::Io(inner)) => Some(inner),
                _ => None,
            }
        });
        io_err.map_or(false, |e| e.kind() == io::ErrorKind::BrokenPipe)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn detects_wrapped_broken_pipe() {
        let raw = io::Error::new(io::ErrorKind::BrokenPipe, "closed");
        let err = Error::from(PileconsError::Io(raw));
        assert!(is_broken_pipe(&err));

        let contextual: anyhow::Result<()> =
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed")).context("writing row");
        assert!(is_broken_pipe(&contextual.unwrap_err()));
    }

    #[test]
    fn ignores_other_errors() {
        let err = Error::from(io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert!(!is_broken_pipe(&err));
        assert!(!is_broken_pipe(&Error::msg("plain")));
    }
}
