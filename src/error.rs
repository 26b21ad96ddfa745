//! Error taxonomy (spec.md §6, §7).
//!
//! Errors are *latched*: most entry points are void-returning (mirroring the
//! `pf*` C API) and instead record the first unreported [`ErrorCode`] on the
//! context, exactly as `graphics::gx::vertex::VertexAccumulator` logs a
//! `log::warn!` and keeps going rather than unwinding. [`Context::new`] is
//! the one entry point that genuinely has nowhere to latch into, so it
//! returns a `Result` directly.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    #[error("no error")]
    NoError,
    #[error("no current context")]
    NoContext,
    #[error("invalid enum value")]
    InvalidEnum,
    #[error("invalid value")]
    InvalidValue,
    #[error("invalid operation for current state")]
    InvalidOperation,
    #[error("matrix stack overflow")]
    StackOverflow,
    #[error("matrix stack underflow")]
    StackUnderflow,
    #[error("out of memory")]
    OutOfMemory,
}

/// A ring of one slot: the first unread error survives, later ones are
/// dropped until the slot is read (spec.md §6, §7).
#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorLatch {
    pending: Option<ErrorCode>,
}

impl ErrorLatch {
    pub fn set(&mut self, code: ErrorCode) {
        if self.pending.is_none() {
            log::warn!("pixelforge: {code}");
            self.pending = Some(code);
        }
    }

    /// Read and clear the latched error.
    pub fn take(&mut self) -> ErrorCode {
        self.pending.take().unwrap_or(ErrorCode::NoError)
    }
}
