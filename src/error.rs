//! Command line error types.

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Configuration, secrets or collaborator setup failed; nothing was touched.
    #[display("invalid configuration")]
    Configuration,
    /// The event payload could not be read or decoded.
    #[display("invalid object notification")]
    InvalidEvent,
    /// A reconciliation flow failed.
    #[display("reconciliation failed")]
    Reconcile,
    /// Some records of an event failed; the others were processed.
    #[display("{_0} of {_1} event records failed")]
    PartialEvent(#[error(not(source))] usize, #[error(not(source))] usize),
}
