//! Command-line Error Types

use derive_more::{Display, Error};
use std::io::Error as IoError;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not read or save remembered settings")]
    Settings,
    #[display("sync roots are incomplete; pass --select, --studio and --destination (add --remember to keep them)")]
    Roots,
    #[display("no rating reader available")]
    Reader,
    #[display("could not start the async runtime: {_0}")]
    Runtime(IoError),
    #[display("invalid path argument: {_0}")]
    Path(IoError),
    #[display("sync worker was lost")]
    Worker,
}
