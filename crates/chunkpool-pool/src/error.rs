use chunkpool_sys::system::SysError;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
  #[error("pool geometry does not fit in the address space")]
  Overflow,
  #[error("system failed to provide a block: {0}")]
  System(#[from] SysError),
  #[error("thread-local pool registry has already been torn down")]
  Teardown,
}

pub type PoolResult<T> = Result<T, PoolError>;
