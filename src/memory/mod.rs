mod chunk_pool;

pub use chunk_pool::*;
