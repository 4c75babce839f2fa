mod priority_queue;
mod scratch_buffer;
mod work_scheduler;

pub use priority_queue::*;
pub use scratch_buffer::*;
pub use work_scheduler::*;
