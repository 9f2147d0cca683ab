pub mod grabber;
pub mod handle;
pub mod probe;
pub mod sampler;

pub use grabber::*;
pub use handle::*;
pub use probe::*;
pub use sampler::*;
