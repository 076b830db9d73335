pub mod stream;
pub mod upstream;

pub use stream::*;
pub use upstream::*;
