pub mod country;
pub mod history;
pub mod preferences;
pub mod sample;
pub mod trip;

pub use country::*;
pub use history::*;
pub use preferences::*;
pub use sample::*;
pub use trip::*;
