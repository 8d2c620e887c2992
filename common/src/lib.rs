pub mod analysis;
pub mod charts;
pub mod predictions;
pub mod prices;
pub mod sources;
pub mod timeframe;
pub mod transforms;

pub use analysis::*;
pub use charts::*;
pub use predictions::*;
pub use prices::*;
pub use timeframe::*;
