//! Market data access port trait.

use crate::domain::bar::Bar;
use crate::domain::error::BarsimError;

pub trait DataPort {
    /// Load the full bar series for the instrument, sorted by timestamp.
    fn load_bars(&self) -> Result<Vec<Bar>, BarsimError>;
}
