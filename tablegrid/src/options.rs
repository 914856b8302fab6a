use crate::buffer::DEFAULT_BUFFER_CAPACITY;
use crate::{Error, Result};

/// Configuration for [`crate::ViewManager`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewOptions {
    /// Maximum number of rows the dataset may hold.
    ///
    /// This is also the slot count of each shared index buffer region, so memory use is
    /// `2 * 4 * buffer_capacity` bytes regardless of the dataset size.
    pub buffer_capacity: usize,

    /// Run filtering and sorting on a background thread.
    ///
    /// When `false` (or when the thread cannot be spawned) the manager stays in natural order for
    /// every filter/sort configuration.
    pub background: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            background: true,
        }
    }
}

impl ViewOptions {
    pub fn new(buffer_capacity: usize) -> Self {
        Self {
            buffer_capacity,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        // Row positions are stored as u32.
        if self.buffer_capacity > u32::MAX as usize {
            return Err(Error::InvalidConfig {
                message: format!(
                    "buffer_capacity {} exceeds the maximum of {}",
                    self.buffer_capacity,
                    u32::MAX
                ),
            });
        }
        Ok(())
    }
}
