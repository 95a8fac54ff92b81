use thiserror::Error;

/// An error from an indexed or keyed container operation.
///
/// The container is left unmodified whenever an error is returned.
/// "Not found" is not an error: the find family reports misses through
/// its return type instead (see [crate::Omt::find_zero]).
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The supplied index lies outside the valid range for the
    /// operation.
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// The offending index (for range iteration, the range end).
        index: usize,
        /// The container length at the time of the call.
        len: usize,
    },

    /// A keyed insertion found a stored value comparing equal to the
    /// new key.
    #[error("an equal key is already present")]
    KeyExists,
}
