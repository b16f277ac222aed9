/// Classification for chain advancement.
///
/// Used by the provider chain to decide how a failed adapter attempt is
/// recorded before moving on. Every adapter fault advances the chain; the
/// class only distinguishes "never tried" from "tried and failed".
///
/// # Behavior Summary
///
/// | Class | Network call made? | Try Next Provider? |
/// |-------|-------------------|-------------------|
/// | `Skip` | No | Yes |
/// | `NextProvider` | Yes | Yes |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// The adapter could not attempt the lookup at all (missing credential,
    /// unsupported instrument). Recorded as a skip.
    Skip,

    /// The adapter attempted the lookup and failed (network, status, parse).
    /// Recorded as a failure.
    NextProvider,
}
