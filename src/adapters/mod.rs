/*!
 * Ecosystem Adapters
 * Optional modules bridging third-party types into the value model
 *
 * The core has no built-in knowledge of any ecosystem type: each adapter
 * implements the `Serializer` capability for its types and registers
 * itself through an explicit call made by the hosting application.
 */

#[cfg(feature = "time-adapter")]
pub mod time;
