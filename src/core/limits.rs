/*!
 * Limits and Constants
 *
 * Centralized location for the crate's limits, thresholds, and magic numbers.
 * All values include rationale comments explaining WHY they exist.
 * Performance-critical constants are marked with [PERF]
 * Security-critical constants are marked with [SECURITY]
 */

// =============================================================================
// BUFFER LIMITS
// =============================================================================

/// Initial capacity of an in-memory output buffer (2KB)
/// Covers typical API response payloads without a single reallocation
/// [PERF] First growth lands at 3KB, second at 4.6KB
pub const DEFAULT_BUFFER_CAPACITY: usize = 2048;

/// Fixed buffer capacity in streaming (sink-attached) mode (4KB)
/// The buffer never grows with a sink attached; it flushes instead
pub const STREAM_BUFFER_CAPACITY: usize = 4096;

/// Largest backing allocation the thread-local spare slot retains (128KB)
/// A call that ballooned past this donates nothing back, so one oversized
/// payload cannot pin memory on every worker thread
pub const POOL_RETAIN_MAX: usize = 128 * 1024;

/// Capacity of the cross-thread shared pool (16 buffers)
/// Diminishing returns past this; the thread-local slot absorbs most reuse
pub const SHARED_POOL_SLOTS: usize = 16;

// =============================================================================
// TRAVERSAL LIMITS
// =============================================================================

/// Default recursion-depth ceiling for one serialization call
/// Bounds native stack usage independently of cycle detection: deeply
/// nested but acyclic input would otherwise be unbounded
/// [SECURITY] Converts attacker-controlled nesting into a deterministic error
pub const DEFAULT_MAX_DEPTH: usize = 512;

// =============================================================================
// NUMERIC LIMITS
// =============================================================================

/// Largest integer magnitude JavaScript can represent exactly (2^53 - 1)
/// Under BROWSER_COMPATIBLE, numerals beyond this are emitted quoted so
/// browser consumers do not silently lose precision
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_integer_is_2_pow_53_minus_1() {
        assert_eq!(MAX_SAFE_INTEGER, (1i64 << 53) - 1);
    }

    #[test]
    fn test_pool_retain_covers_default_capacity() {
        assert!(POOL_RETAIN_MAX >= DEFAULT_BUFFER_CAPACITY);
        assert!(POOL_RETAIN_MAX >= STREAM_BUFFER_CAPACITY);
    }
}
