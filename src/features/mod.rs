/*!
 * Serialization Features
 * Immutable bit-flag configuration resolved once per writer
 *
 * Every escaping and formatting decision in the crate is driven by this
 * mask. The mask itself is cheap to pass around; the hot paths read the
 * [`Derived`] state instead, which is recomputed exactly once per mask
 * change by [`compute_derived`].
 */

use bitflags::bitflags;

bitflags! {
    /// Formatting and compatibility options combined into a single bitmask
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Features: u32 {
        /// Emit property names inside quotes (on by default)
        const QUOTE_FIELD_NAMES       = 1 << 0;
        /// Use `'` instead of `"` for strings and names
        const USE_SINGLE_QUOTES       = 1 << 1;
        /// Emit record/map properties whose value is absent
        const WRITE_NULL_PROPERTIES   = 1 << 2;
        /// Emit enums as their variant name (on by default)
        const ENUM_AS_NAME            = 1 << 3;
        /// Emit enums as their display text; mutually exclusive with
        /// `ENUM_AS_NAME` - configuring one clears the other
        const ENUM_AS_TEXT            = 1 << 4;
        /// Absent lists become `[]`
        const NULL_LIST_AS_EMPTY      = 1 << 5;
        /// Absent strings become `""`
        const NULL_STRING_AS_EMPTY    = 1 << 6;
        /// Absent numbers become `0`; also trims a trailing `.0` from floats
        const NULL_NUMBER_AS_ZERO     = 1 << 7;
        /// Absent booleans become `false`
        const NULL_BOOL_AS_FALSE      = 1 << 8;
        /// Sort record fields and map entries by name
        const SORT_FIELDS             = 1 << 9;
        /// One element per line with tab indentation
        const PRETTY_PRINT            = 1 << 10;
        /// Preserve concrete type names (`@type` tags, numeric suffixes,
        /// hex byte arrays) so polymorphic values decode unambiguously
        const WRITE_CLASS_NAME        = 1 << 11;
        /// Skip cycle bookkeeping entirely; a genuine cycle then runs into
        /// the depth ceiling instead of producing a `$ref`
        const DISABLE_CYCLE_DETECTION = 1 << 12;
        /// Escape `/` as `\/`
        const ESCAPE_SLASH            = 1 << 13;
        /// Escape every non-ASCII scalar and quote integers beyond the
        /// JavaScript safe range
        const BROWSER_COMPATIBLE      = 1 << 14;
        /// Additionally escape `(` `)` `<` `>` to defuse markup injection
        const BROWSER_SECURE          = 1 << 15;
        /// Skip record fields holding `0`, `0.0`, `false`, or `""`
        const SKIP_DEFAULT_VALUES     = 1 << 16;
    }
}

impl Default for Features {
    fn default() -> Self {
        Features::QUOTE_FIELD_NAMES | Features::ENUM_AS_NAME
    }
}

impl Features {
    /// Set or clear one flag, applying the enum-representation exclusion
    /// rule: the two enum flags never coexist.
    #[must_use]
    pub fn config(mut self, flag: Features, on: bool) -> Features {
        if on {
            self |= flag;
            if flag == Features::ENUM_AS_TEXT {
                self &= !Features::ENUM_AS_NAME;
            } else if flag == Features::ENUM_AS_NAME {
                self &= !Features::ENUM_AS_TEXT;
            }
        } else {
            self &= !flag;
        }
        self
    }
}

/// Escaping mode selected by the browser-compatibility flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeMode {
    /// JSON escapes plus U+007F..U+009F and U+2028/U+2029; other non-ASCII
    /// passes through raw
    Plain,
    /// Every non-ASCII scalar escaped (`\uXXXX`, surrogate pairs beyond the
    /// BMP)
    BrowserCompatible,
}

/// Feature state resolved once per mask change
///
/// `special_bits` is the 64-entry classification bitset for the escaping
/// hot path: bit `n` set means byte `n` needs an escape. `\` (92) sits
/// outside the window and is tested explicitly.
#[derive(Debug, Clone, Copy)]
pub struct Derived {
    pub quote: u8,
    pub quote_field_names: bool,
    pub sort_fields: bool,
    pub pretty: bool,
    pub detect_cycles: bool,
    pub write_class_name: bool,
    pub browser_compatible: bool,
    pub browser_secure: bool,
    pub null_number_as_zero: bool,
    pub mode: EscapeMode,
    pub special_bits: u64,
}

/// Recompute [`Derived`] from a mask. Call on every mask change.
pub fn compute_derived(features: Features) -> Derived {
    let quote = if features.contains(Features::USE_SINGLE_QUOTES) {
        b'\''
    } else {
        b'"'
    };

    // Control characters always need escaping; the active quote character
    // replaces the double quote's bit in single-quote mode.
    let mut bits: u64 = (1u64 << 32) - 1;
    bits |= 1u64 << quote;
    if features.contains(Features::ESCAPE_SLASH) {
        bits |= 1u64 << b'/';
    }
    if features.contains(Features::BROWSER_SECURE) {
        bits |= (1u64 << b'(') | (1u64 << b')') | (1u64 << b'<') | (1u64 << b'>');
    }

    let mode = if features.contains(Features::BROWSER_COMPATIBLE) {
        EscapeMode::BrowserCompatible
    } else {
        EscapeMode::Plain
    };

    Derived {
        quote,
        quote_field_names: features.contains(Features::QUOTE_FIELD_NAMES),
        sort_fields: features.contains(Features::SORT_FIELDS),
        pretty: features.contains(Features::PRETTY_PRINT),
        detect_cycles: !features.contains(Features::DISABLE_CYCLE_DETECTION),
        write_class_name: features.contains(Features::WRITE_CLASS_NAME),
        browser_compatible: features.contains(Features::BROWSER_COMPATIBLE),
        browser_secure: features.contains(Features::BROWSER_SECURE),
        null_number_as_zero: features.contains(Features::NULL_NUMBER_AS_ZERO),
        mode,
        special_bits: bits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mask() {
        let f = Features::default();
        assert!(f.contains(Features::QUOTE_FIELD_NAMES));
        assert!(f.contains(Features::ENUM_AS_NAME));
        assert!(!f.contains(Features::PRETTY_PRINT));
    }

    #[test]
    fn test_enum_flags_mutually_exclusive() {
        let f = Features::default().config(Features::ENUM_AS_TEXT, true);
        assert!(f.contains(Features::ENUM_AS_TEXT));
        assert!(!f.contains(Features::ENUM_AS_NAME));

        let f = f.config(Features::ENUM_AS_NAME, true);
        assert!(f.contains(Features::ENUM_AS_NAME));
        assert!(!f.contains(Features::ENUM_AS_TEXT));
    }

    #[test]
    fn test_special_bits_plain() {
        let d = compute_derived(Features::default());
        assert_eq!(d.special_bits, 0x4_FFFF_FFFF);
    }

    #[test]
    fn test_special_bits_escape_slash() {
        let d = compute_derived(Features::default() | Features::ESCAPE_SLASH);
        assert_eq!(d.special_bits, 0x8004_FFFF_FFFF);
    }

    #[test]
    fn test_special_bits_browser_secure() {
        let d = compute_derived(Features::default() | Features::BROWSER_SECURE);
        assert_eq!(d.special_bits, 0x5000_0304_FFFF_FFFF);
    }

    #[test]
    fn test_single_quote_swaps_quote_bit() {
        let d = compute_derived(Features::default() | Features::USE_SINGLE_QUOTES);
        assert_eq!(d.quote, b'\'');
        assert_ne!(d.special_bits & (1 << b'\''), 0);
        // the double quote keeps its control-range bits only
        assert_eq!(d.special_bits & (1 << b'"'), 0);
    }

    #[test]
    fn test_cycle_detection_default_on() {
        assert!(compute_derived(Features::default()).detect_cycles);
        let d = compute_derived(Features::default() | Features::DISABLE_CYCLE_DETECTION);
        assert!(!d.detect_cycles);
    }
}
