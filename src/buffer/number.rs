/*!
 * Numeric Formatting
 * Digits and floats written without intermediate heap strings
 */

use super::OutBuffer;
use crate::core::errors::SerResult;
use crate::core::limits::MAX_SAFE_INTEGER;

impl OutBuffer {
    /// The minimum values cannot be negated losslessly, so they
    /// short-circuit to their literal text before the sign-and-measure
    /// digit path runs.
    #[inline]
    pub fn write_i32(&mut self, v: i32) -> SerResult<()> {
        if v == i32::MIN {
            return self.write_raw(b"-2147483648");
        }
        let mut fmt = itoa::Buffer::new();
        self.write_raw(fmt.format(v).as_bytes())
    }

    #[inline]
    pub fn write_u32(&mut self, v: u32) -> SerResult<()> {
        let mut fmt = itoa::Buffer::new();
        self.write_raw(fmt.format(v).as_bytes())
    }

    /// 64-bit integers beyond ±2^53-1 lose precision in JavaScript, so
    /// BROWSER_COMPATIBLE wraps them in quotes (unless WRITE_CLASS_NAME is
    /// carrying the exact type already).
    pub fn write_i64(&mut self, v: i64) -> SerResult<()> {
        let d = self.derived();
        let quoted = d.browser_compatible
            && !d.write_class_name
            && !(-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&v);
        if v == i64::MIN {
            return if quoted {
                self.write_raw(b"\"-9223372036854775808\"")
            } else {
                self.write_raw(b"-9223372036854775808")
            };
        }
        let mut fmt = itoa::Buffer::new();
        let text = fmt.format(v);
        if quoted {
            self.write_byte(b'"')?;
            self.write_raw(text.as_bytes())?;
            self.write_byte(b'"')
        } else {
            self.write_raw(text.as_bytes())
        }
    }

    pub fn write_u64(&mut self, v: u64) -> SerResult<()> {
        let d = self.derived();
        let quoted =
            d.browser_compatible && !d.write_class_name && v > MAX_SAFE_INTEGER as u64;
        let mut fmt = itoa::Buffer::new();
        let text = fmt.format(v);
        if quoted {
            self.write_byte(b'"')?;
            self.write_raw(text.as_bytes())?;
            self.write_byte(b'"')
        } else {
            self.write_raw(text.as_bytes())
        }
    }

    /// NaN and the infinities have no JSON numeral; they write the null
    /// representation. Finite values use the shortest text that round-trips.
    pub fn write_f64(&mut self, v: f64, type_suffix: bool) -> SerResult<()> {
        if !v.is_finite() {
            return self.write_null();
        }
        let mut fmt = ryu::Buffer::new();
        let mut text = fmt.format_finite(v);
        if self.derived().null_number_as_zero {
            text = text.strip_suffix(".0").unwrap_or(text);
        }
        self.write_raw(text.as_bytes())?;
        if type_suffix && self.derived().write_class_name {
            self.write_byte(b'D')?;
        }
        Ok(())
    }

    pub fn write_f32(&mut self, v: f32, type_suffix: bool) -> SerResult<()> {
        if !v.is_finite() {
            return self.write_null();
        }
        let mut fmt = ryu::Buffer::new();
        let mut text = fmt.format_finite(v);
        if self.derived().null_number_as_zero {
            text = text.strip_suffix(".0").unwrap_or(text);
        }
        self.write_raw(text.as_bytes())?;
        if type_suffix && self.derived().write_class_name {
            self.write_byte(b'F')?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Features;

    fn written(features: Features, f: impl FnOnce(&mut OutBuffer)) -> String {
        let mut out = OutBuffer::with_features(features);
        f(&mut out);
        out.into_string().unwrap()
    }

    #[test]
    fn test_int_literals() {
        let text = written(Features::default(), |o| {
            o.write_i32(0).unwrap();
            o.write_byte(b',').unwrap();
            o.write_i32(-42).unwrap();
            o.write_byte(b',').unwrap();
            o.write_i64(1234567890123).unwrap();
        });
        assert_eq!(text, "0,-42,1234567890123");
    }

    #[test]
    fn test_min_values_are_literal() {
        assert_eq!(
            written(Features::default(), |o| o.write_i32(i32::MIN).unwrap()),
            "-2147483648"
        );
        assert_eq!(
            written(Features::default(), |o| o.write_i64(i64::MIN).unwrap()),
            "-9223372036854775808"
        );
    }

    #[test]
    fn test_browser_safe_integer_quoting() {
        let f = Features::default() | Features::BROWSER_COMPATIBLE;
        assert_eq!(
            written(f, |o| o.write_i64(i64::MAX).unwrap()),
            "\"9223372036854775807\""
        );
        assert_eq!(
            written(f, |o| o.write_i64(9_007_199_254_740_991).unwrap()),
            "9007199254740991"
        );
        assert_eq!(
            written(f, |o| o.write_i64(-9_007_199_254_740_992).unwrap()),
            "\"-9007199254740992\""
        );
        assert_eq!(
            written(f, |o| o.write_u64(u64::MAX).unwrap()),
            "\"18446744073709551615\""
        );
        // type-name preservation overrides the quoting
        let f = f | Features::WRITE_CLASS_NAME;
        assert_eq!(
            written(f, |o| o.write_i64(i64::MAX).unwrap()),
            "9223372036854775807"
        );
    }

    #[test]
    fn test_floats() {
        assert_eq!(
            written(Features::default(), |o| o.write_f64(1.5, false).unwrap()),
            "1.5"
        );
        assert_eq!(
            written(Features::default(), |o| o.write_f64(1.0, false).unwrap()),
            "1.0"
        );
        assert_eq!(
            written(Features::default(), |o| o.write_f64(f64::NAN, false).unwrap()),
            "null"
        );
        assert_eq!(
            written(Features::default(), |o| {
                o.write_f64(f64::INFINITY, false).unwrap()
            }),
            "null"
        );
    }

    #[test]
    fn test_trailing_zero_trim() {
        let f = Features::default() | Features::NULL_NUMBER_AS_ZERO;
        assert_eq!(written(f, |o| o.write_f64(1.0, false).unwrap()), "1");
        assert_eq!(written(f, |o| o.write_f64(1.25, false).unwrap()), "1.25");
    }

    #[test]
    fn test_type_suffixes() {
        let f = Features::default() | Features::WRITE_CLASS_NAME;
        assert_eq!(written(f, |o| o.write_f64(2.5, true).unwrap()), "2.5D");
        assert_eq!(written(f, |o| o.write_f32(2.5, true).unwrap()), "2.5F");
        // no suffix without the feature
        assert_eq!(
            written(Features::default(), |o| o.write_f64(2.5, true).unwrap()),
            "2.5"
        );
    }

    #[test]
    fn test_float_round_trip() {
        for v in [0.1, -1234.5678, 1e300, f64::MIN_POSITIVE, std::f64::consts::PI] {
            let text = written(Features::default(), |o| o.write_f64(v, false).unwrap());
            assert_eq!(text.parse::<f64>().unwrap(), v);
        }
    }
}
