//! # NMEA 0183 sentence helpers
//!
//! Only the framing is handled here: checksum calculation, verification and field splitting.
//! Interpretation of individual sentences belongs to drivers.

/// Calculates NMEA checksum: XOR of all bytes between `$` and `*`.
///
/// Leading `$` is ignored, so both `"GPGGA,..."` and `"$GPGGA,..."` produce the same value.
pub fn checksum(body: &str) -> u8 {
    body.trim_start_matches('$')
        .bytes()
        .fold(0u8, |acc, byte| acc ^ byte)
}

/// Frames sentence body as a complete NMEA line: `$<body>*<checksum>\r\n`.
///
/// ```rust
/// use glidelink::core::utils::nmea;
///
/// assert_eq!(nmea::frame("PFLX2,1.5,,,,,,"), "$PFLX2,1.5,,,,,,*36\r\n");
/// ```
pub fn frame(body: &str) -> String {
    let body = body.trim_start_matches('$');
    format!("${body}*{:02X}\r\n", checksum(body))
}

/// Parsed NMEA sentence borrowed from a line.
#[derive(Clone, Debug, PartialEq)]
pub struct Sentence<'a> {
    address: &'a str,
    fields: Vec<&'a str>,
}

impl<'a> Sentence<'a> {
    /// Parses a line into a sentence.
    ///
    /// Returns `None` if line does not start with `$` or if checksum is present and does not
    /// match. Sentences without checksum are accepted as-is, many instruments omit it.
    pub fn parse(line: &'a str) -> Option<Self> {
        let line = line.trim();
        let body = line.strip_prefix('$')?;

        let body = match body.rsplit_once('*') {
            Some((body, sum)) => {
                let expected = u8::from_str_radix(sum.trim(), 16).ok()?;
                if checksum(body) != expected {
                    log::trace!("checksum mismatch: {line}");
                    return None;
                }
                body
            }
            None => body,
        };

        let mut parts = body.split(',');
        let address = parts.next().filter(|address| !address.is_empty())?;

        Some(Self {
            address,
            fields: parts.collect(),
        })
    }

    /// Sentence address, for example `GPGGA` or `LXWP0`.
    #[inline(always)]
    pub fn address(&self) -> &'a str {
        self.address
    }

    /// Number of fields after the address.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if sentence has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns a non-empty field by its index (address excluded).
    pub fn field(&self, index: usize) -> Option<&'a str> {
        self.fields
            .get(index)
            .copied()
            .filter(|field| !field.is_empty())
    }

    /// Parses a field as a floating point number.
    pub fn number(&self, index: usize) -> Option<f64> {
        self.field(index)?.trim().parse().ok()
    }
}
