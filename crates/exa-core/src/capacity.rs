//! Capacity normalization.
//!
//! The two SFA product families report virtual disk sizes differently: one embeds a bare
//! `Cap=15.4 TiB` field in a free-form descriptor, the other a quoted
//! `Capacity='713.8 TiB'` field, and either may also carry a typed `Capacity` value that
//! is already a byte count. Everything is normalized to bytes internally and formatted
//! back to TiB or PiB for display.
//!
//! Parsing never fails outward: malformed tokens log a warning and count as zero bytes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Bytes in one kibibyte.
pub const KIB: u64 = 1 << 10;
/// Bytes in one mebibyte.
pub const MIB: u64 = 1 << 20;
/// Bytes in one gibibyte.
pub const GIB: u64 = 1 << 30;
/// Bytes in one tebibyte.
pub const TIB: u64 = 1 << 40;

/// Binary capacity units accepted in capacity tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapacityUnit {
    /// Plain bytes (`B`)
    Bytes,
    /// Kibibytes (`KiB`)
    KiB,
    /// Mebibytes (`MiB`)
    MiB,
    /// Gibibytes (`GiB`)
    GiB,
    /// Tebibytes (`TiB`)
    TiB,
}

impl CapacityUnit {
    /// Number of bytes in one unit.
    #[must_use]
    pub const fn multiplier(self) -> u64 {
        match self {
            Self::Bytes => 1,
            Self::KiB => KIB,
            Self::MiB => MIB,
            Self::GiB => GIB,
            Self::TiB => TIB,
        }
    }

    /// Canonical unit symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Bytes => "B",
            Self::KiB => "KiB",
            Self::MiB => "MiB",
            Self::GiB => "GiB",
            Self::TiB => "TiB",
        }
    }
}

impl FromStr for CapacityUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "B" => Ok(Self::Bytes),
            "KIB" => Ok(Self::KiB),
            "MIB" => Ok(Self::MiB),
            "GIB" => Ok(Self::GiB),
            "TIB" => Ok(Self::TiB),
            _ => Err(Error::InvalidCapacity(format!("unknown unit `{s}`"))),
        }
    }
}

impl fmt::Display for CapacityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// The two embedded-field encodings found in virtual disk descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapacityDialect {
    /// Bare value terminated by a comma: `Cap=15.4 TiB,`
    Cap,
    /// Quoted value: `Capacity='713.8 TiB'`
    Capacity,
}

impl CapacityDialect {
    /// Name of the embedded field for this dialect.
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Cap => "Cap",
            Self::Capacity => "Capacity",
        }
    }

    /// Picks the dialect a descriptor is written in, if any.
    #[must_use]
    pub fn detect(descriptor: &str) -> Option<Self> {
        if embedded_value(descriptor, Self::Capacity.field_name()).is_some() {
            Some(Self::Capacity)
        } else if embedded_value(descriptor, Self::Cap.field_name()).is_some() {
            Some(Self::Cap)
        } else {
            None
        }
    }

    /// Parses this dialect's field out of `descriptor` into bytes.
    #[must_use]
    pub fn parse(self, descriptor: &str) -> u64 {
        parse_embedded(descriptor, self.field_name())
    }
}

/// Parses a `<number> <unit>` token into bytes.
///
/// # Errors
///
/// Returns [`Error::InvalidCapacity`] when the token is malformed, negative or uses an
/// unknown unit.
pub fn try_parse_token(text: &str) -> Result<u64> {
    let mut parts = text.split_whitespace();
    let (Some(number), Some(unit)) = (parts.next(), parts.next()) else {
        return Err(Error::InvalidCapacity(format!(
            "expected `<number> <unit>`, got `{text}`"
        )));
    };

    let value: f64 = number
        .parse()
        .map_err(|_| Error::InvalidCapacity(format!("invalid number `{number}`")))?;
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidCapacity(format!("invalid number `{number}`")));
    }

    let unit: CapacityUnit = unit.parse()?;
    Ok(scale(value, unit))
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn scale(value: f64, unit: CapacityUnit) -> u64 {
    (value * unit.multiplier() as f64) as u64
}

/// Parses a `<number> <unit>` token into bytes, logging and returning 0 on failure.
#[must_use]
pub fn parse_token(text: &str) -> u64 {
    match try_parse_token(text) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(token = text, %err, "unparseable capacity token");
            0
        }
    }
}

/// Finds the raw value of `field_name=` inside a free-form descriptor.
///
/// A quoted value runs to the matching quote; a bare value runs to the next comma. The
/// field name must start at a field boundary, so `Cap` does not match `MaxCap=`.
#[must_use]
pub fn embedded_value<'a>(descriptor: &'a str, field_name: &str) -> Option<&'a str> {
    let needle = format!("{field_name}=");
    let mut offset = 0;

    while let Some(found) = descriptor[offset..].find(&needle) {
        let start = offset + found;
        let at_boundary = descriptor[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric() && c != '_');

        if at_boundary {
            return read_value(&descriptor[start + needle.len()..]);
        }
        offset = start + needle.len();
    }

    None
}

fn read_value(rest: &str) -> Option<&str> {
    let rest = rest.trim_start();
    match rest.chars().next() {
        Some(quote @ ('\'' | '"')) => {
            let body = &rest[1..];
            body.find(quote).map(|end| body[..end].trim())
        }
        _ => Some(rest.split(',').next().unwrap_or("").trim()),
    }
}

/// Parses the capacity embedded as `field_name=<value>` in a descriptor string.
///
/// Returns 0 with a logged warning if the field is absent or its value is malformed.
#[must_use]
pub fn parse_embedded(descriptor: &str, field_name: &str) -> u64 {
    match embedded_value(descriptor, field_name) {
        Some(value) => parse_token(value),
        None => {
            warn!(field = field_name, "capacity field not found in descriptor");
            0
        }
    }
}

/// Parses a typed capacity value: a byte count, or a (possibly quoted) token string.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_typed(value: &serde_json::Value) -> u64 {
    match value {
        serde_json::Value::Number(number) => {
            if let Some(bytes) = number.as_u64() {
                bytes
            } else {
                match number.as_f64() {
                    Some(bytes) if bytes.is_finite() && bytes >= 0.0 => bytes as u64,
                    _ => {
                        warn!(%number, "negative or non-finite capacity value");
                        0
                    }
                }
            }
        }
        serde_json::Value::String(text) => {
            parse_token(text.trim().trim_matches(|c| c == '\'' || c == '"'))
        }
        serde_json::Value::Null => {
            debug!("capacity value is null");
            0
        }
        other => {
            warn!(value = %other, "unsupported capacity value type");
            0
        }
    }
}

/// Formats a byte count as TiB, or as PiB from 1024 TiB upward, with two decimals.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: Option<u64>) -> Option<String> {
    let tib = bytes? as f64 / TIB as f64;
    if tib >= 1024.0 {
        Some(format!("{:.2} PiB", tib / 1024.0))
    } else {
        Some(format!("{tib:.2} TiB"))
    }
}
