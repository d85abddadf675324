//! SDES `a=crypto` attribute (RFC 4568, section 9.1).
//!
//! Formats handled:
//! - `a=crypto:1 AES_CM_128_HMAC_SHA1_80 inline:<base64key>`
//! - `a=crypto:2 AES_256_CM_HMAC_SHA1_80 inline:<base64key>|2^31|1:4`
//! - `a=cryptoscale:1 client AES_CM_128_HMAC_SHA1_80 inline:<base64key>|2^31|1:1`
//!
//! Only the `inline` key method with a single key parameter is supported.

use std::fmt;
use std::str::FromStr;

use super::error::{Error, Result};
use super::keys::MasterKeyMaterial;
use super::suite::{self, CryptoSuite};

/// Master key identifier carried after the lifetime: `<value>:<length>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mki {
    pub value: u64,
    /// Length of the MKI field in SRTP packets, 1..=128 bytes.
    pub length: u8,
}

/// One parsed crypto attribute with its decoded key material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoAttribute {
    pub tag: u32,
    pub suite: &'static CryptoSuite,
    key: MasterKeyMaterial,
    /// Master key lifetime in packets.
    pub lifetime: Option<u64>,
    pub mki: Option<Mki>,
    /// Session parameters, kept verbatim (e.g. `KDR=1`, `UNENCRYPTED_SRTP`).
    pub session_params: Vec<String>,
}

fn malformed(reason: impl Into<String>) -> Error {
    Error::Attribute(reason.into())
}

fn parse_lifetime(s: &str) -> Result<u64> {
    if let Some(exp) = s.strip_prefix("2^") {
        let exp: u32 = exp
            .parse()
            .map_err(|_| malformed(format!("bad lifetime exponent: {}", s)))?;
        return 1u64
            .checked_shl(exp)
            .ok_or_else(|| malformed(format!("lifetime out of range: {}", s)));
    }
    s.parse()
        .map_err(|_| malformed(format!("bad lifetime: {}", s)))
}

fn format_lifetime(lifetime: u64) -> String {
    if lifetime > 1 && lifetime.is_power_of_two() {
        format!("2^{}", lifetime.trailing_zeros())
    } else {
        lifetime.to_string()
    }
}

fn parse_mki(value: &str, length: &str) -> Result<Mki> {
    let value = value
        .parse()
        .map_err(|_| malformed(format!("bad MKI value: {}", value)))?;
    let length = length
        .parse::<u8>()
        .ok()
        .filter(|len| (1..=128).contains(len))
        .ok_or_else(|| malformed(format!("bad MKI length: {}", length)))?;
    Ok(Mki { value, length })
}

impl CryptoAttribute {
    /// Build an attribute around existing key material.
    pub fn new(tag: u32, key: MasterKeyMaterial) -> Self {
        Self {
            tag,
            suite: key.suite(),
            key,
            lifetime: None,
            mki: None,
            session_params: Vec::new(),
        }
    }

    /// Build an attribute with freshly generated key material.
    pub fn generate(tag: u32, suite: &'static CryptoSuite, lifetime: Option<u64>) -> Result<Self> {
        let mut attribute = Self::new(tag, MasterKeyMaterial::generate(suite)?);
        attribute.lifetime = lifetime;
        Ok(attribute)
    }

    /// Parse a crypto attribute line, decoding its inline key for the named suite.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let body = line.strip_prefix("a=").unwrap_or(line);

        let (rest, scaled) = if let Some(rest) = body.strip_prefix("crypto:") {
            (rest, false)
        } else if let Some(rest) = body.strip_prefix("cryptoscale:") {
            (rest, true)
        } else {
            return Err(malformed(format!("not a crypto line: {}", line)));
        };

        let mut fields = rest.split_whitespace();
        let tag = fields
            .next()
            .ok_or_else(|| malformed("missing tag"))?;
        let tag: u32 = tag
            .parse()
            .map_err(|_| malformed(format!("bad crypto tag: {}", tag)))?;

        if scaled {
            fields.next().ok_or_else(|| malformed("missing cryptoscale role"))?;
        }

        let suite = suite::lookup(fields.next().ok_or_else(|| malformed("missing crypto suite"))?)?;

        let key_params = fields
            .next()
            .ok_or_else(|| malformed("missing key parameters"))?;
        if key_params.contains(';') {
            return Err(malformed("multiple key parameters are not supported"));
        }
        let key_info = key_params
            .strip_prefix("inline:")
            .ok_or_else(|| malformed(format!("unsupported key method: {}", key_params)))?;

        let mut parts = key_info.split('|');
        let key_salt = parts.next().unwrap_or_default();
        let mut lifetime = None;
        let mut mki = None;
        for part in parts {
            if let Some((value, length)) = part.split_once(':') {
                if mki.is_some() {
                    return Err(malformed("duplicate MKI"));
                }
                mki = Some(parse_mki(value, length)?);
            } else {
                if lifetime.is_some() || mki.is_some() {
                    return Err(malformed(format!("unexpected key parameter field: {}", part)));
                }
                lifetime = Some(parse_lifetime(part)?);
            }
        }

        let key = MasterKeyMaterial::decode_inline(suite, key_salt)?;
        let session_params = fields.map(String::from).collect();

        tracing::debug!("Parsed crypto attribute tag={} suite={}", tag, suite);
        Ok(Self {
            tag,
            suite,
            key,
            lifetime,
            mki,
            session_params,
        })
    }

    /// Parse every line that is a usable crypto attribute, skipping the rest.
    ///
    /// A peer may offer suites we don't implement alongside ones we do.
    pub fn parse_offer<'a, I>(lines: I) -> Vec<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        lines
            .into_iter()
            .filter_map(|line| match Self::parse(line) {
                Ok(attribute) => Some(attribute),
                Err(e) => {
                    tracing::warn!("Skipping crypto attribute: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Pick the offered attribute whose suite ranks highest in `preferred`.
    pub fn select<'a>(
        preferred: &[&'static CryptoSuite],
        offered: &'a [CryptoAttribute],
    ) -> Option<&'a CryptoAttribute> {
        let suite = suite::select(preferred, offered.iter().map(|a| a.suite.name))?;
        offered.iter().find(|a| a.suite == suite)
    }

    pub fn master_key(&self) -> &MasterKeyMaterial {
        &self.key
    }
}

impl FromStr for CryptoAttribute {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for CryptoAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "a=crypto:{} {} inline:{}",
            self.tag,
            self.suite,
            self.key.encode_inline()
        )?;
        if let Some(lifetime) = self.lifetime {
            write!(f, "|{}", format_lifetime(lifetime))?;
        }
        if let Some(mki) = self.mki {
            write!(f, "|{}:{}", mki.value, mki.length)?;
        }
        for param in &self.session_params {
            write!(f, " {}", param)?;
        }
        Ok(())
    }
}
