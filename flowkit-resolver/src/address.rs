//! Account addresses and the alias table mapping import locations onto them.

use indexmap::IndexMap;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// The length of an account address in bytes.
pub const ADDRESS_LENGTH: usize = 8;

/// An account address on chain.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Address([u8; ADDRESS_LENGTH]);

/// Error returned upon failed parsing of an [Address].
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum AddressError {
    #[error("address `{0}` is empty")]
    Empty(String),
    #[error("address `{0}` is longer than {} bytes", ADDRESS_LENGTH)]
    TooLong(String),
    #[error("address `{0}` is not valid hex")]
    InvalidHex(String),
}

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    /// Parses hex with or without a `0x` prefix. Short addresses are left-padded with zeroes, so
    /// `0x01` is the same address as `0x0000000000000001`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim();
        let digits = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
            .unwrap_or(digits);
        if digits.is_empty() {
            return Err(AddressError::Empty(s.to_string()));
        }
        if digits.len() > ADDRESS_LENGTH * 2 {
            return Err(AddressError::TooLong(s.to_string()));
        }
        let padded = format!("{:0>width$}", digits, width = ADDRESS_LENGTH * 2);
        let mut bytes = [0u8; ADDRESS_LENGTH];
        hex::decode_to_slice(&padded, &mut bytes)
            .map_err(|_| AddressError::InvalidHex(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_str(&s).map_err(de::Error::custom)
    }
}

/// A fixed mapping from import location to the address of an account that already holds the
/// imported contract.
///
/// Imports resolved through the alias table do not take part in the dependency graph, as their
/// targets are not part of the set being deployed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AliasTable {
    aliases: IndexMap<String, Address>,
}

impl AliasTable {
    /// Parse every address in the given `(location, address)` pairs, failing on the first invalid
    /// address.
    pub fn parse<I, L, A>(entries: I) -> Result<Self, AddressError>
    where
        I: IntoIterator<Item = (L, A)>,
        L: Into<String>,
        A: AsRef<str>,
    {
        let mut aliases = IndexMap::new();
        for (location, address) in entries {
            let address: Address = address.as_ref().parse()?;
            aliases.insert(location.into(), address);
        }
        Ok(Self { aliases })
    }

    pub fn get(&self, location: &str) -> Option<Address> {
        self.aliases.get(location).copied()
    }

    pub fn contains(&self, location: &str) -> bool {
        self.aliases.contains_key(location)
    }
}

impl<L: Into<String>> FromIterator<(L, Address)> for AliasTable {
    fn from_iter<I: IntoIterator<Item = (L, Address)>>(iter: I) -> Self {
        Self {
            aliases: iter.into_iter().map(|(l, a)| (l.into(), a)).collect(),
        }
    }
}
