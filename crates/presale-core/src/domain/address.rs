use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const PUBKEY_BYTES: usize = 32;

/// Base58-encoded 32-byte wallet public key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let decoded = bs58::decode(trimmed)
            .into_vec()
            .map_err(|_| ValidationError::InvalidAddress {
                value: input.to_owned(),
            })?;

        if decoded.len() != PUBKEY_BYTES {
            return Err(ValidationError::InvalidAddress {
                value: input.to_owned(),
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form used by the wallet button.
    pub fn short(&self) -> String {
        format_address(&self.0)
    }
}

impl Display for WalletAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

/// `first5...last3` for addresses of at least 8 characters, otherwise unchanged.
pub fn format_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() < 8 {
        return address.to_owned();
    }

    let head: String = chars[..5].iter().collect();
    let tail: String = chars[chars.len() - 3..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYSTEM_PROGRAM: &str = "11111111111111111111111111111111";
    const TOKEN_PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

    #[test]
    fn formats_long_address() {
        assert_eq!(format_address(TOKEN_PROGRAM), "Token...5DA");
    }

    #[test]
    fn exactly_eight_characters_is_shortened() {
        assert_eq!(format_address("ABCDEFGH"), "ABCDE...FGH");
    }

    #[test]
    fn short_address_is_returned_unformatted() {
        assert_eq!(format_address("ABCDEFG"), "ABCDEFG");
        assert_eq!(format_address(""), "");
    }

    #[test]
    fn parses_valid_public_keys() {
        assert_eq!(
            WalletAddress::parse(SYSTEM_PROGRAM).expect("valid").as_str(),
            SYSTEM_PROGRAM
        );
        assert_eq!(
            WalletAddress::parse(TOKEN_PROGRAM).expect("valid").short(),
            "Token...5DA"
        );
    }

    #[test]
    fn rejects_non_base58_and_wrong_length() {
        assert!(matches!(
            WalletAddress::parse("0OIl-not-base58"),
            Err(ValidationError::InvalidAddress { .. })
        ));
        assert!(matches!(
            WalletAddress::parse("abc"),
            Err(ValidationError::InvalidAddress { .. })
        ));
    }
}
