use std::str::FromStr;

use coins_bip32::path::DerivationPath;

use super::derivation_path_to_bytes;

/// Identifies which key on the card a derivation (or non-derivation) is
/// relative to, mirroring the applet's `deriveSource` P1 bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPath {
    /// Use the current key as-is, no derivation.
    Current,
    /// Derive from the master key. `None` re-selects the master key itself.
    FromMaster(Option<DerivationPath>),
    /// Derive from the parent of the current key.
    FromParent(DerivationPath),
    /// Derive from the current key.
    FromCurrent(DerivationPath),
}

/// Whether a derived key replaces the card's current key or is used once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeriveMode {
    /// Derive for a single operation; the card's current key is unchanged.
    Temporary,
    /// Derive and make the result the card's new current key.
    Persistent,
}

const DERIVE_OPTION_CURRENT: u8 = 0x00;
const DERIVE_OPTION_DERIVE: u8 = 0x01;
const DERIVE_OPTION_DERIVE_AND_MAKE_CURRENT: u8 = 0x02;

const DERIVE_SOURCE_MASTER: u8 = 0x00;
const DERIVE_SOURCE_PARENT: u8 = 0x40;
const DERIVE_SOURCE_CURRENT: u8 = 0x80;

/// Computes the P1 byte and optional encoded path body for a command that
/// takes a [`KeyPath`] (DERIVE KEY, EXPORT KEY, SIGN).
///
/// P1 combines a derivation option (current / derive / derive & make
/// current) with a source indicator (master / parent / current), per the
/// applet's GENERATE derivation commands.
pub(crate) fn prepare_derivation_parameters(
    key_path: &KeyPath,
    derive_mode: Option<DeriveMode>,
) -> Result<(u8, Option<Vec<u8>>), crate::Error> {
    let (source, path) = match key_path {
        KeyPath::Current => (DERIVE_SOURCE_MASTER, None),
        KeyPath::FromMaster(path) => (DERIVE_SOURCE_MASTER, path.as_ref()),
        KeyPath::FromParent(path) => (DERIVE_SOURCE_PARENT, Some(path)),
        KeyPath::FromCurrent(path) => (DERIVE_SOURCE_CURRENT, Some(path)),
    };

    if let Some(path) = path {
        if path.len() > 10 {
            return Err(crate::Error::InvalidDerivationPathLength);
        }
    }

    let option = match key_path {
        KeyPath::Current => DERIVE_OPTION_CURRENT,
        _ => match derive_mode.unwrap_or(DeriveMode::Temporary) {
            DeriveMode::Temporary => DERIVE_OPTION_DERIVE,
            DeriveMode::Persistent => DERIVE_OPTION_DERIVE_AND_MAKE_CURRENT,
        },
    };

    let p1 = option | source;
    let data = path.map(|p| derivation_path_to_bytes(p).to_vec());

    Ok((p1, data))
}

fn parse_component(part: &str) -> Result<u32, crate::Error> {
    let (digits, hardened) = match part.strip_suffix('\'') {
        Some(digits) => (digits, true),
        None => (part, false),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(crate::Error::InvalidData(
            "derivation path component is not a non-negative integer",
        ));
    }

    let value: u32 = digits
        .parse()
        .map_err(|_| crate::Error::InvalidData("derivation path component out of range"))?;

    Ok(if hardened { value | 0x8000_0000 } else { value })
}

impl FromStr for KeyPath {
    type Err = crate::Error;

    /// Parses the `/`-delimited key path syntax: an optional leading source
    /// marker (`m` for master, `..` for parent, `.` or nothing for current),
    /// followed by up to 10 decimal components each optionally suffixed with
    /// `'` to mark it hardened.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/').peekable();

        #[derive(PartialEq, Eq)]
        enum Source {
            Master,
            Parent,
            Current,
        }

        let source = match parts.peek().copied() {
            Some("m") => {
                parts.next();
                Source::Master
            }
            Some("..") => {
                parts.next();
                Source::Parent
            }
            Some(".") => {
                parts.next();
                Source::Current
            }
            _ => Source::Current,
        };

        let components = parts
            .filter(|part| !part.is_empty())
            .map(parse_component)
            .collect::<Result<Vec<u32>, _>>()?;

        if components.len() > 10 {
            return Err(crate::Error::InvalidDerivationPathLength);
        }

        Ok(match source {
            Source::Master if components.is_empty() => KeyPath::FromMaster(None),
            Source::Master => KeyPath::FromMaster(Some(DerivationPath::from_iter(components))),
            Source::Parent => KeyPath::FromParent(DerivationPath::from_iter(components)),
            Source::Current if components.is_empty() => KeyPath::Current,
            Source::Current => KeyPath::FromCurrent(DerivationPath::from_iter(components)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_master_path_with_hardened_components() {
        let key_path = KeyPath::from_str("m/44'/60'/0'/0/0").unwrap();
        match key_path {
            KeyPath::FromMaster(Some(path)) => {
                let components: Vec<u32> = path.iter().collect();
                assert_eq!(
                    components,
                    vec![
                        44 | 0x8000_0000,
                        60 | 0x8000_0000,
                        0 | 0x8000_0000,
                        0,
                        0
                    ]
                );
            }
            other => panic!("expected FromMaster(Some(_)), got {other:?}"),
        }
    }

    #[test]
    fn bare_master_path_has_no_components() {
        assert_eq!(KeyPath::from_str("m").unwrap(), KeyPath::FromMaster(None));
    }

    #[test]
    fn empty_path_means_current_key() {
        assert_eq!(KeyPath::from_str("").unwrap(), KeyPath::Current);
    }

    #[test]
    fn parent_and_current_prefixes_are_recognized() {
        assert!(matches!(
            KeyPath::from_str("../0").unwrap(),
            KeyPath::FromParent(_)
        ));
        assert!(matches!(
            KeyPath::from_str("./0").unwrap(),
            KeyPath::FromCurrent(_)
        ));
        assert!(matches!(
            KeyPath::from_str("0").unwrap(),
            KeyPath::FromCurrent(_)
        ));
    }

    #[test]
    fn rejects_non_digit_components() {
        assert!(KeyPath::from_str("m/abc").is_err());
    }

    #[test]
    fn rejects_more_than_ten_components() {
        assert!(KeyPath::from_str("m/0/0/0/0/0/0/0/0/0/0/0").is_err());
    }

    #[test]
    fn prepare_derivation_parameters_combines_option_and_source() {
        let (p1, data) = prepare_derivation_parameters(&KeyPath::Current, None).unwrap();
        assert_eq!(p1, 0x00);
        assert!(data.is_none());

        let (p1, data) =
            prepare_derivation_parameters(&KeyPath::FromMaster(None), Some(DeriveMode::Persistent))
                .unwrap();
        assert_eq!(p1, DERIVE_OPTION_DERIVE_AND_MAKE_CURRENT | DERIVE_SOURCE_MASTER);
        assert!(data.is_none());

        let path = DerivationPath::from_iter([0u32, 1]);
        let (p1, data) =
            prepare_derivation_parameters(&KeyPath::FromParent(path), Some(DeriveMode::Temporary))
                .unwrap();
        assert_eq!(p1, DERIVE_OPTION_DERIVE | DERIVE_SOURCE_PARENT);
        assert_eq!(data.unwrap().len(), 8);
    }
}
