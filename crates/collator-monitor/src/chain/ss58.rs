use blake2::{Blake2b512, Digest};

const CHECKSUM_PREFIX: &[u8] = b"SS58PRE";
const CHECKSUM_LEN: usize = 2;

/// Largest address type the SS58 format can carry.
pub const MAX_PREFIX: u16 = 16_383;

/// SS58-encodes a 32-byte account id with the given network prefix.
pub fn encode(account: &[u8; 32], prefix: u16) -> String {
    let ident = prefix & MAX_PREFIX;
    let mut payload = match ident {
        0..=63 => vec![ident as u8],
        _ => {
            let first = ((ident & 0b0000_0000_1111_1100) as u8) >> 2;
            let second = ((ident >> 8) as u8) | (((ident & 0b0000_0000_0000_0011) as u8) << 6);
            vec![first | 0b0100_0000, second]
        }
    };
    payload.extend_from_slice(account);

    let hash = Blake2b512::new()
        .chain_update(CHECKSUM_PREFIX)
        .chain_update(&payload)
        .finalize();
    payload.extend_from_slice(&hash[..CHECKSUM_LEN]);

    bs58::encode(payload).into_string()
}

/// `1234567890...abcdef` form used in listings.
pub fn shorten(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 16 {
        return address.to_string();
    }
    let head: String = chars[..10].iter().collect();
    let tail: String = chars[chars.len() - 6..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "d43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d";

    fn alice() -> [u8; 32] {
        let mut account = [0u8; 32];
        hex::decode_to_slice(ALICE, &mut account).unwrap();
        account
    }

    #[test]
    fn test_encode_generic_substrate_prefix() {
        assert_eq!(
            encode(&alice(), 42),
            "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY"
        );
    }

    #[test]
    fn test_encode_polkadot_prefix() {
        assert_eq!(
            encode(&alice(), 0),
            "15oF4uVJwmo4TdGW7VfQxNLavjCXviqxT9S1MgbjMNHr6Sp5"
        );
    }

    #[test]
    fn test_encode_kusama_prefix() {
        assert_eq!(
            encode(&alice(), 2),
            "HNZata7iMYWmk5RvZRTiAsSDhV8366zq2YGb3tLH5Upf74F"
        );
    }

    #[test]
    fn test_encode_two_byte_prefix() {
        assert_eq!(
            encode(&alice(), 1284),
            "VdvKmYJfD4VXA9fzz1SbmCo2eYHSzUFbaDCZSuaNKJAe8YNg6"
        );
    }

    #[test]
    fn test_shorten() {
        assert_eq!(
            shorten("16WWmr2Xqgy5fna35GsNHXMU7vDBM12gzHCFGibQjSmKpAN"),
            "16WWmr2Xqg...SmKpAN"
        );
        assert_eq!(shorten("ADDR1"), "ADDR1");
    }
}
