//! Kademlia node Id or a lookup target
use rand::{rngs::OsRng, CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha1_smol::Sha1;
use std::{
    fmt::{self, Debug, Display, Formatter},
    str::FromStr,
};

use crate::{Error, Result};

/// The size of node IDs in bytes.
pub const ID_SIZE: usize = 20;
/// The size of node IDs in bits, and the largest [Distance::log2].
pub const MAX_DISTANCE: u8 = ID_SIZE as u8 * 8;

/// Random bytes hashed into every generated Id.
const SEED_SIZE: usize = 32;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Kademlia node Id or a lookup target.
///
/// Stored big-endian, so the derived ordering is the ordering of the
/// 160-bit unsigned integer it represents.
pub struct Id(pub [u8; ID_SIZE]);

impl Id {
    /// The smallest Id, `0`.
    pub const MIN: Id = Id([0; ID_SIZE]);
    /// The largest Id, `2^160 - 1`.
    pub const MAX: Id = Id([u8::MAX; ID_SIZE]);

    /// Generate a fresh Id from the operating system's secure random source.
    pub fn random() -> Id {
        Self::generate(&mut OsRng)
    }

    /// Generate a fresh Id from the given cryptographically secure source.
    ///
    /// Every call draws new entropy from `rng` and hashes it with SHA-1,
    /// so the resulting Id is unpredictable and uniformly distributed.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Id {
        let mut seed = [0u8; SEED_SIZE];
        rng.fill_bytes(&mut seed);

        Id(Sha1::from(seed).digest().bytes())
    }

    /// Create a new Id from some bytes. Returns Err if `bytes` is not of length
    /// [ID_SIZE].
    pub fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> Result<Id> {
        let bytes = bytes.as_ref();
        let array: [u8; ID_SIZE] = bytes
            .try_into()
            .map_err(|_| Error::InvalidIdSize(bytes.len()))?;

        Ok(Id(array))
    }

    /// XOR distance between this Id and a target Id.
    ///
    /// Distance to self is zero, and the distance is symmetric.
    pub fn distance(&self, other: &Id) -> Distance {
        let mut xor = [0u8; ID_SIZE];

        for (i, byte) in xor.iter_mut().enumerate() {
            *byte = self.0[i] ^ other.0[i];
        }

        Distance(xor)
    }

    pub fn as_bytes(&self) -> &[u8; ID_SIZE] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl AsRef<[u8]> for Id {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; ID_SIZE]> for Id {
    fn from(bytes: [u8; ID_SIZE]) -> Self {
        Id(bytes)
    }
}

impl TryFrom<&[u8]> for Id {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Id::from_bytes(bytes)
    }
}

impl FromStr for Id {
    type Err = Error;

    fn from_str(s: &str) -> Result<Id> {
        let mut bytes = [0u8; ID_SIZE];
        hex::decode_to_slice(s, &mut bytes)?;

        Ok(Id(bytes))
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl Debug for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// XOR of two [Id]s, ordered as an unsigned 160-bit integer. Smaller is closer.
pub struct Distance([u8; ID_SIZE]);

impl Distance {
    pub const ZERO: Distance = Distance([0; ID_SIZE]);

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Number of leading zero bits, i.e. the length of the common prefix
    /// of the two Ids.
    pub fn leading_zeros(&self) -> u32 {
        let mut zeros = 0;

        for byte in self.0 {
            zeros += byte.leading_zeros();

            if byte != 0 {
                break;
            }
        }

        zeros
    }

    /// Simplified distance: the number of bits after the common prefix.
    ///
    /// Distance to self is 0
    /// Distance to the furthest Id is 160
    /// Distance to an Id with 5 leading matching bits is 155
    pub fn log2(&self) -> u8 {
        MAX_DISTANCE - self.leading_zeros() as u8
    }

    pub fn as_bytes(&self) -> &[u8; ID_SIZE] {
        &self.0
    }
}

impl Debug for Distance {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Distance({})", hex::encode(self.0))
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn distance_to_self() {
        let id = Id::random();
        let distance = id.distance(&id);

        assert!(distance.is_zero());
        assert_eq!(distance, Distance::ZERO);
        assert_eq!(distance.log2(), 0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Id::random();
        let b = Id::random();

        assert_eq!(a.distance(&b), b.distance(&a));
    }

    #[test]
    fn distance_zero_only_for_equal_ids() {
        let a = Id::random();
        let mut bytes = a.0;
        bytes[ID_SIZE - 1] ^= 1;
        let b = Id(bytes);

        assert!(!a.distance(&b).is_zero());
        assert_eq!(a.distance(&b).log2(), 1);
    }

    #[test]
    fn distance_to_furthest() {
        assert_eq!(Id::MIN.distance(&Id::MAX).log2(), MAX_DISTANCE);
        assert_eq!(Id::MIN.distance(&Id::MAX).leading_zeros(), 0);
    }

    #[test]
    fn distance_with_common_prefix() {
        let a = Id::from_str("0000000000000000000000000000000000000000").unwrap();
        let b = Id::from_str("0400000000000000000000000000000000000000").unwrap();

        assert_eq!(a.distance(&b).leading_zeros(), 5);
        assert_eq!(a.distance(&b).log2(), 155);
    }

    #[test]
    fn distance_orders_as_integer() {
        let target = Id::MIN;
        let near = Id::from_str("00000000000000000000000000000000000000ff").unwrap();
        let far = Id::from_str("0000000000000000000000000000000000000100").unwrap();

        assert!(target.distance(&near) < target.distance(&far));
    }

    #[test]
    fn generated_ids_are_unique() {
        let ids: HashSet<Id> = (0..1000).map(|_| Id::random()).collect();

        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn generate_with_injected_rng() {
        let mut rng = StdRng::from_entropy();
        let a = Id::generate(&mut rng);
        let b = Id::generate(&mut rng);

        assert_ne!(a, b);
    }

    #[test]
    fn from_bytes_round_trip() {
        let bytes: [u8; ID_SIZE] = core::array::from_fn(|i| i as u8);
        let id = Id::from_bytes(bytes).unwrap();

        assert_eq!(id.as_bytes(), &bytes);
        assert_eq!(id.to_vec(), bytes.to_vec());
    }

    #[test]
    fn from_bytes_invalid_size() {
        assert_eq!(Id::from_bytes(b"foo"), Err(Error::InvalidIdSize(3)));
        assert_eq!(Id::from_bytes([0u8; 21]), Err(Error::InvalidIdSize(21)));
    }

    #[test]
    fn hex_text_form() {
        let str = "5a3ce9c14e7a08645677bbd1cfe7d8f956d53256";
        let id = Id::from_str(str).unwrap();

        assert_eq!(id.to_string(), str);
        assert!(matches!(
            Id::from_str("5a3ce9c1"),
            Err(Error::InvalidIdHex(_))
        ));
        assert!(matches!(
            Id::from_str("zz3ce9c14e7a08645677bbd1cfe7d8f956d53256"),
            Err(Error::InvalidIdHex(_))
        ));
    }
}
