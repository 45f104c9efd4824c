use core::{fmt, hash::Hash, str::FromStr, time::Duration};

use thiserror::Error;

/// A trait representing a layout-compatible Snowflake ID.
///
/// This trait abstracts the core behavior of a Snowflake-style ID with separate
/// bit fields for timestamp, datacenter ID, worker ID and sequence. The
/// generator only speaks in terms of this trait, so alternative layouts can be
/// plugged in without touching the generation loop.
///
/// # Example
///
/// ```
/// use galaxy_id::{GalaxyId, SnowflakeId};
///
/// let id = GalaxyId::from_components(1000, 2, 7, 1);
/// assert_eq!(id.timestamp(), 1000);
/// assert_eq!(id.datacenter_id(), 2);
/// assert_eq!(id.worker_id(), 7);
/// assert_eq!(id.sequence(), 1);
/// ```
pub trait SnowflakeId:
    Sized + Copy + Clone + fmt::Display + fmt::Debug + PartialOrd + Ord + PartialEq + Eq + Hash
{
    /// Returns the timestamp portion of the ID.
    fn timestamp(&self) -> u64;

    /// Returns the maximum possible value for the timestamp field.
    fn max_timestamp() -> u64;

    /// Returns the datacenter ID portion of the ID.
    fn datacenter_id(&self) -> u64;

    /// Returns the maximum possible value for the datacenter field.
    fn max_datacenter_id() -> u64;

    /// Returns the worker ID portion of the ID.
    fn worker_id(&self) -> u64;

    /// Returns the maximum possible value for the worker field.
    fn max_worker_id() -> u64;

    /// Returns the sequence portion of the ID.
    fn sequence(&self) -> u64;

    /// Returns the maximum possible value for the sequence field.
    fn max_sequence() -> u64;

    /// Constructs a new Snowflake ID from its components.
    fn from_components(timestamp: u64, datacenter_id: u64, worker_id: u64, sequence: u64)
    -> Self;

    /// Converts this type into its raw representation.
    fn to_raw(&self) -> u64;

    /// Converts a raw value into this type.
    fn from_raw(raw: u64) -> Self;

    /// Returns true if the current sequence value can be incremented.
    fn has_sequence_room(&self) -> bool {
        self.sequence() < Self::max_sequence()
    }

    /// Returns a new ID with the sequence incremented.
    fn increment_sequence(&self) -> Self {
        Self::from_components(
            self.timestamp(),
            self.datacenter_id(),
            self.worker_id(),
            self.sequence() + 1,
        )
    }

    /// Returns a new ID for a newer timestamp with sequence reset to zero.
    fn rollover_to_timestamp(&self, ts: u64) -> Self {
        Self::from_components(ts, self.datacenter_id(), self.worker_id(), 0)
    }
}

/// The Galaxy primary-key layout.
///
/// - 1 bit reserved (always zero, keeps the value positive as `i64`)
/// - 41 bits timestamp (ms since the generator epoch, [`TWITTER_EPOCH`] by
///   default)
/// - 5 bits datacenter ID
/// - 5 bits worker ID
/// - 12 bits sequence
///
/// ```text
///  Bit Index:  63   62            22 21      17 16      12 11           0
///              +----+----------------+----------+----------+-------------+
///  Field:      | 0  | timestamp (41) |  dc (5)  |  wk (5)  | sequence(12)|
///              +----+----------------+----------+----------+-------------+
/// ```
///
/// [`TWITTER_EPOCH`]: crate::TWITTER_EPOCH
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GalaxyId {
    id: u64,
}

impl GalaxyId {
    /// Bitmask for the 41-bit timestamp field. Occupies bits 22 through 62.
    pub const TIMESTAMP_MASK: u64 = (1 << 41) - 1;

    /// Bitmask for the 5-bit datacenter field. Occupies bits 17 through 21.
    pub const DATACENTER_ID_MASK: u64 = (1 << 5) - 1;

    /// Bitmask for the 5-bit worker field. Occupies bits 12 through 16.
    pub const WORKER_ID_MASK: u64 = (1 << 5) - 1;

    /// Bitmask for the 12-bit sequence field. Occupies bits 0 through 11.
    pub const SEQUENCE_MASK: u64 = (1 << 12) - 1;

    pub const TIMESTAMP_SHIFT: u64 = 22;
    pub const DATACENTER_ID_SHIFT: u64 = 17;
    pub const WORKER_ID_SHIFT: u64 = 12;
    pub const SEQUENCE_SHIFT: u64 = 0;

    /// The reserved top bit. A valid ID never has it set.
    pub const RESERVED_MASK: u64 = 1 << 63;

    pub const fn from(timestamp: u64, datacenter_id: u64, worker_id: u64, sequence: u64) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let datacenter_id = (datacenter_id & Self::DATACENTER_ID_MASK) << Self::DATACENTER_ID_SHIFT;
        let worker_id = (worker_id & Self::WORKER_ID_MASK) << Self::WORKER_ID_SHIFT;
        let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: timestamp | datacenter_id | worker_id | sequence,
        }
    }

    /// Extracts the timestamp from the packed ID.
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the datacenter ID from the packed ID.
    pub const fn datacenter_id(&self) -> u64 {
        (self.id >> Self::DATACENTER_ID_SHIFT) & Self::DATACENTER_ID_MASK
    }

    /// Extracts the worker ID from the packed ID.
    pub const fn worker_id(&self) -> u64 {
        (self.id >> Self::WORKER_ID_SHIFT) & Self::WORKER_ID_MASK
    }

    /// Extracts the sequence number from the packed ID.
    pub const fn sequence(&self) -> u64 {
        (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    /// Milliseconds since the Unix epoch at which this ID was minted, given
    /// the epoch its generator counted from.
    pub const fn unix_millis(&self, epoch: Duration) -> u64 {
        self.timestamp() + epoch.as_millis() as u64
    }

    /// Returns the ID as a zero-padded 20-digit string.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }
}

impl SnowflakeId for GalaxyId {
    fn timestamp(&self) -> u64 {
        self.timestamp()
    }

    fn max_timestamp() -> u64 {
        Self::TIMESTAMP_MASK
    }

    fn datacenter_id(&self) -> u64 {
        self.datacenter_id()
    }

    fn max_datacenter_id() -> u64 {
        Self::DATACENTER_ID_MASK
    }

    fn worker_id(&self) -> u64 {
        self.worker_id()
    }

    fn max_worker_id() -> u64 {
        Self::WORKER_ID_MASK
    }

    fn sequence(&self) -> u64 {
        self.sequence()
    }

    fn max_sequence() -> u64 {
        Self::SEQUENCE_MASK
    }

    fn from_components(
        timestamp: u64,
        datacenter_id: u64,
        worker_id: u64,
        sequence: u64,
    ) -> Self {
        debug_assert!(timestamp <= Self::TIMESTAMP_MASK, "timestamp overflow");
        debug_assert!(
            datacenter_id <= Self::DATACENTER_ID_MASK,
            "datacenter_id overflow"
        );
        debug_assert!(worker_id <= Self::WORKER_ID_MASK, "worker_id overflow");
        debug_assert!(sequence <= Self::SEQUENCE_MASK, "sequence overflow");
        Self::from(timestamp, datacenter_id, worker_id, sequence)
    }

    fn to_raw(&self) -> u64 {
        self.id
    }

    fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }
}

impl fmt::Display for GalaxyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Errors returned when parsing a [`GalaxyId`] from its decimal string form.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseIdError {
    #[error("id string is empty")]
    Empty,
    #[error("id string contains a non-digit character at byte {position}")]
    InvalidDigit { position: usize },
    #[error("id does not fit in 64 bits")]
    Overflow,
    #[error("id {raw} has the reserved bit set")]
    ReservedBitSet { raw: u64 },
}

impl FromStr for GalaxyId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseIdError::Empty);
        }
        let mut raw: u64 = 0;
        for (position, b) in s.bytes().enumerate() {
            if !b.is_ascii_digit() {
                return Err(ParseIdError::InvalidDigit { position });
            }
            raw = raw
                .checked_mul(10)
                .and_then(|r| r.checked_add(u64::from(b - b'0')))
                .ok_or(ParseIdError::Overflow)?;
        }
        if raw & Self::RESERVED_MASK != 0 {
            return Err(ParseIdError::ReservedBitSet { raw });
        }
        Ok(Self::from_raw(raw))
    }
}

struct FieldLayout {
    name: &'static str,
    bits: u8,
    value: u64,
}

impl GalaxyId {
    fn fields(&self) -> [FieldLayout; 5] {
        [
            FieldLayout {
                name: "reserved",
                bits: 1,
                value: self.id >> 63,
            },
            FieldLayout {
                name: "timestamp",
                bits: 41,
                value: self.timestamp(),
            },
            FieldLayout {
                name: "datacenter_id",
                bits: 5,
                value: self.datacenter_id(),
            },
            FieldLayout {
                name: "worker_id",
                bits: 5,
                value: self.worker_id(),
            },
            FieldLayout {
                name: "sequence",
                bits: 12,
                value: self.sequence(),
            },
        ]
    }
}

impl fmt::Debug for GalaxyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn center(s: &str, width: usize) -> String {
            let pad = width.saturating_sub(s.len());
            let left = pad / 2;
            format!("{}{}{}", " ".repeat(left), s, " ".repeat(pad - left))
        }

        let fields = self.fields();
        let labels: Vec<String> = fields
            .iter()
            .map(|field| format!("{} ({})", field.name, field.bits))
            .collect();
        let decimals: Vec<String> = fields.iter().map(|field| field.value.to_string()).collect();
        // +2 for padding
        let widths: Vec<usize> = labels
            .iter()
            .zip(&decimals)
            .map(|(label, dec)| label.len().max(dec.len()) + 2)
            .collect();

        let border = |f: &mut fmt::Formatter<'_>| -> fmt::Result {
            write!(f, "        +")?;
            for &w in &widths {
                write!(f, "{}+", "-".repeat(w))?;
            }
            writeln!(f)
        };

        writeln!(f, "GalaxyId {{")?;
        writeln!(f, "    raw id     : 0x{:016x} ({})", self.id, self.id)?;
        writeln!(f, "    padded     : {}", self.to_padded_string())?;
        writeln!(f, "    layout     :")?;
        border(f)?;
        write!(f, "        |")?;
        for (label, &w) in labels.iter().zip(&widths) {
            write!(f, "{}|", center(label, w))?;
        }
        writeln!(f)?;
        border(f)?;
        write!(f, "        |")?;
        for (dec, &w) in decimals.iter().zip(&widths) {
            write!(f, "{}|", center(dec, w))?;
        }
        writeln!(f)?;
        border(f)?;
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TWITTER_EPOCH;

    #[test]
    fn galaxy_id_fields_and_bounds() {
        let ts = GalaxyId::TIMESTAMP_MASK;
        let dc = GalaxyId::DATACENTER_ID_MASK;
        let wk = GalaxyId::WORKER_ID_MASK;
        let seq = GalaxyId::SEQUENCE_MASK;

        let id = GalaxyId::from_components(ts, dc, wk, seq);
        assert_eq!(id.timestamp(), ts);
        assert_eq!(id.datacenter_id(), dc);
        assert_eq!(id.worker_id(), wk);
        assert_eq!(id.sequence(), seq);
        assert_eq!(id.to_raw(), u64::MAX >> 1, "only the reserved bit is clear");
    }

    #[test]
    fn galaxy_id_matches_reference_packing() {
        // ((ts) << 22) | (dc << 17) | (worker << 12) | seq
        let id = GalaxyId::from_components(1_000, 3, 9, 42);
        let expected = (1_000u64 << 22) | (3 << 17) | (9 << 12) | 42;
        assert_eq!(id.to_raw(), expected);
    }

    #[test]
    fn galaxy_id_fields_do_not_bleed() {
        let id = GalaxyId::from_components(0, GalaxyId::DATACENTER_ID_MASK, 0, 0);
        assert_eq!(id.worker_id(), 0);
        assert_eq!(id.timestamp(), 0);

        let id = GalaxyId::from_components(0, 0, GalaxyId::WORKER_ID_MASK, 0);
        assert_eq!(id.datacenter_id(), 0);
        assert_eq!(id.sequence(), 0);
    }

    #[test]
    fn galaxy_id_ordering_follows_timestamp_then_sequence() {
        let a = GalaxyId::from_components(10, 31, 31, 4095);
        let b = GalaxyId::from_components(11, 0, 0, 0);
        assert!(a < b);

        let c = GalaxyId::from_components(11, 0, 0, 1);
        assert!(b < c);
    }

    #[test]
    fn unix_millis_adds_epoch() {
        let id = GalaxyId::from_components(5, 0, 0, 0);
        assert_eq!(id.unix_millis(TWITTER_EPOCH), 1_288_834_974_662);
    }

    #[test]
    fn parse_round_trips_display() {
        let id = GalaxyId::from_components(123_456_789, 4, 17, 99);
        let parsed: GalaxyId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);

        let padded: GalaxyId = id.to_padded_string().parse().unwrap();
        assert_eq!(padded, id);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!("".parse::<GalaxyId>(), Err(ParseIdError::Empty));
        assert_eq!(
            "12a4".parse::<GalaxyId>(),
            Err(ParseIdError::InvalidDigit { position: 2 })
        );
        assert_eq!(
            "-1".parse::<GalaxyId>(),
            Err(ParseIdError::InvalidDigit { position: 0 })
        );
        assert_eq!(
            "18446744073709551616".parse::<GalaxyId>(),
            Err(ParseIdError::Overflow)
        );
        assert_eq!(
            u64::MAX.to_string().parse::<GalaxyId>(),
            Err(ParseIdError::ReservedBitSet { raw: u64::MAX })
        );
    }

    #[test]
    fn debug_renders_layout() {
        let id = GalaxyId::from_components(1, 2, 3, 4);
        let rendered = format!("{id:?}");
        assert!(rendered.starts_with("GalaxyId {"));
        assert!(rendered.contains("datacenter_id (5)"));
        assert!(rendered.contains("worker_id (5)"));
        assert!(rendered.contains(&id.to_padded_string()));
    }
}
