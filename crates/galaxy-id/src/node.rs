//! Datacenter and worker assignment for a generator.
//!
//! Resolution runs once at startup, in order:
//!
//! 1. An explicit override (numeric, must fit in 5 bits).
//! 2. Host-derived values: the worker ID from the last octet of the first
//!    non-loopback IPv4 address, the datacenter ID from a hash of the
//!    hostname.
//! 3. The fixed default `1`.
//!
//! Nothing here detects two nodes resolving to the same pair. Deployments
//! that run more than one node behind the same hostname hash or the same
//! `/27` worth of last octets must set the overrides by hand.

use std::net::{IpAddr, Ipv4Addr};

use sysinfo::{Networks, System};

/// Maximum value of a 5-bit worker ID.
pub const MAX_WORKER_ID: u8 = (1 << 5) - 1;

/// Maximum value of a 5-bit datacenter ID.
pub const MAX_DATACENTER_ID: u8 = (1 << 5) - 1;

/// Used for either field when neither an override nor the host yields one.
pub const DEFAULT_NODE_ID: u8 = 1;

/// The `(datacenter, worker)` pair a generator stamps into its IDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeIdentity {
    datacenter_id: u8,
    worker_id: u8,
}

impl Default for NodeIdentity {
    fn default() -> Self {
        Self::new(DEFAULT_NODE_ID, DEFAULT_NODE_ID)
    }
}

impl NodeIdentity {
    /// Builds an identity from explicit values. Each value is masked to 5
    /// bits; use [`Self::try_new`] to reject out-of-range input instead.
    pub const fn new(datacenter_id: u8, worker_id: u8) -> Self {
        debug_assert!(datacenter_id <= MAX_DATACENTER_ID, "datacenter_id overflow");
        debug_assert!(worker_id <= MAX_WORKER_ID, "worker_id overflow");
        Self {
            datacenter_id: datacenter_id & MAX_DATACENTER_ID,
            worker_id: worker_id & MAX_WORKER_ID,
        }
    }

    /// Builds an identity, returning `None` if either value exceeds 5 bits.
    pub const fn try_new(datacenter_id: u8, worker_id: u8) -> Option<Self> {
        if datacenter_id > MAX_DATACENTER_ID || worker_id > MAX_WORKER_ID {
            return None;
        }
        Some(Self {
            datacenter_id,
            worker_id,
        })
    }

    pub const fn datacenter_id(&self) -> u64 {
        self.datacenter_id as u64
    }

    pub const fn worker_id(&self) -> u64 {
        self.worker_id as u64
    }

    /// Resolves an identity from optional overrides, falling back to `probe`
    /// and then to [`DEFAULT_NODE_ID`].
    ///
    /// Overrides are taken verbatim from configuration. One that is not a
    /// base-10 integer in `0..=31` is logged and ignored.
    ///
    /// # Example
    /// ```
    /// use galaxy_id::{HostProbe, NodeIdentity};
    /// use std::net::Ipv4Addr;
    ///
    /// struct Fixed;
    /// impl HostProbe for Fixed {
    ///     fn ipv4_addresses(&self) -> Vec<Ipv4Addr> {
    ///         vec![Ipv4Addr::new(10, 0, 0, 37)]
    ///     }
    ///     fn hostname(&self) -> Option<String> {
    ///         None
    ///     }
    /// }
    ///
    /// let identity = NodeIdentity::resolve(None, Some("4"), &Fixed);
    /// assert_eq!(identity.worker_id(), 37 & 31);
    /// assert_eq!(identity.datacenter_id(), 4);
    /// ```
    pub fn resolve(
        worker_override: Option<&str>,
        datacenter_override: Option<&str>,
        probe: &impl HostProbe,
    ) -> Self {
        let worker_id = parse_override("worker", worker_override, MAX_WORKER_ID)
            .or_else(|| {
                probe
                    .ipv4_addresses()
                    .into_iter()
                    .find(|addr| !addr.is_loopback() && !addr.is_unspecified())
                    .map(worker_id_from_ipv4)
            })
            .unwrap_or(DEFAULT_NODE_ID);

        let datacenter_id = parse_override("datacenter", datacenter_override, MAX_DATACENTER_ID)
            .or_else(|| {
                probe
                    .hostname()
                    .filter(|name| !name.is_empty())
                    .map(|name| datacenter_id_from_hostname(&name))
            })
            .unwrap_or(DEFAULT_NODE_ID);

        let identity = Self {
            datacenter_id,
            worker_id,
        };
        tracing::info!(
            datacenter_id = identity.datacenter_id,
            worker_id = identity.worker_id,
            "resolved snowflake node identity"
        );
        identity
    }
}

fn parse_override(field: &str, raw: Option<&str>, max: u8) -> Option<u8> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<u8>() {
        Ok(value) if value <= max => Some(value),
        _ => {
            tracing::warn!(field, value = raw, max, "ignoring invalid node id override");
            None
        }
    }
}

/// Last octet of `addr`, masked to 5 bits.
pub fn worker_id_from_ipv4(addr: Ipv4Addr) -> u8 {
    addr.octets()[3] & MAX_WORKER_ID
}

/// `hash = hash * 31 + byte` over the hostname bytes in wrapping signed
/// 64-bit arithmetic, masked to 5 bits. Distinct hosts can collide.
pub fn datacenter_id_from_hostname(hostname: &str) -> u8 {
    let hash = hostname
        .bytes()
        .fold(0i64, |hash, b| hash.wrapping_mul(31).wrapping_add(i64::from(b)));
    (hash & i64::from(MAX_DATACENTER_ID)) as u8
}

/// Source of host facts used to derive a [`NodeIdentity`].
pub trait HostProbe {
    /// IPv4 addresses of the host's network interfaces, in a stable order.
    fn ipv4_addresses(&self) -> Vec<Ipv4Addr>;

    /// The local hostname, if it can be determined.
    fn hostname(&self) -> Option<String>;
}

/// [`HostProbe`] reading the real host through `sysinfo`.
///
/// Interfaces are visited in name order so the choice is stable across
/// restarts.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemProbe;

impl HostProbe for SystemProbe {
    fn ipv4_addresses(&self) -> Vec<Ipv4Addr> {
        let networks = Networks::new_with_refreshed_list();
        let mut interfaces: Vec<_> = networks.iter().collect();
        interfaces.sort_by(|(a, _), (b, _)| a.cmp(b));

        interfaces
            .into_iter()
            .flat_map(|(_, data)| data.ip_networks().iter())
            .filter_map(|network| match network.addr {
                IpAddr::V4(v4) => Some(v4),
                IpAddr::V6(_) => None,
            })
            .collect()
    }

    fn hostname(&self) -> Option<String> {
        System::host_name()
    }
}
