//! Bridge configuration.

use gangway_protocol::{ProtocolVersion, ARENA_SIZE};

/// Configuration for the host side of the bridge.
///
/// The protocol version is part of configuration by design: the V1/V2
/// divergence (PROTOCOL.md §7) is resolved here, once, rather than
/// guessed from call-site behavior.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Size of the request workspace the host asks the guest to
    /// reserve, and the overflow bound for request encoding.
    /// Default: 65536, the value every observed deployment uses.
    pub arena_size: u32,

    /// Wire protocol version spoken by the guest.
    pub version: ProtocolVersion,

    /// Ceiling on the guest's linear memory, in bytes.
    /// Default: 16 MiB.
    pub max_memory_bytes: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            arena_size: ARENA_SIZE as u32,
            version: ProtocolVersion::V2,
            max_memory_bytes: 16 * 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert_eq!(config.arena_size, 65536);
        assert_eq!(config.version, ProtocolVersion::V2);
        assert_eq!(config.max_memory_bytes, 16 * 1024 * 1024);
    }
}
