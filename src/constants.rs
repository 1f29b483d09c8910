/// Node id of the flow source.
pub const SOURCE: usize = 0;

/// Node id of the flow sink.
pub const SINK: usize = 1;

/// Largest number of participants the table can be built for. Secrets are
/// encoded as `u8` bitmasks, so participant indices must fit in eight bits.
pub const MAX_SUPPORTED_PARTIES: u8 = 8;

/// Default upper bound on `N` when building the canonical table.
pub const DEFAULT_MAX_PARTIES: u8 = 6;

/// Smallest threshold with a non-trivial sharing pattern.
pub const MIN_THRESHOLD: u8 = 2;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = ".shard-recover/conf.toml";

/// Prefix of the environment variables read by the config layer.
pub const ENV_PREFIX: &str = "RECOVER";
