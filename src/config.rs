//! Options for unlocking keys and decrypting messages.

use derive_builder::Builder;

use crate::errors::{Error, Result};
use crate::types::coded_count;

/// Default upper bound on decompressed message content, 256 MiB.
pub const DEFAULT_MAX_DECOMPRESSED_SIZE: usize = 256 * 1024 * 1024;

/// Default upper bound on iterated S2K byte counts, the largest coded count.
pub const DEFAULT_MAX_S2K_COUNT: usize = 65_011_712;

/// Limits and policies applied by [`Message`](crate::composed::Message) decryption.
///
/// ```
/// use lega_pgp::config::DecryptOptionsBuilder;
///
/// let options = DecryptOptionsBuilder::default()
///     .allow_unprotected_keys(false)
///     .max_decompressed_size(1 << 20)
///     .build()
///     .unwrap();
/// assert!(!options.allow_unprotected_keys);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(build_fn(error = "Error", validate = "Self::validate"))]
pub struct DecryptOptions {
    /// Accept secret keys stored without passphrase protection.
    #[builder(default = "true")]
    pub allow_unprotected_keys: bool,

    /// Inflating compressed packets stops with an error beyond this many bytes.
    #[builder(default = "DEFAULT_MAX_DECOMPRESSED_SIZE")]
    pub max_decompressed_size: usize,

    /// Iterated S2K specifiers in messages asking for more bytes are rejected.
    #[builder(default = "DEFAULT_MAX_S2K_COUNT")]
    pub max_s2k_count: usize,
}

impl DecryptOptionsBuilder {
    fn validate(&self) -> Result<()> {
        if let Some(0) = self.max_decompressed_size {
            crate::bail!("max_decompressed_size must not be zero");
        }
        if let Some(count) = self.max_s2k_count {
            crate::ensure!(
                count >= coded_count(0),
                "max_s2k_count {} is below the smallest coded count {}",
                count,
                coded_count(0)
            );
        }

        Ok(())
    }
}

impl Default for DecryptOptions {
    fn default() -> Self {
        DecryptOptions {
            allow_unprotected_keys: true,
            max_decompressed_size: DEFAULT_MAX_DECOMPRESSED_SIZE,
            max_s2k_count: DEFAULT_MAX_S2K_COUNT,
        }
    }
}
