//! ActivityStreams 1 <-> 2 conversion core.
//! Pure, synchronous tree transformations over `serde_json` values.

pub mod audience;
pub mod convert;
pub mod links;
pub mod logging;
pub mod model;
pub mod util;
pub mod vocab;

pub use audience::{address, is_public};
pub use convert::error::{ConvertError, ConvertResult};
pub use convert::from_as1::from_as1;
pub use convert::options::{FromAs1Options, ToAs1Options};
pub use convert::to_as1::to_as1;
pub use links::{get_url, get_urls, link_tags};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::reference::Reference;
pub use model::{CONTEXT, PUBLIC_AUDIENCE, PUBLICS};
pub use util::json::Object;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
