//! Host and toolchain facts attached to every metrics record

pub mod host;
pub mod xcode;

pub use host::{local_host_name, HostFactsError, HostFactsFetcher, SysinfoHostFacts};
pub use xcode::{EnvXcodeFacts, XcodeVersionSource, XCODE_BUILD_NUMBER_KEY, XCODE_VERSION_KEY};
