// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Type for configuration / validation failures
//! Any result returned by the validation or configuration builder methods returned
//! in this crate is a `ConfigError`.

use thiserror::Error;

/// The reasons why we may reject a configuration
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(String),
    #[error("Malformed configuration: {0}")]
    Malformed(String),

    // mutually exclusive options
    #[error("Can not use hello-multiplier and dead-interval concurrently for \"{0}\"!")]
    HelloMultiplierWithDeadInterval(String),
    #[error("Can not use both md5 and plaintext-password at the same time for \"{0}\"!")]
    ConflictingAuthentication(String),
    #[error(
        "You can not have \"split-horizon poison-reverse\" enabled with \"split-horizon disable\" for \"{0}\"!"
    )]
    ConflictingSplitHorizon(String),
    #[error("Only one area-type can be configured for area \"{0}\"!")]
    ConflictingAreaType(String),
    #[error("Can not use on-match goto and on-match next together in route-map \"{0}\" rule {1}!")]
    ConflictingOnMatch(String, u32),

    // references
    #[error("Route-map \"{0}\" does not exist!")]
    NoSuchRouteMap(String),
    #[error("Access-list \"{0}\" does not exist!")]
    NoSuchAccessList(String),
    #[error("Prefix-list \"{0}\" does not exist!")]
    NoSuchPrefixList(String),
    #[error("Interface \"{0}\" does not exist!")]
    NoSuchInterface(String),

    // policy objects
    #[error("Invalid rule {1} in prefix-list \"{0}\": {2}")]
    BadPrefixListRule(String, u32, String),
    #[error("Invalid access-list \"{0}\": {1}")]
    BadAccessList(String, &'static str),
    #[error("Invalid rule {1} in access-list \"{0}\": {2}")]
    BadAccessListRule(String, u32, &'static str),
}

/// Result-like type for configurations
pub type ConfigResult = Result<(), ConfigError>;

