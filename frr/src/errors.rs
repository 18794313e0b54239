// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Errors when driving FRR

use std::path::PathBuf;
use thiserror::Error;

use crate::driver::FrrDriverParamsBuilderError;

#[derive(Error, Debug)]
pub enum FrrErr {
    #[error("Invalid section pattern '{0}': {1}")]
    BadPattern(String, String),

    #[error("Invalid driver parameters: {0}")]
    BadParams(#[from] FrrDriverParamsBuilderError),

    #[error("Failed to run {}: {}", .0.display(), .1)]
    SpawnFailed(PathBuf, String),

    #[error("Failed to write {}: {}", .0.display(), .1)]
    WriteFailed(PathBuf, String),

    #[error("Failed to load running configuration: {0}")]
    LoadFailed(String),

    #[error("Reloading error: {0}")]
    ReloadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_messages() {
        let err = FrrErr::SpawnFailed(PathBuf::from("/usr/bin/vtysh"), "not found".to_string());
        assert_eq!(err.to_string(), "Failed to run /usr/bin/vtysh: not found");
        let err = FrrErr::WriteFailed(PathBuf::from("/tmp/frr.conf"), "read-only".to_string());
        assert_eq!(err.to_string(), "Failed to write /tmp/frr.conf: read-only");
    }
}
