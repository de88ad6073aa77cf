// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Processor selection, tagged by `type` in YAML.
#[derive(Clone, Debug, Deserialize, Serialize, strum::IntoStaticStr, strum::EnumDiscriminants)]
#[serde(tag = "type", rename_all = "snake_case")]
#[strum_discriminants(
    derive(
        Deserialize,
        Serialize,
        strum::EnumVariantNames,
        strum::IntoStaticStr,
        strum::Display,
    ),
    name(ProcessorName),
    serde(rename_all = "snake_case"),
    strum(serialize_all = "snake_case")
)]
#[strum(serialize_all = "snake_case")]
pub enum ProcessorConfig {
    SetCodeProcessor(SetCodeProcessorConfig),
}

impl ProcessorConfig {
    /// Name recorded in `processor_status`.
    pub fn name(&self) -> &'static str {
        self.into()
    }

    pub fn set_code(&self) -> &SetCodeProcessorConfig {
        match self {
            ProcessorConfig::SetCodeProcessor(config) => config,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SetCodeProcessorConfig {
    /// Scopes every account and designator id.
    pub chain_id: u64,
    /// Blocks per batch read from the source.
    #[serde(default = "SetCodeProcessorConfig::default_batch_size")]
    pub batch_size: usize,
    /// Blocks the fetcher waits before a block counts as final. Informational only.
    #[serde(default)]
    pub finality_confirmation: Option<u64>,
}

impl SetCodeProcessorConfig {
    pub const fn default_batch_size() -> usize {
        DEFAULT_BATCH_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processor_name() {
        let config: ProcessorConfig =
            serde_yaml::from_str("type: set_code_processor\nchain_id: 911867\n").unwrap();

        assert_eq!(config.name(), "set_code_processor");
        assert_eq!(ProcessorName::SetCodeProcessor.to_string(), "set_code_processor");
        assert_eq!(config.set_code().chain_id, 911867);
        assert_eq!(config.set_code().batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.set_code().finality_confirmation, None);
    }

    #[test]
    fn test_unknown_processor_is_rejected() {
        assert!(serde_yaml::from_str::<ProcessorConfig>("type: unknown_processor\nchain_id: 1\n").is_err());
    }
}
