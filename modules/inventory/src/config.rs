use serde::{Deserialize, Serialize};

/// Configuration for the inventory module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InventoryConfig {
    /// Hold an in-process lock across each read-modify-write.
    #[serde(default)]
    pub serialize_writes: bool,
    /// Size of the synthetic buyer roster written with the seed document.
    #[serde(default = "default_seed_buyers")]
    pub seed_buyers: usize,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            serialize_writes: false,
            seed_buyers: default_seed_buyers(),
        }
    }
}

fn default_seed_buyers() -> usize {
    10
}
