use crate::constants::STATS_AGE_BUCKETS;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct GenerationSample {
    pub generation: u64,
    pub total_alive: u64,
    pub alive_by_age: [u64; STATS_AGE_BUCKETS],
    pub deaths_by_age: [u64; STATS_AGE_BUCKETS],
    pub overlay_records: usize,
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub start_generation: u64,
    pub final_generation: u64,
    pub sample_every: u64,
    pub final_alive: u64,
    pub samples: Vec<GenerationSample>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub final_snapshot: String,
}

impl RunSummary {
    pub fn generations_run(&self) -> u64 {
        self.final_generation - self.start_generation
    }
}
