use elec14::engine::config::{
    BackendSelection, DEFAULT_RELATIVE_TOLERANCE, DEFAULT_WORK_GROUP_SIZE,
};
use elec14::engine::decomposition::PairDecomposition;

pub struct DefaultsConfig {
    pub backend: BackendSelection,
    pub units: String,
    pub platform: usize,
    pub device: usize,
    pub work_group_size: usize,
    pub decomposition: PairDecomposition,
    pub relative_tolerance: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            backend: BackendSelection::Both,
            units: "kj-mol".to_string(),
            platform: 0,
            device: 0,
            work_group_size: DEFAULT_WORK_GROUP_SIZE,
            decomposition: PairDecomposition::Dense,
            relative_tolerance: DEFAULT_RELATIVE_TOLERANCE,
        }
    }
}
