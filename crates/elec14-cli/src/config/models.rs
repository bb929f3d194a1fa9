use elec14::core::io::text::InputPaths;
use elec14::engine::config::EvaluationConfig;
use std::path::PathBuf;

pub struct AppConfig {
    pub inputs: InputPaths,
    pub pairs_csv: Option<PathBuf>,
    /// Name of the energy unit system, or `custom` for an explicit constant.
    pub units_label: String,
    pub core_config: EvaluationConfig,
}
