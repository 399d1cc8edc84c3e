use lustre_gpu::{shaders, FilterProgram};

use crate::filter::Filter;

/// Copies its input unchanged
#[derive(Clone, Debug)]
pub struct PassthroughFilter {
    pub enabled: bool,
}

impl Default for PassthroughFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl PassthroughFilter {
    pub fn new() -> Self {
        Self { enabled: true }
    }
}

impl Filter for PassthroughFilter {
    fn label(&self) -> &str {
        "passthrough"
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn program(&self) -> FilterProgram {
        FilterProgram::new("Passthrough Filter", shaders::PASSTHROUGH_SHADER)
    }
}
