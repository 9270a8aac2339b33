//! Engine configuration.

/// Tunable defaults threaded through [`crate::Engine::new`].
///
/// The defaults match the shipped ruleset conventions: patients under
/// 15 use the pediatric checklists, and ER terminations without
/// explicit metadata fall back to the emergency severity/department.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Patients strictly younger than this use the pediatric ER checklists.
    pub pediatric_age_threshold: f64,
    /// Severity id applied when a screening item carries none.
    pub default_severity: String,
    /// Department id applied when a screening item carries none.
    pub default_department: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            pediatric_age_threshold: 15.0,
            default_severity: "sev003".to_string(),
            default_department: "dept002".to_string(),
        }
    }
}
