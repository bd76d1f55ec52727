//! # Settings
//!
//! Tunables of the constraint system and its handlers, with the defaults used throughout the
//! tests.

/// Settings of the constraint system.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Settings {
    /// Tolerance when checking solutions.
    pub feasibility_tolerance: f64,
    /// Tolerance for comparing values that should be equal.
    pub epsilon: f64,
    /// Maximum number of propagation rounds per call.
    pub max_propagation_rounds: usize,
    /// Linking constraints.
    pub linking: LinkingSettings,
    /// Logic-or constraints.
    pub logicor: LogicOrSettings,
    /// Conflict analysis.
    pub conflict: ConflictSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            feasibility_tolerance: 1e-6,
            epsilon: 1e-9,
            max_propagation_rounds: 100,
            linking: LinkingSettings::default(),
            logicor: LogicOrSettings::default(),
            conflict: ConflictSettings::default(),
        }
    }
}

/// Settings of the linking constraint handler.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkingSettings {
    /// Add the linear relaxation to the initial LP.
    pub linearize: bool,
    /// Drop binary variables at the ends of the array once they are globally fixed to zero.
    pub remove_fixings: bool,
}

impl Default for LinkingSettings {
    fn default() -> Self {
        Self {
            linearize: true,
            remove_fixings: true,
        }
    }
}

/// Settings of the logic-or constraint handler.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogicOrSettings {
    /// Compare constraints pairwise for subsumption during presolving.
    pub presolve_pairwise: bool,
    /// Detect identical constraints with a hash table during presolving.
    pub presolve_use_hashing: bool,
    /// Number of pairwise comparisons after which the yield is evaluated.
    pub min_comparisons: usize,
    /// Minimal number of removed constraints per comparison to keep comparing.
    pub min_gain_per_min_comparisons: f64,
}

impl Default for LogicOrSettings {
    fn default() -> Self {
        Self {
            presolve_pairwise: true,
            presolve_use_hashing: true,
            min_comparisons: 200_000,
            min_gain_per_min_comparisons: 1e-6,
        }
    }
}

/// Settings of conflict analysis.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConflictSettings {
    /// Analyze conflicts at all.
    pub enabled: bool,
    /// Turn conflicts over binary variables into logic-or constraints.
    pub add_conflicts: bool,
    /// Maximum number of inferred bounds to resolve per conflict.
    pub max_resolution_steps: usize,
}

impl Default for ConflictSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            add_conflicts: true,
            max_resolution_steps: 1_000,
        }
    }
}
