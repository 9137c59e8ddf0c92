//! Configuration for the track matcher.
//!
//! Defaults follow the values tuned for through-going cosmic-ray tracks;
//! load alternatives from YAML for reproducible reprocessing.
//!
//! # Example
//!
//! ```rust
//! use kirana_match::MatcherConfig;
//!
//! let config = MatcherConfig::default().with_min_matched_hits(5);
//! assert!(config.validate().is_ok());
//! ```

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration validation failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A length, count, or radius that must be positive is not.
    #[error("{name} must be positive (got {value})")]
    NotPositive {
        /// Field name.
        name: &'static str,
        /// Offending value.
        value: f32,
    },
    /// A fraction lies outside (0, 1].
    #[error("{name} must lie in (0, 1] (got {value})")]
    BadFraction {
        /// Field name.
        name: &'static str,
        /// Offending value.
        value: f32,
    },
    /// The three input list names are not pairwise distinct.
    #[error("input cluster list names must be distinct")]
    DuplicateListNames,
}

/// Errors loading configuration from YAML.
#[derive(Debug, thiserror::Error)]
pub enum YamlConfigError {
    /// IO error reading the file.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// Configuration validation failed.
    #[error("config validation error: {0}")]
    Validation(#[from] ConfigError),
}

/// Tunables of the three-view matching algorithm.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Name of the U-view input cluster list.
    pub input_list_u: String,
    /// Name of the V-view input cluster list.
    pub input_list_v: String,
    /// Name of the W-view input cluster list.
    pub input_list_w: String,

    /// Minimum end-to-end cluster length for a cluster to be fitted and
    /// matched (length units). Default: 10.0
    pub cluster_min_length: f32,

    /// Sliding-fit smoothing half-window (samples). Default: 15
    pub sliding_fit_half_window: usize,

    /// Number of evenly spaced sample points across a pair's shared drift
    /// range. Default: 100
    pub n_sampling_points: usize,

    /// Minimum absolute drift overlap between paired clusters. Default: 3.0
    pub min_x_overlap: f32,

    /// Minimum overlap as a fraction of the pair's union span. Default: 0.8
    pub min_x_overlap_fraction: f32,

    /// Radius around a predicted position within which a third-view hit is
    /// associated. Default: 1.5
    pub max_point_displacement: f32,

    /// Maximum spacing between an associated hit and its nearest associated
    /// neighbor; isolated hits are dropped as noise. Default: 5.0
    pub max_hit_displacement: f32,

    /// Minimum fraction of predicted samples that must be explained by a
    /// matched hit. Default: 0.8
    pub min_matched_point_fraction: f32,

    /// Minimum number of matched hits for a candidate to be accepted.
    /// Default: 10
    pub min_matched_hits: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            input_list_u: "ClustersU".to_string(),
            input_list_v: "ClustersV".to_string(),
            input_list_w: "ClustersW".to_string(),
            cluster_min_length: 10.0,
            sliding_fit_half_window: 15,
            n_sampling_points: 100,
            min_x_overlap: 3.0,
            min_x_overlap_fraction: 0.8,
            max_point_displacement: 1.5,
            max_hit_displacement: 5.0,
            min_matched_point_fraction: 0.8,
            min_matched_hits: 10,
        }
    }
}

impl MatcherConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum clean-cluster length.
    pub fn with_cluster_min_length(mut self, length: f32) -> Self {
        self.cluster_min_length = length;
        self
    }

    /// Set the sliding-fit half-window.
    pub fn with_sliding_fit_half_window(mut self, half_window: usize) -> Self {
        self.sliding_fit_half_window = half_window;
        self
    }

    /// Set the number of trajectory sample points.
    pub fn with_n_sampling_points(mut self, n: usize) -> Self {
        self.n_sampling_points = n;
        self
    }

    /// Set the hit association radius.
    pub fn with_max_point_displacement(mut self, radius: f32) -> Self {
        self.max_point_displacement = radius;
        self
    }

    /// Set the maximum hit-to-neighbor spacing.
    pub fn with_max_hit_displacement(mut self, radius: f32) -> Self {
        self.max_hit_displacement = radius;
        self
    }

    /// Set the minimum matched-hit count.
    pub fn with_min_matched_hits(mut self, count: usize) -> Self {
        self.min_matched_hits = count;
        self
    }

    /// Set the three input cluster list names.
    pub fn with_input_lists(
        mut self,
        u: impl Into<String>,
        v: impl Into<String>,
        w: impl Into<String>,
    ) -> Self {
        self.input_list_u = u.into();
        self.input_list_v = v.into();
        self.input_list_w = w.into();
        self
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
            if value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::NotPositive { name, value })
            }
        }
        fn fraction(name: &'static str, value: f32) -> Result<(), ConfigError> {
            if value > 0.0 && value <= 1.0 {
                Ok(())
            } else {
                Err(ConfigError::BadFraction { name, value })
            }
        }

        positive("cluster_min_length", self.cluster_min_length)?;
        positive("min_x_overlap", self.min_x_overlap)?;
        positive("max_point_displacement", self.max_point_displacement)?;
        positive("max_hit_displacement", self.max_hit_displacement)?;
        positive("sliding_fit_half_window", self.sliding_fit_half_window as f32)?;
        positive("n_sampling_points", self.n_sampling_points as f32)?;
        positive("min_matched_hits", self.min_matched_hits as f32)?;
        fraction("min_x_overlap_fraction", self.min_x_overlap_fraction)?;
        fraction(
            "min_matched_point_fraction",
            self.min_matched_point_fraction,
        )?;

        if self.input_list_u == self.input_list_v
            || self.input_list_v == self.input_list_w
            || self.input_list_w == self.input_list_u
        {
            return Err(ConfigError::DuplicateListNames);
        }

        Ok(())
    }

    /// Load configuration from a YAML file and validate it.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, YamlConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Load configuration from a YAML string and validate it.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, YamlConfigError> {
        let config: MatcherConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to a YAML string.
    pub fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
