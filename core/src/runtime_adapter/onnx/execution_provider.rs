//! Execution Provider configuration for ONNX Runtime.
//!
//! | Provider | Platform | Hardware | Feature Flag |
//! |----------|----------|----------|--------------|
//! | CPU | All | CPU | (default) |
//! | CoreML | macOS/iOS | Neural Engine, GPU, CPU | `coreml-ep` |

use std::fmt;

/// Execution provider selection for ONNX Runtime.
///
/// If the selected provider is unavailable, ONNX Runtime falls back to CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionProviderKind {
    /// CPU execution (default, always available)
    #[default]
    Cpu,

    /// CoreML execution provider (macOS/iOS only)
    ///
    /// Requires the `coreml-ep` feature flag.
    #[cfg(feature = "coreml-ep")]
    CoreML(CoreMLConfig),
}

impl fmt::Display for ExecutionProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            #[cfg(feature = "coreml-ep")]
            Self::CoreML(config) => write!(f, "coreml-{}", config.compute_units),
        }
    }
}

impl ExecutionProviderKind {
    /// Returns the name of this execution provider.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            #[cfg(feature = "coreml-ep")]
            Self::CoreML(_) => "coreml",
        }
    }

    /// Parses a provider name as given on the command line.
    ///
    /// Accepts `cpu` always, and `coreml`, `coreml-ane`, `coreml-gpu`,
    /// `coreml-cpu`, `coreml-all` when built with `coreml-ep`.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        if lower == "cpu" {
            return Some(Self::Cpu);
        }
        #[cfg(feature = "coreml-ep")]
        {
            if lower == "coreml" {
                return Some(Self::CoreML(CoreMLConfig::default()));
            }
            if let Some(units) = lower.strip_prefix("coreml-") {
                return CoreMLComputeUnits::parse(units).map(|compute_units| {
                    Self::CoreML(CoreMLConfig {
                        compute_units,
                        ..Default::default()
                    })
                });
            }
        }
        None
    }
}

/// CoreML execution provider configuration.
#[cfg(feature = "coreml-ep")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreMLConfig {
    /// Which compute units to use for inference.
    pub compute_units: CoreMLComputeUnits,

    /// Whether to enable CoreML on subgraphs (control flow operators).
    pub use_subgraphs: bool,
}

#[cfg(feature = "coreml-ep")]
impl Default for CoreMLConfig {
    fn default() -> Self {
        Self {
            compute_units: CoreMLComputeUnits::default(),
            use_subgraphs: true,
        }
    }
}

/// CoreML compute unit selection.
#[cfg(feature = "coreml-ep")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoreMLComputeUnits {
    CpuOnly,
    CpuAndGpu,
    /// Neural Engine, available on A12+ and M1+ chips.
    #[default]
    CpuAndNeuralEngine,
    All,
}

#[cfg(feature = "coreml-ep")]
impl fmt::Display for CoreMLComputeUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CpuOnly => write!(f, "cpu"),
            Self::CpuAndGpu => write!(f, "gpu"),
            Self::CpuAndNeuralEngine => write!(f, "ane"),
            Self::All => write!(f, "all"),
        }
    }
}

#[cfg(feature = "coreml-ep")]
impl CoreMLComputeUnits {
    /// Accepts: "cpu", "gpu", "ane", "neural-engine", "all"
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cpu" | "cpu-only" => Some(Self::CpuOnly),
            "gpu" | "cpu-gpu" => Some(Self::CpuAndGpu),
            "ane" | "neural-engine" | "cpu-ane" => Some(Self::CpuAndNeuralEngine),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}
