use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a step in the build tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    /// The root step of the whole build
    Main,
    Target,
    Detail,
}

/// Subtype of a `detail` step, as reported by xclogparser
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DetailStepType {
    CCompilation,
    SwiftCompilation,
    ScriptExecution,
    CreateStaticLibrary,
    Linker,
    CopySwiftLibs,
    CompileAssetsCatalog,
    CompileStoryboard,
    WriteAuxiliaryFile,
    LinkStoryboards,
    CopyResourceFile,
    MergeSwiftModule,
    #[serde(rename = "XIBCompilation")]
    XibCompilation,
    SwiftAggregatedCompilation,
    PrecompileBridgingHeader,
    ValidateEmbeddedBinary,
    Validate,
    Other,
    #[default]
    None,
    #[serde(other)]
    Unknown,
}

impl DetailStepType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetailStepType::CCompilation => "cCompilation",
            DetailStepType::SwiftCompilation => "swiftCompilation",
            DetailStepType::ScriptExecution => "scriptExecution",
            DetailStepType::CreateStaticLibrary => "createStaticLibrary",
            DetailStepType::Linker => "linker",
            DetailStepType::CopySwiftLibs => "copySwiftLibs",
            DetailStepType::CompileAssetsCatalog => "compileAssetsCatalog",
            DetailStepType::CompileStoryboard => "compileStoryboard",
            DetailStepType::WriteAuxiliaryFile => "writeAuxiliaryFile",
            DetailStepType::LinkStoryboards => "linkStoryboards",
            DetailStepType::CopyResourceFile => "copyResourceFile",
            DetailStepType::MergeSwiftModule => "mergeSwiftModule",
            DetailStepType::XibCompilation => "XIBCompilation",
            DetailStepType::SwiftAggregatedCompilation => "swiftAggregatedCompilation",
            DetailStepType::PrecompileBridgingHeader => "precompileBridgingHeader",
            DetailStepType::ValidateEmbeddedBinary => "validateEmbeddedBinary",
            DetailStepType::Validate => "validate",
            DetailStepType::Other => "other",
            DetailStepType::None => "none",
            DetailStepType::Unknown => "unknown",
        }
    }

    /// Intermediate node grouping swift compilations under a target
    pub fn is_aggregation(&self) -> bool {
        matches!(self, DetailStepType::SwiftAggregatedCompilation)
    }
}

impl fmt::Display for DetailStepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One build step as produced by the log parser.
///
/// Timestamps are seconds since the Unix epoch with sub-second precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStepRecord {
    pub identifier: String,
    #[serde(default)]
    pub parent_identifier: String,
    #[serde(rename = "type")]
    pub kind: StepKind,
    #[serde(default)]
    pub detail_step_type: DetailStepType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub architecture: String,
    #[serde(default, rename = "documentURL")]
    pub document_url: String,
    #[serde(default)]
    pub start_timestamp: f64,
    #[serde(default)]
    pub end_timestamp: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub compilation_end_timestamp: f64,
    #[serde(default)]
    pub compilation_duration: f64,
    #[serde(default)]
    pub warning_count: u32,
    #[serde(default)]
    pub error_count: u32,
    #[serde(default)]
    pub fetched_from_cache: bool,
}

impl BuildStepRecord {
    /// A step with empty descriptive fields and zeroed timings
    pub fn new(
        identifier: impl Into<String>,
        parent_identifier: impl Into<String>,
        kind: StepKind,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            parent_identifier: parent_identifier.into(),
            kind,
            detail_step_type: DetailStepType::None,
            title: String::new(),
            signature: String::new(),
            architecture: String::new(),
            document_url: String::new(),
            start_timestamp: 0.0,
            end_timestamp: 0.0,
            duration: 0.0,
            compilation_end_timestamp: 0.0,
            compilation_duration: 0.0,
            warning_count: 0,
            error_count: 0,
            fetched_from_cache: false,
        }
    }

    pub fn with_detail_type(mut self, detail_type: DetailStepType) -> Self {
        self.detail_step_type = detail_type;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    pub fn cached(mut self, fetched_from_cache: bool) -> Self {
        self.fetched_from_cache = fetched_from_cache;
        self
    }
}
