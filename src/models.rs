use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Risk classification used for permissions, SDK levels and whole apps
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    /// No meaningful risk
    Info,

    /// Low risk
    Low,

    /// Moderate risk
    Medium,

    /// High risk
    High,

    /// Critical risk
    Critical,
}

impl RiskLevel {
    /// Uppercase string form, matching the serialized representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Critical => "CRITICAL",
            RiskLevel::High => "HIGH",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::Low => "LOW",
            RiskLevel::Info => "INFO",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Catalog entry describing a known dangerous Android permission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionRecord {
    /// Fully-qualified permission identifier (e.g. `android.permission.READ_SMS`)
    pub identifier: String,

    /// Short human-readable name (e.g. `READ_SMS`)
    pub name: String,

    /// Risk level of the permission itself
    pub risk_level: RiskLevel,

    /// Grouping such as "SMS", "Camera", "Location"
    pub category: String,

    /// One-line description of what the permission allows
    pub description: String,

    /// Concrete risks the permission exposes the user to
    pub risks: Vec<String>,

    /// Mitigation advice, most important first
    pub mitigations: Vec<String>,

    /// Safer APIs or patterns the app could use instead
    pub secure_alternatives: Vec<String>,
}

/// Catalog entry for a known Android API level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdkVersionRecord {
    /// API level (e.g. 34)
    pub api_level: u32,

    /// Marketing name (e.g. "Android 14"), or `API <n>` for unknown levels
    pub name: String,

    /// Support status as free text ("Current", "EOL", "Unknown", ...)
    pub status: String,

    /// Risk attributed to running at this level
    pub risk_level: RiskLevel,
}

/// Matched permissions grouped under one category, in first-seen order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub category: String,
    pub permissions: Vec<PermissionRecord>,
}

/// Result of scoring one app's permission list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionAnalysis {
    /// Weighted risk score, clamped to 0..=100
    pub risk_score: u32,

    /// Overall level derived from the score thresholds
    pub risk_level: RiskLevel,

    /// Catalog records for every requested permission found, in input order
    pub dangerous_permissions: Vec<PermissionRecord>,

    /// Matched records grouped by category, categories in first-seen order
    pub categories: Vec<CategoryGroup>,

    /// Mitigation advice, at most two entries per matched permission
    pub recommendations: Vec<String>,

    /// Number of permissions the app requested
    pub total_permissions: usize,

    /// Number of requested permissions present in the catalog
    pub dangerous_count: usize,
}

/// Result of analyzing an app's target/min SDK levels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdkAnalysis {
    pub target_sdk: u32,
    pub target_info: SdkVersionRecord,
    pub min_sdk: u32,
    pub min_info: SdkVersionRecord,

    /// Human-readable warnings, in fixed emission order (0..=3 entries)
    pub findings: Vec<String>,
}

/// Flattened permission data embedded in an app report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DangerousPermission {
    pub name: String,
    pub risk_level: RiskLevel,
    pub category: String,
    pub description: String,
}

/// Security report for a single scanned app; never mutated after creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSecurityReport {
    pub package_name: String,
    pub app_name: String,
    pub version_name: String,
    pub version_code: i64,
    pub target_sdk: u32,
    pub min_sdk: u32,

    /// Full raw permission list as reported by the device
    pub permissions: Vec<String>,

    pub dangerous_permissions: Vec<DangerousPermission>,
    pub risk_score: u32,
    pub risk_level: String,
    pub sdk_findings: Vec<String>,

    /// Deduplicated, capped at 20; populated only by deep scans
    pub insecure_urls: Vec<String>,

    pub recommendations: Vec<String>,
    pub scan_time: String,
}

/// Dangerous-permission frequency entry in the fleet summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionCount {
    pub permission: String,
    pub count: usize,
}

/// Cross-app statistics computed at aggregation time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Most frequent dangerous permissions across all apps (top 10)
    pub most_common_permissions: Vec<PermissionCount>,

    /// Package names of the five highest-scoring apps
    pub highest_risk_apps: Vec<String>,

    /// Dangerous-permission occurrences summed over all apps
    pub total_dangerous_permissions: usize,

    /// Apps with at least one insecure URL
    pub apps_with_insecure_urls: usize,
}

/// Complete report for one scan run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullScanReport {
    /// Device identity snapshot, passed through verbatim
    pub device_info: BTreeMap<String, String>,

    pub scan_time: String,
    pub total_apps: usize,
    pub high_risk_apps: usize,
    pub medium_risk_apps: usize,
    pub low_risk_apps: usize,

    /// App reports sorted by risk score descending; ties keep scan order
    pub apps: Vec<AppSecurityReport>,

    pub summary: ScanSummary,
}
