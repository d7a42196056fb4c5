use crate::catalog::{
    PermissionCatalog, SdkCatalog, DEPRECATED_SDK, MIN_RECOMMENDED_SDK, MIN_SECURE_SDK,
};
use crate::models::{
    CategoryGroup, PermissionAnalysis, RiskLevel, SdkAnalysis, SdkVersionRecord,
};
use log::debug;

/// Score contribution per matched permission risk level
fn risk_weight(level: RiskLevel) -> u32 {
    match level {
        RiskLevel::Critical => 25,
        RiskLevel::High => 15,
        RiskLevel::Medium => 8,
        RiskLevel::Low => 3,
        RiskLevel::Info => 1,
    }
}

/// Maps an accumulated score onto an overall risk level
fn overall_risk(score: u32) -> RiskLevel {
    match score {
        70.. => RiskLevel::Critical,
        50.. => RiskLevel::High,
        30.. => RiskLevel::Medium,
        10.. => RiskLevel::Low,
        _ => RiskLevel::Info,
    }
}

/// Stateless risk scoring engine over borrowed catalogs
pub struct RiskEngine<'a> {
    permissions: &'a PermissionCatalog,
    sdk: &'a SdkCatalog,
}

impl<'a> RiskEngine<'a> {
    pub fn new(permissions: &'a PermissionCatalog, sdk: &'a SdkCatalog) -> Self {
        Self { permissions, sdk }
    }

    /// Scores a list of requested permission identifiers.
    ///
    /// Identifiers absent from the catalog are skipped. The input is not
    /// deduplicated: a permission listed twice contributes twice, matching
    /// what the device actually reported.
    pub fn score_permissions(&self, requested: &[String]) -> PermissionAnalysis {
        let mut dangerous = Vec::new();
        let mut categories: Vec<CategoryGroup> = Vec::new();
        let mut score: u32 = 0;

        for identifier in requested {
            let Some(info) = self.permissions.lookup(identifier) else {
                continue;
            };

            score += risk_weight(info.risk_level);

            match categories.iter_mut().find(|g| g.category == info.category) {
                Some(group) => group.permissions.push(info.clone()),
                None => categories.push(CategoryGroup {
                    category: info.category.clone(),
                    permissions: vec![info.clone()],
                }),
            }

            dangerous.push(info.clone());
        }

        let score = score.min(100);

        let recommendations = dangerous
            .iter()
            .flat_map(|info| {
                info.mitigations
                    .iter()
                    .take(2)
                    .map(move |m| format!("[{}] {}", info.name, m))
            })
            .collect();

        debug!(
            "scored {} permissions: {} dangerous, score {}",
            requested.len(),
            dangerous.len(),
            score
        );

        PermissionAnalysis {
            risk_score: score,
            risk_level: overall_risk(score),
            total_permissions: requested.len(),
            dangerous_count: dangerous.len(),
            dangerous_permissions: dangerous,
            categories,
            recommendations,
        }
    }

    /// Analyzes an app's target and minimum SDK levels.
    ///
    /// Findings are emitted in a fixed order and are independent checks:
    /// a very old min SDK can trigger both the insecure and the deprecated
    /// warning.
    pub fn score_sdk(&self, target_sdk: u32, min_sdk: u32) -> SdkAnalysis {
        let target_info = self
            .sdk
            .lookup(target_sdk)
            .cloned()
            .unwrap_or_else(|| fallback_record(target_sdk, RiskLevel::Medium));

        let min_fallback_risk = if min_sdk < MIN_SECURE_SDK {
            RiskLevel::High
        } else {
            RiskLevel::Medium
        };
        let min_info = self
            .sdk
            .lookup(min_sdk)
            .cloned()
            .unwrap_or_else(|| fallback_record(min_sdk, min_fallback_risk));

        let mut findings = Vec::new();

        if target_sdk < MIN_RECOMMENDED_SDK {
            findings.push(format!(
                "Target SDK {} is below recommended minimum ({})",
                target_sdk, MIN_RECOMMENDED_SDK
            ));
        }
        if min_sdk < MIN_SECURE_SDK {
            findings.push(format!(
                "Min SDK {} allows installation on insecure Android versions",
                min_sdk
            ));
        }
        if min_sdk < DEPRECATED_SDK {
            findings.push(format!(
                "Min SDK {} is deprecated and has known vulnerabilities",
                min_sdk
            ));
        }

        SdkAnalysis {
            target_sdk,
            target_info,
            min_sdk,
            min_info,
            findings,
        }
    }
}

fn fallback_record(api_level: u32, risk_level: RiskLevel) -> SdkVersionRecord {
    SdkVersionRecord {
        api_level,
        name: format!("API {}", api_level),
        status: "Unknown".to_string(),
        risk_level,
    }
}
