use crate::models::{
    AppSecurityReport, DangerousPermission, FullScanReport, PermissionAnalysis, PermissionCount,
    RiskLevel, ScanSummary, SdkAnalysis,
};
use chrono::Local;
use std::collections::BTreeMap;

/// Static identity of a scanned app, as scraped from the device
#[derive(Debug, Clone, Default)]
pub struct AppIdentity {
    pub package_name: String,
    pub app_name: String,
    pub version_name: String,
    pub version_code: i64,
    pub target_sdk: u32,
    pub min_sdk: u32,
    pub permissions: Vec<String>,
}

/// Assembles the immutable per-app report from finished analysis results.
///
/// Pure assembly: nothing is rescored here.
pub fn build_app_report(
    identity: AppIdentity,
    permission_analysis: &PermissionAnalysis,
    sdk_analysis: &SdkAnalysis,
    insecure_urls: Vec<String>,
) -> AppSecurityReport {
    let dangerous_permissions = permission_analysis
        .dangerous_permissions
        .iter()
        .map(|info| DangerousPermission {
            name: info.name.clone(),
            risk_level: info.risk_level,
            category: info.category.clone(),
            description: info.description.clone(),
        })
        .collect();

    AppSecurityReport {
        package_name: identity.package_name,
        app_name: identity.app_name,
        version_name: identity.version_name,
        version_code: identity.version_code,
        target_sdk: identity.target_sdk,
        min_sdk: identity.min_sdk,
        permissions: identity.permissions,
        dangerous_permissions,
        risk_score: permission_analysis.risk_score,
        risk_level: permission_analysis.risk_level.to_string(),
        sdk_findings: sdk_analysis.findings.clone(),
        insecure_urls,
        recommendations: permission_analysis.recommendations.clone(),
        scan_time: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

/// Aggregates per-app reports into the full scan report.
///
/// An empty app list produces a zero-valued report rather than an error.
pub fn build_full_report(
    device_info: BTreeMap<String, String>,
    app_reports: Vec<AppSecurityReport>,
) -> FullScanReport {
    let high_risk_apps = app_reports
        .iter()
        .filter(|a| a.risk_level == RiskLevel::Critical.as_str() || a.risk_level == RiskLevel::High.as_str())
        .count();
    let medium_risk_apps = app_reports
        .iter()
        .filter(|a| a.risk_level == RiskLevel::Medium.as_str())
        .count();
    let low_risk_apps = app_reports
        .iter()
        .filter(|a| {
            a.risk_level == RiskLevel::Low.as_str() || a.risk_level == RiskLevel::Info.as_str()
        })
        .count();

    let summary = ScanSummary {
        most_common_permissions: most_common_permissions(&app_reports),
        highest_risk_apps: Vec::new(), // filled after the sort below
        total_dangerous_permissions: app_reports
            .iter()
            .map(|a| a.dangerous_permissions.len())
            .sum(),
        apps_with_insecure_urls: app_reports
            .iter()
            .filter(|a| !a.insecure_urls.is_empty())
            .count(),
    };

    let total_apps = app_reports.len();
    let mut apps = app_reports;
    // Stable sort: ties keep the original scan order
    apps.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));

    let summary = ScanSummary {
        highest_risk_apps: apps.iter().take(5).map(|a| a.package_name.clone()).collect(),
        ..summary
    };

    FullScanReport {
        device_info,
        scan_time: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        total_apps,
        high_risk_apps,
        medium_risk_apps,
        low_risk_apps,
        apps,
        summary,
    }
}

/// Tallies dangerous-permission names across all apps, keeping the top 10.
///
/// Counting iterates apps in scan order, so equal counts tie-break by the
/// order a permission was first seen.
fn most_common_permissions(app_reports: &[AppSecurityReport]) -> Vec<PermissionCount> {
    let mut counts: Vec<PermissionCount> = Vec::new();

    for app in app_reports {
        for perm in &app.dangerous_permissions {
            match counts.iter_mut().find(|c| c.permission == perm.name) {
                Some(entry) => entry.count += 1,
                None => counts.push(PermissionCount {
                    permission: perm.name.clone(),
                    count: 1,
                }),
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(10);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PermissionCatalog, SdkCatalog};
    use crate::scoring::RiskEngine;

    fn scan_app(package: &str, permissions: &[&str]) -> AppSecurityReport {
        let perm_catalog = PermissionCatalog::builtin();
        let sdk_catalog = SdkCatalog::builtin();
        let engine = RiskEngine::new(&perm_catalog, &sdk_catalog);

        let permissions: Vec<String> = permissions.iter().map(|s| s.to_string()).collect();
        let analysis = engine.score_permissions(&permissions);
        let sdk = engine.score_sdk(33, 26);

        build_app_report(
            AppIdentity {
                package_name: package.to_string(),
                app_name: package.to_string(),
                version_name: "1.0.0".to_string(),
                version_code: 1,
                target_sdk: 33,
                min_sdk: 26,
                permissions,
            },
            &analysis,
            &sdk,
            Vec::new(),
        )
    }

    #[test]
    fn app_report_flattens_analysis() {
        let report = scan_app("com.example.app", &["android.permission.CAMERA"]);
        assert_eq!(report.risk_score, 15);
        assert_eq!(report.risk_level, "LOW");
        assert_eq!(report.dangerous_permissions.len(), 1);
        assert_eq!(report.dangerous_permissions[0].name, "CAMERA");
        assert_eq!(report.dangerous_permissions[0].category, "Camera");
        assert!(report.sdk_findings.is_empty());
    }

    #[test]
    fn empty_scan_produces_zero_report() {
        let report = build_full_report(BTreeMap::new(), Vec::new());
        assert_eq!(report.total_apps, 0);
        assert_eq!(report.high_risk_apps, 0);
        assert_eq!(report.medium_risk_apps, 0);
        assert_eq!(report.low_risk_apps, 0);
        assert!(report.apps.is_empty());
        assert!(report.summary.most_common_permissions.is_empty());
        assert!(report.summary.highest_risk_apps.is_empty());
        assert_eq!(report.summary.total_dangerous_permissions, 0);
        assert_eq!(report.summary.apps_with_insecure_urls, 0);
    }

    #[test]
    fn three_app_scan_end_to_end() {
        let apps = vec![
            scan_app("com.app.one", &[]),
            scan_app("com.app.two", &["android.permission.CAMERA"]),
            scan_app(
                "com.app.three",
                &[
                    "android.permission.SYSTEM_ALERT_WINDOW",
                    "android.permission.BIND_ACCESSIBILITY_SERVICE",
                ],
            ),
        ];
        let report = build_full_report(BTreeMap::new(), apps);

        assert_eq!(report.total_apps, 3);
        assert_eq!(report.high_risk_apps, 1);
        assert_eq!(report.medium_risk_apps, 0);
        assert_eq!(report.low_risk_apps, 2);

        let order: Vec<(&str, u32)> = report
            .apps
            .iter()
            .map(|a| (a.package_name.as_str(), a.risk_score))
            .collect();
        assert_eq!(
            order,
            vec![("com.app.three", 50), ("com.app.two", 15), ("com.app.one", 0)]
        );
        assert_eq!(report.summary.total_dangerous_permissions, 3);
    }

    #[test]
    fn counts_are_invariant_under_input_permutation() {
        let a = scan_app("com.app.a", &["android.permission.CAMERA"]);
        let b = scan_app("com.app.b", &["android.permission.READ_SMS"]);
        let c = scan_app(
            "com.app.c",
            &[
                "android.permission.READ_SMS",
                "android.permission.SEND_SMS",
                "android.permission.READ_CONTACTS",
            ],
        );

        let forward = build_full_report(BTreeMap::new(), vec![a.clone(), b.clone(), c.clone()]);
        let reversed = build_full_report(BTreeMap::new(), vec![c, b, a]);

        assert_eq!(forward.high_risk_apps, reversed.high_risk_apps);
        assert_eq!(forward.medium_risk_apps, reversed.medium_risk_apps);
        assert_eq!(forward.low_risk_apps, reversed.low_risk_apps);
        assert_eq!(
            forward.summary.total_dangerous_permissions,
            reversed.summary.total_dangerous_permissions
        );

        let scores = |r: &FullScanReport| r.apps.iter().map(|x| x.risk_score).collect::<Vec<_>>();
        assert_eq!(scores(&forward), scores(&reversed));
    }

    #[test]
    fn sort_is_stable_for_equal_scores() {
        let apps = vec![
            scan_app("com.first", &["android.permission.CAMERA"]),
            scan_app("com.second", &["android.permission.RECORD_AUDIO"]),
            scan_app("com.third", &["android.permission.CALL_PHONE"]),
        ];
        let report = build_full_report(BTreeMap::new(), apps);
        // All three score 15; scan order must survive the sort
        let order: Vec<&str> = report.apps.iter().map(|a| a.package_name.as_str()).collect();
        assert_eq!(order, vec!["com.first", "com.second", "com.third"]);
    }

    #[test]
    fn common_permissions_ranked_with_first_seen_tie_break() {
        let apps = vec![
            scan_app("com.a", &["android.permission.CAMERA", "android.permission.READ_SMS"]),
            scan_app("com.b", &["android.permission.READ_SMS"]),
            scan_app("com.c", &["android.permission.RECORD_AUDIO"]),
        ];
        let report = build_full_report(BTreeMap::new(), apps);
        let ranked: Vec<(&str, usize)> = report
            .summary
            .most_common_permissions
            .iter()
            .map(|c| (c.permission.as_str(), c.count))
            .collect();
        // READ_SMS appears twice; CAMERA ties RECORD_AUDIO but was seen first
        assert_eq!(
            ranked,
            vec![("READ_SMS", 2), ("CAMERA", 1), ("RECORD_AUDIO", 1)]
        );
    }

    #[test]
    fn highest_risk_apps_lists_top_five_packages() {
        let mut apps = Vec::new();
        for i in 0..7 {
            // i * 15, far from the clamp, so every app scores differently
            let perms: Vec<&str> = std::iter::repeat("android.permission.CAMERA")
                .take(i)
                .collect();
            apps.push(scan_app(&format!("com.app.{}", i), &perms));
        }
        let report = build_full_report(BTreeMap::new(), apps);
        assert_eq!(report.summary.highest_risk_apps.len(), 5);
        assert_eq!(report.summary.highest_risk_apps[0], "com.app.6");
    }

    #[test]
    fn insecure_url_apps_are_counted() {
        let mut with_urls = scan_app("com.leaky", &["android.permission.INTERNET"]);
        with_urls.insecure_urls = vec!["http://api.example.com/data".to_string()];
        let clean = scan_app("com.clean", &["android.permission.INTERNET"]);

        let report = build_full_report(BTreeMap::new(), vec![with_urls, clean]);
        assert_eq!(report.summary.apps_with_insecure_urls, 1);
    }
}
