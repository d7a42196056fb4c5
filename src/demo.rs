use crate::catalog::{PermissionCatalog, SdkCatalog};
use crate::models::FullScanReport;
use crate::report::{build_app_report, build_full_report, AppIdentity};
use crate::scoring::RiskEngine;
use std::collections::BTreeMap;

/// Builds a full report from canned sample apps, scored through the real
/// engine. Used by the `demo` subcommand so the tool can be tried without
/// a connected device.
pub fn sample_report(permissions: &PermissionCatalog, sdk: &SdkCatalog) -> FullScanReport {
    let engine = RiskEngine::new(permissions, sdk);

    let samples: &[(&str, &str, &[&str], u32, u32, &[&str])] = &[
        (
            "com.social.app",
            "Social Media App",
            &[
                "android.permission.CAMERA",
                "android.permission.RECORD_AUDIO",
                "android.permission.ACCESS_FINE_LOCATION",
                "android.permission.READ_CONTACTS",
                "android.permission.READ_SMS",
                "android.permission.INTERNET",
            ],
            31,
            21,
            &[],
        ),
        (
            "com.banking.app",
            "Banking App",
            &[
                "android.permission.INTERNET",
                "android.permission.ACCESS_FINE_LOCATION",
                "android.permission.CAMERA",
                "android.permission.SYSTEM_ALERT_WINDOW",
            ],
            33,
            26,
            &[],
        ),
        (
            "com.game.casual",
            "Casual Game",
            &[
                "android.permission.INTERNET",
                "android.permission.ACCESS_WIFI_STATE",
            ],
            33,
            24,
            &[],
        ),
        (
            "com.flashlight.free",
            "Free Flashlight",
            &[
                "android.permission.CAMERA",
                "android.permission.ACCESS_FINE_LOCATION",
                "android.permission.READ_CONTACTS",
                "android.permission.READ_CALL_LOG",
                "android.permission.SEND_SMS",
                "android.permission.RECORD_AUDIO",
                "android.permission.INTERNET",
            ],
            28,
            19,
            &["http://api.example.com/data"],
        ),
    ];

    let mut reports = Vec::new();
    for &(package, name, perms, target_sdk, min_sdk, urls) in samples {
        let perms: Vec<String> = perms.iter().map(|s| s.to_string()).collect();
        let analysis = engine.score_permissions(&perms);
        let sdk_analysis = engine.score_sdk(target_sdk, min_sdk);

        reports.push(build_app_report(
            AppIdentity {
                package_name: package.to_string(),
                app_name: name.to_string(),
                version_name: "1.0.0".to_string(),
                version_code: 1,
                target_sdk,
                min_sdk,
                permissions: perms,
            },
            &analysis,
            &sdk_analysis,
            urls.iter().map(|s| s.to_string()).collect(),
        ));
    }

    let mut device_info = BTreeMap::new();
    for (key, value) in [
        ("model", "Demo Device"),
        ("manufacturer", "Sample"),
        ("android_version", "13"),
        ("sdk_version", "33"),
        ("security_patch", "2024-01-01"),
    ] {
        device_info.insert(key.to_string(), value.to_string());
    }

    build_full_report(device_info, reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_report_is_consistent() {
        let permissions = PermissionCatalog::builtin();
        let sdk = SdkCatalog::builtin();
        let report = sample_report(&permissions, &sdk);

        assert_eq!(report.total_apps, 4);
        // Free Flashlight requests the heaviest permission set and leads
        assert_eq!(report.apps[0].package_name, "com.flashlight.free");
        assert_eq!(report.summary.apps_with_insecure_urls, 1);
        assert_eq!(
            report.total_apps,
            report.high_risk_apps + report.medium_risk_apps + report.low_risk_apps
        );
    }
}
