use crate::adb::AdbBridge;
use crate::catalog::{PermissionCatalog, SdkCatalog};
use crate::models::{AppSecurityReport, FullScanReport};
use crate::report::{build_app_report, build_full_report};
use crate::scoring::RiskEngine;
use colored::{Color, Colorize};
use log::{debug, info, warn};

/// Drives a scan run: enumerates packages, scores each app and accumulates
/// the per-app reports in scan order
pub struct Scanner<'a> {
    adb: &'a AdbBridge,
    permissions: &'a PermissionCatalog,
    sdk: &'a SdkCatalog,
    include_system: bool,
    results: Vec<AppSecurityReport>,
}

impl<'a> Scanner<'a> {
    pub fn new(
        adb: &'a AdbBridge,
        permissions: &'a PermissionCatalog,
        sdk: &'a SdkCatalog,
        include_system: bool,
    ) -> Self {
        Self {
            adb,
            permissions,
            sdk,
            include_system,
            results: Vec::new(),
        }
    }

    /// Scans every installed app sequentially
    pub fn scan_all(&mut self, deep_scan: bool) -> anyhow::Result<&[AppSecurityReport]> {
        let packages = self.adb.list_packages(self.include_system)?;
        info!("found {} apps to scan", packages.len());

        println!(
            "\n{}",
            format!("Found {} apps to scan", packages.len()).cyan().bold()
        );

        for (i, package) in packages.iter().enumerate() {
            println!(
                "  [{}/{}] scanning {}",
                i + 1,
                packages.len(),
                package.dimmed()
            );
            match self.scan_app(package, deep_scan) {
                Some(report) => self.results.push(report),
                None => debug!("skipped {}: no accessible info", package),
            }
        }

        Ok(&self.results)
    }

    /// Scans a single app. Returns None when the device reports no
    /// permissions for it, which usually means the dump was inaccessible.
    pub fn scan_app(&self, package: &str, deep_scan: bool) -> Option<AppSecurityReport> {
        let identity = match self.adb.package_info(package) {
            Ok(identity) => identity,
            Err(err) => {
                warn!("could not scan {}: {}", package, err);
                return None;
            }
        };

        if identity.permissions.is_empty() {
            return None;
        }

        let engine = RiskEngine::new(self.permissions, self.sdk);
        let permission_analysis = engine.score_permissions(&identity.permissions);
        let sdk_analysis = engine.score_sdk(identity.target_sdk, identity.min_sdk);

        let insecure_urls = if deep_scan {
            self.adb.search_apk_for_urls(package)
        } else {
            Vec::new()
        };

        Some(build_app_report(
            identity,
            &permission_analysis,
            &sdk_analysis,
            insecure_urls,
        ))
    }

    /// Builds the full report from everything scanned so far
    pub fn full_report(self) -> FullScanReport {
        let device_info = self.adb.device_info();
        build_full_report(device_info, self.results)
    }
}

fn risk_color(level: &str) -> Color {
    match level {
        "CRITICAL" => Color::BrightRed,
        "HIGH" => Color::Red,
        "MEDIUM" => Color::Yellow,
        "LOW" => Color::Green,
        _ => Color::Blue,
    }
}

/// Prints a detailed single-app report to the console
pub fn display_app_report(report: &AppSecurityReport) {
    let color = risk_color(&report.risk_level);

    println!("\n{}", report.app_name.bold());
    println!("  {}: {}", "Package".bold(), report.package_name.dimmed());
    println!(
        "  {}: {} ({})",
        "Version".bold(),
        report.version_name,
        report.version_code
    );
    println!(
        "  {}: {} | {}: {}",
        "Target SDK".bold(),
        report.target_sdk,
        "Min SDK".bold(),
        report.min_sdk
    );

    let filled = (report.risk_score / 5) as usize;
    let meter = format!("{}{}", "█".repeat(filled), "░".repeat(20 - filled));
    println!(
        "\n  {}: {} {}/100 {}",
        "Risk Score".bold(),
        meter.color(color),
        report.risk_score,
        report.risk_level.color(color).bold()
    );

    if !report.dangerous_permissions.is_empty() {
        println!(
            "\n  {} ({}):",
            "Dangerous Permissions".red().bold(),
            report.dangerous_permissions.len()
        );
        for perm in &report.dangerous_permissions {
            println!(
                "    {} [{}] {}",
                perm.name.cyan(),
                perm.risk_level.as_str().color(risk_color(perm.risk_level.as_str())),
                perm.description.dimmed()
            );
        }
    }

    if !report.sdk_findings.is_empty() {
        println!("\n  {}:", "SDK Issues".yellow().bold());
        for finding in &report.sdk_findings {
            println!("    ⚠ {}", finding);
        }
    }

    if !report.insecure_urls.is_empty() {
        println!("\n  {}:", "Insecure URLs Found".red().bold());
        for url in report.insecure_urls.iter().take(10) {
            println!("    ✗ {}", url);
        }
    }

    if !report.recommendations.is_empty() {
        println!("\n  {}:", "Recommendations".cyan().bold());
        for rec in report.recommendations.iter().take(10) {
            println!("    → {}", rec);
        }
    }
}

/// Prints the scan-wide summary block
pub fn display_scan_summary(report: &FullScanReport) {
    println!("\n{}", "Scan Summary".cyan().bold());
    println!("  {}: {}", "Total Apps Scanned".bold(), report.total_apps);
    println!("  {}: {}", "High Risk".red().bold(), report.high_risk_apps);
    println!(
        "  {}: {}",
        "Medium Risk".yellow().bold(),
        report.medium_risk_apps
    );
    println!("  {}: {}", "Low Risk".green().bold(), report.low_risk_apps);
    println!(
        "  {}: {}",
        "Dangerous Permissions Found".bold(),
        report.summary.total_dangerous_permissions
    );
    println!(
        "  {}: {}",
        "Apps with Insecure URLs".bold(),
        report.summary.apps_with_insecure_urls
    );
}

/// Prints the high-risk apps table, worst first
pub fn display_high_risk_apps(report: &FullScanReport) {
    let high_risk: Vec<&AppSecurityReport> = report
        .apps
        .iter()
        .filter(|a| a.risk_level == "CRITICAL" || a.risk_level == "HIGH")
        .collect();

    if high_risk.is_empty() {
        println!("\n{}", "✓ No high-risk apps found!".green().bold());
        return;
    }

    println!(
        "\n{}",
        format!("⚠ High Risk Applications ({}):", high_risk.len())
            .red()
            .bold()
    );

    for app in high_risk.iter().take(15) {
        let mut issues = Vec::new();
        if !app.dangerous_permissions.is_empty() {
            issues.push(format!("{} dangerous perms", app.dangerous_permissions.len()));
        }
        if !app.sdk_findings.is_empty() {
            issues.push(format!("{} SDK issues", app.sdk_findings.len()));
        }
        if !app.insecure_urls.is_empty() {
            issues.push(format!("{} insecure URLs", app.insecure_urls.len()));
        }
        let issues = if issues.is_empty() {
            "Review recommended".to_string()
        } else {
            issues.join(", ")
        };

        println!(
            "  {:<28} {:<38} {:>8} {:>5}  {}",
            app.app_name.bold(),
            app.package_name.dimmed(),
            app.risk_level.color(risk_color(&app.risk_level)),
            app.risk_score,
            issues.dimmed()
        );
    }

    if high_risk.len() > 15 {
        println!(
            "  {}",
            format!("... and {} more high-risk apps", high_risk.len() - 15).dimmed()
        );
    }
}
