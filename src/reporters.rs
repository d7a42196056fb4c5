use crate::cli::OutputFormat;
use crate::models::FullScanReport;
use anyhow::Result;
use chrono::Local;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};

const TEXT_TEMPLATE: &str = r#"================================================================================
                          MOBILE SECURITY SCAN REPORT
================================================================================

Scan Time: {{ report.scan_time }}
Device: {{ report.device_info.model | default(value="Unknown") }} (Android {{ report.device_info.android_version | default(value="Unknown") }})

--------------------------------------------------------------------------------
                                   SUMMARY
--------------------------------------------------------------------------------

Total Apps Scanned:     {{ report.total_apps }}
High Risk Apps:         {{ report.high_risk_apps }}
Medium Risk Apps:       {{ report.medium_risk_apps }}
Low Risk Apps:          {{ report.low_risk_apps }}
Dangerous Permissions:  {{ report.summary.total_dangerous_permissions }}
Apps w/ Insecure URLs:  {{ report.summary.apps_with_insecure_urls }}

--------------------------------------------------------------------------------
                                 APP DETAILS
--------------------------------------------------------------------------------
{% for app in report.apps %}
┌──────────────────────────────────────────────────────────────────────────────┐
│ {{ app.app_name }} ({{ app.package_name }})
├──────────────────────────────────────────────────────────────────────────────┤
│ Version: {{ app.version_name }} ({{ app.version_code }})
│ Risk Level: {{ app.risk_level }} (Score: {{ app.risk_score }}/100)
│ Target SDK: {{ app.target_sdk }} | Min SDK: {{ app.min_sdk }}
{%- if app.dangerous_permissions %}
│
│ Dangerous Permissions: {{ app.dangerous_permissions | length }}
{%- for perm in app.dangerous_permissions %}
│   • {{ perm.name }} [{{ perm.risk_level }}]
│     {{ perm.description }}
{%- endfor %}
{%- endif %}
{%- if app.sdk_findings %}
│
│ SDK Issues:
{%- for finding in app.sdk_findings %}
│   ⚠ {{ finding }}
{%- endfor %}
{%- endif %}
{%- if app.insecure_urls %}
│
│ Insecure URLs:
{%- for url in app.insecure_urls %}
│   ✗ {{ url }}
{%- endfor %}
{%- endif %}
{%- if app.recommendations %}
│
│ Recommendations:
{%- for rec in app.recommendations %}
│   → {{ rec }}
{%- endfor %}
{%- endif %}
└──────────────────────────────────────────────────────────────────────────────┘
{% endfor %}
================================================================================
                 Generated by droidaudit - Mobile Security Suite
================================================================================
"#;

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Mobile Security Scan Report</title>
    <style>
        :root {
            --bg-dark: #1a1a2e;
            --bg-card: #16213e;
            --text-primary: #eaeaea;
            --text-secondary: #a0a0a0;
            --accent: #0f4c75;
            --critical: #e74c3c;
            --high: #e67e22;
            --medium: #f39c12;
            --low: #27ae60;
            --info: #3498db;
        }

        * { box-sizing: border-box; margin: 0; padding: 0; }

        body {
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background: var(--bg-dark);
            color: var(--text-primary);
            line-height: 1.6;
            padding: 20px;
        }

        .container { max-width: 1400px; margin: 0 auto; }

        header {
            background: linear-gradient(135deg, var(--accent), var(--bg-card));
            padding: 30px;
            border-radius: 15px;
            margin-bottom: 30px;
            text-align: center;
        }

        header h1 { font-size: 2.5em; margin-bottom: 10px; }
        header p { color: var(--text-secondary); }

        .stats-grid {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
            gap: 20px;
            margin-bottom: 30px;
        }

        .stat-card {
            background: var(--bg-card);
            padding: 25px;
            border-radius: 12px;
            text-align: center;
            border-left: 4px solid var(--accent);
        }

        .stat-card.critical { border-color: var(--critical); }
        .stat-card.medium { border-color: var(--medium); }
        .stat-card.low { border-color: var(--low); }

        .stat-number { font-size: 3em; font-weight: bold; }

        .stat-label {
            color: var(--text-secondary);
            text-transform: uppercase;
            font-size: 0.85em;
            letter-spacing: 1px;
        }

        .app-card {
            background: var(--bg-card);
            border-radius: 12px;
            margin-bottom: 20px;
            overflow: hidden;
            border: 1px solid rgba(255,255,255,0.1);
        }

        .app-header {
            padding: 20px;
            display: flex;
            justify-content: space-between;
            align-items: center;
            border-bottom: 1px solid rgba(255,255,255,0.1);
            cursor: pointer;
        }

        .app-header:hover { background: rgba(255,255,255,0.05); }

        .app-name { font-size: 1.3em; font-weight: 600; }

        .app-package {
            color: var(--text-secondary);
            font-size: 0.9em;
            font-family: monospace;
        }

        .risk-badge {
            padding: 8px 16px;
            border-radius: 20px;
            font-weight: bold;
            font-size: 0.85em;
            text-transform: uppercase;
        }

        .risk-CRITICAL { background: var(--critical); }
        .risk-HIGH { background: var(--high); }
        .risk-MEDIUM { background: var(--medium); color: #333; }
        .risk-LOW { background: var(--low); }
        .risk-INFO { background: var(--info); }

        .app-details { padding: 20px; display: none; }
        .app-details.active { display: block; }

        .detail-section { margin-bottom: 20px; }

        .detail-section h4 {
            color: var(--accent);
            margin-bottom: 10px;
            padding-bottom: 5px;
            border-bottom: 1px solid rgba(255,255,255,0.1);
        }

        .permission-list { display: flex; flex-wrap: wrap; gap: 8px; }

        .permission-tag {
            background: rgba(231, 76, 60, 0.3);
            border: 1px solid var(--critical);
            padding: 6px 12px;
            border-radius: 6px;
            font-size: 0.85em;
            font-family: monospace;
        }

        .recommendation {
            background: rgba(52, 152, 219, 0.2);
            padding: 12px 16px;
            border-radius: 8px;
            margin-bottom: 8px;
            border-left: 3px solid var(--info);
        }

        .sdk-info {
            display: grid;
            grid-template-columns: repeat(2, 1fr);
            gap: 15px;
        }

        .sdk-box {
            background: rgba(255,255,255,0.05);
            padding: 15px;
            border-radius: 8px;
        }

        .sdk-label { color: var(--text-secondary); font-size: 0.85em; }
        .sdk-value { font-size: 1.2em; font-weight: bold; }

        .risk-meter {
            width: 100%;
            height: 10px;
            background: rgba(255,255,255,0.1);
            border-radius: 5px;
            overflow: hidden;
            margin-top: 10px;
        }

        .risk-meter-fill { height: 100%; }

        .insecure-url {
            font-family: monospace;
            background: rgba(231, 76, 60, 0.2);
            padding: 8px 12px;
            border-radius: 6px;
            margin-bottom: 6px;
            word-break: break-all;
        }

        footer {
            text-align: center;
            padding: 30px;
            color: var(--text-secondary);
            font-size: 0.9em;
        }

        @media (max-width: 768px) {
            .app-header { flex-direction: column; gap: 10px; }
            .sdk-info { grid-template-columns: 1fr; }
        }
    </style>
</head>
<body>
    <div class="container">
        <header>
            <h1>Mobile Security Scan Report</h1>
            <p>Generated: {{ report.scan_time }}</p>
            <p>Device: {{ report.device_info.model | default(value="Unknown") }} (Android {{ report.device_info.android_version | default(value="Unknown") }})</p>
        </header>

        <div class="stats-grid">
            <div class="stat-card">
                <div class="stat-number">{{ report.total_apps }}</div>
                <div class="stat-label">Total Apps Scanned</div>
            </div>
            <div class="stat-card critical">
                <div class="stat-number">{{ report.high_risk_apps }}</div>
                <div class="stat-label">High Risk Apps</div>
            </div>
            <div class="stat-card medium">
                <div class="stat-number">{{ report.medium_risk_apps }}</div>
                <div class="stat-label">Medium Risk Apps</div>
            </div>
            <div class="stat-card low">
                <div class="stat-number">{{ report.low_risk_apps }}</div>
                <div class="stat-label">Low Risk Apps</div>
            </div>
        </div>

        <h2 style="margin-bottom: 20px;">Application Security Details</h2>

        {% for app in report.apps %}
        <div class="app-card">
            <div class="app-header" onclick="toggleDetails('app-{{ loop.index }}')">
                <div>
                    <div class="app-name">{{ app.app_name }}</div>
                    <div class="app-package">{{ app.package_name }}</div>
                </div>
                <div style="display: flex; align-items: center; gap: 15px;">
                    <div>
                        <div style="font-size: 0.8em; color: var(--text-secondary);">Risk Score</div>
                        <div style="font-size: 1.5em; font-weight: bold;">{{ app.risk_score }}/100</div>
                    </div>
                    <span class="risk-badge risk-{{ app.risk_level }}">{{ app.risk_level }}</span>
                </div>
            </div>

            <div class="app-details" id="app-{{ loop.index }}">
                <div class="detail-section">
                    <h4>Risk Assessment</h4>
                    <div class="risk-meter">
                        <div class="risk-meter-fill" style="width: {{ app.risk_score }}%; background: {% if app.risk_score >= 70 %}var(--critical){% elif app.risk_score >= 50 %}var(--high){% elif app.risk_score >= 30 %}var(--medium){% else %}var(--low){% endif %};"></div>
                    </div>
                </div>

                <div class="detail-section">
                    <h4>SDK Information</h4>
                    <div class="sdk-info">
                        <div class="sdk-box">
                            <div class="sdk-label">Target SDK</div>
                            <div class="sdk-value">API {{ app.target_sdk }}</div>
                        </div>
                        <div class="sdk-box">
                            <div class="sdk-label">Minimum SDK</div>
                            <div class="sdk-value">API {{ app.min_sdk }}</div>
                        </div>
                    </div>
                    {% if app.sdk_findings %}
                    <div style="margin-top: 15px;">
                        {% for finding in app.sdk_findings %}
                        <div class="recommendation">{{ finding }}</div>
                        {% endfor %}
                    </div>
                    {% endif %}
                </div>

                {% if app.dangerous_permissions %}
                <div class="detail-section">
                    <h4>Dangerous Permissions ({{ app.dangerous_permissions | length }})</h4>
                    <div class="permission-list">
                        {% for perm in app.dangerous_permissions %}
                        <span class="permission-tag" title="{{ perm.description }}">{{ perm.name }}</span>
                        {% endfor %}
                    </div>
                </div>
                {% endif %}

                {% if app.insecure_urls %}
                <div class="detail-section">
                    <h4>Insecure URLs Found</h4>
                    {% for url in app.insecure_urls %}
                    <div class="insecure-url">{{ url }}</div>
                    {% endfor %}
                </div>
                {% endif %}

                {% if app.recommendations %}
                <div class="detail-section">
                    <h4>Recommendations</h4>
                    {% for rec in app.recommendations %}
                    <div class="recommendation">{{ rec }}</div>
                    {% endfor %}
                </div>
                {% endif %}
            </div>
        </div>
        {% endfor %}

        <footer>
            <p>Generated by droidaudit - Mobile Security Suite</p>
        </footer>
    </div>

    <script>
        function toggleDetails(id) {
            const details = document.getElementById(id);
            details.classList.toggle('active');
        }

        // Expand high-risk apps by default
        document.querySelectorAll('.risk-CRITICAL, .risk-HIGH').forEach((badge, i) => {
            const card = badge.closest('.app-card');
            const details = card.querySelector('.app-details');
            if (details && i < 5) details.classList.add('active');
        });
    </script>
</body>
</html>
"#;

/// Renders the report as a fixed-width text document
pub fn render_text(report: &FullScanReport) -> Result<String> {
    let mut tera = Tera::default();
    tera.add_raw_template("report.txt", TEXT_TEMPLATE)?;

    let mut context = Context::new();
    context.insert("report", report);

    Ok(tera.render("report.txt", &context)?)
}

/// Renders the report as a pretty-printed JSON document.
///
/// This is the machine-readable format: a lossless dump of the whole report.
pub fn render_json(report: &FullScanReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Renders the report as a standalone HTML page.
///
/// The template is registered under an `.html` name so tera auto-escapes
/// every interpolation; app labels and scraped URLs are attacker-influenced.
pub fn render_html(report: &FullScanReport) -> Result<String> {
    let mut tera = Tera::default();
    tera.add_raw_template("report.html", HTML_TEMPLATE)?;

    let mut context = Context::new();
    context.insert("report", report);

    Ok(tera.render("report.html", &context)?)
}

/// Writes rendered reports into an output directory
pub struct Reporter {
    output_dir: PathBuf,
}

impl Reporter {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// Writes the report in the requested format(s); returns the file paths
    pub fn write(&self, report: &FullScanReport, format: OutputFormat) -> Result<Vec<PathBuf>> {
        let base = format!(
            "security_report_{}",
            Local::now().format("%Y%m%d_%H%M%S")
        );
        self.write_as(report, format, &base)
    }

    /// Same as [`write`](Self::write) with an explicit base file name
    pub fn write_as(
        &self,
        report: &FullScanReport,
        format: OutputFormat,
        base_name: &str,
    ) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.output_dir)?;

        let mut written = Vec::new();
        let mut emit = |ext: &str, content: String| -> Result<()> {
            let path = self.output_dir.join(format!("{}.{}", base_name, ext));
            fs::write(&path, content)?;
            info!("report written: {}", path.display());
            written.push(path);
            Ok(())
        };

        match format {
            OutputFormat::Json => emit("json", render_json(report)?)?,
            OutputFormat::Html => emit("html", render_html(report)?)?,
            OutputFormat::Text => emit("txt", render_text(report)?)?,
            OutputFormat::All => {
                emit("json", render_json(report)?)?;
                emit("html", render_html(report)?)?;
                emit("txt", render_text(report)?)?;
            }
            OutputFormat::Cli => {}
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PermissionCatalog, SdkCatalog};
    use crate::report::{build_app_report, build_full_report, AppIdentity};
    use crate::scoring::RiskEngine;
    use regex::Regex;
    use std::collections::BTreeMap;

    fn sample_report() -> FullScanReport {
        let perm_catalog = PermissionCatalog::builtin();
        let sdk_catalog = SdkCatalog::builtin();
        let engine = RiskEngine::new(&perm_catalog, &sdk_catalog);

        let mut apps = Vec::new();
        for (package, name, permissions, urls) in [
            (
                "com.social.app",
                "Social Media App",
                vec![
                    "android.permission.CAMERA",
                    "android.permission.READ_SMS",
                    "android.permission.ACCESS_FINE_LOCATION",
                ],
                vec![],
            ),
            (
                "com.flashlight.free",
                "Free <Flashlight>",
                vec![
                    "android.permission.SYSTEM_ALERT_WINDOW",
                    "android.permission.READ_CONTACTS",
                ],
                vec!["http://api.example.com/data?q=<script>"],
            ),
            ("com.game.casual", "Casual Game", vec!["android.permission.INTERNET"], vec![]),
        ] {
            let permissions: Vec<String> = permissions.iter().map(|s| s.to_string()).collect();
            let analysis = engine.score_permissions(&permissions);
            let sdk = engine.score_sdk(27, 21);
            apps.push(build_app_report(
                AppIdentity {
                    package_name: package.to_string(),
                    app_name: name.to_string(),
                    version_name: "1.0.0".to_string(),
                    version_code: 1,
                    target_sdk: 27,
                    min_sdk: 21,
                    permissions,
                },
                &analysis,
                &sdk,
                urls.iter().map(|s| s.to_string()).collect(),
            ));
        }

        let mut device_info = BTreeMap::new();
        device_info.insert("model".to_string(), "Pixel 7".to_string());
        device_info.insert("android_version".to_string(), "13".to_string());
        build_full_report(device_info, apps)
    }

    #[test]
    fn json_is_lossless() {
        let report = sample_report();
        let json = render_json(&report).unwrap();
        let parsed: FullScanReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.total_apps, report.total_apps);
        assert_eq!(parsed.apps.len(), report.apps.len());
        for (a, b) in parsed.apps.iter().zip(report.apps.iter()) {
            assert_eq!(a.risk_score, b.risk_score);
            assert_eq!(a.risk_level, b.risk_level);
            assert_eq!(a.permissions, b.permissions);
            assert_eq!(a.insecure_urls, b.insecure_urls);
        }
    }

    #[test]
    fn text_and_json_agree_on_every_score() {
        let report = sample_report();
        let text = render_text(&report).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&render_json(&report).unwrap()).unwrap();

        let score_re = Regex::new(r"Score: (\d+)/100").unwrap();
        let text_scores: Vec<u64> = score_re
            .captures_iter(&text)
            .map(|c| c[1].parse().unwrap())
            .collect();
        let json_scores: Vec<u64> = json["apps"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["risk_score"].as_u64().unwrap())
            .collect();

        assert_eq!(text_scores, json_scores);
        assert_eq!(text_scores.len(), report.total_apps);
    }

    #[test]
    fn text_omits_empty_sections() {
        let report = sample_report();
        let text = render_text(&report).unwrap();
        // The clean INTERNET-only app still has recommendations, but no URLs;
        // only one app carries insecure URLs, so the header appears once
        assert_eq!(text.matches("Insecure URLs:").count(), 1);
        assert!(text.contains("Social Media App (com.social.app)"));
    }

    #[test]
    fn html_escapes_untrusted_fields() {
        let report = sample_report();
        let html = render_html(&report).unwrap();
        assert!(html.contains("Free &lt;Flashlight&gt;"));
        assert!(!html.contains("Free <Flashlight>"));
        assert!(html.contains("&lt;script&gt;"));
        // Risk meter width comes straight from the numeric score
        assert!(html.contains(&format!("width: {}%", report.apps[0].risk_score)));
    }

    #[test]
    fn html_renders_stat_counts() {
        let report = sample_report();
        let html = render_html(&report).unwrap();
        assert!(html.contains(&format!(
            "<div class=\"stat-number\">{}</div>",
            report.total_apps
        )));
        assert!(html.contains("risk-badge risk-HIGH"));
    }

    #[test]
    fn missing_device_keys_fall_back_to_placeholder() {
        let mut report = sample_report();
        report.device_info.clear();
        let text = render_text(&report).unwrap();
        assert!(text.contains("Device: Unknown (Android Unknown)"));
        let html = render_html(&report).unwrap();
        assert!(html.contains("Device: Unknown"));
    }

    #[test]
    fn reporter_writes_all_formats() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = Reporter::new(dir.path());
        let written = reporter
            .write_as(&sample_report(), OutputFormat::All, "scan_test")
            .unwrap();
        assert_eq!(written.len(), 3);
        for path in &written {
            assert!(path.exists());
            assert!(fs::metadata(path).unwrap().len() > 0);
        }
    }
}
