use crate::catalog::{PRIVATE_HOST_PATTERN, URL_PATTERN};
use crate::report::AppIdentity;
use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;
use std::collections::BTreeMap;
use std::process::Command;
use thiserror::Error;

/// Failures at the device boundary.
///
/// These never reach the scoring core: callers translate them into empty
/// or defaulted inputs before scoring.
#[derive(Debug, Error)]
pub enum AdbError {
    #[error("adb binary not found; install Android SDK Platform Tools")]
    BinaryMissing,

    #[error("adb command failed: {0}")]
    CommandFailed(String),

    #[error("adb i/o error: {0}")]
    Io(#[from] std::io::Error),
}

lazy_static! {
    static ref VERSION_NAME_RE: Regex = Regex::new(r"versionName=(\S+)").unwrap();
    static ref VERSION_CODE_RE: Regex = Regex::new(r"versionCode=(\d+)").unwrap();
    static ref TARGET_SDK_RE: Regex = Regex::new(r"targetSdk(?:Version)?=(\d+)").unwrap();
    static ref MIN_SDK_RE: Regex = Regex::new(r"minSdk(?:Version)?=(\d+)").unwrap();
}

/// Thin wrapper over the `adb` binary, optionally pinned to one device
pub struct AdbBridge {
    device: Option<String>,
}

impl AdbBridge {
    pub fn new(device: Option<String>) -> Self {
        Self { device }
    }

    fn run(&self, args: &[&str]) -> Result<String, AdbError> {
        let mut cmd = Command::new("adb");
        if let Some(serial) = &self.device {
            cmd.arg("-s").arg(serial);
        }
        cmd.args(args);

        debug!("adb {}", args.join(" "));
        let output = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AdbError::BinaryMissing
            } else {
                AdbError::Io(e)
            }
        })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(AdbError::CommandFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ))
        }
    }

    /// True when adb is reachable and at least one device is attached
    pub fn check_connection(&self) -> bool {
        match self.run(&["devices"]) {
            Ok(out) => out
                .lines()
                .skip(1)
                .any(|l| !l.trim().is_empty() && l.contains("device")),
            Err(err) => {
                warn!("connection check failed: {}", err);
                false
            }
        }
    }

    /// Snapshot of device identity properties.
    ///
    /// Missing properties are simply absent from the map; serializers
    /// substitute a placeholder at render time.
    pub fn device_info(&self) -> BTreeMap<String, String> {
        let props = [
            ("model", "ro.product.model"),
            ("manufacturer", "ro.product.manufacturer"),
            ("android_version", "ro.build.version.release"),
            ("sdk_version", "ro.build.version.sdk"),
            ("security_patch", "ro.build.version.security_patch"),
            ("device", "ro.product.device"),
            ("build_id", "ro.build.id"),
        ];

        let mut info = BTreeMap::new();
        for (key, prop) in props {
            if let Ok(out) = self.run(&["shell", "getprop", prop]) {
                let value = out.trim();
                if !value.is_empty() {
                    info.insert(key.to_string(), value.to_string());
                }
            }
        }
        info
    }

    /// Lists installed package names; third-party only unless `include_system`
    pub fn list_packages(&self, include_system: bool) -> Result<Vec<String>, AdbError> {
        let mut args = vec!["shell", "pm", "list", "packages"];
        if !include_system {
            args.push("-3");
        }
        Ok(parse_package_list(&self.run(&args)?))
    }

    /// Scrapes identity, SDK levels and the requested permission list from
    /// `dumpsys package`. Fields the dump does not reveal stay at their
    /// defaults; that is not an error.
    pub fn package_info(&self, package: &str) -> Result<AppIdentity, AdbError> {
        let dump = self.run(&["shell", "dumpsys", "package", package])?;
        let mut identity = parse_package_dump(&dump);
        identity.package_name = package.to_string();
        identity.app_name = self.app_label(package);
        Ok(identity)
    }

    /// Best-effort human-readable label; falls back to the last package segment
    pub fn app_label(&self, package: &str) -> String {
        let out = self.run(&[
            "shell",
            "cmd",
            "package",
            "query-activities",
            "--brief",
            "-a",
            "android.intent.action.MAIN",
            "-c",
            "android.intent.category.LAUNCHER",
            package,
        ]);

        if let Ok(out) = out {
            if let Some(label) = out.trim().lines().last().and_then(|l| l.rsplit('/').next()) {
                if !label.is_empty() && !label.contains(' ') {
                    return label.to_string();
                }
            }
        }

        fallback_label(package)
    }

    /// Deep scan: greps the installed APK for URL-like strings and keeps the
    /// insecure ones. Returned list is first-seen deduplicated, capped at 20.
    pub fn search_apk_for_urls(&self, package: &str) -> Vec<String> {
        let out = self.run(&[
            "shell",
            &format!(
                "strings /data/app/*{}*/base.apk 2>/dev/null | grep -E 'https?://'",
                package
            ),
        ]);

        match out {
            Ok(text) => extract_insecure_urls(&text),
            Err(err) => {
                debug!("url scan failed for {}: {}", package, err);
                Vec::new()
            }
        }
    }

    pub fn uninstall_app(&self, package: &str) -> Result<(), AdbError> {
        self.run(&["uninstall", package]).map(|_| ())
    }

    pub fn open_app(&self, package: &str) -> Result<(), AdbError> {
        let out = self.run(&[
            "shell",
            "cmd",
            "package",
            "query-activities",
            "--brief",
            "-a",
            "android.intent.action.MAIN",
            "-c",
            "android.intent.category.LAUNCHER",
            package,
        ])?;

        let activity = out
            .trim()
            .lines()
            .last()
            .and_then(|l| l.trim().rsplit('/').next())
            .filter(|a| !a.is_empty())
            .ok_or_else(|| AdbError::CommandFailed(format!("no launcher activity for {}", package)))?;

        self.run(&["shell", "am", "start", "-n", &format!("{}/{}", package, activity)])
            .map(|_| ())
    }

    pub fn force_stop_app(&self, package: &str) -> Result<(), AdbError> {
        self.run(&["shell", "am", "force-stop", package]).map(|_| ())
    }
}

/// Parses `pm list packages` output
pub fn parse_package_list(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.trim().strip_prefix("package:"))
        .map(|s| s.to_string())
        .collect()
}

/// Parses a `dumpsys package <pkg>` dump into an identity skeleton.
///
/// The dump format varies across vendors; every field is best-effort.
pub fn parse_package_dump(dump: &str) -> AppIdentity {
    let mut identity = AppIdentity {
        version_name: "Unknown".to_string(),
        ..Default::default()
    };

    let mut in_permissions = false;
    let mut permissions = Vec::new();

    for line in dump.lines() {
        let line = line.trim();

        if let Some(cap) = VERSION_NAME_RE.captures(line) {
            identity.version_name = cap[1].to_string();
        }
        if let Some(cap) = VERSION_CODE_RE.captures(line) {
            identity.version_code = cap[1].parse().unwrap_or(0);
        }
        if let Some(cap) = TARGET_SDK_RE.captures(line) {
            identity.target_sdk = cap[1].parse().unwrap_or(0);
        }
        if let Some(cap) = MIN_SDK_RE.captures(line) {
            identity.min_sdk = cap[1].parse().unwrap_or(0);
        }

        if line.to_lowercase().contains("requested permissions:") {
            in_permissions = true;
            continue;
        }
        if in_permissions {
            if line.to_lowercase().ends_with("permissions:") {
                // next permission section (install/runtime) starts here
                in_permissions = false;
            } else if line.starts_with("android.permission.") || line.starts_with("com.") {
                // Entries look like "android.permission.CAMERA: granted=true"
                if let Some(perm) = line.split(':').next().and_then(|s| s.split_whitespace().next())
                {
                    permissions.push(perm.to_string());
                }
            } else if !line.is_empty() && !line.to_lowercase().contains("permission") {
                in_permissions = false;
            }
        }
    }

    identity.permissions = permissions;
    identity
}

/// Filters raw strings output down to externally-routable plain-http URLs,
/// first-seen deduplicated and capped at 20
pub fn extract_insecure_urls(text: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();

    for m in URL_PATTERN.find_iter(text) {
        let url = m.as_str();
        if !url.starts_with("http://") || PRIVATE_HOST_PATTERN.is_match(url) {
            continue;
        }
        if !urls.iter().any(|u| u == url) {
            urls.push(url.to_string());
        }
        if urls.len() == 20 {
            break;
        }
    }

    urls
}

fn fallback_label(package: &str) -> String {
    package
        .rsplit('.')
        .next()
        .unwrap_or(package)
        .replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_DUMP: &str = r#"
Packages:
  Package [com.example.app] (a1b2c3):
    userId=10123
    pkg=Package{f00 com.example.app}
    codePath=/data/app/com.example.app-1
    versionCode=42 minSdk=21 targetSdk=30
    versionName=2.5.1
    requested permissions:
      android.permission.CAMERA: restricted=false
      android.permission.INTERNET
      com.example.app.CUSTOM_PERMISSION
    install permissions:
      android.permission.INTERNET: granted=true
  Dexopt state:
    [com.example.app]
"#;

    #[test]
    fn parses_package_list() {
        let out = "package:com.example.one\npackage:com.example.two\n\njunk line\n";
        assert_eq!(
            parse_package_list(out),
            vec!["com.example.one", "com.example.two"]
        );
    }

    #[test]
    fn parses_dumpsys_package() {
        let identity = parse_package_dump(SAMPLE_DUMP);
        assert_eq!(identity.version_name, "2.5.1");
        assert_eq!(identity.version_code, 42);
        assert_eq!(identity.target_sdk, 30);
        assert_eq!(identity.min_sdk, 21);
        assert_eq!(
            identity.permissions,
            vec![
                "android.permission.CAMERA",
                "android.permission.INTERNET",
                "com.example.app.CUSTOM_PERMISSION",
            ]
        );
    }

    #[test]
    fn empty_dump_yields_defaults() {
        let identity = parse_package_dump("");
        assert_eq!(identity.version_name, "Unknown");
        assert_eq!(identity.version_code, 0);
        assert_eq!(identity.target_sdk, 0);
        assert!(identity.permissions.is_empty());
    }

    #[test]
    fn url_extraction_filters_and_dedupes() {
        let text = "\
noise http://api.example.com/v1 more\n\
https://secure.example.com/ok\n\
http://192.168.1.10/internal\n\
http://localhost:3000/dev\n\
again http://api.example.com/v1 twice\n\
http://tracker.example.net/p?id=1\n";
        assert_eq!(
            extract_insecure_urls(text),
            vec![
                "http://api.example.com/v1",
                "http://tracker.example.net/p?id=1",
            ]
        );
    }

    #[test]
    fn url_extraction_caps_at_20() {
        let mut text = String::new();
        for i in 0..50 {
            text.push_str(&format!("http://host{}.example.com/x\n", i));
        }
        assert_eq!(extract_insecure_urls(&text).len(), 20);
    }

    #[test]
    fn label_fallback_uses_last_segment() {
        assert_eq!(fallback_label("com.flashlight.super_bright"), "super bright");
    }
}
