use crate::models::{PermissionRecord, RiskLevel, SdkVersionRecord};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

/// Target SDK levels below this are flagged (Android 9.0 Pie)
pub const MIN_RECOMMENDED_SDK: u32 = 28;

/// Min SDK levels below this allow installation on insecure Android versions (Android 8.0 Oreo)
pub const MIN_SECURE_SDK: u32 = 26;

/// Min SDK levels below this are deprecated with known vulnerabilities (Android 6.0 Marshmallow)
pub const DEPRECATED_SDK: u32 = 23;

/// URL extraction and filtering patterns used by the deep scan
lazy_static! {
    /// Matches URL-like substrings in raw APK strings output
    pub static ref URL_PATTERN: Regex = Regex::new(r#"https?://[^\s"'<>]+"#).unwrap();

    /// Plain-http URLs pointing at localhost or private ranges are not reported
    pub static ref PRIVATE_HOST_PATTERN: Regex =
        Regex::new(r"^http://(localhost|127\.0\.0\.1|10\.|192\.168\.|172\.(1[6-9]|2[0-9]|3[01])\.)")
            .unwrap();
}

/// Immutable lookup table of known dangerous Android permissions.
///
/// Built once at startup and passed by reference into the scoring engine,
/// so tests can substitute a smaller catalog.
pub struct PermissionCatalog {
    records: HashMap<String, PermissionRecord>,
}

impl PermissionCatalog {
    /// Looks up a permission by its fully-qualified identifier.
    ///
    /// Absence is not an error: most permissions are benign and
    /// intentionally not in the catalog.
    pub fn lookup(&self, identifier: &str) -> Option<&PermissionRecord> {
        self.records.get(identifier)
    }

    /// Builds a catalog from an explicit record list; later duplicates win
    pub fn from_records(records: Vec<PermissionRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|r| (r.identifier.clone(), r))
                .collect(),
        }
    }

    /// The built-in catalog of dangerous Android permissions
    pub fn builtin() -> Self {
        let mut records = Vec::new();

        // SMS
        records.push(record(
            "android.permission.READ_SMS",
            RiskLevel::Critical,
            "SMS",
            "Allows reading SMS messages",
            &[
                "Can read OTP/2FA codes",
                "Access to personal conversations",
                "Financial data exposure (bank SMS)",
                "Identity theft risk",
            ],
            &[
                "Revoke if not essential for app function",
                "Use SMS Retriever API instead",
                "Enable 2FA with authenticator apps",
            ],
            &["Google SMS Retriever API", "Push notifications for OTP"],
        ));
        records.push(record(
            "android.permission.SEND_SMS",
            RiskLevel::Critical,
            "SMS",
            "Allows sending SMS messages",
            &[
                "Unauthorized SMS charges",
                "Spam distribution",
                "Premium SMS fraud",
                "Phishing attacks",
            ],
            &[
                "Deny unless messaging app",
                "Monitor phone bills regularly",
                "Use Intent-based SMS for occasional sends",
            ],
            &["Intent ACTION_SENDTO", "In-app messaging services"],
        ));
        records.push(record(
            "android.permission.RECEIVE_SMS",
            RiskLevel::Critical,
            "SMS",
            "Allows receiving SMS messages",
            &[
                "Intercept OTP codes",
                "Privacy violation",
                "SMS-based attacks",
            ],
            &[
                "Review which apps have this permission",
                "Use authenticator apps for 2FA",
            ],
            &["SMS Retriever API", "Firebase Auth phone verification"],
        ));

        // Contacts
        records.push(record(
            "android.permission.READ_CONTACTS",
            RiskLevel::High,
            "Contacts",
            "Allows reading contact data",
            &[
                "Contact list harvesting",
                "Social engineering attacks",
                "Spam targeting contacts",
                "Privacy breach",
            ],
            &[
                "Grant only to trusted communication apps",
                "Review app reviews before granting",
                "Use contact picker for single selections",
            ],
            &["Contact Picker API", "Manual contact entry"],
        ));
        records.push(record(
            "android.permission.WRITE_CONTACTS",
            RiskLevel::High,
            "Contacts",
            "Allows modifying contact data",
            &[
                "Contact manipulation",
                "Malicious contact injection",
                "Data corruption",
            ],
            &["Deny to most apps", "Backup contacts regularly"],
            &["Intent-based contact creation"],
        ));

        // Camera
        records.push(record(
            "android.permission.CAMERA",
            RiskLevel::High,
            "Camera",
            "Allows access to device camera",
            &[
                "Unauthorized photo/video capture",
                "Surveillance without consent",
                "Privacy invasion",
                "Facial recognition abuse",
            ],
            &[
                "Grant only when actively using camera features",
                "Revoke when not needed",
                "Use camera covers",
                "Check indicator lights",
            ],
            &["Intent ACTION_IMAGE_CAPTURE", "External camera apps"],
        ));

        // Location
        records.push(record(
            "android.permission.ACCESS_FINE_LOCATION",
            RiskLevel::High,
            "Location",
            "Allows precise GPS location access",
            &[
                "Real-time tracking",
                "Location history exposure",
                "Stalking enablement",
                "Home/work location inference",
            ],
            &[
                "Use 'While using app' option",
                "Deny background location",
                "Use coarse location when possible",
            ],
            &["Coarse location for general apps", "On-demand location requests"],
        ));
        records.push(record(
            "android.permission.ACCESS_COARSE_LOCATION",
            RiskLevel::Medium,
            "Location",
            "Allows approximate location access",
            &["General area tracking", "Behavioral profiling"],
            &["Prefer over fine location", "Review necessity"],
            &["IP-based geolocation", "Manual location entry"],
        ));
        records.push(record(
            "android.permission.ACCESS_BACKGROUND_LOCATION",
            RiskLevel::Critical,
            "Location",
            "Allows location access in background",
            &[
                "Continuous tracking without awareness",
                "Battery drain",
                "Comprehensive movement history",
            ],
            &[
                "Deny to most apps",
                "Allow only for navigation/fitness apps",
                "Regular audit",
            ],
            &["Geofencing APIs", "User-triggered location updates"],
        ));

        // Microphone
        records.push(record(
            "android.permission.RECORD_AUDIO",
            RiskLevel::High,
            "Microphone",
            "Allows audio recording",
            &[
                "Eavesdropping",
                "Conversation recording",
                "Voice data collection",
                "Background listening",
            ],
            &[
                "Grant only to call/voice apps",
                "Revoke when not needed",
                "Check mic indicator",
            ],
            &["Speech-to-text APIs", "Intent-based voice input"],
        ));

        // Storage
        records.push(record(
            "android.permission.READ_EXTERNAL_STORAGE",
            RiskLevel::Medium,
            "Storage",
            "Allows reading external storage",
            &[
                "Access to photos/documents",
                "Personal data exposure",
                "Downloaded file access",
            ],
            &["Use scoped storage", "Grant selective media access"],
            &["Storage Access Framework", "Media Store API"],
        ));
        records.push(record(
            "android.permission.WRITE_EXTERNAL_STORAGE",
            RiskLevel::Medium,
            "Storage",
            "Allows writing to external storage",
            &["File manipulation", "Malware installation", "Data corruption"],
            &["Use app-specific directories", "Review file access patterns"],
            &["App-specific storage", "Scoped storage (Android 10+)"],
        ));
        records.push(record(
            "android.permission.MANAGE_EXTERNAL_STORAGE",
            RiskLevel::Critical,
            "Storage",
            "Allows full external storage management",
            &[
                "Complete file system access",
                "All app data accessible",
                "System file manipulation",
            ],
            &["Only for file managers", "Deny to other apps"],
            &["SAF for document access", "MediaStore for media"],
        ));

        // Phone
        records.push(record(
            "android.permission.READ_PHONE_STATE",
            RiskLevel::Medium,
            "Phone",
            "Allows reading phone state and identity",
            &[
                "Device fingerprinting",
                "IMEI/phone number exposure",
                "Call state monitoring",
            ],
            &["Deny if not call-related", "Review data collection policies"],
            &["Instance ID for app identification"],
        ));
        records.push(record(
            "android.permission.CALL_PHONE",
            RiskLevel::High,
            "Phone",
            "Allows initiating phone calls",
            &[
                "Premium number calls",
                "Unauthorized charges",
                "Harassment potential",
            ],
            &["Use dial intent instead", "Review call logs"],
            &["Intent ACTION_DIAL"],
        ));
        records.push(record(
            "android.permission.READ_CALL_LOG",
            RiskLevel::High,
            "Phone",
            "Allows reading call history",
            &[
                "Communication pattern exposure",
                "Contact relationship mapping",
                "Privacy violation",
            ],
            &["Deny to most apps", "Clear call logs periodically"],
            &["No direct alternative - limit access"],
        ));

        // Calendar
        records.push(record(
            "android.permission.READ_CALENDAR",
            RiskLevel::Medium,
            "Calendar",
            "Allows reading calendar events",
            &[
                "Schedule exposure",
                "Meeting attendee harvesting",
                "Location pattern inference",
            ],
            &["Grant only to productivity apps", "Review synced accounts"],
            &["CalendarContract.Events picker"],
        ));
        records.push(record(
            "android.permission.WRITE_CALENDAR",
            RiskLevel::Medium,
            "Calendar",
            "Allows modifying calendar events",
            &[
                "Event manipulation",
                "Spam calendar entries",
                "Schedule disruption",
            ],
            &["Limit to calendar apps", "Review calendar changes"],
            &["Intent-based calendar entry"],
        ));

        // Body sensors
        records.push(record(
            "android.permission.BODY_SENSORS",
            RiskLevel::Medium,
            "Sensors",
            "Allows access to body sensors (heart rate, etc.)",
            &[
                "Health data exposure",
                "Activity tracking",
                "Medical privacy breach",
            ],
            &["Grant only to fitness apps", "Review data sharing policies"],
            &["Health Connect API"],
        ));

        // Network
        records.push(record(
            "android.permission.INTERNET",
            RiskLevel::Low,
            "Network",
            "Allows internet access",
            &[
                "Data exfiltration possible",
                "Network attacks",
                "Privacy leaks",
            ],
            &["Monitor data usage", "Use firewall apps"],
            &["Offline modes when available"],
        ));
        records.push(record(
            "android.permission.ACCESS_WIFI_STATE",
            RiskLevel::Low,
            "Network",
            "Allows viewing Wi-Fi connection info",
            &["Network fingerprinting", "Location inference via Wi-Fi"],
            &["Standard permission, low risk"],
            &[],
        ));

        // Special
        records.push(record(
            "android.permission.SYSTEM_ALERT_WINDOW",
            RiskLevel::Critical,
            "Special",
            "Allows drawing over other apps",
            &[
                "Clickjacking attacks",
                "Credential theft overlays",
                "Screen recording",
                "Phishing overlays",
            ],
            &[
                "Deny to untrusted apps",
                "Review overlay permissions in settings",
            ],
            &["Bubbles API (Android 11+)", "Picture-in-picture"],
        ));
        records.push(record(
            "android.permission.BIND_ACCESSIBILITY_SERVICE",
            RiskLevel::Critical,
            "Special",
            "Allows accessibility service binding",
            &[
                "Full screen content access",
                "Keylogging potential",
                "Action automation abuse",
                "Complete device control",
            ],
            &[
                "Enable only for trusted accessibility apps",
                "Regular audit of accessibility services",
            ],
            &["Standard UI automation APIs"],
        ));
        records.push(record(
            "android.permission.BIND_DEVICE_ADMIN",
            RiskLevel::Critical,
            "Special",
            "Allows device administration",
            &[
                "Device wipe capability",
                "Password policy control",
                "Device lock",
                "Data encryption control",
            ],
            &["Only for MDM/enterprise apps", "Review device admin apps"],
            &["Work profile for enterprise"],
        ));
        records.push(record(
            "android.permission.REQUEST_INSTALL_PACKAGES",
            RiskLevel::High,
            "Special",
            "Allows requesting package installation",
            &["Sideloading malware", "Unauthorized app installation"],
            &["Deny to most apps", "Install only from trusted sources"],
            &["Play Store installation"],
        ));

        Self::from_records(records)
    }
}

/// Immutable lookup table of Android API level metadata.
///
/// The table is sparse; levels outside it get a synthesized fallback record.
pub struct SdkCatalog {
    versions: HashMap<u32, SdkVersionRecord>,
}

impl SdkCatalog {
    pub fn lookup(&self, api_level: u32) -> Option<&SdkVersionRecord> {
        self.versions.get(&api_level)
    }

    pub fn from_records(records: Vec<SdkVersionRecord>) -> Self {
        Self {
            versions: records.into_iter().map(|r| (r.api_level, r)).collect(),
        }
    }

    /// The built-in API level table
    pub fn builtin() -> Self {
        let table: &[(u32, &str, &str, RiskLevel)] = &[
            (34, "Android 14", "Current", RiskLevel::Info),
            (33, "Android 13", "Supported", RiskLevel::Info),
            (32, "Android 12L", "Supported", RiskLevel::Info),
            (31, "Android 12", "Supported", RiskLevel::Low),
            (30, "Android 11", "Limited Support", RiskLevel::Low),
            (29, "Android 10", "Security Updates Only", RiskLevel::Medium),
            (28, "Android 9 Pie", "EOL", RiskLevel::Medium),
            (27, "Android 8.1 Oreo", "EOL", RiskLevel::High),
            (26, "Android 8.0 Oreo", "EOL", RiskLevel::High),
            (25, "Android 7.1 Nougat", "EOL", RiskLevel::High),
            (24, "Android 7.0 Nougat", "EOL", RiskLevel::High),
            (23, "Android 6.0 Marshmallow", "EOL", RiskLevel::Critical),
        ];

        Self::from_records(
            table
                .iter()
                .map(|&(api_level, name, status, risk_level)| SdkVersionRecord {
                    api_level,
                    name: name.to_string(),
                    status: status.to_string(),
                    risk_level,
                })
                .collect(),
        )
    }
}

fn record(
    identifier: &str,
    risk_level: RiskLevel,
    category: &str,
    description: &str,
    risks: &[&str],
    mitigations: &[&str],
    secure_alternatives: &[&str],
) -> PermissionRecord {
    let name = identifier.rsplit('.').next().unwrap_or(identifier);
    PermissionRecord {
        identifier: identifier.to_string(),
        name: name.to_string(),
        risk_level,
        category: category.to_string(),
        description: description.to_string(),
        risks: risks.iter().map(|s| s.to_string()).collect(),
        mitigations: mitigations.iter().map(|s| s.to_string()).collect(),
        secure_alternatives: secure_alternatives.iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_lookup() {
        let catalog = PermissionCatalog::builtin();
        let rec = catalog.lookup("android.permission.READ_SMS").unwrap();
        assert_eq!(rec.name, "READ_SMS");
        assert_eq!(rec.risk_level, RiskLevel::Critical);
        assert_eq!(rec.category, "SMS");
        assert!(catalog.lookup("android.permission.VIBRATE").is_none());
    }

    #[test]
    fn builtin_catalog_identifiers_unique() {
        // from_records keeps the last entry per identifier, so a size match
        // against the source list proves uniqueness
        assert_eq!(PermissionCatalog::builtin().records.len(), 25);
    }

    #[test]
    fn sdk_catalog_is_sparse() {
        let catalog = SdkCatalog::builtin();
        assert_eq!(catalog.lookup(34).unwrap().name, "Android 14");
        assert_eq!(catalog.lookup(23).unwrap().risk_level, RiskLevel::Critical);
        assert!(catalog.lookup(22).is_none());
        assert!(catalog.lookup(999).is_none());
    }

    #[test]
    fn url_patterns() {
        assert!(URL_PATTERN.is_match("payload http://api.example.com/v1 trailing"));
        assert!(PRIVATE_HOST_PATTERN.is_match("http://192.168.1.5/admin"));
        assert!(PRIVATE_HOST_PATTERN.is_match("http://localhost:8080/"));
        assert!(!PRIVATE_HOST_PATTERN.is_match("http://api.example.com/data"));
        assert!(!PRIVATE_HOST_PATTERN.is_match("https://192.168.1.5/"));
    }
}
