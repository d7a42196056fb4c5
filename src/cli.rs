use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "droidaudit",
    version,
    about = "Scan Android apps over ADB for security issues",
    long_about = "Command-line security scanner that connects to an Android device over ADB, enumerates installed applications and rates each one by its declared permissions, SDK versions and (optionally) insecure URLs found inside the APK."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Target device serial number
    #[arg(short, long, global = true)]
    pub device: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan all installed apps for security vulnerabilities
    Scan {
        /// Include system apps
        #[arg(short, long)]
        system: bool,

        /// Deep APK analysis: also search app binaries for insecure URLs (slower)
        #[arg(long)]
        deep: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Cli)]
        output: OutputFormat,

        /// Directory for generated report files
        #[arg(short = 'O', long, default_value = "reports")]
        output_dir: PathBuf,
    },

    /// Analyze a single app
    Analyze {
        /// Package name (e.g. com.example.app)
        package: String,

        /// Deep APK analysis
        #[arg(long)]
        deep: bool,
    },

    /// List installed apps on the device
    ListApps {
        /// Include system apps
        #[arg(short, long)]
        system: bool,
    },

    /// Uninstall an app from the device
    Uninstall { package: String },

    /// Open/launch an app on the device
    Open { package: String },

    /// Force stop an app
    ForceStop { package: String },

    /// Run a demo scan with sample data (no device needed)
    Demo {
        /// Directory for generated report files
        #[arg(short = 'O', long, default_value = "reports")]
        output_dir: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored console output only
    Cli,
    /// JSON report file
    Json,
    /// HTML report file
    Html,
    /// Plain text report file
    Text,
    /// All file formats
    All,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Cli => write!(f, "cli"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Html => write!(f, "html"),
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::All => write!(f, "all"),
        }
    }
}
