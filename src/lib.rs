//! A compiler from versioned, declarative provisioning configs to fully expanded provisioning
//! documents.
//!
//! # Configs
//!
//! A config names its `variant` and `version`, then describes the machine at a high level. For
//! example, this mirrors the boot disk across two drives and encrypts the root filesystem with
//! the machine's TPM:
//! ```
//! use indoc::indoc;
//! use kindling::{compile, TranslateOptions};
//!
//! let input: serde_yaml::Value = serde_yaml::from_str(indoc!("
//!     variant: fcos
//!     version: 1.5.0
//!     boot_device:
//!       luks:
//!         tpm2: true
//!       mirror:
//!         devices:
//!           - /dev/sda
//!           - /dev/sdb
//! "))?;
//! let output = compile(&input, &TranslateOptions::default())?;
//!
//! let storage = &output.config.storage;
//! assert_eq!(storage.disks.len(), 2);
//! assert_eq!(storage.raid[1].name, "md-root");
//! assert_eq!(storage.luks[0].device.as_deref(), Some("/dev/md/md-root"));
//! assert_eq!(storage.filesystems.last().unwrap().device, "/dev/mapper/root");
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! The compiled document is the provisioning agent's wire format. Every part of it can be traced
//! back to the part of the config it came from:
//! ```
//! # use indoc::indoc;
//! # use kindling::{compile, TranslateOptions};
//! # use kindling_translate::loc;
//! # let input: serde_yaml::Value = serde_yaml::from_str(indoc!("
//! #     variant: fcos
//! #     version: 1.5.0
//! #     boot_device:
//! #       luks:
//! #         tpm2: true
//! #       mirror:
//! #         devices:
//! #           - /dev/sda
//! #           - /dev/sdb
//! # "))?;
//! # let output = compile(&input, &TranslateOptions::default())?;
//! assert_eq!(
//!     output.translations.find_source(&loc!(Target, "storage", "disks", 1, "partitions", 3)),
//!     Some(loc!(Authoring, "boot_device", "mirror", "devices", 1)),
//! );
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! # Diagnostics
//!
//! Problems are collected into a [`Report`] rather than stopping at the first. Each entry is
//! located in the config as written, even when it was only noticed in the compiled document.
//! Fatal entries and errors fail the compile; warnings fail it only in strict mode.

use kindling_fcos::{v1_4, v1_5, v1_6, VARIANT};
use kindling_schema::wire;
use kindling_translate::{loc, tree, Location, Space, Translated};
use serde::{de::DeserializeOwned, Serialize};

pub use kindling_config::{ConfigFile, TranslateOptions};
pub use kindling_translate::{Report, Severity, TranslationSet};

/// A successfully compiled config
#[derive(Debug, Clone)]
pub struct Output {
    /// The provisioning document
    pub config: wire::Config,
    /// Where each part of the document came from in the config
    pub translations: TranslationSet,
    /// Any warnings
    pub report: Report,
}

impl Output {
    /// Renders the document as JSON, leaving out anything unset
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        let value = tree::strip_absent(serde_json::to_value(&self.config)?);
        if pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        }
    }
}

/// The reasons a compile can fail, each with the full report of diagnostics
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The config could not be translated at all
    #[error("config could not be translated")]
    Fatal(Report),
    /// The config was translated but is not valid
    #[error("config is invalid")]
    Invalid(Report),
    /// The config only has warnings, but warnings are treated as failures
    #[error("config has warnings and strict mode is enabled")]
    Strict(Report),
}

impl CompileError {
    /// Every diagnostic gathered before the compile failed
    pub fn report(&self) -> &Report {
        match self {
            CompileError::Fatal(report)
            | CompileError::Invalid(report)
            | CompileError::Strict(report) => report,
        }
    }
}

/// A config version that can be compiled directly from its parsed form
trait Compilable: Serialize + DeserializeOwned {
    fn validate(&self) -> Report;
    fn to_wire(&self, options: &TranslateOptions) -> Translated<wire::Config>;
}

macro_rules! impl_compilable {
    ($($version:ident),* $(,)?) => {
        $(
            impl Compilable for $version::Config {
                fn validate(&self) -> Report {
                    $version::Config::validate(self)
                }

                fn to_wire(&self, options: &TranslateOptions) -> Translated<wire::Config> {
                    $version::Config::to_wire(self, options)
                }
            }
        )*
    };
}

impl_compilable!(v1_4, v1_5, v1_6);

/// Compiles a parsed config into a provisioning document
///
/// The config's `variant` and `version` select the model it is read into.
pub fn compile(input: &serde_yaml::Value, options: &TranslateOptions) -> Result<Output, CompileError> {
    let field = |name: &str| input.get(name).and_then(serde_yaml::Value::as_str);
    let (variant, version) = (field("variant"), field("version"));
    let span = tracing::span!(
        tracing::Level::DEBUG,
        "compile",
        variant = variant.unwrap_or_default(),
        version = version.unwrap_or_default()
    );
    let _guard = span.enter();

    match (variant, version) {
        (Some(VARIANT), Some(v1_4::VERSION)) => compile_as::<v1_4::Config>(input, options),
        (Some(VARIANT), Some(v1_5::VERSION)) => compile_as::<v1_5::Config>(input, options),
        (Some(VARIANT), Some(v1_6::VERSION)) => compile_as::<v1_6::Config>(input, options),
        (variant, version) => {
            let mut report = Report::new();
            let message = match (variant, version) {
                (None, _) => "config has no variant".to_owned(),
                (_, None) => "config has no version".to_owned(),
                (Some(variant), Some(version)) => {
                    format!("unsupported config version {version:?} for variant {variant:?}")
                }
            };
            report.add_fatal(loc!(Authoring, "version"), message);
            Err(CompileError::Fatal(report))
        }
    }
}

fn compile_as<C: Compilable>(
    input: &serde_yaml::Value,
    options: &TranslateOptions,
) -> Result<Output, CompileError> {
    let root = Location::root(Space::Authoring);
    let mut report = Report::new();

    let tree = match serde_json::to_value(input) {
        Ok(tree) => tree,
        Err(e) => {
            report.add_fatal(root, format!("config is not a tree of records: {e}"));
            return Err(CompileError::Fatal(report));
        }
    };
    let config: C = match serde_yaml::from_value(input.clone()) {
        Ok(config) => config,
        Err(e) => {
            report.add_fatal(root, format!("config does not match its version: {e}"));
            return Err(CompileError::Fatal(report));
        }
    };
    for steps in tree::unused_keys(&tree, &tree::to_tree(&config)) {
        report.add_warning(root.join(&steps), "unused key");
    }

    report.merge(config.validate());
    if report.is_error() {
        tracing::debug!("Config failed validation");
        return Err(CompileError::Invalid(report));
    }

    let (config, translations, stage_report) = config.to_wire(options).into_parts();
    report.merge(stage_report);
    report.correlate(&translations);
    tracing::debug!(
        "Compiled config; {} translations recorded, {} diagnostics",
        translations.len(),
        report.entries().len()
    );

    if report.is_fatal() {
        Err(CompileError::Fatal(report))
    } else if report.is_error() {
        Err(CompileError::Invalid(report))
    } else if report.fails(options.strict) {
        Err(CompileError::Strict(report))
    } else {
        Ok(Output {
            config,
            translations,
            report,
        })
    }
}
