//! 외부 명령 기반 로컬 스캐너
//!
//! 설정된 명령을 스캔 대상 디렉토리를 마지막 인자로 붙여 실행하고,
//! 표준 출력의 JSON을 스캔 요약으로 변환합니다. 출력 계약:
//!
//! ```json
//! {
//!   "package_verification_code": "…",
//!   "license_findings": [
//!     { "license": "MIT", "path": "src/a.c", "start_line": 1, "end_line": 3 }
//!   ],
//!   "copyright_findings": [
//!     { "statement": "Copyright …", "path": "src/a.c", "start_line": 1, "end_line": 1 }
//!   ],
//!   "issues": [ { "message": "…", "severity": "Warning" } ]
//! }
//! ```
//!
//! 모든 필드는 생략 가능합니다.

use std::path::Path;
use std::process::Command;
use std::time::SystemTime;

use serde::Deserialize;
use tracing::debug;

use provost_core::error::ScanError;
use provost_core::scan::{
    CopyrightFinding, LicenseFinding, ScanSummary, ScannerDetails, TextLocation,
};
use provost_core::types::{Issue, Severity};

use crate::wrapper::LocalScanner;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawOutput {
    package_verification_code: String,
    license_findings: Vec<RawLicenseFinding>,
    copyright_findings: Vec<RawCopyrightFinding>,
    issues: Vec<RawIssue>,
}

#[derive(Debug, Deserialize)]
struct RawLicenseFinding {
    license: String,
    path: String,
    #[serde(default)]
    start_line: u32,
    #[serde(default)]
    end_line: u32,
}

#[derive(Debug, Deserialize)]
struct RawCopyrightFinding {
    statement: String,
    path: String,
    #[serde(default)]
    start_line: u32,
    #[serde(default)]
    end_line: u32,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    message: String,
    #[serde(default)]
    severity: Severity,
}

/// 외부 명령을 실행하는 로컬 스캐너
#[derive(Debug, Clone)]
pub struct CommandScanner {
    details: ScannerDetails,
    command: String,
    args: Vec<String>,
}

impl CommandScanner {
    /// 명령 스캐너를 생성합니다.
    ///
    /// 설정 지문은 명령과 인자에서 파생되므로, 같은 스캐너라도 인자가
    /// 다르면 저장된 결과를 공유하지 않습니다.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        command: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        let command = command.into();
        let configuration = if args.is_empty() {
            command.clone()
        } else {
            format!("{command} {}", args.join(" "))
        };
        Self {
            details: ScannerDetails {
                name: name.into(),
                version: version.into(),
                configuration,
            },
            command,
            args,
        }
    }

    fn parse_output(&self, stdout: &[u8]) -> Result<RawOutput, ScanError> {
        serde_json::from_slice(stdout).map_err(|e| ScanError::OutputParse {
            scanner: self.details.name.clone(),
            reason: e.to_string(),
        })
    }
}

impl LocalScanner for CommandScanner {
    fn details(&self) -> &ScannerDetails {
        &self.details
    }

    fn scan_path(&self, path: &Path) -> Result<ScanSummary, ScanError> {
        let start_time = SystemTime::now();
        debug!(scanner = %self.details.name, path = %path.display(), "running command scanner");

        let output = Command::new(&self.command)
            .args(&self.args)
            .arg(path)
            .output()
            .map_err(|e| ScanError::ScannerFailed {
                scanner: self.details.name.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScanError::ScannerFailed {
                scanner: self.details.name.clone(),
                reason: format!("exit status {}: {}", output.status, stderr.trim()),
            });
        }

        let raw = self.parse_output(&output.stdout)?;
        let end_time = SystemTime::now();

        let mut summary = ScanSummary {
            start_time,
            end_time,
            package_verification_code: raw.package_verification_code,
            license_findings: Default::default(),
            copyright_findings: Default::default(),
            issues: Vec::new(),
        };
        for finding in raw.license_findings {
            summary.license_findings.insert(LicenseFinding {
                license: finding.license,
                location: TextLocation::new(finding.path, finding.start_line, finding.end_line),
            });
        }
        for finding in raw.copyright_findings {
            summary.copyright_findings.insert(CopyrightFinding {
                statement: finding.statement,
                location: TextLocation::new(finding.path, finding.start_line, finding.end_line),
            });
        }
        for issue in raw.issues {
            summary.issues.push(Issue {
                timestamp: end_time,
                source: self.details.name.clone(),
                message: issue.message,
                severity: issue.severity,
            });
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner() -> CommandScanner {
        CommandScanner::new("fake", "1.0.0", "fake-scan", vec!["--json".to_owned()])
    }

    #[test]
    fn configuration_is_derived_from_command_line() {
        assert_eq!(scanner().details().configuration, "fake-scan --json");
        let bare = CommandScanner::new("fake", "1.0.0", "fake-scan", vec![]);
        assert_eq!(bare.details().configuration, "fake-scan");
    }

    #[test]
    fn parses_full_output() {
        let raw = scanner()
            .parse_output(
                br#"{
                    "package_verification_code": "abc",
                    "license_findings": [
                        { "license": "MIT", "path": "a.c", "start_line": 1, "end_line": 2 }
                    ],
                    "copyright_findings": [
                        { "statement": "Copyright X", "path": "a.c" }
                    ],
                    "issues": [ { "message": "timeout on b.c" } ]
                }"#,
            )
            .unwrap();
        assert_eq!(raw.package_verification_code, "abc");
        assert_eq!(raw.license_findings.len(), 1);
        assert_eq!(raw.copyright_findings[0].start_line, 0);
        assert_eq!(raw.issues[0].severity, Severity::Warning);
    }

    #[test]
    fn empty_object_is_a_valid_output() {
        let raw = scanner().parse_output(b"{}").unwrap();
        assert!(raw.license_findings.is_empty());
    }

    #[test]
    fn malformed_output_is_a_parse_error() {
        let err = scanner().parse_output(b"not json").unwrap_err();
        assert!(matches!(err, ScanError::OutputParse { .. }));
    }

    // 존재하지 않는 명령은 실행 실패로 보고됩니다.
    #[test]
    fn missing_command_is_a_scanner_failure() {
        let scanner = CommandScanner::new(
            "missing",
            "1.0.0",
            "provost-test-no-such-command",
            vec![],
        );
        let err = scanner.scan_path(Path::new("/tmp")).unwrap_err();
        assert!(matches!(err, ScanError::ScannerFailed { .. }));
    }
}
