//! 스캔 결과의 프로비넌스별 분할과 패키지 단위 병합
//!
//! 원격 스캐너나 저장된 패키지 결과는 소스 트리 전체 기준 경로를
//! 씁니다. 캐시는 프로비넌스 단위이므로, 전체 트리 요약을 각 발견의
//! 경로가 속한 프로비넌스별로 쪼개고(split), 최종 출력에서는 다시
//! 하위 저장소 경로를 붙여 합칩니다(merge).
//!
//! 경로 귀속은 컴포넌트 단위 접두사 매칭입니다. `lib/ab`는
//! `lib/abc/x.c`의 접두사가 아닙니다. 여러 접두사가 맞으면 가장 긴
//! 경로(가장 깊은 하위 저장소)가 이기고, 아무것도 맞지 않으면 루트
//! (`""`)로 귀속됩니다.

use std::collections::BTreeMap;

use provost_core::provenance::{KnownProvenance, NestedProvenance};
use provost_core::scan::{
    NestedProvenanceScanResult, ScanResult, ScanSummary, ScannerDetails, TextLocation,
};

/// `prefix`가 `path`의 컴포넌트 단위 접두사이면 나머지 경로를 반환합니다.
fn strip_component_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return Some(path);
    }
    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() {
        return Some("");
    }
    rest.strip_prefix('/')
}

/// 하위 저장소 경로를 깊은 것부터 정렬해 반환합니다.
fn paths_deepest_first(nested: &NestedProvenance) -> Vec<&str> {
    let mut paths: Vec<&str> = nested.sub_repositories.keys().map(String::as_str).collect();
    paths.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    paths
}

/// 경로가 귀속되는 하위 저장소 경로를 찾습니다. 루트 귀속이면 `None`입니다.
fn owning_path<'a>(paths: &[&'a str], file_path: &str) -> Option<(&'a str, String)> {
    for candidate in paths {
        if let Some(rest) = strip_component_prefix(file_path, candidate) {
            return Some((candidate, rest.to_owned()));
        }
    }
    None
}

/// 전체 트리 스캔 요약을 프로비넌스별 결과로 분할합니다.
///
/// 중첩 프로비넌스에 포함된 모든 프로비넌스에 대해 결과를 하나씩
/// 만듭니다. 발견이 없는 프로비넌스도 빈 결과를 받으므로, 분할 결과만으로
/// 해당 스캐너의 커버리지가 완전해집니다. 이슈와 검증 코드는 파일 단위
/// 귀속이 불가능하므로 루트 결과에 남습니다.
pub fn split_summary(
    nested: &NestedProvenance,
    scanner: &ScannerDetails,
    summary: ScanSummary,
) -> Vec<ScanResult> {
    let paths = paths_deepest_first(nested);

    // 경로 -> 프로비넌스별 요약. 루트는 "" 키를 씁니다.
    let mut summaries: BTreeMap<&str, ScanSummary> = BTreeMap::new();
    summaries.insert(
        "",
        ScanSummary {
            start_time: summary.start_time,
            end_time: summary.end_time,
            package_verification_code: summary.package_verification_code.clone(),
            license_findings: Default::default(),
            copyright_findings: Default::default(),
            issues: summary.issues.clone(),
        },
    );
    for path in &paths {
        summaries.insert(
            path,
            ScanSummary {
                start_time: summary.start_time,
                end_time: summary.end_time,
                package_verification_code: String::new(),
                license_findings: Default::default(),
                copyright_findings: Default::default(),
                issues: Vec::new(),
            },
        );
    }

    for finding in summary.license_findings {
        let (key, rest) = match owning_path(&paths, &finding.location.path) {
            Some((path, rest)) => (path, rest),
            None => ("", finding.location.path.clone()),
        };
        if let Some(part) = summaries.get_mut(key) {
            part.license_findings.insert(provost_core::scan::LicenseFinding {
                license: finding.license,
                location: TextLocation {
                    path: rest,
                    ..finding.location
                },
            });
        }
    }

    for finding in summary.copyright_findings {
        let (key, rest) = match owning_path(&paths, &finding.location.path) {
            Some((path, rest)) => (path, rest),
            None => ("", finding.location.path.clone()),
        };
        if let Some(part) = summaries.get_mut(key) {
            part.copyright_findings
                .insert(provost_core::scan::CopyrightFinding {
                    statement: finding.statement,
                    location: TextLocation {
                        path: rest,
                        ..finding.location
                    },
                });
        }
    }

    summaries
        .into_iter()
        .map(|(path, part)| {
            let provenance = if path.is_empty() {
                nested.root.clone()
            } else {
                KnownProvenance::Repository(nested.sub_repositories[path].clone())
            };
            ScanResult {
                provenance,
                scanner: scanner.clone(),
                summary: part,
            }
        })
        .collect()
}

/// 경로 앞에 하위 저장소 경로를 붙입니다.
fn prefix_path(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        path.to_owned()
    } else if path.is_empty() {
        prefix.to_owned()
    } else {
        format!("{prefix}/{path}")
    }
}

/// 프로비넌스별 결과를 패키지 단위 평탄 결과로 병합합니다.
///
/// 스캐너마다 하나의 [`ScanResult`]를 만듭니다. 하위 저장소 발견의
/// 경로는 해당 하위 저장소의 상대 경로가 앞에 붙고, 프로비넌스는 루트로
/// 통일됩니다. 스캐너 간 발견은 병합하지 않습니다.
pub fn merge_nested_result(result: &NestedProvenanceScanResult) -> Vec<ScanResult> {
    let nested = &result.nested_provenance;

    // 프로비넌스 -> 트리 내 경로 (같은 프로비넌스가 여러 경로에 내장될
    // 수 있으므로 경로 목록)
    let mut locations: BTreeMap<KnownProvenance, Vec<&str>> = BTreeMap::new();
    locations.entry(nested.root.clone()).or_default().push("");
    for (path, repository) in &nested.sub_repositories {
        locations
            .entry(KnownProvenance::Repository(repository.clone()))
            .or_default()
            .push(path);
    }

    let mut scanners: Vec<ScannerDetails> = Vec::new();
    for results in result.scan_results.values() {
        for r in results {
            if !scanners.contains(&r.scanner) {
                scanners.push(r.scanner.clone());
            }
        }
    }

    scanners
        .into_iter()
        .map(|scanner| {
            let mut merged = ScanSummary::default();
            let mut first = true;

            for (provenance, results) in &result.scan_results {
                let Some(paths) = locations.get(provenance) else {
                    continue;
                };
                for r in results.iter().filter(|r| r.scanner == scanner) {
                    if first {
                        merged.start_time = r.summary.start_time;
                        merged.end_time = r.summary.end_time;
                        first = false;
                    } else {
                        merged.start_time = merged.start_time.min(r.summary.start_time);
                        merged.end_time = merged.end_time.max(r.summary.end_time);
                    }
                    if *provenance == nested.root {
                        merged.package_verification_code =
                            r.summary.package_verification_code.clone();
                    }
                    merged.issues.extend(r.summary.issues.iter().cloned());

                    for prefix in paths {
                        for finding in &r.summary.license_findings {
                            merged
                                .license_findings
                                .insert(provost_core::scan::LicenseFinding {
                                    license: finding.license.clone(),
                                    location: TextLocation {
                                        path: prefix_path(prefix, &finding.location.path),
                                        ..finding.location.clone()
                                    },
                                });
                        }
                        for finding in &r.summary.copyright_findings {
                            merged
                                .copyright_findings
                                .insert(provost_core::scan::CopyrightFinding {
                                    statement: finding.statement.clone(),
                                    location: TextLocation {
                                        path: prefix_path(prefix, &finding.location.path),
                                        ..finding.location.clone()
                                    },
                                });
                        }
                    }
                }
            }

            ScanResult {
                provenance: nested.root.clone(),
                scanner,
                summary: merged,
            }
        })
        .collect()
}
