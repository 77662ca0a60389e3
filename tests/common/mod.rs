//! Shared fixtures and artifact-inspection helpers for the integration tests.

use std::io::Read;

use dashprint::{RenderSettings, Snapshot};

/// A representative snapshot covering every section kind.
pub fn sample_snapshot() -> Snapshot {
    serde_json::from_str(
        r#"{
            "period": { "start": "2025-11-29", "end": "2025-12-29" },
            "title": "Acme Holding",
            "metrics": {
                "totalVisitors": 2715,
                "totalPageViews": 5205,
                "resumesReceived": 75,
                "leadsToBitrix": 22,
                "conversionRate": 2.7
            },
            "topPages": [
                { "name": "Homepage", "visitors": 1180 },
                { "name": "About Us", "visitors": 219 },
                { "name": "Vacancies", "visitors": 188 },
                { "name": "Blog", "visitors": 180 },
                { "name": "Contact", "visitors": 146 }
            ],
            "trafficSources": [
                { "name": "Direct", "visitors": 1520 },
                { "name": "Organic Search", "visitors": 892 },
                { "name": "Referral", "visitors": 203 },
                { "name": "Social", "visitors": 100 }
            ],
            "countries": [
                { "country": "United Arab Emirates", "code": "AE",
                  "visitors": 605, "views": 1210 },
                { "country": "India", "code": "IN", "visitors": 398, "views": 835 },
                { "country": "Saudi Arabia", "code": "SA", "visitors": 377, "views": 790 }
            ],
            "devices": [
                { "name": "Desktop", "visitors": 1602 },
                { "name": "Mobile", "visitors": 1080 },
                { "name": "Tablet", "visitors": 33 }
            ],
            "operatingSystems": [
                { "name": "Windows", "percentage": 68.0 },
                { "name": "macOS", "percentage": 22.0 },
                { "name": "Linux", "percentage": 10.0 }
            ],
            "blogPost": { "title": "Market Outlook for the Gulf Region",
                          "lifetimeViews": 15320 },
            "insights": [
                "Desktop dominates traffic at 59% of visitors.",
                "Direct traffic is the strongest acquisition channel."
            ]
        }"#,
    )
    .expect("sample snapshot must parse")
}

pub fn default_settings() -> RenderSettings {
    RenderSettings::default()
}

/// Number of chart sections the sample snapshot yields with everything
/// visible: top pages, traffic sources, countries, devices, OS.
pub const SAMPLE_CHART_COUNT: usize = 5;

/// Count occurrences of a byte pattern in an artifact.
pub fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    haystack
        .windows(needle.len())
        .filter(|w| *w == needle)
        .count()
}

/// Read one part out of a DOCX (zip) package.
pub fn read_zip_part(bytes: &[u8], name: &str) -> Vec<u8> {
    let mut archive =
        zip::ZipArchive::new(std::io::Cursor::new(bytes)).expect("artifact must be a zip package");
    let mut file = archive
        .by_name(name)
        .unwrap_or_else(|_| panic!("package must contain {name}"));
    let mut out = Vec::new();
    file.read_to_end(&mut out).expect("part must be readable");
    out
}

/// All file names in a DOCX (zip) package.
pub fn zip_part_names(bytes: &[u8]) -> Vec<String> {
    let archive =
        zip::ZipArchive::new(std::io::Cursor::new(bytes)).expect("artifact must be a zip package");
    archive.file_names().map(String::from).collect()
}
