pub mod visualization;

use serde::Serialize;

use crate::detection::{BoundingBox, RegionFinding};

pub const REPORT_HEADER: &str = "==== Document Tampering Detection Report v3.0 ====";
pub const NO_FINDINGS: &str = "No suspicious regions found.";

/// Findings for one page, in the order the pipeline was configured to emit.
#[derive(Debug, Clone, PartialEq)]
pub struct PageReport {
    pub source: String,
    pub base_name: String,
    pub page: usize,
    pub threshold: f64,
    pub findings: Vec<RegionFinding>,
}

impl PageReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn render_text(&self) -> String {
        let mut out = format!(
            "{}\nSource: {}\nPage: {}\n\n",
            REPORT_HEADER, self.source, self.page
        );

        if self.findings.is_empty() {
            out.push_str(NO_FINDINGS);
            out.push('\n');
            return out;
        }

        let blocks = self
            .findings
            .iter()
            .map(format_finding)
            .collect::<Vec<_>>();
        out.push_str(&blocks.join("\n"));
        out
    }
}

fn format_finding(finding: &RegionFinding) -> String {
    let b = &finding.bbox;
    format!(
        "[Region {}] bbox: ({},{},{},{})\n  \
         Total: {:.2} | ELA: {:.2} | Noise: {:.2} | FFT: {:.2}\n",
        finding.index,
        b.x,
        b.y,
        b.width,
        b.height,
        finding.total_score,
        finding.ela_score,
        finding.noise_score,
        finding.fft_score
    )
}

#[derive(Serialize)]
pub struct JsonReport {
    pub source: String,
    pub page: usize,
    pub threshold: f64,
    pub finding_count: usize,
    pub findings: Vec<FindingSection>,
}

#[derive(Serialize)]
pub struct FindingSection {
    pub index: usize,
    pub bbox: BoundingBox,
    pub total_score: f64,
    pub ela_score: f64,
    pub noise_score: f64,
    pub fft_score: f64,
}

impl From<&PageReport> for JsonReport {
    fn from(report: &PageReport) -> Self {
        Self {
            source: report.source.clone(),
            page: report.page,
            threshold: report.threshold,
            finding_count: report.findings.len(),
            findings: report
                .findings
                .iter()
                .map(|f| FindingSection {
                    index: f.index,
                    bbox: f.bbox,
                    total_score: f.total_score,
                    ela_score: f.ela_score,
                    noise_score: f.noise_score,
                    fft_score: f.fft_score,
                })
                .collect(),
        }
    }
}

impl JsonReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
