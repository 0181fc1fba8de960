use std::path::{Path, PathBuf};

use image::DynamicImage;
use log::{debug, info};
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
    PageImage, PipelineConfig,
    analysis::{
        SignalExtractor, ela::ElaAnalyzer, frequency::FrequencyAnalyzer, noise::NoiseAnalyzer,
    },
    detection::{RegionFinding, regions::RegionExtractor},
    error::{ForensicsError, Result},
    fusion::FusedMaps,
    raster::{Rasterizer, base_name},
    report::{JsonReport, PageReport, visualization::Visualizer},
};

/// Everything computed for one page before it is reported.
#[derive(Debug, Clone, PartialEq)]
pub struct PageAnalysis {
    pub page: usize,
    pub maps: FusedMaps,
    pub findings: Vec<RegionFinding>,
}

/// Files written for one page.
#[derive(Debug, Clone, Default)]
pub struct PageArtifacts {
    pub marked: PathBuf,
    pub heatmap: PathBuf,
    pub text_report: PathBuf,
    pub json_report: PathBuf,
    pub patches: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct PageOutcome {
    pub report: PageReport,
    pub artifacts: PageArtifacts,
}

pub struct ForensicsPipeline {
    config: PipelineConfig,
    ela: ElaAnalyzer,
    noise: NoiseAnalyzer,
    frequency: FrequencyAnalyzer,
    regions: RegionExtractor,
}

impl ForensicsPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            ela: ElaAnalyzer::new(config.ela_quality)?,
            noise: NoiseAnalyzer::new(),
            frequency: FrequencyAnalyzer::new(),
            regions: RegionExtractor::new(config.threshold)?,
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn analyze_page(&self, page: &PageImage) -> Result<PageAnalysis> {
        let (width, height) = page.dimensions();
        info!("analyzing page {} ({}x{})", page.index(), width, height);

        let ela = self.ela.extract(page)?;
        let noise = self.noise.extract(page)?;
        let fft = self.frequency.extract(page)?;
        debug!(
            "page {}: extracted {}, {}, {} maps",
            page.index(),
            self.ela.name(),
            self.noise.name(),
            self.frequency.name()
        );

        let maps = FusedMaps::fuse(&ela, &noise, &fft)?;
        let mut findings = self.regions.extract(&maps);
        self.config.finding_order.apply(&mut findings);

        info!("page {}: {} suspicious region(s)", page.index(), findings.len());

        Ok(PageAnalysis {
            page: page.index(),
            maps,
            findings,
        })
    }

    pub fn build_report(&self, source: &Path, analysis: &PageAnalysis) -> PageReport {
        PageReport {
            source: source.display().to_string(),
            base_name: base_name(source),
            page: analysis.page,
            threshold: self.config.threshold,
            findings: analysis.findings.clone(),
        }
    }

    /// Analyses already-rasterized pages without writing anything. Reports
    /// come back in page order.
    pub fn analyze_document(
        &self,
        source: &Path,
        pages: Vec<DynamicImage>,
    ) -> Result<Vec<PageReport>> {
        self.process_pages(pages, |page| {
            let analysis = self.analyze_page(&page)?;
            Ok(self.build_report(source, &analysis))
        })
    }

    /// Rasterizes `source` once, then analyses and writes every page.
    pub fn run(
        &self,
        source: &Path,
        rasterizer: &(dyn Rasterizer + Sync),
        writer: &ReportWriter,
    ) -> Result<Vec<PageOutcome>> {
        if !source.exists() {
            return Err(ForensicsError::InputNotFound(source.to_path_buf()));
        }

        info!(
            "rasterizing {} with {} at {} dpi",
            source.display(),
            rasterizer.name(),
            self.config.dpi
        );
        let pages = rasterizer.rasterize(source, self.config.dpi)?;

        self.process_pages(pages, |page| {
            let analysis = self.analyze_page(&page)?;
            let report = self.build_report(source, &analysis);
            let artifacts = writer.write_page(&page, &analysis, &report)?;
            Ok(PageOutcome { report, artifacts })
        })
    }

    fn process_pages<T, F>(&self, pages: Vec<DynamicImage>, per_page: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(PageImage) -> Result<T> + Sync,
    {
        if pages.is_empty() {
            return Err(ForensicsError::UnsupportedInput(
                "document contains no pages".into(),
            ));
        }

        // Every page is validated before the first one is analysed.
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(i, image)| PageImage::new(i + 1, image))
            .collect::<Result<Vec<_>>>()?;

        if self.config.parallel {
            pages.into_par_iter().map(&per_page).collect()
        } else {
            pages.into_iter().map(&per_page).collect()
        }
    }
}

/// Persists the per-page outputs into one directory.
pub struct ReportWriter {
    output_dir: PathBuf,
    save_patches: bool,
    visualizer: Visualizer,
}

impl ReportWriter {
    pub fn new<P: AsRef<Path>>(output_dir: P, save_patches: bool) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)?;

        Ok(Self {
            output_dir,
            save_patches,
            visualizer: Visualizer::new(),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn page_path(&self, report: &PageReport, suffix: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_p{}_{}", report.base_name, report.page, suffix))
    }

    pub fn write_page(
        &self,
        page: &PageImage,
        analysis: &PageAnalysis,
        report: &PageReport,
    ) -> Result<PageArtifacts> {
        let marked = self.page_path(report, "marked.jpg");
        self.visualizer
            .annotate(page.rgb(), &report.findings)
            .save(&marked)?;

        let heatmap = self.page_path(report, "heatmap.jpg");
        self.visualizer
            .create_heatmap(&analysis.maps.fused)
            .save(&heatmap)?;

        let text_report = self.page_path(report, "report.txt");
        std::fs::write(&text_report, report.render_text())?;

        let json_report = self.page_path(report, "report.json");
        std::fs::write(&json_report, JsonReport::from(report).to_json()?)?;

        let mut patches = Vec::new();
        if self.save_patches {
            for finding in &report.findings {
                let path = self.page_path(report, &format!("patch{}.jpg", finding.index));
                self.visualizer
                    .crop_region(page.rgb(), &finding.bbox)
                    .save(&path)?;
                patches.push(path);
            }
        }

        debug!(
            "page {}: wrote outputs to {}",
            report.page,
            self.output_dir.display()
        );

        Ok(PageArtifacts {
            marked,
            heatmap,
            text_report,
            json_report,
            patches,
        })
    }
}
