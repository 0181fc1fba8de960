//! Builds a synthetic page with a pasted high-frequency block, runs the
//! detector on it and writes the outputs.
//!
//! Run with: cargo run --example synthetic_page -- [output_dir] [threshold]

use std::env;
use std::path::Path;

use image::{Rgb, RgbImage};
use page_forensics::{
    ForensicsPipeline, PageImage, PipelineConfig, error::Result, pipeline::ReportWriter,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let output_dir = args.get(1).map(|s| s.as_str()).unwrap_or("./output");
    let threshold = args
        .get(2)
        .and_then(|t| t.parse().ok())
        .unwrap_or(0.3);

    let mut rgb = RgbImage::from_pixel(400, 300, Rgb([128, 128, 128]));
    for y in 112..176 {
        for x in 160..240 {
            let v = if (x + y) % 2 == 0 { 255 } else { 0 };
            rgb.put_pixel(x, y, Rgb([v, v, v]));
        }
    }

    let config = PipelineConfig {
        threshold,
        save_patches: true,
        ..Default::default()
    };
    let pipeline = ForensicsPipeline::new(config)?;
    let writer = ReportWriter::new(output_dir, true)?;

    let page = PageImage::from_rgb(1, rgb)?;
    let analysis = pipeline.analyze_page(&page)?;
    let report = pipeline.build_report(Path::new("synthetic.png"), &analysis);
    let artifacts = writer.write_page(&page, &analysis, &report)?;

    print!("{}", report.render_text());
    println!();
    println!("Annotated page: {}", artifacts.marked.display());
    println!("Heatmap:        {}", artifacts.heatmap.display());

    Ok(())
}
