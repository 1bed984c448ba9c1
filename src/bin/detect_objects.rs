use haar_cascade::config::detect::load_config;
use haar_cascade::detect::{Detection, MultiScaleDetector};
use haar_cascade::diagnostics::DetectionReport;
use haar_cascade::image::io::{
    draw_rectangles, load_grayscale_image, save_grayscale_u8, write_json_file,
};
use serde::Serialize;
use std::env;
use std::path::Path;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;

    let detector = MultiScaleDetector::from_file(&config.model, config.detection.clone())
        .map_err(|e| e.to_string())?;
    let mut gray = load_grayscale_image(&config.input)?;
    let image = gray.as_view().to_f32();

    let (detections, report) = detector.detect_with_report(&image);

    write_json_file(
        &config.output.detections_json,
        &DetectionSummary {
            width: image.w,
            height: image.h,
            detection_count: detections.len(),
            detections: &detections,
        },
    )?;
    if let Some(path) = &config.output.report_json {
        write_json_file(path, &report)?;
    }
    if let Some(path) = &config.output.annotated_image {
        let boxes: Vec<[usize; 4]> = detections.iter().map(Detection::as_rect).collect();
        draw_rectangles(&mut gray, &boxes, 255, 2);
        save_grayscale_u8(&gray, path)?;
        println!("Saved annotated image to {}", path.display());
    }

    print_summary(&detections, &report);
    Ok(())
}

fn print_summary(detections: &[Detection], report: &DetectionReport) {
    println!(
        "Scanned {} scales ({} windows): {} candidates, {} after NMS in {:.1} ms",
        report.scales.len(),
        report.windows_evaluated(),
        report.raw_detections,
        report.final_detections,
        report.timings.total_ms
    );
    for d in detections {
        println!("  [{}, {}, {}x{}]", d.x, d.y, d.width, d.height);
    }
}

fn usage() -> String {
    "Usage: detect_objects <config.json>".to_string()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DetectionSummary<'a> {
    width: usize,
    height: usize,
    detection_count: usize,
    detections: &'a [Detection],
}
