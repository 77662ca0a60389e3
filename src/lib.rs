mod chart;
mod docx;
mod error;
mod fonts;
mod model;
mod pdf;
mod report;

pub use error::Error;
pub use model::{RenderSettings, SectionId, Snapshot};
pub use report::{Report, build_report};

use std::path::Path;
use std::time::Instant;

/// Render `snapshot` as a paginated PDF and write it under `out_dir` with its
/// derived file name. Returns the path written.
pub fn export_pdf(
    snapshot: &Snapshot,
    settings: &RenderSettings,
    out_dir: &Path,
) -> Result<std::path::PathBuf, Error> {
    let t0 = Instant::now();

    let report = report::build_report(snapshot, settings)?;
    let t_build = t0.elapsed();

    let bytes = pdf::render(&report, settings)?;
    let t_render = t0.elapsed();

    let path = out_dir.join(format!("{}.pdf", report.file_stem));
    std::fs::write(&path, &bytes).map_err(Error::Io)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: build={:.1}ms, render={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_build.as_secs_f64() * 1000.0,
        (t_render - t_build).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(path)
}

/// Render `snapshot` as a DOCX flow document and write it under `out_dir`
/// with its derived file name. Returns the path written.
pub fn export_docx(
    snapshot: &Snapshot,
    settings: &RenderSettings,
    out_dir: &Path,
) -> Result<std::path::PathBuf, Error> {
    let t0 = Instant::now();

    let report = report::build_report(snapshot, settings)?;
    let t_build = t0.elapsed();

    let bytes = docx::render(&report)?;
    let t_render = t0.elapsed();

    let path = out_dir.join(format!("{}.docx", report.file_stem));
    std::fs::write(&path, &bytes).map_err(Error::Io)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: build={:.1}ms, render={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_build.as_secs_f64() * 1000.0,
        (t_render - t_build).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(path)
}

/// In-memory variants for callers that handle persistence themselves.
pub fn render_pdf_bytes(snapshot: &Snapshot, settings: &RenderSettings) -> Result<Vec<u8>, Error> {
    let report = report::build_report(snapshot, settings)?;
    pdf::render(&report, settings)
}

pub fn render_docx_bytes(snapshot: &Snapshot, settings: &RenderSettings) -> Result<Vec<u8>, Error> {
    let report = report::build_report(snapshot, settings)?;
    docx::render(&report)
}
