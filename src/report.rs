//! Report orchestration: turns an analytics snapshot plus settings into an
//! ordered list of sections with pre-rasterized chart bitmaps, which both
//! document backends consume. Section visibility and dataset validation
//! happen here, before any drawing starts, so the rasterizers never see an
//! empty dataset.

use crate::chart::{self, Bitmap, format_value};
use crate::error::Error;
use crate::model::{DatasetEntry, RenderSettings, SectionId, Snapshot};

/// Distinguishes the two bitmap shapes for per-kind output sizing (wide bar
/// canvases vs. squarer pie canvases).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Pie,
}

#[derive(Debug)]
pub struct MetricEntry {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug)]
pub enum SectionBody {
    MetricsCards(Vec<MetricEntry>),
    Chart(ChartKind, Bitmap),
    Highlights { title: String, lifetime_views: String },
    Insights(Vec<String>),
}

#[derive(Debug)]
pub struct Section {
    pub id: SectionId,
    pub title: &'static str,
    pub body: SectionBody,
    /// Extra vertical gap inserted before the section heading, in page units.
    pub gap_before: f32,
}

/// Fully prepared report: header lines plus sections in their fixed order.
/// Built once per export; each export re-rasterizes from current settings.
#[derive(Debug)]
pub struct Report {
    pub title: String,
    pub subtitle: String,
    pub period_label: String,
    pub file_stem: String,
    pub sections: Vec<Section>,
}

pub fn build_report(snapshot: &Snapshot, settings: &RenderSettings) -> Result<Report, Error> {
    let mut sections = Vec::new();
    let palette = &settings.palette;
    let bar_height_px = (settings.chart_height * 5.0) as u32;

    if settings.is_visible(SectionId::Metrics) {
        let m = &snapshot.metrics;
        sections.push(Section {
            id: SectionId::Metrics,
            title: "KEY METRICS",
            body: SectionBody::MetricsCards(vec![
                MetricEntry {
                    label: "Total Visitors",
                    value: format_value(m.total_visitors as f64),
                },
                MetricEntry {
                    label: "Total Page Views",
                    value: format_value(m.total_page_views as f64),
                },
                MetricEntry {
                    label: "Resumes Received",
                    value: format_value(m.resumes_received as f64),
                },
                MetricEntry {
                    label: "Leads to Bitrix",
                    value: format_value(m.leads_to_bitrix as f64),
                },
                MetricEntry {
                    label: "Conversion Rate",
                    value: format!("{}%", format_value(m.conversion_rate)),
                },
            ]),
            gap_before: 0.0,
        });
    }

    if settings.is_visible(SectionId::TopPages) {
        let data: Vec<DatasetEntry> = snapshot
            .top_pages
            .iter()
            .map(|p| DatasetEntry::new(p.name.clone(), p.visitors))
            .collect();
        require_non_empty(&data, "TOP PERFORMING PAGES")?;
        sections.push(Section {
            id: SectionId::TopPages,
            title: "TOP PERFORMING PAGES",
            body: SectionBody::Chart(
                ChartKind::Bar,
                chart::render_bar_chart(&data, 700, bar_height_px, palette)?,
            ),
            // Breathing room between the metrics cards and the first chart.
            gap_before: 10.0,
        });
    }

    if settings.is_visible(SectionId::TrafficSources) {
        let data: Vec<DatasetEntry> = snapshot
            .traffic_sources
            .iter()
            .map(|s| DatasetEntry::new(s.name.clone(), s.visitors))
            .collect();
        require_positive_total(&data, "TRAFFIC SOURCES")?;
        // A legend with more than four entries wraps awkwardly at the default
        // width, so widen the canvas for it.
        let multiplier = if data.len() > 4 {
            settings.pie_chart_width.max(3.5)
        } else {
            settings.pie_chart_width
        };
        sections.push(Section {
            id: SectionId::TrafficSources,
            title: "TRAFFIC SOURCES",
            body: SectionBody::Chart(
                ChartKind::Pie,
                chart::render_pie_chart(&data, 700, 400, palette, multiplier)?,
            ),
            gap_before: 0.0,
        });
    }

    if settings.is_visible(SectionId::Countries) {
        let data: Vec<DatasetEntry> = snapshot
            .countries
            .iter()
            .map(|c| {
                let mut entry = DatasetEntry::new(c.code.clone(), c.visitors);
                entry.secondary = Some(c.views);
                entry
            })
            .collect();
        require_non_empty(&data, "TOP COUNTRIES")?;
        sections.push(Section {
            id: SectionId::Countries,
            title: "TOP COUNTRIES",
            body: SectionBody::Chart(
                ChartKind::Bar,
                chart::render_bar_chart(&data, 700, bar_height_px, palette)?,
            ),
            gap_before: 0.0,
        });
    }

    if settings.is_visible(SectionId::Devices) {
        let data: Vec<DatasetEntry> = snapshot
            .devices
            .iter()
            .map(|d| DatasetEntry::new(d.name.clone(), d.visitors))
            .collect();
        require_positive_total(&data, "DEVICE BREAKDOWN")?;
        sections.push(Section {
            id: SectionId::Devices,
            title: "DEVICE BREAKDOWN",
            body: SectionBody::Chart(
                ChartKind::Pie,
                chart::render_pie_chart(&data, 700, 400, palette, settings.pie_chart_width)?,
            ),
            gap_before: 0.0,
        });
    }

    if settings.is_visible(SectionId::OperatingSystems) {
        // OS shares arrive as percentages; they feed the value channel
        // directly, since slice sweeps only depend on relative proportions.
        let data: Vec<DatasetEntry> = snapshot
            .operating_systems
            .iter()
            .map(|os| DatasetEntry::new(os.name.clone(), os.percentage))
            .collect();
        require_positive_total(&data, "OPERATING SYSTEMS")?;
        sections.push(Section {
            id: SectionId::OperatingSystems,
            title: "OPERATING SYSTEMS",
            body: SectionBody::Chart(
                ChartKind::Pie,
                chart::render_pie_chart(&data, 700, 400, palette, settings.pie_chart_width)?,
            ),
            gap_before: 0.0,
        });
    }

    if settings.is_visible(SectionId::ContentHighlights) {
        match &snapshot.blog_post {
            Some(post) => sections.push(Section {
                id: SectionId::ContentHighlights,
                title: "CONTENT HIGHLIGHTS",
                body: SectionBody::Highlights {
                    title: post.title.clone(),
                    lifetime_views: format_value(post.lifetime_views as f64),
                },
                gap_before: 0.0,
            }),
            None => log::debug!("content highlights visible but snapshot has no blog post"),
        }
    }

    if settings.is_visible(SectionId::Insights) {
        if snapshot.insights.is_empty() {
            log::debug!("insights visible but snapshot has none");
        } else {
            sections.push(Section {
                id: SectionId::Insights,
                title: "KEY INSIGHTS",
                body: SectionBody::Insights(snapshot.insights.clone()),
                gap_before: 0.0,
            });
        }
    }

    Ok(Report {
        title: snapshot.title.clone(),
        subtitle: snapshot.subtitle.clone(),
        period_label: format!(
            "Reporting Period: {} \u{2013} {}",
            format_date(&snapshot.period.start),
            format_date(&snapshot.period.end)
        ),
        file_stem: format!("REPORT-{}-to-{}", snapshot.period.start, snapshot.period.end),
        sections,
    })
}

fn require_non_empty(data: &[DatasetEntry], section: &str) -> Result<(), Error> {
    if data.is_empty() {
        return Err(Error::InvalidDataset(section.to_string()));
    }
    Ok(())
}

fn require_positive_total(data: &[DatasetEntry], section: &str) -> Result<(), Error> {
    require_non_empty(data, section)?;
    if data.iter().map(|d| d.value).sum::<f64>() <= 0.0 {
        return Err(Error::InvalidDataset(section.to_string()));
    }
    Ok(())
}

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Format an ISO `YYYY-MM-DD` date as `MMM dd, yyyy`. Anything that does not
/// parse is shown verbatim rather than failing the export.
fn format_date(iso: &str) -> String {
    let mut parts = iso.splitn(3, '-');
    let (Some(year), Some(month), Some(day)) = (parts.next(), parts.next(), parts.next()) else {
        return iso.to_string();
    };
    let (Ok(m), Ok(d)) = (month.parse::<usize>(), day.parse::<u32>()) else {
        return iso.to_string();
    };
    if !(1..=12).contains(&m) || !(1..=31).contains(&d) || year.len() != 4 {
        return iso.to_string();
    }
    format!("{} {:02}, {}", MONTHS[m - 1], d, year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlogPost, MetricsSummary, NamedCount, Period};

    fn snapshot() -> Snapshot {
        serde_json::from_str(
            r#"{
                "period": { "start": "2025-11-29", "end": "2025-12-29" },
                "metrics": { "totalVisitors": 2715, "totalPageViews": 5205,
                             "resumesReceived": 75, "leadsToBitrix": 22,
                             "conversionRate": 2.7 },
                "topPages": [ { "name": "Homepage", "visitors": 1180 },
                              { "name": "About Us", "visitors": 219 } ],
                "trafficSources": [ { "name": "Direct", "visitors": 1520 },
                                    { "name": "Organic Search", "visitors": 892 } ],
                "countries": [ { "country": "United Arab Emirates (AE)",
                                 "code": "AE", "visitors": 605, "views": 1210 } ],
                "devices": [ { "name": "Desktop", "visitors": 2113 },
                             { "name": "Mobile", "visitors": 568 } ],
                "operatingSystems": [ { "name": "Windows", "percentage": 68.0 },
                                      { "name": "macOS", "percentage": 22.0 } ],
                "blogPost": { "title": "Market Outlook", "lifetimeViews": 15320 },
                "insights": [ "Desktop dominates traffic." ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn sections_come_out_in_fixed_order() {
        let report = build_report(&snapshot(), &RenderSettings::default()).unwrap();
        let ids: Vec<SectionId> = report.sections.iter().map(|s| s.id).collect();
        assert_eq!(
            ids,
            vec![
                SectionId::Metrics,
                SectionId::TopPages,
                SectionId::TrafficSources,
                SectionId::Countries,
                SectionId::Devices,
                SectionId::OperatingSystems,
                SectionId::ContentHighlights,
                SectionId::Insights,
            ]
        );
    }

    #[test]
    fn hidden_sections_are_skipped_entirely() {
        let mut settings = RenderSettings::default();
        settings.show_top_pages = false;
        settings.show_os = false;
        let report = build_report(&snapshot(), &settings).unwrap();
        assert!(report.sections.iter().all(|s| s.id != SectionId::TopPages));
        assert!(
            report
                .sections
                .iter()
                .all(|s| s.id != SectionId::OperatingSystems)
        );
    }

    #[test]
    fn empty_visible_chart_dataset_fails_validation() {
        let mut snap = snapshot();
        snap.top_pages.clear();
        let err = build_report(&snap, &RenderSettings::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidDataset(ref s) if s == "TOP PERFORMING PAGES"));
        // Hiding the section makes the same snapshot valid again.
        let mut settings = RenderSettings::default();
        settings.show_top_pages = false;
        assert!(build_report(&snap, &settings).is_ok());
    }

    #[test]
    fn all_zero_pie_dataset_fails_validation() {
        let mut snap = snapshot();
        snap.devices = vec![
            NamedCount {
                name: "Desktop".into(),
                visitors: 0.0,
            },
            NamedCount {
                name: "Mobile".into(),
                visitors: 0.0,
            },
        ];
        let err = build_report(&snap, &RenderSettings::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidDataset(ref s) if s == "DEVICE BREAKDOWN"));
    }

    #[test]
    fn traffic_sources_widen_past_four_entries() {
        let mut snap = snapshot();
        snap.traffic_sources = (0..5)
            .map(|i| NamedCount {
                name: format!("Source {i}"),
                visitors: 100.0,
            })
            .collect();
        let report = build_report(&snap, &RenderSettings::default()).unwrap();
        let section = report
            .sections
            .iter()
            .find(|s| s.id == SectionId::TrafficSources)
            .unwrap();
        let SectionBody::Chart(kind, bitmap) = &section.body else {
            panic!("traffic sources must be a chart section");
        };
        assert_eq!(*kind, ChartKind::Pie);
        // Widened to 3.5 × the 400px pie square.
        assert_eq!(bitmap.width_px, 1400);
    }

    #[test]
    fn period_label_and_file_stem() {
        let report = build_report(&snapshot(), &RenderSettings::default()).unwrap();
        assert_eq!(
            report.period_label,
            "Reporting Period: Nov 29, 2025 \u{2013} Dec 29, 2025"
        );
        assert_eq!(report.file_stem, "REPORT-2025-11-29-to-2025-12-29");
    }

    #[test]
    fn unparseable_period_dates_pass_through() {
        assert_eq!(format_date("soon"), "soon");
        assert_eq!(format_date("2025-13-01"), "2025-13-01");
        assert_eq!(format_date("2025-02-07"), "Feb 07, 2025");
    }

    #[test]
    fn missing_blog_post_drops_highlights_without_error() {
        let snap = Snapshot {
            period: Period {
                start: "2025-01-01".into(),
                end: "2025-01-31".into(),
            },
            title: "Analytics Report".into(),
            subtitle: "Performance Dashboard".into(),
            metrics: MetricsSummary::default(),
            top_pages: vec![],
            traffic_sources: vec![],
            countries: vec![],
            devices: vec![],
            operating_systems: vec![],
            blog_post: None::<BlogPost>,
            insights: vec![],
        };
        let mut settings = RenderSettings::default();
        settings.show_top_pages = false;
        settings.show_traffic_sources = false;
        settings.show_countries = false;
        settings.show_devices = false;
        settings.show_os = false;
        let report = build_report(&snap, &settings).unwrap();
        let ids: Vec<SectionId> = report.sections.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![SectionId::Metrics]);
    }
}
