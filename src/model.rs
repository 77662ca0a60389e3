use serde::Deserialize;

/// One labeled numeric data point feeding a chart. Insertion order is
/// significant: it determines both draw order and palette assignment.
#[derive(Clone, Debug)]
pub struct DatasetEntry {
    pub label: String,
    pub value: f64,
    /// Secondary measure carried alongside the primary one (e.g. page views
    /// next to visitors). Not drawn by the rasterizers.
    pub secondary: Option<f64>,
}

impl DatasetEntry {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
            secondary: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Period {
    pub start: String,
    pub end: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricsSummary {
    pub total_visitors: u64,
    pub total_page_views: u64,
    pub resumes_received: u64,
    pub leads_to_bitrix: u64,
    pub conversion_rate: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NamedCount {
    pub name: String,
    pub visitors: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CountryCount {
    pub country: String,
    pub code: String,
    pub visitors: f64,
    #[serde(default)]
    pub views: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ShareEntry {
    pub name: String,
    pub percentage: f64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub title: String,
    pub lifetime_views: u64,
}

fn default_report_title() -> String {
    "Analytics Report".into()
}
fn default_report_subtitle() -> String {
    "Performance Dashboard".into()
}

/// Read-only analytics snapshot handed in by the collecting side. One render
/// pass treats this as immutable input; nothing here survives the export.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub period: Period,
    /// Report header lines; the collecting side may override both.
    #[serde(default = "default_report_title")]
    pub title: String,
    #[serde(default = "default_report_subtitle")]
    pub subtitle: String,
    #[serde(default)]
    pub metrics: MetricsSummary,
    #[serde(default)]
    pub top_pages: Vec<NamedCount>,
    #[serde(default)]
    pub traffic_sources: Vec<NamedCount>,
    #[serde(default)]
    pub countries: Vec<CountryCount>,
    #[serde(default)]
    pub devices: Vec<NamedCount>,
    #[serde(default)]
    pub operating_systems: Vec<ShareEntry>,
    #[serde(default)]
    pub blog_post: Option<BlogPost>,
    #[serde(default)]
    pub insights: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SectionId {
    Metrics,
    TopPages,
    TrafficSources,
    Countries,
    Devices,
    OperatingSystems,
    ContentHighlights,
    Insights,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Helvetica,
    Times,
    Courier,
}

fn default_primary_color() -> String {
    "#000000".into()
}
fn default_background_color() -> String {
    "#f5f5f5".into()
}
fn default_text_color() -> String {
    "#000000".into()
}
fn default_border_color() -> String {
    "#e0e0e0".into()
}
fn default_title_font_size() -> f32 {
    20.0
}
fn default_heading_font_size() -> f32 {
    12.0
}
fn default_body_font_size() -> f32 {
    9.0
}
fn default_margin() -> f32 {
    15.0
}
fn default_card_padding() -> f32 {
    6.0
}
fn default_chart_height() -> f32 {
    80.0
}
fn default_true() -> bool {
    true
}
fn default_pie_chart_width() -> f64 {
    2.8
}

fn default_palette() -> Vec<String> {
    [
        "#4A90E2", // soft blue
        "#50C878", // mint green
        "#FF6B6B", // coral red
        "#FFA07A", // light salmon
        "#9370DB", // medium purple
        "#20B2AA", // light sea green
        "#FFD700", // gold
        "#87CEEB", // sky blue
        "#DDA0DD", // plum
        "#98D8C8", // mint
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Theming and layout knobs for one render pass. Every field has a default so
/// a partial (or missing) settings object never fails rendering.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderSettings {
    pub primary_color: String,
    pub background_color: String,
    pub text_color: String,
    pub border_color: String,

    /// Font sizes in points.
    pub title_font_size: f32,
    pub heading_font_size: f32,
    pub body_font_size: f32,
    pub font_family: FontFamily,

    /// Layout dimensions in page units (mm on the A4 page).
    pub margin: f32,
    pub card_padding: f32,
    pub chart_height: f32,

    pub show_metrics: bool,
    pub show_top_pages: bool,
    pub show_traffic_sources: bool,
    pub show_countries: bool,
    pub show_devices: bool,
    pub show_os: bool,
    pub show_content_highlights: bool,
    pub show_insights: bool,

    /// Ordered chart palette; entry i gets `palette[i % palette.len()]`.
    #[serde(alias = "barChartColors")]
    pub palette: Vec<String>,
    /// Pie bitmap width as a multiple of its height; the extra horizontal
    /// space holds the legend.
    pub pie_chart_width: f64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            primary_color: default_primary_color(),
            background_color: default_background_color(),
            text_color: default_text_color(),
            border_color: default_border_color(),
            title_font_size: default_title_font_size(),
            heading_font_size: default_heading_font_size(),
            body_font_size: default_body_font_size(),
            font_family: FontFamily::default(),
            margin: default_margin(),
            card_padding: default_card_padding(),
            chart_height: default_chart_height(),
            show_metrics: default_true(),
            show_top_pages: default_true(),
            show_traffic_sources: default_true(),
            show_countries: default_true(),
            show_devices: default_true(),
            show_os: default_true(),
            show_content_highlights: default_true(),
            show_insights: default_true(),
            palette: default_palette(),
            pie_chart_width: default_pie_chart_width(),
        }
    }
}

impl RenderSettings {
    pub fn is_visible(&self, id: SectionId) -> bool {
        match id {
            SectionId::Metrics => self.show_metrics,
            SectionId::TopPages => self.show_top_pages,
            SectionId::TrafficSources => self.show_traffic_sources,
            SectionId::Countries => self.show_countries,
            SectionId::Devices => self.show_devices,
            SectionId::OperatingSystems => self.show_os,
            SectionId::ContentHighlights => self.show_content_highlights,
            SectionId::Insights => self.show_insights,
        }
    }
}
