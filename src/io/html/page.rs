use std::{io::Write, path::Path};

use anyhow::Result;

use crate::{
    io::html::writer::{escape_html, write_html_footer, write_html_header, write_plot, HtmlStringWriter, HtmlWriter, PlotlySource},
    render::Figure,
};

const PLOT_DIV_ID: &str = "plot";

const DESCRIPTION_CSS: &str = r#"        body {
            margin: 0;
            padding: 20px;
            background: linear-gradient(135deg, #f5f7fa 0%, #c3cfe2 100%);
            font-family: 'Arial', sans-serif;
            color: #2c3e50;
        }
        .container {
            max-width: 1200px;
            margin: 0 auto;
            background: white;
            padding: 20px;
            border-radius: 10px;
            box-shadow: 0 4px 6px rgba(0,0,0,0.1);
        }
        .description {
            margin: 20px 0;
            padding: 20px;
            background: #f8f9fa;
            border-left: 4px solid #1f77b4;
            border-radius: 4px;
        }
        .description h2 {
            color: #1f77b4;
            margin-top: 0;
        }
        .description p {
            line-height: 1.6;
        }
        .description ul {
            padding-left: 20px;
        }
        .description li {
            margin: 8px 0;
        }"#;

const INTERACTION_TIPS: [&str; 5] = [
    "🔄 Click and drag to rotate the view",
    "🔍 Scroll to zoom in/out",
    "✋ Right-click and drag to pan",
    "👆 Double-click to reset the view",
    "ℹ️ Hover over points to see detailed information",
];

/// Descriptive panel shown above the plot.
#[derive(Debug, Clone, PartialEq)]
pub struct Description {
    pub heading: String,
    pub paragraphs: Vec<String>,
    pub features: Vec<String>,
}

impl Description {
    /// The "About This Visualization" panel for a layered peaks plot of `value_name`.
    pub fn peaks(region_name: &str, value_name: &str) -> Self {
        Self {
            heading: "About This Visualization".to_string(),
            paragraphs: vec![format!(
                "This interactive 3D visualization transforms {region_name} {value_name} data into an artistic \
                 landscape of peaks and valleys. Each point represents a block group, with height and color \
                 intensity corresponding to {value_name} values. The underlying terrain adds depth and context \
                 to the visualization."
            )],
            features: INTERACTION_TIPS.iter().map(|tip| tip.to_string()).collect(),
        }
    }

    fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer, r#"        <div class="description">"#)?;
        writeln!(writer, "            <h2>{}</h2>", escape_html(&self.heading))?;
        for paragraph in &self.paragraphs {
            writeln!(writer, "            <p>{}</p>", escape_html(paragraph))?;
        }
        if !self.features.is_empty() {
            writeln!(writer, "            <p><strong>Interactive Features:</strong></p>")?;
            writeln!(writer, "            <ul>")?;
            for feature in &self.features {
                writeln!(writer, "                <li>{}</li>", escape_html(feature))?;
            }
            writeln!(writer, "            </ul>")?;
        }
        writeln!(writer, "        </div>")?;
        Ok(())
    }
}

/// Full-window page holding only the plot.
fn write_plot_page<W: Write>(writer: &mut W, title: &str, figure: &Figure, plotly: &PlotlySource) -> Result<()> {
    write_html_header(writer, title, "        body { margin: 0; }", plotly)?;
    write_plot(writer, PLOT_DIV_ID, "100vh", figure)?;
    write_html_footer(writer)
}

/// Styled page: description panel followed by the plot, inside a centered card.
fn write_described_page<W: Write>(
    writer: &mut W,
    title: &str,
    description: &Description,
    figure: &Figure,
    plotly: &PlotlySource,
) -> Result<()> {
    write_html_header(writer, title, DESCRIPTION_CSS, plotly)?;
    writeln!(writer, r#"    <div class="container">"#)?;
    description.write(writer)?;
    write_plot(writer, PLOT_DIV_ID, "800px", figure)?;
    writeln!(writer, "    </div>")?;
    write_html_footer(writer)
}

/// Write a self-contained page with just the plot to `path`.
pub fn write_plot_html(path: &Path, title: &str, figure: &Figure, plotly: &PlotlySource) -> Result<()> {
    let mut writer = HtmlWriter::new(path)?;
    write_plot_page(&mut writer, title, figure, plotly)?;
    writer.finish()
}

/// Write the plot wrapped in a descriptive card to `path`.
pub fn write_described_html(
    path: &Path,
    title: &str,
    description: &Description,
    figure: &Figure,
    plotly: &PlotlySource,
) -> Result<()> {
    let mut writer = HtmlWriter::new(path)?;
    write_described_page(&mut writer, title, description, figure, plotly)?;
    writer.finish()
}

/// Render the plain plot page to a string.
pub fn plot_html_string(title: &str, figure: &Figure, plotly: &PlotlySource) -> Result<String> {
    let mut writer = HtmlStringWriter::new();
    write_plot_page(&mut writer, title, figure, plotly)?;
    writer.into_string()
}

/// Render the described page to a string.
pub fn described_html_string(title: &str, description: &Description, figure: &Figure, plotly: &PlotlySource) -> Result<String> {
    let mut writer = HtmlStringWriter::new();
    write_described_page(&mut writer, title, description, figure, plotly)?;
    writer.into_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn inline() -> PlotlySource {
        PlotlySource::Inline("window.Plotly = {};".to_string())
    }

    fn figure() -> Figure {
        let mut figure = Figure::new(json!({}));
        figure.add_trace(json!({ "type": "scatter3d", "x": [1.0], "y": [2.0], "z": [0.5] }));
        figure
    }

    #[test]
    fn description_mentions_value() {
        let description = Description::peaks("Texas", "density");
        assert!(description.paragraphs[0].contains("Texas density data"));
        assert_eq!(description.features.len(), 5);
    }

    #[test]
    fn described_page_wraps_plot() {
        let html = described_html_string(
            "Texas Population Peaks - Interactive 3D Visualization",
            &Description::peaks("Texas", "density"),
            &figure(),
            &inline(),
        ).unwrap();

        let panel = html.find(r#"class="description""#).unwrap();
        let plot = html.find(r#"id="plot""#).unwrap();
        assert!(panel < plot);
        assert!(html.contains(".container {"));
        assert!(html.contains("<li>🔍 Scroll to zoom in/out</li>"));
        assert_eq!(html.matches("<html>").count(), 1);
    }

    #[test]
    fn plot_file_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.html");
        write_plot_html(&path, "Plot", &figure(), &inline()).unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert_eq!(html, plot_html_string("Plot", &figure(), &inline()).unwrap());
        assert!(html.contains("height:100vh"));
    }
}
