//! HTML writing operations.

use std::{fs::File, io::{BufWriter, Write}, path::Path};

use anyhow::{Context, Result};

use crate::render::Figure;

/// Where the page loads plotly.js from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlotlySource {
    /// The library source, inlined so the page is self-contained.
    Inline(String),
    /// `<script src=...>` pointing at a hosted bundle; the page needs network access.
    Cdn(String),
}

impl PlotlySource {
    pub const DEFAULT_CDN: &'static str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

    /// Link the default hosted bundle.
    pub fn cdn() -> Self { Self::Cdn(Self::DEFAULT_CDN.to_string()) }

    /// Inline a local copy of `plotly.min.js`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("[io::html] Failed to read plotly.js from {}", path.display()))?;
        Ok(Self::Inline(source))
    }
}

pub(crate) struct HtmlWriter {
    writer: BufWriter<File>
}

/// String-based HTML writer, for building pages in memory.
pub(crate) struct HtmlStringWriter {
    buffer: Vec<u8>
}

/// Implement std::io::Write so `write!` / `writeln!` work.
impl Write for HtmlWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> { self.writer.write(buf) }

    fn flush(&mut self) -> std::io::Result<()> { self.writer.flush() }

    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> { self.writer.write_all(buf) }
}

impl Write for HtmlStringWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> { Ok(()) }
}

impl HtmlWriter {
    /// Create a new HTML writer to a file path
    pub(crate) fn new(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("[io::html] Failed to create {}", path.display()))?;

        Ok(Self { writer: BufWriter::new(file) })
    }

    /// Flush buffered output to disk.
    pub(crate) fn finish(mut self) -> Result<()> {
        self.writer.flush().context("[io::html] Failed to flush output")
    }
}

impl HtmlStringWriter {
    pub(crate) fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Get the HTML string
    pub(crate) fn into_string(self) -> Result<String> {
        String::from_utf8(self.buffer)
            .context("[io::html] HTML output is not valid UTF-8")
    }
}

/// Escape text for use in HTML element content or attribute values.
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Keep embedded script text from closing its `<script>` element early.
fn escape_script(text: &str) -> String {
    text.replace("</", "<\\/")
}

/// Write the doctype, `<head>` (title, optional CSS, plotly.js) and opening `<body>`.
pub(crate) fn write_html_header<W: Write>(writer: &mut W, title: &str, css: &str, plotly: &PlotlySource) -> Result<()> {
    writeln!(writer, "<!DOCTYPE html>")?;
    writeln!(writer, "<html>")?;
    writeln!(writer, "<head>")?;
    writeln!(writer, r#"    <meta charset="utf-8" />"#)?;
    writeln!(writer, "    <title>{}</title>", escape_html(title))?;
    if !css.is_empty() {
        writeln!(writer, "    <style>\n{css}\n    </style>")?;
    }
    match plotly {
        PlotlySource::Cdn(url) => writeln!(writer, r#"    <script src="{}" charset="utf-8"></script>"#, escape_html(url))?,
        PlotlySource::Inline(source) => writeln!(writer, "    <script type=\"text/javascript\">\n{}\n    </script>", escape_script(source))?,
    }
    writeln!(writer, "</head>")?;
    writeln!(writer, "<body>")?;
    Ok(())
}

/// Write the plot container and the script that draws `figure` into it.
pub(crate) fn write_plot<W: Write>(writer: &mut W, div_id: &str, height: &str, figure: &Figure) -> Result<()> {
    let json = escape_script(&figure.to_json()?);
    let id = escape_html(div_id);
    writeln!(writer, r#"<div id="{id}" class="plotly-graph-div" style="height:{height}; width:100%;"></div>"#)?;
    writeln!(writer, r#"<script type="text/javascript">"#)?;
    writeln!(writer, "    const figure = {json};")?;
    writeln!(writer, r#"    Plotly.newPlot("{id}", figure.data, figure.layout, {{"responsive": true}});"#)?;
    writeln!(writer, "</script>")?;
    Ok(())
}

/// Write the closing `</body>` and `</html>` tags.
pub(crate) fn write_html_footer<W: Write>(writer: &mut W) -> Result<()> {
    writeln!(writer, "</body>")?;
    writeln!(writer, "</html>")?;
    Ok(())
}
