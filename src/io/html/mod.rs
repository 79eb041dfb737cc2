mod page;
mod writer;

pub use page::{described_html_string, plot_html_string, write_described_html, write_plot_html, Description};
pub use writer::PlotlySource;
