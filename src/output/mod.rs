pub mod formatter;

pub use formatter::{
    bar_width, format_aggregates, format_comparison, format_json, format_points, format_result,
    should_use_colors,
};
