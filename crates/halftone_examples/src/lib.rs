#![forbid(unsafe_code)]

mod output;
mod presets;

pub use output::{
    init_tracing, load_field, save_canvas_png, save_svg, synthetic_portrait_rgb, target_for,
};
pub use presets::{gallery_config, portrait_config};
