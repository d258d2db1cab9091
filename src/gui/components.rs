mod bass_band;
mod config_panel;
mod live_monitoring;

pub use bass_band::render_bass_band;
pub use config_panel::render_config_panel;
pub use live_monitoring::render_live_monitoring;
