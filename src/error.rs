/// Precondition violations of the visualizer core.
///
/// These point at a wiring or configuration bug upstream of the detector, so
/// they are reported instead of being replaced by a silent default.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Bass band can't be empty")]
    EmptyBassBand,

    #[error("Bass band needs {requested} bins but the snapshot only has {available}")]
    BassBandOutOfRange { requested: usize, available: usize },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
