mod flow;
mod settings;

pub use flow::{RebalanceFlow, RebalanceFlowError};
pub use settings::Settings;
