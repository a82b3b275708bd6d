mod generate;
mod kinds;
mod loads;
mod plugins;

pub use generate::cmd_generate;
pub use kinds::cmd_kinds;
pub use loads::cmd_loads;
pub use plugins::cmd_plugins;
