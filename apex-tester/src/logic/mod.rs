pub mod career_run;
pub mod checks;
pub mod policy;
pub mod reports;
pub mod seeds;

pub use career_run::{CareerReport, CareerRunner};
pub use policy::DriverStyle;
pub use seeds::resolve_seed_inputs;
