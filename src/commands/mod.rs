pub mod bonferroni;
pub mod common;
pub mod decode;

pub use bonferroni::{run_bonferroni, BonferroniArgs};
pub use decode::{run_decode, DecodeArgs};
