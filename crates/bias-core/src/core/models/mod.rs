pub mod restraint;
