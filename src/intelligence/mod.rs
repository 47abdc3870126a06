//! Lab-test knowledge: canonical test keys, reference ranges, band
//! interpretations and patient-facing descriptions.

pub mod reference;

pub use reference::*;
