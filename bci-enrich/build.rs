//! Build stamp for the bci-enrich startup banner

include!("../build/stamp.rs");
