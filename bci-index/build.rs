//! Build stamp for the bci-index startup banner

include!("../build/stamp.rs");
