pub mod join_set;
pub mod paths;

pub const FILTER_SPEC: &str = "fontsplit=debug,fontsplit_common=debug,info";
