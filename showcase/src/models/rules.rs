/// rsfn: match
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub action: String,
    pub value: u32,
    pub guard: bool,
}

include!(concat!(env!("OUT_DIR"), "/rule_match_gen.rs"));

/// rsfn: optional
#[derive(Debug, Clone, PartialEq)]
pub struct Launch {
    pub options: Vec<String>,
    pub retries: u8,
}

include!(concat!(env!("OUT_DIR"), "/launch_optional_gen.rs"));
