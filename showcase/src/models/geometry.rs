/// rsfn: match
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub kind: String,
    pub sides: u32,
    pub filled: bool,
}

include!(concat!(env!("OUT_DIR"), "/shape_match_gen.rs"));

impl Shape {
    pub fn new(kind: &str, sides: u32, filled: bool) -> Self {
        Self { kind: kind.to_string(), sides, filled }
    }
}
