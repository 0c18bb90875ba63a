/// rsfn: curried
pub fn volume(length: u32, width: u32, height: u32) -> u32 {
    length * width * height
}

include!(concat!(env!("OUT_DIR"), "/volume_curried_gen.rs"));

/// rsfn: curried
pub fn join_with(separator: String, parts: impl IntoIterator<Item = String>) -> String {
    parts.into_iter().collect::<Vec<_>>().join(separator.as_str())
}

include!(concat!(env!("OUT_DIR"), "/join_with_curried_gen.rs"));

/// rsfn: curried
pub fn div_rem(dividend: i64, divisor: i64) -> (i64, i64) {
    (dividend / divisor, dividend % divisor)
}

include!(concat!(env!("OUT_DIR"), "/div_rem_curried_gen.rs"));

/// rsfn: curried
pub fn answer() -> u8 {
    42
}

include!(concat!(env!("OUT_DIR"), "/answer_curried_gen.rs"));

/// rsfn: curried
pub fn greet(name: &str, times: usize) -> String {
    vec![format!("hello {}", name); times].join(", ")
}

include!(concat!(env!("OUT_DIR"), "/greet_curried_gen.rs"));

/// rsfn: curried
pub fn scale(scale: f64, value: f64) -> f64 {
    scale * value
}

include!(concat!(env!("OUT_DIR"), "/scale_curried_gen.rs"));
