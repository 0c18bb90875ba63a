/// A person, readable only through the generated `PersonRecord`.
///
/// rsfn: record
struct Person {
    name: String,
    age: u32,
    emails: Vec<String>,
}

include!(concat!(env!("OUT_DIR"), "/person_record_gen.rs"));
