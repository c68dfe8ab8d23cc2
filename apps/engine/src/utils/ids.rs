use uuid::Uuid;

/// `<prefix>_<16 hex chars>` from a random v4 UUID.
pub fn generate_id(prefix: &str) -> String {
    let simple = Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}", &simple[..16])
}
