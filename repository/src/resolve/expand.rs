//! Eager-load list resolution

pub struct ExpandResolver;

impl ExpandResolver {
    /// Union of the caller's comma-separated list and the defaults.
    ///
    /// Entries are trimmed, empty ones dropped, duplicates removed; caller
    /// entries come first.
    pub fn resolve(request: Option<&str>, defaults: &[String]) -> Vec<String> {
        let requested = request.into_iter().flat_map(|csv| csv.split(','));
        let mut expands: Vec<String> = Vec::new();
        for name in requested.chain(defaults.iter().map(String::as_str)) {
            let name = name.trim();
            if !name.is_empty() && !expands.iter().any(|existing| existing == name) {
                expands.push(name.to_string());
            }
        }
        expands
    }
}
