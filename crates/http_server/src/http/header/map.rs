use super::{HeaderName, HeaderValue, HeaderValues};

/// Multi-valued header storage.
///
/// Entries keep the order in which their names were first seen. Names are stored verbatim, so
/// `Accept` and `accept` are separate entries, but every lookup is case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    entries: Vec<(HeaderName, HeaderValues)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Values stored under exactly `name`, creating the entry if needed
    pub fn entry(&mut self, name: HeaderName) -> &mut HeaderValues {
        let idx = match self.entries.iter().position(|(n, _)| *n == name) {
            Some(idx) => idx,
            None => {
                self.entries.push((name, HeaderValues::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    pub fn append(&mut self, name: HeaderName, value: HeaderValue) {
        self.entry(name).push(value);
    }

    /// First value of the first entry matching `name`
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.get_all(name).next()
    }

    /// Every value of every entry matching `name`, in order
    pub fn get_all<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a HeaderValue> + use<'a, 'n> {
        self.entries
            .iter()
            .filter(move |(n, _)| n.matches(name))
            .flat_map(|(_, values)| values.iter())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n.matches(name))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (HeaderName, HeaderValues)> {
        self.entries.iter()
    }

    /// Number of distinct (exact) names
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(HeaderName::from(*name), HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn repeated_names_keep_arrival_order() {
        assert!(HeaderMap::new().is_empty());
        let map = map(&[("Accept", "a"), ("Host", "h"), ("Accept", "b")]);
        assert_eq!(map.len(), 2);
        let values: Vec<_> = map.get_all("accept").map(|v| v.to_utf8().unwrap()).collect();
        assert_eq!(values, ["a", "b"]);

        let names: Vec<_> = map.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["Accept", "Host"]);
    }

    #[test]
    fn lookup_is_case_insensitive_but_storage_is_not() {
        let map = map(&[("X-Token", "1"), ("x-token", "2")]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("X-TOKEN").unwrap().to_utf8(), Some("1"));
        assert_eq!(map.get_all("x-Token").count(), 2);
        assert!(map.contains("x-token"));
        assert!(!map.contains("x-tokens"));
        assert!(map.get("missing").is_none());
    }

    #[test]
    fn values_outlive_the_lookup_name() {
        let map = map(&[("Host", "example.com")]);
        let value = {
            let name = String::from("host");
            map.get(&name)
        };
        assert_eq!(value.map(HeaderValue::as_bytes), Some(&b"example.com"[..]));
    }
}
