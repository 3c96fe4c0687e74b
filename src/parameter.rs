//! A single `name=value` pair and its query-string codec.

use std::fmt;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::value::Value;

/// Everything but the characters left alone by a browser's `encodeURIComponent`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub(crate) fn encode(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

/// `+` is not a space here, only percent escapes are decoded
pub(crate) fn decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Matches everything when Solr's dismax handler needs a non-empty `q`
const MATCH_ALL: &str = "*:*";

/// One Solr request parameter. The value may be unset, which is what a freshly materialized
/// placeholder looks like. Local params (`{!tag=dt}`) ride along in front of the value on the wire
/// but never take part in value comparisons.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameter {
    name: String,
    value: Option<Value>,
    locals: Vec<(String, String)>,
}

impl Parameter {
    /// An unset parameter
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            value: None,
            locals: Vec::new(),
        }
    }

    pub fn with_value<N, V>(name: N, value: V) -> Self
    where
        N: Into<String>,
        V: Into<Value>,
    {
        Self {
            name: name.into(),
            value: Some(value.into()),
            locals: Vec::new(),
        }
    }

    /// Decode a parameter from a single `name=value` token
    pub fn parse(pair: &str) -> Self {
        let mut param = Self::default();
        param.parse_string(pair);
        param
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        if self.name != name {
            self.name = name.to_string();
        }
    }

    /// The current value, `None` for an unset parameter
    pub fn val(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn set_val<V: Into<Value>>(&mut self, value: V) {
        self.value = Some(value.into());
    }

    pub fn clear_val(&mut self) {
        self.value = None;
    }

    /// Unset or empty parameters contribute nothing to a query string
    pub fn is_empty(&self) -> bool {
        self.value.as_ref().map_or(true, Value::is_empty)
    }

    pub fn local(&self, key: &str) -> Option<&str> {
        self.locals.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Set a local param, keys keep the order they were first set in
    pub fn set_local<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let key = key.into();
        let value = value.into();
        match self.locals.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.locals.push((key, value)),
        }
    }

    pub fn remove_local(&mut self, key: &str) -> Option<String> {
        let idx = self.locals.iter().position(|(k, _)| k == key)?;
        Some(self.locals.remove(idx).1)
    }

    pub fn locals(&self) -> impl Iterator<Item = (&str, &str)> {
        self.locals.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn local_prefix(&self) -> String {
        let pairs: Vec<String> = self
            .locals
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        if pairs.is_empty() {
            String::new()
        } else {
            format!("{{!{}}}", pairs.join(" "))
        }
    }

    /// The encoded `name=value` pair, or an empty string when there is no value to send
    pub fn string(&self) -> String {
        let prefix = self.local_prefix();
        match self.value.as_ref().filter(|v| !v.is_empty()) {
            Some(value) => format!("{}={}", encode(&self.name), encode(&format!("{}{}", prefix, value))),
            None if self.name == "q" && !prefix.is_empty() => format!("q.alt={}", encode(&format!("{}{}", prefix, MATCH_ALL))),
            None => String::new(),
        }
    }

    /// Replace this parameter's name, value and local params with the ones decoded from `pair`.
    /// A token without `=` decodes to an empty string value.
    pub fn parse_string(&mut self, pair: &str) {
        let (name, raw) = match pair.find('=') {
            Some(idx) => (&pair[..idx], &pair[idx + 1..]),
            None => (pair, ""),
        };
        let name = decode(name);
        let mut value = decode(raw);

        self.locals.clear();
        if value.starts_with("{!") {
            if let Some(end) = value.find('}') {
                for token in value[2..end].split_whitespace() {
                    match token.find('=') {
                        Some(idx) => self.set_local(&token[..idx], &token[idx + 1..]),
                        None => self.set_local(token, ""),
                    }
                }
                value = value[end + 1..].to_string();
            }
        }

        if name == "q.alt" && !self.locals.is_empty() && value == MATCH_ALL {
            self.name = "q".to_string();
            self.value = None;
        } else {
            self.name = name;
            self.value = Some(Value::from(value));
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_string() {
        let param = Parameter::with_value("fq", "a:1");
        assert_eq!(param.string(), "fq=a%3A1");
        let param = Parameter::with_value("sort", "score desc");
        assert_eq!(param.string(), "sort=score%20desc");
        let param = Parameter::with_value("rows", 10);
        assert_eq!(param.string(), "rows=10");
        let param = Parameter::with_value("start", 0);
        assert_eq!(param.string(), "start=0");
    }

    #[test]
    fn test_encodes_name() {
        let param = Parameter::with_value("f.my field.facet.limit", 5);
        assert_eq!(param.string(), "f.my%20field.facet.limit=5");
    }

    #[test]
    fn test_unreserved_characters() {
        let param = Parameter::with_value("q", "it's (a)~b*c!-_.");
        assert_eq!(param.string(), "q=it's%20(a)~b*c!-_.");
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(Parameter::new("q").string(), "");
        assert_eq!(Parameter::with_value("q", "").string(), "");
        assert_eq!(Parameter::with_value("fl", Vec::<&str>::new()).string(), "");
    }

    #[test]
    fn test_list_value() {
        let param = Parameter::with_value("fl", vec!["id", "score"]);
        assert_eq!(param.string(), "fl=id%2Cscore");
    }

    #[test]
    fn test_parse_string() {
        let param = Parameter::parse("fq=a%3A1");
        assert_eq!(param.name(), "fq");
        assert_eq!(param.val(), Some(&Value::from("a:1")));

        let param = Parameter::parse("q=a=b");
        assert_eq!(param.name(), "q");
        assert_eq!(param.val(), Some(&Value::from("a=b")));
    }

    #[test]
    fn test_parse_keeps_plus() {
        let param = Parameter::parse("q=a+b%20c");
        assert_eq!(param.val(), Some(&Value::from("a+b c")));
    }

    #[test]
    fn test_parse_missing_equals() {
        let param = Parameter::parse("facet");
        assert_eq!(param.name(), "facet");
        assert_eq!(param.val(), Some(&Value::from("")));
        assert!(param.is_empty());
        assert_eq!(param.string(), "");
    }

    #[test]
    fn test_parse_bad_escape() {
        let param = Parameter::parse("q=100%");
        assert_eq!(param.val(), Some(&Value::from("100%")));
    }

    #[test]
    fn test_locals() {
        let mut param = Parameter::with_value("fq", "type:article");
        param.set_local("tag", "type");
        param.set_local("cache", "false");
        param.set_local("tag", "kind");
        assert_eq!(param.local("tag"), Some("kind"));
        assert_eq!(param.string(), "fq=%7B!tag%3Dkind%20cache%3Dfalse%7Dtype%3Aarticle");

        let parsed = Parameter::parse(&param.string());
        assert_eq!(parsed, param);

        assert_eq!(param.remove_local("cache"), Some("false".to_string()));
        assert_eq!(param.remove_local("cache"), None);
        assert_eq!(param.locals().collect::<Vec<_>>(), vec![("tag", "kind")]);
    }

    #[test]
    fn test_empty_locals_are_skipped() {
        let mut param = Parameter::with_value("facet.field", "type");
        param.set_local("ex", "");
        assert_eq!(param.string(), "facet.field=type");
    }

    #[test]
    fn test_q_alt() {
        let mut param = Parameter::new("q");
        param.set_local("type", "dismax");
        assert_eq!(param.string(), "q.alt=%7B!type%3Ddismax%7D*%3A*");

        let parsed = Parameter::parse(&param.string());
        assert_eq!(parsed.name(), "q");
        assert_eq!(parsed.val(), None);
        assert_eq!(parsed.local("type"), Some("dismax"));
    }

    #[test]
    fn test_plain_q_alt() {
        let parsed = Parameter::parse("q.alt=*%3A*");
        assert_eq!(parsed.name(), "q.alt");
        assert_eq!(parsed.val(), Some(&Value::from("*:*")));
    }
}
