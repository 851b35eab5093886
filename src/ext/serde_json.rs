// === Module Header START ===
// purpose: Nested JSON fetching via dotted paths and typed extraction for serde_json::Value
// role: extension/serde_json
// outputs: JsonFetch trait and JsonFetched wrapper (typed extraction, opaque ids, array elements)
// invariants: No panics; missing paths yield None
// === Module Header END ===

use serde::de::DeserializeOwned;

/// Wrapper around a JSON location to allow typed extraction via a clear second step.
pub struct JsonFetched<'a> {
  inner: Option<&'a serde_json::Value>,
}

impl<'a> JsonFetched<'a> {
  /// Attempt to deserialize the fetched value as `T`.
  pub fn to<T>(&self) -> Option<T>
  where
    T: DeserializeOwned,
  {
    self.inner.and_then(|v| serde_json::from_value::<T>(v.clone()).ok())
  }

  /// Read an opaque identifier that exports write either as a string or as a number.
  pub fn to_id(&self) -> Option<String> {
    match self.inner? {
      serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
      serde_json::Value::Number(n) => Some(n.to_string()),
      _ => None,
    }
  }

  /// Borrow the fetched array's elements (empty when absent or not an array).
  pub fn elements(&self) -> &'a [serde_json::Value] {
    self.inner.and_then(|v| v.as_array()).map(|a| a.as_slice()).unwrap_or(&[])
  }
}

/// Extension to fetch nested values via dotted paths like "fields.issuetype.name".
pub trait JsonFetch {
  fn fetch(&self, path: &str) -> JsonFetched<'_>;
}

impl JsonFetch for serde_json::Value {
  fn fetch(&self, path: &str) -> JsonFetched<'_> {
    if path.is_empty() {
      return JsonFetched { inner: Some(self) };
    }

    let mut cur = self;

    for key in path.split('.') {
      match cur.get(key) {
        Some(next) => cur = next,
        None => return JsonFetched { inner: None },
      }
    }

    JsonFetched { inner: Some(cur) }
  }
}
