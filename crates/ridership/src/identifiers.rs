//! Type-safe identifiers for routes and stops.
//!
//! All identifiers use Arc<str> so the many trip records that share a route or
//! stop name share one allocation.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Serialize, Serializer};

macro_rules! impl_identifier {
    ($name:ident) => {
        #[derive(Clone, Debug)]
        pub struct $name(Arc<str>);

        impl $name {
            pub fn new(s: impl AsRef<str>) -> Self {
                Self(s.as_ref().into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
            }
        }

        impl Eq for $name {}

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                self.0.cmp(&other.0)
            }
        }

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.0.hash(state);
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }
    };
}

impl_identifier!(RouteIdentifier);
impl_identifier!(StopIdentifier);

/// Interns identifier strings while a table is being loaded, so every row
/// naming the same route or stop shares one `Arc<str>`.
#[derive(Default)]
pub(crate) struct Interner {
    routes: std::collections::HashMap<Arc<str>, RouteIdentifier>,
    stops: std::collections::HashMap<Arc<str>, StopIdentifier>,
}

impl Interner {
    pub(crate) fn route(&mut self, raw: &str) -> RouteIdentifier {
        if let Some(id) = self.routes.get(raw) {
            return id.clone();
        }
        let id = RouteIdentifier::new(raw);
        self.routes.insert(id.0.clone(), id.clone());
        id
    }

    pub(crate) fn stop(&mut self, raw: &str) -> StopIdentifier {
        if let Some(id) = self.stops.get(raw) {
            return id.clone();
        }
        let id = StopIdentifier::new(raw);
        self.stops.insert(id.0.clone(), id.clone());
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_equality() {
        let id1 = StopIdentifier::new("Harmoni");
        let id2 = StopIdentifier::new("Harmoni");
        let id3 = id1.clone();

        assert_eq!(id1, id2);
        assert_eq!(id1, id3);
        assert!(Arc::ptr_eq(&id1.0, &id3.0)); // Clone shares Arc
    }

    #[test]
    fn test_identifier_hash() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(RouteIdentifier::new("1"), 42);

        assert_eq!(map.get(&RouteIdentifier::new("1")), Some(&42));
    }

    #[test]
    fn test_identifier_display_and_serialize() {
        let id = RouteIdentifier::new("9D");
        assert_eq!(format!("{}", id), "9D");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"9D\"");
    }

    #[test]
    fn test_identifier_ordering() {
        let mut ids = vec![RouteIdentifier::new("9"), RouteIdentifier::new("1"), RouteIdentifier::new("4B")];
        ids.sort();
        let names: Vec<_> = ids.iter().map(|id| id.as_str()).collect();
        assert_eq!(names, vec!["1", "4B", "9"]);
    }

    #[test]
    fn test_interner_shares_allocation() {
        let mut interner = Interner::default();
        let a = interner.stop("Blok M");
        let b = interner.stop("Blok M");
        assert!(Arc::ptr_eq(&a.0, &b.0));

        let r = interner.route("13");
        assert_eq!(r, RouteIdentifier::new("13"));
    }
}
