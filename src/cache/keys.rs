//! Cache key derivation.
//!
//! Equal parameter tuples must render the identical key string; cache hits
//! depend on it. Keywords are embedded verbatim: `beach` and `Beach` cache
//! separately, as do keywords differing only in whitespace.

/// Resource namespace every sight key lives under.
pub const NAMESPACE: &str = "sight";

/// A logical query identified for caching purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SightKey {
    /// Single sight with nested associations.
    Detail(i64),
    /// Paginated listing.
    List { page: u32, page_size: u32 },
    /// Curated popular subset, unpaginated.
    HotList,
    /// Curated featured subset, unpaginated.
    FineList,
    /// Keyword search with pagination.
    Search {
        keyword: String,
        page: u32,
        page_size: u32,
    },
}

impl SightKey {
    /// Render the deterministic key string for this query.
    pub fn render(&self) -> String {
        match self {
            SightKey::Detail(id) => format!("{NAMESPACE}:detail:{id}"),
            SightKey::List { page, page_size } => {
                format!("{NAMESPACE}:list:{page}:{page_size}")
            }
            SightKey::HotList => format!("{NAMESPACE}:hot:list"),
            SightKey::FineList => format!("{NAMESPACE}:fine:list"),
            SightKey::Search {
                keyword,
                page,
                page_size,
            } => format!("{NAMESPACE}:search:{keyword}:{page}:{page_size}"),
        }
    }
}

/// Wildcard patterns used by invalidation and the bulk clear operation.
pub mod patterns {
    pub const LIST: &str = "sight:list:*";
    pub const DETAIL: &str = "sight:detail:*";
    pub const SEARCH: &str = "sight:search:*";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_tuples_render_identical_keys() {
        let a = SightKey::Search {
            keyword: "lake".to_string(),
            page: 2,
            page_size: 10,
        };
        let b = SightKey::Search {
            keyword: "lake".to_string(),
            page: 2,
            page_size: 10,
        };
        assert_eq!(a.render(), b.render());
        assert_eq!(a.render(), "sight:search:lake:2:10");
    }

    #[test]
    fn any_parameter_change_renders_a_different_key() {
        let base = SightKey::List {
            page: 1,
            page_size: 6,
        };
        let other_page = SightKey::List {
            page: 2,
            page_size: 6,
        };
        let other_size = SightKey::List {
            page: 1,
            page_size: 10,
        };
        assert_ne!(base.render(), other_page.render());
        assert_ne!(base.render(), other_size.render());
    }

    #[test]
    fn keywords_are_not_normalized() {
        let lower = SightKey::Search {
            keyword: "beach".to_string(),
            page: 1,
            page_size: 6,
        };
        let upper = SightKey::Search {
            keyword: "Beach".to_string(),
            page: 1,
            page_size: 6,
        };
        assert_ne!(lower.render(), upper.render());
    }

    #[test]
    fn fixed_keys_match_the_namespace_layout() {
        assert_eq!(SightKey::Detail(7).render(), "sight:detail:7");
        assert_eq!(SightKey::HotList.render(), "sight:hot:list");
        assert_eq!(SightKey::FineList.render(), "sight:fine:list");
    }
}
