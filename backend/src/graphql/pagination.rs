//! Connection types for paged GraphQL listings
//!
//! Works and favorites page with a numeric id cursor: `endCursor` is the id of
//! the last returned node and is passed back as `after`.
//!
//! Usage: Use the `define_connection!` macro to create type-specific connections.

use async_graphql::SimpleObject;

/// Information about pagination in a connection
#[derive(SimpleObject, Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    /// Whether another page follows this one
    pub has_next_page: bool,
    /// Id of the last node, present only when `has_next_page` is true
    pub end_cursor: Option<i64>,
}

impl PageInfo {
    pub fn of<T>(page: &crate::db::Page<T>) -> Self {
        Self {
            has_next_page: page.has_next_page,
            end_cursor: page.end_cursor,
        }
    }
}

/// Macro to define a GraphQL connection type for a specific entity
///
/// Usage:
/// ```ignore
/// define_connection!(WorkConnection, WorkEdge, Work);
/// ```
#[macro_export]
macro_rules! define_connection {
    ($conn_name:ident, $edge_name:ident, $node_type:ty) => {
        /// Edge wrapping a single node
        #[derive(async_graphql::SimpleObject, Debug, Clone)]
        pub struct $edge_name {
            /// The item at the end of the edge
            pub node: $node_type,
        }

        /// Connection containing edges and page info
        #[derive(async_graphql::SimpleObject, Debug, Clone)]
        pub struct $conn_name {
            /// The edges in this connection
            pub edges: Vec<$edge_name>,
            /// Pagination information
            pub page_info: $crate::graphql::pagination::PageInfo,
        }

        impl $conn_name {
            /// Create from a page of records
            pub fn from_page<T>(page: $crate::db::Page<T>) -> Self
            where
                $node_type: From<T>,
            {
                let page_info = $crate::graphql::pagination::PageInfo::of(&page);
                Self {
                    edges: page
                        .items
                        .into_iter()
                        .map(|item| $edge_name {
                            node: <$node_type>::from(item),
                        })
                        .collect(),
                    page_info,
                }
            }
        }
    };
}
