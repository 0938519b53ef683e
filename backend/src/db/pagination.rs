//! Hybrid page-number / cursor pagination for id-descending listings
//!
//! Works and favorites are listed newest first and page the same way:
//!
//! - `page` selects a fixed block by offset (`page_size * (page - 1)`)
//! - `after` selects the rows whose id is strictly below the cursor
//! - neither selects the first page
//!
//! `page` wins when both are given. Zero or negative values count as unset
//! rather than being rejected. One extra row beyond the page is fetched so
//! `has_next_page` is known without a separate COUNT query.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

/// Page selection requested by a client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: Option<i64>,
    /// Id cursor: only rows with a smaller id are returned
    pub after: Option<i64>,
}

impl PageRequest {
    pub fn new(page: Option<i64>, after: Option<i64>) -> Self {
        Self { page, after }
    }

    /// Resolve the request into the bounded read the store has to perform.
    pub fn window(&self, page_size: i64) -> Window {
        let page_size = page_size.max(0);
        let limit = page_size + 1;

        if let Some(page) = self.page.filter(|p| *p > 0) {
            Window {
                limit,
                offset: page_size.saturating_mul(page - 1),
                before_id: None,
            }
        } else if let Some(after) = self.after.filter(|a| *a > 0) {
            Window {
                limit,
                offset: 0,
                before_id: Some(after),
            }
        } else {
            Window {
                limit,
                offset: 0,
                before_id: None,
            }
        }
    }
}

/// A single bounded read: `ORDER BY id DESC`, optional `id < before_id`,
/// then `OFFSET offset LIMIT limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub limit: i64,
    pub offset: i64,
    pub before_id: Option<i64>,
}

impl Window {
    /// Append the cursor predicate, ordering and bounds to a query whose
    /// WHERE clause is already open.
    pub fn push_sql(&self, qb: &mut QueryBuilder<'_, Sqlite>, id_column: &str) {
        if let Some(before_id) = self.before_id {
            qb.push(" AND ").push(id_column).push(" < ");
            qb.push_bind(before_id);
        }
        qb.push(" ORDER BY ").push(id_column).push(" DESC LIMIT ");
        qb.push_bind(self.limit);
        qb.push(" OFFSET ");
        qb.push_bind(self.offset);
    }
}

/// Records that can be paged by their identifier
pub trait Keyed {
    fn key(&self) -> i64;
}

/// An ordered, filterable record store that can serve a [`Window`].
#[async_trait]
pub trait PageSource: Sync {
    type Item: Keyed + Send;

    /// Fetch the rows of `window`, id descending. Store errors are returned as-is.
    async fn fetch_window(&self, window: &Window) -> Result<Vec<Self::Item>>;
}

/// One page of results plus what the client needs to ask for the next one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next_page: bool,
    /// Id of the last returned item, present only when another page exists
    pub end_cursor: Option<i64>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            has_next_page: false,
            end_cursor: None,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            has_next_page: self.has_next_page,
            end_cursor: self.end_cursor,
        }
    }
}

impl<T: Keyed> Page<T> {
    /// Build a page from a fetch of up to `page_size + 1` rows.
    pub fn from_lookahead(mut fetched: Vec<T>, page_size: i64) -> Self {
        let page_size = page_size.max(0) as usize;
        let has_next_page = fetched.len() > page_size;
        fetched.truncate(page_size);

        let end_cursor = if has_next_page {
            fetched.last().map(Keyed::key)
        } else {
            None
        };

        Self {
            items: fetched,
            has_next_page,
            end_cursor,
        }
    }
}

/// Fetch one page from `source`.
pub async fn paginate<S>(source: &S, request: PageRequest, page_size: i64) -> Result<Page<S::Item>>
where
    S: PageSource + ?Sized,
{
    let window = request.window(page_size);
    let fetched = source.fetch_window(&window).await?;

    tracing::trace!(
        limit = window.limit,
        offset = window.offset,
        before_id = ?window.before_id,
        fetched = fetched.len(),
        "Fetched page window"
    );

    Ok(Page::from_lookahead(fetched, page_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Row {
        id: i64,
        owner: i64,
    }

    impl Keyed for Row {
        fn key(&self) -> i64 {
            self.id
        }
    }

    /// In-memory store that honours a window the way the SQL repositories do
    struct VecSource {
        rows: Vec<Row>,
        owner: Option<i64>,
    }

    impl VecSource {
        fn sequential(n: i64) -> Self {
            Self {
                rows: (1..=n).map(|id| Row { id, owner: id % 2 }).collect(),
                owner: None,
            }
        }
    }

    #[async_trait]
    impl PageSource for VecSource {
        type Item = Row;

        async fn fetch_window(&self, window: &Window) -> Result<Vec<Row>> {
            let mut rows: Vec<Row> = self
                .rows
                .iter()
                .filter(|r| self.owner.is_none_or(|o| r.owner == o))
                .filter(|r| window.before_id.is_none_or(|b| r.id < b))
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.id.cmp(&a.id));
            Ok(rows
                .into_iter()
                .skip(window.offset as usize)
                .take(window.limit as usize)
                .collect())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl PageSource for FailingSource {
        type Item = Row;

        async fn fetch_window(&self, _window: &Window) -> Result<Vec<Row>> {
            anyhow::bail!("database is locked")
        }
    }

    fn ids(page: &Page<Row>) -> Vec<i64> {
        page.items.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_window_first_page() {
        let window = PageRequest::default().window(10);
        assert_eq!(
            window,
            Window {
                limit: 11,
                offset: 0,
                before_id: None
            }
        );
    }

    #[test]
    fn test_window_page_takes_priority_over_after() {
        let window = PageRequest::new(Some(3), Some(7)).window(10);
        assert_eq!(window.offset, 20);
        assert_eq!(window.before_id, None);
    }

    #[test]
    fn test_window_non_positive_values_are_unset() {
        let first = PageRequest::default().window(10);
        assert_eq!(PageRequest::new(Some(0), None).window(10), first);
        assert_eq!(PageRequest::new(Some(-4), Some(-1)).window(10), first);
        assert_eq!(PageRequest::new(None, Some(0)).window(10), first);

        let cursor = PageRequest::new(Some(-1), Some(5)).window(10);
        assert_eq!(cursor.before_id, Some(5));
        assert_eq!(cursor.offset, 0);
    }

    #[test]
    fn test_window_huge_page_saturates() {
        let window = PageRequest::new(Some(i64::MAX), None).window(10);
        assert_eq!(window.offset, i64::MAX);
    }

    #[test]
    fn test_push_sql() {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT id FROM works WHERE 1 = 1");
        PageRequest::new(None, Some(12)).window(10).push_sql(&mut qb, "id");
        assert_eq!(
            qb.sql(),
            "SELECT id FROM works WHERE 1 = 1 AND id < ? ORDER BY id DESC LIMIT ? OFFSET ?"
        );

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT id FROM works WHERE 1 = 1");
        PageRequest::new(Some(2), None).window(10).push_sql(&mut qb, "id");
        assert_eq!(
            qb.sql(),
            "SELECT id FROM works WHERE 1 = 1 ORDER BY id DESC LIMIT ? OFFSET ?"
        );
    }

    #[tokio::test]
    async fn test_walk_21_records_by_cursor() {
        let source = VecSource::sequential(21);

        let first = paginate(&source, PageRequest::default(), 10).await.unwrap();
        assert_eq!(ids(&first), (12..=21).rev().collect::<Vec<_>>());
        assert!(first.has_next_page);
        assert_eq!(first.end_cursor, Some(12));

        let second = paginate(&source, PageRequest::new(None, Some(12)), 10)
            .await
            .unwrap();
        assert_eq!(ids(&second), (2..=11).rev().collect::<Vec<_>>());
        assert!(second.has_next_page);
        assert_eq!(second.end_cursor, Some(2));

        let third = paginate(&source, PageRequest::new(None, Some(2)), 10)
            .await
            .unwrap();
        assert_eq!(ids(&third), vec![1]);
        assert!(!third.has_next_page);
        assert_eq!(third.end_cursor, None);
    }

    #[tokio::test]
    async fn test_fewer_records_than_page() {
        let source = VecSource::sequential(5);
        let page = paginate(&source, PageRequest::default(), 10).await.unwrap();
        assert_eq!(ids(&page), vec![5, 4, 3, 2, 1]);
        assert!(!page.has_next_page);
        assert_eq!(page.end_cursor, None);
    }

    #[tokio::test]
    async fn test_third_page_of_25() {
        let source = VecSource::sequential(25);
        let page = paginate(&source, PageRequest::new(Some(3), None), 10)
            .await
            .unwrap();
        assert_eq!(ids(&page), vec![5, 4, 3, 2, 1]);
        assert!(!page.has_next_page);
        assert_eq!(page.end_cursor, None);
    }

    #[tokio::test]
    async fn test_empty_source() {
        let source = VecSource::sequential(0);
        let page = paginate(&source, PageRequest::default(), 10).await.unwrap();
        assert_eq!(page, Page::empty());
    }

    #[tokio::test]
    async fn test_exactly_one_page_left() {
        let source = VecSource::sequential(20);
        let page = paginate(&source, PageRequest::new(Some(2), None), 10)
            .await
            .unwrap();
        assert_eq!(ids(&page), (1..=10).rev().collect::<Vec<_>>());
        assert!(!page.has_next_page);
        assert_eq!(page.end_cursor, None);
    }

    #[tokio::test]
    async fn test_page_beyond_end() {
        let source = VecSource::sequential(15);
        let page = paginate(&source, PageRequest::new(Some(9), None), 10)
            .await
            .unwrap();
        assert_eq!(page, Page::empty());
    }

    #[tokio::test]
    async fn test_page_one_matches_default() {
        let source = VecSource::sequential(17);
        let default = paginate(&source, PageRequest::default(), 10).await.unwrap();
        let page_one = paginate(&source, PageRequest::new(Some(1), None), 10)
            .await
            .unwrap();
        assert_eq!(default, page_one);
    }

    #[tokio::test]
    async fn test_domain_filter_applies_before_paging() {
        let source = VecSource {
            owner: Some(0),
            ..VecSource::sequential(30)
        };
        let first = paginate(&source, PageRequest::default(), 10).await.unwrap();
        assert_eq!(ids(&first), vec![30, 28, 26, 24, 22, 20, 18, 16, 14, 12]);
        assert_eq!(first.end_cursor, Some(12));

        let second = paginate(&source, PageRequest::new(None, first.end_cursor), 10)
            .await
            .unwrap();
        assert_eq!(ids(&second), vec![10, 8, 6, 4, 2]);
        assert!(!second.has_next_page);
    }

    #[tokio::test]
    async fn test_item_count_and_next_page_for_all_offsets() {
        for n in 0..=25i64 {
            let source = VecSource::sequential(n);
            for page_size in 0..=12i64 {
                for page in 1..=5i64 {
                    let result = paginate(&source, PageRequest::new(Some(page), None), page_size)
                        .await
                        .unwrap();
                    let skipped = page_size * (page - 1);
                    let expected = page_size.min((n - skipped).max(0));
                    assert_eq!(result.items.len() as i64, expected, "n={n} size={page_size} page={page}");
                    assert_eq!(
                        result.has_next_page,
                        n > skipped + page_size,
                        "n={n} size={page_size} page={page}"
                    );
                }
            }
        }
    }

    #[tokio::test]
    async fn test_cursor_walk_has_no_gaps_or_overlaps() {
        for n in 0..=33i64 {
            for page_size in 1..=7i64 {
                let source = VecSource::sequential(n);
                let mut seen = Vec::new();
                let mut request = PageRequest::default();
                loop {
                    let page = paginate(&source, request, page_size).await.unwrap();
                    seen.extend(ids(&page));
                    match page.end_cursor {
                        Some(cursor) => {
                            assert!(page.has_next_page);
                            assert_eq!(Some(&cursor), seen.last());
                            request = PageRequest::new(None, Some(cursor));
                        }
                        None => {
                            assert!(!page.has_next_page);
                            break;
                        }
                    }
                }
                assert_eq!(seen, (1..=n).rev().collect::<Vec<_>>(), "n={n} size={page_size}");
            }
        }
    }

    #[tokio::test]
    async fn test_store_error_propagates() {
        let err = paginate(&FailingSource, PageRequest::default(), 10)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "database is locked");
    }
}
