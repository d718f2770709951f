/// Fixed-size pagination over an ordered list
///
/// A requested page number that is missing or not an integer resolves to
/// page 1; one outside `1..=num_pages` resolves to the last page. An empty
/// list still has one (empty) page.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: i64,
}

impl Paginator {
    /// `per_page` below 1 is treated as 1
    pub fn new(per_page: i64) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn per_page(&self) -> i64 {
        self.per_page
    }

    /// Resolve the raw `page` query value against `total` items
    pub fn window(&self, total: i64, raw_page: Option<&str>) -> PageWindow {
        let total = total.max(0);
        let num_pages = ((total + self.per_page - 1) / self.per_page).max(1);

        let number = match raw_page.map(str::trim).map(str::parse::<i64>) {
            Some(Ok(n)) if (1..=num_pages).contains(&n) => n,
            Some(Ok(_)) => num_pages,
            Some(Err(_)) | None => 1,
        };

        PageWindow {
            number,
            num_pages,
            per_page: self.per_page,
            total,
        }
    }
}

/// Position of one page within a paginated list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: i64,
    pub num_pages: i64,
    pub per_page: i64,
    pub total: i64,
}

impl PageWindow {
    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn next_page_number(&self) -> Option<i64> {
        self.has_next().then_some(self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<i64> {
        self.has_previous().then_some(self.number - 1)
    }

    /// 1-based index of the first item on this page (0 when empty)
    pub fn start_index(&self) -> i64 {
        if self.total == 0 {
            0
        } else {
            self.offset() + 1
        }
    }
}

/// One page of items plus where it sits
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub window: PageWindow,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
