pub const DEFAULT_PAGE_SIZE: usize = 500;

#[derive(Debug, Clone)]
pub struct Pagination<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
    page_size: usize,
}

pub fn paginate(text: &str, page_size: usize) -> Pagination<'_> {
    let mut line_starts = Vec::with_capacity(text.len() / 32 + 1);
    line_starts.push(0);
    line_starts.extend(text.match_indices('\n').map(|(idx, _)| idx + 1));

    Pagination {
        text,
        line_starts,
        page_size: page_size.max(1),
    }
}

impl<'a> Pagination<'a> {
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self) -> usize {
        self.line_count().div_ceil(self.page_size).max(1)
    }

    pub fn clamp_page(&self, page: usize) -> usize {
        page.clamp(1, self.page_count())
    }

    pub fn page_of(&self, page: usize) -> &'a str {
        let page = self.clamp_page(page);
        let first_line = (page - 1) * self.page_size;
        let end_line = (first_line + self.page_size).min(self.line_count());

        let start = self.line_starts[first_line];
        let end = if end_line < self.line_count() {
            // Exclude the separator that precedes the next page.
            self.line_starts[end_line] - 1
        } else {
            self.text.len()
        };
        &self.text[start..end]
    }

    pub fn line_range(&self, page: usize) -> std::ops::Range<usize> {
        let page = self.clamp_page(page);
        let first_line = (page - 1) * self.page_size;
        first_line..(first_line + self.page_size).min(self.line_count())
    }

    pub fn pages(&self) -> impl Iterator<Item = &'a str> + '_ {
        (1..=self.page_count()).map(move |page| self.page_of(page))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub line_count: usize,
    pub page_count: usize,
    pub current_page: usize,
}

impl PaginationState {
    pub fn derive(text: &str, page_size: usize, requested_page: usize) -> Self {
        let pagination = paginate(text, page_size);
        Self::from_pagination(&pagination, requested_page)
    }

    pub fn from_pagination(pagination: &Pagination<'_>, requested_page: usize) -> Self {
        Self {
            line_count: pagination.line_count(),
            page_count: pagination.page_count(),
            current_page: pagination.clamp_page(requested_page),
        }
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.page_count
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }
}
