use crate::error::PageError;
use crate::models::Project;

/// One page per project, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    current_page: usize,
    total_pages: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new()
    }
}

impl Pagination {
    pub fn new() -> Self {
        Self {
            current_page: 1,
            total_pages: 0,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Recompute the page count after the collection changed, clamping the
    /// current page into the new range.
    pub fn sync(&mut self, len: usize) {
        self.total_pages = len;
        self.current_page = self.current_page.clamp(1, len.max(1));
    }

    pub fn go_to_page(&mut self, page: usize) -> Result<(), PageError> {
        if page == 0 || page > self.total_pages {
            return Err(PageError::OutOfRange {
                requested: page,
                total: self.total_pages,
            });
        }
        self.current_page = page;
        Ok(())
    }

    pub fn next_page(&mut self) -> Result<(), PageError> {
        self.go_to_page(self.current_page + 1)
    }

    pub fn previous_page(&mut self) -> Result<(), PageError> {
        self.go_to_page(self.current_page.saturating_sub(1))
    }

    /// Zero-based index of the current project, `None` when there are no pages.
    pub fn current_index(&self) -> Option<usize> {
        (self.total_pages > 0).then(|| self.current_page - 1)
    }

    pub fn current_project<'a>(&self, projects: &'a [Project]) -> Option<&'a Project> {
        self.current_index().and_then(|i| projects.get(i))
    }
}
