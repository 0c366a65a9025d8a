//! The visible window onto a source: `cols * rows` bytes starting at a
//! row-aligned `offset`, materialized into memory and read through a
//! [`BitCursor`](bitcursor::BitCursor) at the current bit lane.

use tracing::instrument;

use crate::model::bitcursor;
use crate::model::space;
use crate::model::space::SourceExt;

#[derive(Debug)]
pub struct Viewport {
    cols: u32,
    rows: u32,
    offset: u64,
    /* last valid byte address, inclusive */
    limit: u64,
    lane: u8,

    source: Option<space::PagedSource>,
    page: bitcursor::BitCursor<Vec<u8>>,
    /* the last fetch failed and `page` still holds an older window */
    stale: bool,
}

impl Viewport {
    pub fn new(cols: u32, rows: u32) -> Viewport {
        Viewport {
            cols: std::cmp::max(cols, 1),
            rows: std::cmp::max(rows, 1),
            offset: 0,
            limit: 0,
            lane: 0,

            source: None,
            page: bitcursor::BitCursor::new(Vec::new()),
            stale: false,
        }
    }

    /// Replaces the source and loads its first page. The source stays
    /// attached even if that first fetch fails.
    pub fn attach(&mut self, source: space::PagedSource) -> Result<(), space::SourceError> {
        tracing::info!(label = source.get_label(), length = source.length(), "attaching source");

        self.limit = source.length().saturating_sub(1);
        self.source = Some(source);
        self.reset_page();

        self.seek(0)
    }

    pub fn detach(&mut self) -> Option<space::PagedSource> {
        self.limit = 0;
        self.reset_page();
        self.source.take()
    }

    fn reset_page(&mut self) {
        self.offset = 0;
        self.lane = 0;
        self.page = bitcursor::BitCursor::new(Vec::new());
        self.stale = false;
    }

    pub fn cols(&self) -> u32 { self.cols }
    pub fn rows(&self) -> u32 { self.rows }
    pub fn offset(&self) -> u64 { self.offset }
    pub fn limit(&self) -> u64 { self.limit }
    pub fn lane(&self) -> u8 { self.lane }
    pub fn is_stale(&self) -> bool { self.stale }

    pub fn source(&self) -> Option<&space::PagedSource> {
        self.source.as_ref()
    }

    pub fn page_size(&self) -> u64 {
        self.cols as u64 * self.rows as u64
    }

    /// The furthest a page may start: the beginning of the row holding `limit`.
    pub fn max_offset(&self) -> u64 {
        self.limit - self.limit % self.cols as u64
    }

    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.offset && addr - self.offset < self.page_size()
    }

    /// The raw bytes of the current page, `cols * rows` long or shorter at
    /// the end of the source.
    pub fn bytes(&self) -> &[u8] {
        self.page.get_ref()
    }

    /// The current page read at the current bit lane. With a non-zero lane
    /// the last byte of the page can't be completed and is left out.
    pub fn lane_bytes(&self) -> Vec<u8> {
        let mut cursor = bitcursor::BitCursor::new(self.bytes());
        match cursor.position(0, self.lane) {
            Ok(()) => cursor.get_available(self.bytes().len()),
            Err(_) => Vec::new(),
        }
    }

    pub fn cursor_mut(&mut self) -> &mut bitcursor::BitCursor<Vec<u8>> {
        &mut self.page
    }

    pub fn set_lane(&mut self, lane: u8) {
        self.lane = lane % 8;
        self.rewind();
    }

    fn rewind(&mut self) {
        if let Err(underrun) = self.page.position(0, self.lane) {
            /* only an empty page can't hold the lane offset */
            tracing::trace!(%underrun, "page too short for lane");
        }
    }

    /// Loads the page starting at `target`, clamped to `[0, max_offset]`
    /// and aligned down to a row boundary. On failure the previous page and
    /// offset are kept.
    #[instrument(level = "debug", skip(self))]
    pub fn seek(&mut self, target: u64) -> Result<(), space::SourceError> {
        let Some(source) = &self.source else { return Ok(()) };

        let target = std::cmp::min(target - target % self.cols as u64, self.max_offset());

        match source.fetch_page(target, self.page_size() as usize) {
            Ok(page) => {
                self.page = bitcursor::BitCursor::new(page.bytes);
                self.offset = target;
                self.stale = false;
                self.rewind();
                Ok(())
            },
            Err(e) => {
                tracing::error!(offset = target, error = %e, "page fetch failed; keeping previous page");
                self.stale = true;
                Err(e)
            },
        }
    }

    pub fn skip(&mut self, delta: i64) -> Result<(), space::SourceError> {
        self.seek(self.offset.saturating_add_signed(delta))
    }

    /// Where the page would start after paging towards `addr` one whole
    /// page at a time until it is visible.
    pub fn page_offset_for(&self, addr: u64) -> u64 {
        let page = self.page_size();

        if addr < self.offset {
            let pages = (self.offset - addr).div_ceil(page);
            self.offset.saturating_sub(pages.saturating_mul(page))
        } else if addr - self.offset >= page {
            let pages = (addr - self.offset) / page;
            self.offset.saturating_add(pages.saturating_mul(page))
        } else {
            self.offset
        }
    }

    /// Pages so that `addr` is visible, or retries a failed fetch. Returns
    /// whether a new page was loaded.
    pub fn follow(&mut self, addr: u64) -> Result<bool, space::SourceError> {
        if self.source.is_none() || (self.contains(addr) && !self.stale) {
            return Ok(false);
        }

        let target = self.page_offset_for(addr);
        tracing::debug!(addr, from = self.offset, to = target, "paging to follow caret");

        self.seek(target).map(|_| true)
    }
}
